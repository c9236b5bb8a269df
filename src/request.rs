use std::time::{Duration, Instant};

use bytes::Bytes;
use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT,
};
use reqwest::{Client, Url};
use tracing::warn;

use crate::error::{Error, Result};
use crate::search::FetchPolicy;

/// The portal serves its error page with a 200 status; only the body gives
/// it away.
const NOT_FOUND_PREAMBLE: &[u8] = b"<html>\r\n<head><title>404 Not Found</title";

/// Upper bound on the random pacing jitter.
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Browser-like defaults, the portal is not fond of obvious bots.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    headers
}

/// One task's HTTP client. Owns its own pacing clock so concurrent tasks
/// never stall each other, and retries every failure up to the policy's
/// budget before giving up.
pub struct Fetcher {
    client: Client,
    policy: FetchPolicy,
    last_request: Option<Instant>,
}

impl Fetcher {
    pub fn new(policy: FetchPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(policy.timeout)
            .default_headers(default_headers())
            .build()?;
        Ok(Self {
            client,
            policy,
            last_request: None,
        })
    }

    /// Fetches `url` and returns the body bytes, retrying until the
    /// policy's attempt budget is spent. HTTP error statuses and disguised
    /// 404 bodies count as failures like any transport error.
    pub async fn get(&mut self, url: &Url) -> Result<Bytes> {
        let tries = self.policy.max_tries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.pace().await;
            match self.try_get(url).await {
                Ok(body) => return Ok(body),
                Err(error) if attempt < tries => {
                    warn!(%url, attempt, %error, "request failed, retrying");
                }
                Err(error) => {
                    warn!(%url, attempt, %error, "request failed, giving up");
                    return Err(error);
                }
            }
        }
    }

    /// Sleeps off whatever is left of `base_delay` since this fetcher's
    /// previous request, plus a little jitter so parallel tasks don't fall
    /// into lockstep.
    async fn pace(&mut self) {
        if let Some(last) = self.last_request {
            let delay = self.policy.base_delay;
            let elapsed = last.elapsed();
            if delay > Duration::ZERO && elapsed < delay {
                let jitter = MAX_JITTER.mul_f64(rand::thread_rng().gen_range(0.0..1.0));
                tokio::time::sleep(delay - elapsed + jitter).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    async fn try_get(&self, url: &Url) -> Result<Bytes> {
        let res = self.client.get(url.clone()).send().await?.error_for_status()?;
        let body = res.bytes().await?;
        if body.starts_with(NOT_FOUND_PREAMBLE) {
            return Err(Error::DisguisedNotFound);
        }
        Ok(body)
    }
}
