use std::time::Instant;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Url;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::pool::TaskPool;
use crate::query::Endpoints;
use crate::request::Fetcher;
use crate::search::{DateWindow, FetchPolicy, FetchTask, SearchSpec};
use crate::table::ResultTable;
use crate::{parse, plan};

/// Everything the pipeline needs besides the search itself. `Default` is
/// the production setup: the live portal, 30-day slices, 500-row export
/// pages.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Days per date window.
    pub step_days: u32,
    /// Rows per export page.
    pub window_size: u64,
    pub policy: FetchPolicy,
    pub endpoints: Endpoints,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            step_days: crate::DEFAULT_STEP_DAYS,
            window_size: crate::EXPORT_WINDOW_SIZE,
            policy: FetchPolicy::default(),
            endpoints: Endpoints::default(),
        }
    }
}

/// Runs the whole pipeline for one search: slice the date range into
/// windows, discover each window's result count, page every counted window
/// through the export, merge the chunks.
///
/// Windows and chunks fail soft. A window whose count can't be read is
/// skipped, a chunk that won't fetch or decode is dropped, and both only
/// leave a log line behind. `Ok(None)` means nothing at all was collected,
/// which is not the same as a table with zero rows. `Err` is reserved for
/// arguments that could never work, raised before any request goes out.
pub async fn scrape(
    spec: &SearchSpec,
    opts: &ScrapeOptions,
    pool: &impl TaskPool,
) -> Result<Option<ResultTable>> {
    spec.validate()?;
    if opts.step_days == 0 {
        return Err(Error::InvalidInput(
            "a zero-day step would never finish the search".into(),
        ));
    }
    if opts.window_size == 0 {
        return Err(Error::InvalidInput(
            "a zero-row export window would fetch nothing".into(),
        ));
    }

    let windows = plan::date_windows(spec.date_from, spec.date_to, opts.step_days);
    info!(
        keyword = %spec.keyword,
        from = %spec.date_from,
        to = %spec.date_to,
        windows = windows.len(),
        "starting scrape"
    );

    let counting = Instant::now();
    let mut discoveries: Vec<BoxFuture<'static, (DateWindow, Option<u64>)>> =
        Vec::with_capacity(windows.len());
    for window in windows {
        let task = spec.task(window);
        let endpoints = opts.endpoints.clone();
        let policy = opts.policy;
        discoveries.push(async move { discover_count(&endpoints, task, policy).await }.boxed());
    }
    let counted = pool.run_all(discoveries).await;

    let mut chunks: Vec<FetchTask> = Vec::new();
    for (window, count) in counted {
        let Some(count) = count else { continue };
        for slice in plan::offset_windows(count, opts.window_size) {
            chunks.push(spec.task(window).with_slice(slice));
        }
    }
    info!(
        elapsed_ms = counting.elapsed().as_millis() as u64,
        chunks = chunks.len(),
        "count discovery finished"
    );

    let fetching = Instant::now();
    let mut fetches: Vec<BoxFuture<'static, Option<ResultTable>>> =
        Vec::with_capacity(chunks.len());
    for task in chunks {
        let endpoints = opts.endpoints.clone();
        let policy = opts.policy;
        fetches.push(async move { fetch_chunk(&endpoints, task, policy).await }.boxed());
    }
    let fragments = pool.run_all(fetches).await;

    let mut merged: Option<ResultTable> = None;
    let mut dropped = 0usize;
    for fragment in fragments {
        match fragment {
            Some(table) => match merged.as_mut() {
                Some(all) => all.append(table),
                None => merged = Some(table),
            },
            None => dropped += 1,
        }
    }

    match &merged {
        Some(table) => info!(
            elapsed_ms = fetching.elapsed().as_millis() as u64,
            rows = table.len(),
            dropped,
            "data fetch finished"
        ),
        None => warn!(
            elapsed_ms = fetching.elapsed().as_millis() as u64,
            dropped,
            "no data collected"
        ),
    }
    Ok(merged)
}

/// Asks the results page how many rows `task`'s window holds. Every
/// failure mode collapses to `None`: an unknown count just skips the
/// window.
pub async fn discover_count(
    endpoints: &Endpoints,
    task: FetchTask,
    policy: FetchPolicy,
) -> (DateWindow, Option<u64>) {
    let window = task.window;
    let url = endpoints.count_url(&task);
    let body = match fetch(&url, policy).await {
        Ok(body) => body,
        Err(error) => {
            warn!(window = %window, %error, "count discovery failed");
            return (window, None);
        }
    };

    let html = String::from_utf8_lossy(&body);
    match parse::result_count(&html) {
        Ok(count) => {
            debug!(window = %window, count, "window counted");
            (window, Some(count))
        }
        Err(error) => {
            warn!(window = %window, %error, "count discovery failed");
            (window, None)
        }
    }
}

/// Fetches and decodes one export page. Failures are logged and become
/// `None`; a broken chunk never contributes partial rows.
pub async fn fetch_chunk(
    endpoints: &Endpoints,
    task: FetchTask,
    policy: FetchPolicy,
) -> Option<ResultTable> {
    let url = endpoints.export_url(&task);
    let raw = match fetch(&url, policy).await {
        Ok(raw) => raw,
        Err(error) => {
            warn!(window = %task.window, slice = ?task.slice, %error, "chunk fetch failed");
            return None;
        }
    };
    trace!(bytes = raw.len(), "export payload fetched");

    match parse::result_table(&raw) {
        Ok(table) => Some(table),
        Err(error) => {
            warn!(window = %task.window, slice = ?task.slice, %error, "chunk decode failed");
            None
        }
    }
}

/// One request through a task-scoped [`Fetcher`].
async fn fetch(url: &Url, policy: FetchPolicy) -> Result<Bytes> {
    let mut fetcher = Fetcher::new(policy)?;
    fetcher.get(url).await
}
