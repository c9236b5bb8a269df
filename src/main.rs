use chrono::{Duration, Local};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zakupki::{scrape, BoundedPool, Result, ScrapeOptions, SearchSpec, DEFAULT_POOL_SIZE};

const DEFAULT_KEYWORD: &str = "бумага";
const OUT_PATH: &str = "zakupki.csv";
const LOOKBACK_DAYS: i64 = 365;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let keyword = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_KEYWORD.to_string());
    let today = Local::now().date_naive();
    let spec = SearchSpec::new(keyword, today - Duration::days(LOOKBACK_DAYS), today);

    let pool = BoundedPool::new(DEFAULT_POOL_SIZE);
    match scrape(&spec, &ScrapeOptions::default(), &pool).await? {
        Some(table) => {
            let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(OUT_PATH)?;
            writer.write_record(&table.headers)?;
            for row in &table.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
            info!(rows = table.len(), path = OUT_PATH, "wrote the merged export");
        }
        None => warn!("nothing came back for this search"),
    }

    Ok(())
}
