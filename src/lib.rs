//! Scatter-gather scraper for the zakupki.gov.ru procurement portal.
//!
//! The portal exposes a search page with a result count and a CSV export
//! capped at small pages, so collecting a date range means slicing it into
//! windows, asking each window for its count, paging each window's export
//! and gluing the chunks back together. Everything network-facing runs on
//! a bounded task pool with per-request pacing and retries, because the
//! portal drops requests and serves its 404s with a 200 status.

mod error;
mod parse;
mod plan;
mod pool;
pub mod process;
mod query;
mod request;
mod search;
mod table;

pub use error::{Error, Result};
pub use plan::{date_windows, offset_windows};
pub use pool::{BoundedPool, TaskPool};
pub use process::{scrape, ScrapeOptions};
pub use query::Endpoints;
pub use request::Fetcher;
pub use search::{DateWindow, FetchPolicy, FetchTask, OffsetWindow, SearchSpec};
pub use table::ResultTable;

/// Rows per export page, the export engine rejects anything bigger.
pub const EXPORT_WINDOW_SIZE: u64 = 500;
/// Days per date window. A month keeps typical counts within a few pages.
pub const DEFAULT_STEP_DAYS: u32 = 30;
/// In-flight requests per phase.
pub const DEFAULT_POOL_SIZE: usize = 4;
