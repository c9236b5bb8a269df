use core::fmt;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// One logical search against the portal: a keyword, an inclusive date
/// range and the legal regimes to include. Immutable once built; the
/// pipeline slices its range into [`DateWindow`]s.
#[derive(Debug, Clone)]
pub struct SearchSpec {
    pub keyword: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Contracts placed under the 44-FZ regime.
    pub include_fz44: bool,
    /// Contracts placed under the 223-FZ regime.
    pub include_fz223: bool,
}

impl SearchSpec {
    /// Searches for `keyword` over `[date_from, date_to]` with both legal
    /// regimes enabled.
    pub fn new(keyword: impl Into<String>, date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            keyword: keyword.into(),
            date_from,
            date_to,
            include_fz44: true,
            include_fz223: true,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.date_from > self.date_to {
            return Err(Error::InvalidInput(format!(
                "date range is invalid: from {} is after to {}",
                self.date_from, self.date_to
            )));
        }
        Ok(())
    }

    /// A count-discovery task for one window of this search. Chain
    /// [`FetchTask::with_slice`] to turn it into an export task.
    pub fn task(&self, window: DateWindow) -> FetchTask {
        FetchTask {
            keyword: self.keyword.clone(),
            include_fz44: self.include_fz44,
            include_fz223: self.include_fz223,
            window,
            slice: None,
        }
    }
}

/// Per-request behavior. Copied into every fetcher, so tweaking it
/// mid-scrape changes nothing already in flight.
#[derive(Debug, Clone, Copy)]
pub struct FetchPolicy {
    /// Attempts before a failure becomes definitive.
    pub max_tries: u32,
    /// Minimum spacing between two requests from the same fetcher.
    pub base_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_tries: 10,
            base_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
        }
    }
}

/// A contiguous slice of the search date range, inclusive on both ends.
/// Consecutive windows share their boundary day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", fmt_date(self.from), fmt_date(self.to))
    }
}

/// One page of the CSV export: 1-based inclusive row offsets, named after
/// the `from`/`to` query parameters they become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetWindow {
    pub from: u64,
    pub to: u64,
}

/// Everything one request needs: the search narrowed to a single date
/// window, plus an optional offset slice. Without a slice the task asks the
/// results page for a count; with one it asks the export endpoint for rows.
#[derive(Debug, Clone)]
pub struct FetchTask {
    pub keyword: String,
    pub include_fz44: bool,
    pub include_fz223: bool,
    pub window: DateWindow,
    pub slice: Option<OffsetWindow>,
}

impl FetchTask {
    pub fn with_slice(mut self, slice: OffsetWindow) -> Self {
        self.slice = Some(slice);
        self
    }

    /// The query parameters this task owns. Everything else on the endpoint
    /// URL stays whatever the template says.
    pub(crate) fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("searchString", self.keyword.clone()),
            ("fz44", flag(self.include_fz44)),
            ("fz223", flag(self.include_fz223)),
            ("publishDateFrom", fmt_date(self.window.from)),
            ("publishDateTo", fmt_date(self.window.to)),
        ];
        if let Some(slice) = self.slice {
            params.push(("from", slice.from.to_string()));
            params.push(("to", slice.to.to_string()));
        }
        params
    }
}

fn flag(on: bool) -> String {
    if on { "on" } else { "off" }.to_string()
}

/// The portal wants zero-padded `DD.MM.YYYY`.
pub(crate) fn fmt_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dates_are_zero_padded() {
        assert_eq!(fmt_date(day(2024, 3, 5)), "05.03.2024");
        assert_eq!(fmt_date(day(2024, 11, 30)), "30.11.2024");
    }

    #[test]
    fn inverted_range_is_rejected() {
        let spec = SearchSpec::new("бумага", day(2024, 5, 1), day(2024, 4, 1));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn single_day_range_is_fine() {
        let spec = SearchSpec::new("бумага", day(2024, 4, 1), day(2024, 4, 1));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn regime_flags_render_independently() {
        let mut spec = SearchSpec::new("болт", day(2024, 1, 1), day(2024, 1, 31));
        spec.include_fz223 = false;
        let task = spec.task(DateWindow {
            from: spec.date_from,
            to: spec.date_to,
        });
        let params = task.query_params();
        assert!(params.contains(&("fz44", "on".to_string())));
        assert!(params.contains(&("fz223", "off".to_string())));
    }

    #[test]
    fn slice_adds_offset_params() {
        let spec = SearchSpec::new("болт", day(2024, 1, 1), day(2024, 1, 31));
        let task = spec
            .task(DateWindow {
                from: spec.date_from,
                to: spec.date_to,
            })
            .with_slice(OffsetWindow { from: 501, to: 1000 });
        let params = task.query_params();
        assert!(params.contains(&("from", "501".to_string())));
        assert!(params.contains(&("to", "1000".to_string())));
    }

    #[test]
    fn count_task_has_no_offset_params() {
        let spec = SearchSpec::new("болт", day(2024, 1, 1), day(2024, 1, 31));
        let task = spec.task(DateWindow {
            from: spec.date_from,
            to: spec.date_to,
        });
        let params = task.query_params();
        assert!(params.iter().all(|(name, _)| *name != "from" && *name != "to"));
    }
}
