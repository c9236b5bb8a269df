use chrono::{Duration, NaiveDate};

use crate::search::{DateWindow, OffsetWindow};

/// Slices `[from, to]` into windows of at most `step_days` days.
///
/// Windows are inclusive and each one starts on the day the previous one
/// ended, matching how the portal interprets `publishDateFrom` and
/// `publishDateTo`. The final window is clipped to `to`. An empty range
/// (`from == to`) or a zero step yields no windows.
pub fn date_windows(from: NaiveDate, to: NaiveDate, step_days: u32) -> Vec<DateWindow> {
    if step_days == 0 {
        return Vec::new();
    }
    let step = Duration::days(i64::from(step_days));
    let mut windows = Vec::new();
    let mut left = from;
    let mut right = (from + step).min(to);
    while right <= to && left < to {
        windows.push(DateWindow { from: left, to: right });
        left += step;
        right = (right + step).min(to);
    }
    windows
}

/// Plans the 1-based export pages for `count` results.
///
/// Pages advance by `window_size` starting at offset 1. The right edge is
/// only clipped on the first page, so once `count` leaves a short tail
/// behind full pages that tail is dropped rather than fetched.
pub fn offset_windows(count: u64, window_size: u64) -> Vec<OffsetWindow> {
    if window_size == 0 {
        return Vec::new();
    }
    let mut windows = Vec::new();
    let mut left = 1;
    let mut right = window_size.min(count);
    while right <= count && left <= count {
        windows.push(OffsetWindow { from: left, to: right });
        left += window_size;
        right += window_size;
    }
    windows
}
