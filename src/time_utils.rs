// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// First date of a `days`-day window ending at `today`, or `None` for an
/// empty window.
pub fn window_start(today: NaiveDate, days: u32) -> Option<NaiveDate> {
    if days == 0 {
        return None;
    }
    Some(
        today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN),
    )
}

/// Dates from `today - days` through `today`, ascending, produced lazily.
///
/// A zero-day window is empty.
pub fn sync_window(today: NaiveDate, days: u32) -> impl Iterator<Item = NaiveDate> {
    window_start(today, days)
        .into_iter()
        .flat_map(|start| start.iter_days())
        .take_while(move |d| *d <= today)
}
