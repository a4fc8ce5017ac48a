// src/tests/utils.rs

use crate::domain::{Event, ResolvedStatus};
use crate::normalize::RawRow;
use chrono::NaiveDate;

/// A day of November 2025, the month every test fixture lives in.
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, d)
        .unwrap_or_else(|| panic!("November 2025 has no day {d}"))
}

/// Event for `name` with a blank tax id on November `d`.
pub fn ev(name: &str, d: u32, status: &str) -> Event {
    Event::new(name, "", Some(day(d)), status)
}

pub fn resolved(event: Event) -> ResolvedStatus {
    ResolvedStatus::new(event)
}

/// Raw sheet row from header/value pairs.
pub fn row(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
