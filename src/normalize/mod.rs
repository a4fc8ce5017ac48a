// src/normalize/mod.rs

pub mod aliases;
pub mod parse;

pub use aliases::{RawRow, RowView};
pub use parse::{base_month_label, parse_base_month, parse_day_first, parse_money};

use crate::domain::{Event, Money, NOT_INFORMED};
use aliases as alias;
use parse::{digits_only, normalize_label};
use serde::Serialize;

/// Rows left out by normalization or resolution, for observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionCounts {
    /// Rows with neither a client name nor a tax id.
    pub malformed_rows: usize,
    /// Rows whose date could not be parsed.
    pub undated_rows: usize,
}

/// Result of normalizing one sheet export.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Dated events, in input order.
    pub events: Vec<Event>,
    /// Events without a usable date. Kept for audit listings only.
    pub undated: Vec<Event>,
    pub excluded: ExclusionCounts,
}

/// Normalizes every row of a sheet export.
///
/// Never fails: malformed rows are dropped and counted, undated rows are set
/// aside in `undated`. `row_index` on each event is the row's position in
/// `rows`.
pub fn normalize_rows(rows: &[RawRow]) -> Normalized {
    let mut out = Normalized::default();

    for (row_index, row) in rows.iter().enumerate() {
        let Some(event) = normalize_row(row, row_index) else {
            log::debug!("Dropping row {row_index}: no client name or tax id");
            out.excluded.malformed_rows += 1;
            continue;
        };

        if event.timestamp.is_none() {
            log::debug!(
                "Row {row_index} for '{}' has no usable date; kept for audit only",
                event.client_key
            );
            out.excluded.undated_rows += 1;
            out.undated.push(event);
        } else {
            out.events.push(event);
        }
    }

    log::info!(
        "Normalized {} rows: {} dated events, {} undated, {} malformed",
        rows.len(),
        out.events.len(),
        out.excluded.undated_rows,
        out.excluded.malformed_rows
    );

    out
}

/// Normalizes one row. Returns `None` only when the row carries no client
/// identity at all.
pub fn normalize_row(row: &RawRow, row_index: usize) -> Option<Event> {
    let view = RowView::new(row);

    let name = view.lookup(alias::CLIENT_NAME).map(normalize_label);
    let tax_id = view.lookup(alias::TAX_ID).map(digits_only).unwrap_or_default();

    let name = match name {
        Some(name) => name,
        None if !tax_id.is_empty() => NOT_INFORMED.to_string(),
        None => return None,
    };

    let timestamp = view.lookup(alias::DATE).and_then(parse_day_first);
    let raw_status = view.lookup(alias::STATUS).unwrap_or("");

    let labelled = |aliases: &[&str]| {
        view.lookup(aliases)
            .map(normalize_label)
            .unwrap_or_else(|| NOT_INFORMED.to_string())
    };

    let mut event = Event::new(&name, &tax_id, timestamp, raw_status)
        .with_broker(&labelled(alias::BROKER))
        .with_team(&labelled(alias::TEAM))
        .with_value(
            view.lookup(alias::VALUE)
                .and_then(parse_money)
                .unwrap_or(Money::ZERO),
        )
        .with_row_index(row_index);

    event.base_month = view.lookup(alias::BASE_MONTH).and_then(parse_base_month);
    event.builder = view.lookup(alias::BUILDER).map(normalize_label).unwrap_or_default();
    event.development = view
        .lookup(alias::DEVELOPMENT)
        .map(normalize_label)
        .unwrap_or_default();

    Some(event)
}
