// src/portfolio.rs

use crate::domain::{Event, Money, ResolvedStatus, StatusCode};
use serde::Serialize;
use std::collections::HashMap;

/// One line of a broker's client portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioRow {
    pub client_key: String,
    pub client_name: String,
    pub broker: String,
    pub team: String,
    pub origin: String,
    pub current_status: String,
    pub status_code: StatusCode,
    pub last_movement: Option<chrono::NaiveDate>,
    pub builder: String,
    pub development: String,

    pub analyses: usize,
    pub approvals: usize,
    pub sale_events: usize,
    /// Sum of the values of every row in the client's history.
    pub historical_value: Money,
}

#[derive(Default)]
struct HistoryCounts {
    analyses: usize,
    approvals: usize,
    sale_events: usize,
    value: Money,
    last_movement: Option<chrono::NaiveDate>,
}

/// Builds the portfolio from the current statuses and the full event history.
///
/// Counts cover every event of the client, not just the current segment.
/// Rows are sorted by broker, current raw status, then client.
pub fn portfolio(events: &[Event], resolved: &[ResolvedStatus]) -> Vec<PortfolioRow> {
    let mut history: HashMap<&str, HistoryCounts> = HashMap::new();

    for event in events {
        let counts = history.entry(event.client_key.as_str()).or_default();
        let code = event.status_code;

        if code.is_analysis() {
            counts.analyses += 1;
        } else if code.is_approval(false) {
            counts.approvals += 1;
        } else if code.is_sale() {
            counts.sale_events += 1;
        }
        counts.value = counts.value + event.value;
        counts.last_movement = counts.last_movement.max(event.timestamp);
    }

    let mut rows: Vec<PortfolioRow> = resolved
        .iter()
        .map(|status| {
            let event = &status.event;
            let counts = history.remove(event.client_key.as_str()).unwrap_or_default();

            PortfolioRow {
                client_key: event.client_key.clone(),
                client_name: event.client_name.clone(),
                broker: event.broker.clone(),
                team: event.team.clone(),
                origin: status.origin.clone(),
                current_status: event.raw_status.clone(),
                status_code: event.status_code,
                last_movement: counts.last_movement.or(event.timestamp),
                builder: event.builder.clone(),
                development: event.development.clone(),
                analyses: counts.analyses,
                approvals: counts.approvals,
                sale_events: counts.sale_events,
                historical_value: counts.value,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.broker
            .cmp(&b.broker)
            .then_with(|| a.current_status.cmp(&b.current_status))
            .then_with(|| a.client_key.cmp(&b.client_key))
    });

    rows
}
