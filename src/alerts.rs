// src/alerts.rs
//
// Operational alerts for the sales managers. Everything takes an explicit
// reference date so results are reproducible.

use crate::config::AlertThresholds;
use crate::domain::{Event, ResolvedStatus, StatusCode};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdleBroker {
    pub broker: String,
    pub last_analysis: NaiveDate,
    pub days_idle: i64,
}

/// A client stuck in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleClient {
    pub client_key: String,
    pub broker: String,
    pub status_code: StatusCode,
    pub since: NaiveDate,
    pub days: i64,
}

/// Brokers whose latest analysis falls inside the alert window but is at
/// least `idle_days` old. Brokers with no analysis in the window are not
/// reported; they are considered inactive, not idle.
pub fn idle_brokers(
    events: &[Event],
    reference: NaiveDate,
    thresholds: &AlertThresholds,
) -> Vec<IdleBroker> {
    let window_start = reference - chrono::Duration::days(thresholds.idle_window_days);
    let mut latest: BTreeMap<&str, NaiveDate> = BTreeMap::new();

    for event in events.iter().filter(|e| e.status_code.is_analysis()) {
        let Some(date) = event.timestamp else {
            continue;
        };
        if date < window_start || date > reference {
            continue;
        }
        latest
            .entry(event.broker.as_str())
            .and_modify(|last| *last = (*last).max(date))
            .or_insert(date);
    }

    let mut idle: Vec<IdleBroker> = latest
        .into_iter()
        .map(|(broker, last_analysis)| IdleBroker {
            broker: broker.to_string(),
            last_analysis,
            days_idle: (reference - last_analysis).num_days(),
        })
        .filter(|b| b.days_idle >= thresholds.idle_days)
        .collect();

    idle.sort_by(|a, b| b.days_idle.cmp(&a.days_idle).then_with(|| a.broker.cmp(&b.broker)));

    if !idle.is_empty() {
        log::debug!("{} brokers idle as of {reference}", idle.len());
    }

    idle
}

fn stale_in(
    resolved: &[ResolvedStatus],
    code: StatusCode,
    reference: NaiveDate,
    min_days: i64,
) -> Vec<StaleClient> {
    let mut stale: Vec<StaleClient> = resolved
        .iter()
        .filter(|r| r.status_code() == code)
        .filter_map(|r| {
            let since = r.event.timestamp?;
            let days = (reference - since).num_days();
            (days >= min_days).then(|| StaleClient {
                client_key: r.client_key().to_string(),
                broker: r.event.broker.clone(),
                status_code: code,
                since,
                days,
            })
        })
        .collect();

    stale.sort_by(|a, b| b.days.cmp(&a.days).then_with(|| a.client_key.cmp(&b.client_key)));
    stale
}

/// Clients whose current status has been PENDING for `pending_days` or more.
pub fn stale_pending(
    resolved: &[ResolvedStatus],
    reference: NaiveDate,
    thresholds: &AlertThresholds,
) -> Vec<StaleClient> {
    stale_in(resolved, StatusCode::Pending, reference, thresholds.pending_days)
}

/// Sales the broker reported that the builder has not confirmed after
/// `informed_sale_days`.
pub fn stale_informed_sales(
    resolved: &[ResolvedStatus],
    reference: NaiveDate,
    thresholds: &AlertThresholds,
) -> Vec<StaleClient> {
    stale_in(
        resolved,
        StatusCode::SaleInformed,
        reference,
        thresholds.informed_sale_days,
    )
}
