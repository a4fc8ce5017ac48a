// src/domain/event.rs

use super::money::Money;
use super::status::{classify, StatusCode};
use chrono::NaiveDate;
use serde::Serialize;

/// Placeholder for a blank broker, team, client name or CRM origin.
pub const NOT_INFORMED: &str = "NOT_INFORMED";

/// Origin given to clients that no CRM lead matched.
pub const NO_CRM_RECORD: &str = "NO_CRM_RECORD";

/// Builds the client identity used everywhere downstream.
///
/// The tax id only disambiguates: two rows with the same name and a blank tax
/// id are the same client.
pub fn client_key(name: &str, tax_id: &str) -> String {
    format!("{name} | {tax_id}")
}

/// One normalized row of the pipeline sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub client_key: String,
    pub client_name: String,
    pub tax_id: String,

    /// `None` when the sheet date could not be parsed.
    pub timestamp: Option<NaiveDate>,
    pub raw_status: String,
    pub status_code: StatusCode,

    pub broker: String,
    pub team: String,
    pub value: Money,

    /// Commercial month the row is booked under ("DATA BASE").
    pub base_month: Option<NaiveDate>,
    pub builder: String,
    pub development: String,

    /// Position in the input; breaks same-day ties.
    pub row_index: usize,
}

impl Event {
    /// Creates an event with default broker/team and zero value.
    /// `client_name` and `tax_id` are expected to be normalized already.
    pub fn new(
        client_name: &str,
        tax_id: &str,
        timestamp: Option<NaiveDate>,
        raw_status: &str,
    ) -> Self {
        Event {
            client_key: client_key(client_name, tax_id),
            client_name: client_name.to_string(),
            tax_id: tax_id.to_string(),
            timestamp,
            raw_status: raw_status.to_string(),
            status_code: classify(raw_status),
            broker: NOT_INFORMED.to_string(),
            team: NOT_INFORMED.to_string(),
            value: Money::ZERO,
            base_month: None,
            builder: String::new(),
            development: String::new(),
            row_index: 0,
        }
    }

    pub fn with_broker(mut self, broker: &str) -> Self {
        self.broker = broker.to_string();
        self
    }

    pub fn with_team(mut self, team: &str) -> Self {
        self.team = team.to_string();
        self
    }

    pub fn with_value(mut self, value: Money) -> Self {
        self.value = value;
        self
    }

    pub fn with_row_index(mut self, row_index: usize) -> Self {
        self.row_index = row_index;
        self
    }
}

/// The event considered current for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStatus {
    pub event: Event,
    /// Marketing source from the CRM join.
    pub origin: String,
}

impl ResolvedStatus {
    pub fn new(event: Event) -> Self {
        ResolvedStatus {
            event,
            origin: NO_CRM_RECORD.to_string(),
        }
    }

    pub fn client_key(&self) -> &str {
        &self.event.client_key
    }

    pub fn status_code(&self) -> StatusCode {
        self.event.status_code
    }
}

/// One distinct sale, at most one per client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueSale {
    pub client_key: String,
    pub status_code: StatusCode,
    pub date: Option<NaiveDate>,
    pub value: Money,
    pub broker: String,
    pub team: String,
    pub origin: String,
}

impl UniqueSale {
    pub fn from_resolved(resolved: &ResolvedStatus) -> Self {
        let event = &resolved.event;
        UniqueSale {
            client_key: event.client_key.clone(),
            status_code: event.status_code,
            date: event.timestamp,
            value: event.value,
            broker: event.broker.clone(),
            team: event.team.clone(),
            origin: resolved.origin.clone(),
        }
    }
}
