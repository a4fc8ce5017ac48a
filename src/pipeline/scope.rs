// src/pipeline/scope.rs

use crate::domain::Event;
use crate::normalize::parse::normalize_label;
use chrono::NaiveDate;

/// Selection applied to events before resolution: the period, team, broker
/// and commercial months a page is looking at. Every bound is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventScope {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub team: Option<String>,
    pub broker: Option<String>,
    /// First day of each accepted base month; empty accepts all.
    pub base_months: Vec<NaiveDate>,
}

impl EventScope {
    pub fn all() -> Self {
        EventScope::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        EventScope {
            from: Some(from),
            to: Some(to),
            ..EventScope::default()
        }
    }

    pub fn with_team(mut self, team: &str) -> Self {
        self.team = Some(normalize_label(team));
        self
    }

    pub fn with_broker(mut self, broker: &str) -> Self {
        self.broker = Some(normalize_label(broker));
        self
    }

    pub fn with_base_months(mut self, months: Vec<NaiveDate>) -> Self {
        self.base_months = months;
        self
    }

    pub fn contains(&self, event: &Event) -> bool {
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = event.timestamp else {
                return false;
            };
            if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
                return false;
            }
        }

        if let Some(team) = &self.team {
            if normalize_label(&event.team) != *team {
                return false;
            }
        }

        if let Some(broker) = &self.broker {
            if normalize_label(&event.broker) != *broker {
                return false;
            }
        }

        if !self.base_months.is_empty() {
            match event.base_month {
                Some(month) if self.base_months.contains(&month) => {}
                _ => return false,
            }
        }

        true
    }

    pub fn apply(&self, events: &[Event]) -> Vec<Event> {
        events.iter().filter(|e| self.contains(e)).cloned().collect()
    }
}
