// src/pipeline/resolver.rs

use crate::domain::{Event, StatusCode};
use std::collections::BTreeMap;

/// All dated events of one client, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHistory {
    pub client_key: String,
    pub events: Vec<Event>,
}

impl ClientHistory {
    /// Orders `events` by date. The sort is stable, so same-day events keep
    /// their input order, which is the order they happened in.
    pub fn new(client_key: impl Into<String>, mut events: Vec<Event>) -> Self {
        events.sort_by_key(|e| e.timestamp);
        ClientHistory {
            client_key: client_key.into(),
            events,
        }
    }

    pub fn current(&self) -> Option<&Event> {
        resolve_history(&self.events)
    }
}

/// Accumulator of the single pass over a history.
///
/// A withdrawal opens a new segment and forgets any sale seen before it;
/// within a segment the latest sale sticks even if later statuses follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryReduction {
    pub segment_start: usize,
    pub best_sale: Option<usize>,
    pub last_event: Option<usize>,
}

impl HistoryReduction {
    fn step(self, index: usize, code: StatusCode) -> Self {
        match code {
            StatusCode::Withdrawn => HistoryReduction {
                segment_start: index,
                best_sale: None,
                last_event: Some(index),
            },
            code if code.is_sale() => HistoryReduction {
                best_sale: Some(index),
                last_event: Some(index),
                ..self
            },
            _ => HistoryReduction {
                last_event: Some(index),
                ..self
            },
        }
    }

    /// Index of the current event: the segment's last sale, else its last event.
    pub fn current_index(&self) -> Option<usize> {
        self.best_sale.or(self.last_event)
    }
}

/// Folds a chronologically ordered history into its reduction.
pub fn reduce_history(history: &[Event]) -> HistoryReduction {
    history
        .iter()
        .enumerate()
        .fold(HistoryReduction::default(), |acc, (index, event)| {
            acc.step(index, event.status_code)
        })
}

/// The current event of an already ordered history. `None` for an empty one.
pub fn resolve_history(history: &[Event]) -> Option<&Event> {
    reduce_history(history)
        .current_index()
        .map(|index| &history[index])
}

/// Groups dated events by client_key into ordered histories, sorted by key.
/// Undated events are skipped; the second value is how many.
pub fn group_histories(events: &[Event]) -> (Vec<ClientHistory>, usize) {
    let mut by_client: BTreeMap<&str, Vec<Event>> = BTreeMap::new();
    let mut undated = 0;

    for event in events {
        if event.timestamp.is_none() {
            undated += 1;
            continue;
        }
        by_client
            .entry(event.client_key.as_str())
            .or_default()
            .push(event.clone());
    }

    let histories = by_client
        .into_iter()
        .map(|(key, events)| ClientHistory::new(key, events))
        .collect();

    (histories, undated)
}
