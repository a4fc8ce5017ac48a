// src/domain/changes.rs

use super::event::ResolvedStatus;
use super::status::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a client looked like at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub status_code: StatusCode,
    pub raw_status: String,
}

/// Current status per client_key, as handed to whatever persists it between
/// runs. Keyed by a BTreeMap so serialized snapshots are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub clients: BTreeMap<String, SnapshotEntry>,
}

impl Snapshot {
    pub fn from_resolved(resolved: &[ResolvedStatus]) -> Self {
        let clients = resolved
            .iter()
            .map(|r| {
                (
                    r.client_key().to_string(),
                    SnapshotEntry {
                        status_code: r.status_code(),
                        raw_status: r.event.raw_status.clone(),
                    },
                )
            })
            .collect();

        Snapshot { clients }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    NewClient,
    StatusChanged,
}

/// A single client whose current status differs from the previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub client_key: String,
    pub kind: ChangeKind,
    pub previous: Option<SnapshotEntry>,
    pub current: SnapshotEntry,
}

/// Compares the previous snapshot with the current resolution and lists new
/// clients and status changes, ordered by client_key.
///
/// Only the status code is compared; a retyped status text that classifies to
/// the same code is not a change. Clients that disappeared are not reported.
pub fn detect_changes(previous: &Snapshot, current: &Snapshot) -> Vec<StatusChange> {
    let mut changes = Vec::new();

    for (key, entry) in &current.clients {
        match previous.clients.get(key) {
            None => changes.push(StatusChange {
                client_key: key.clone(),
                kind: ChangeKind::NewClient,
                previous: None,
                current: entry.clone(),
            }),
            Some(before) if before.status_code != entry.status_code => {
                changes.push(StatusChange {
                    client_key: key.clone(),
                    kind: ChangeKind::StatusChanged,
                    previous: Some(before.clone()),
                    current: entry.clone(),
                })
            }
            Some(_) => {}
        }
    }

    changes
}
