// src/pipeline/mod.rs

pub mod aggregate;
pub mod resolver;
pub mod sales;
pub mod scope;

pub use aggregate::{aggregate, ratio, AggregateOptions, GroupBy, GroupRollup};
pub use resolver::{group_histories, reduce_history, resolve_history, ClientHistory, HistoryReduction};
pub use sales::{dedupe_sales, SaleFilter};
pub use scope::EventScope;

use crate::crm::{attach_origins, CrmLead};
use crate::domain::{Event, ResolvedStatus, UniqueSale};
use crate::normalize::{normalize_rows, ExclusionCounts, RawRow};

/// Resolves every client in `events` to its current status, one per
/// client_key, ordered by client_key. Undated events are ignored.
///
/// Every status starts with origin `NO_CRM_RECORD`; see `crm::attach_origins`.
pub fn resolve_all(events: &[Event]) -> Vec<ResolvedStatus> {
    let (histories, undated) = group_histories(events);

    if undated > 0 {
        log::debug!("Resolver skipped {undated} undated events");
    }

    let resolved: Vec<ResolvedStatus> = histories
        .iter()
        .filter_map(ClientHistory::current)
        .cloned()
        .map(ResolvedStatus::new)
        .collect();

    log::debug!(
        "Resolved {} clients from {} events",
        resolved.len(),
        events.len()
    );

    resolved
}

/// Knobs of one full pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    pub scope: EventScope,
    pub sale_filter: SaleFilter,
    pub group_by: Option<GroupBy>,
    pub options: AggregateOptions,
}

/// Everything one run produces, from the normalized events down to the
/// ranking.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub excluded: ExclusionCounts,
    /// Dated events inside the scope.
    pub events: Vec<Event>,
    pub undated: Vec<Event>,
    pub resolved: Vec<ResolvedStatus>,
    pub sales: Vec<UniqueSale>,
    /// Empty when no grouping was requested.
    pub rollups: Vec<GroupRollup>,
}

/// Normalize, scope, resolve, join the CRM, dedupe and aggregate.
pub fn run(rows: &[RawRow], leads: &[CrmLead], settings: &PipelineSettings) -> PipelineReport {
    let normalized = normalize_rows(rows);
    let events = settings.scope.apply(&normalized.events);

    let resolved = attach_origins(resolve_all(&events), leads);
    let sales = dedupe_sales(&resolved, settings.sale_filter);

    let rollups = match settings.group_by {
        Some(group_by) => aggregate(&events, &resolved, &sales, group_by, settings.options),
        None => Vec::new(),
    };

    log::info!(
        "Pipeline run: {} clients, {} unique sales, {} groups",
        resolved.len(),
        sales.len(),
        rollups.len()
    );

    PipelineReport {
        excluded: normalized.excluded,
        events,
        undated: normalized.undated,
        resolved,
        sales,
        rollups,
    }
}
