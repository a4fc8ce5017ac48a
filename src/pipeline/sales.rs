// src/pipeline/sales.rs

use crate::domain::{ResolvedStatus, StatusCode, UniqueSale};
use crate::errors::PipelineError;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Which resolved statuses count as a sale for a given KPI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaleFilter {
    /// Only sales confirmed by the builder ("VENDA GERADA").
    GeneratedOnly,
    /// Confirmed sales plus sales the broker reported ("VENDA INFORMADA").
    #[default]
    GeneratedOrInformed,
}

impl SaleFilter {
    pub fn accepts(self, code: StatusCode) -> bool {
        match self {
            SaleFilter::GeneratedOnly => code == StatusCode::SaleGenerated,
            SaleFilter::GeneratedOrInformed => code.is_sale(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SaleFilter::GeneratedOnly => "generated",
            SaleFilter::GeneratedOrInformed => "generated-informed",
        }
    }
}

impl FromStr for SaleFilter {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generated" => Ok(SaleFilter::GeneratedOnly),
            "generated-informed" | "generated+informed" => Ok(SaleFilter::GeneratedOrInformed),
            other => Err(PipelineError::UnknownSaleFilter(other.to_string())),
        }
    }
}

/// Whether `candidate` should replace `current` as the client's sale.
fn supersedes(candidate: &UniqueSale, current: &UniqueSale) -> bool {
    match (candidate.status_code, current.status_code) {
        (StatusCode::SaleGenerated, StatusCode::SaleInformed) => true,
        (StatusCode::SaleInformed, StatusCode::SaleGenerated) => false,
        _ => candidate.date >= current.date,
    }
}

/// One sale per client whose resolved status passes `filter`, ordered by
/// client_key.
///
/// Resolution already yields one status per client, but callers sometimes
/// concatenate resolutions; when a client shows up twice a generated sale
/// beats an informed one, otherwise the later one wins.
pub fn dedupe_sales(resolved: &[ResolvedStatus], filter: SaleFilter) -> Vec<UniqueSale> {
    let mut by_client: BTreeMap<String, UniqueSale> = BTreeMap::new();

    for status in resolved.iter().filter(|r| filter.accepts(r.status_code())) {
        let candidate = UniqueSale::from_resolved(status);

        match by_client.entry(candidate.client_key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                if supersedes(&candidate, slot.get()) {
                    slot.insert(candidate);
                }
            }
        }
    }

    log::debug!(
        "Deduplicated {} unique sales ({}) from {} resolved clients",
        by_client.len(),
        filter.as_str(),
        resolved.len()
    );

    by_client.into_values().collect()
}
