// src/crm.rs
//
// Leads from the CRM feed and the best-effort join that tells each resolved
// client which marketing source it came from.

use crate::domain::{ResolvedStatus, NOT_INFORMED, NO_CRM_RECORD};
use crate::normalize::parse_day_first;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// One lead as the CRM API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrmLead {
    #[serde(rename = "nome_pessoa", default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(rename = "nome_origem", default, deserialize_with = "null_as_empty")]
    pub origin: String,
    #[serde(rename = "nome_campanha", default, deserialize_with = "null_as_empty")]
    pub campaign: String,
    #[serde(rename = "nome_corretor", default, deserialize_with = "null_as_empty")]
    pub broker: String,
    #[serde(rename = "data_captura", default)]
    pub captured_at: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl CrmLead {
    pub fn new(name: &str, origin: &str) -> Self {
        CrmLead {
            name: name.to_string(),
            origin: origin.to_string(),
            campaign: String::new(),
            broker: String::new(),
            captured_at: None,
        }
    }

    /// Normalized origin; blank origins become `NOT_INFORMED`.
    pub fn origin_label(&self) -> String {
        let origin = self.origin.trim();
        if origin.is_empty() {
            NOT_INFORMED.to_string()
        } else {
            origin.to_uppercase()
        }
    }

    /// Capture date, if the CRM sent one we can read.
    pub fn captured_on(&self) -> Option<NaiveDate> {
        self.captured_at.as_deref().and_then(parse_day_first)
    }
}

/// Name normalization used on both sides of the join: uppercase, trimmed,
/// inner runs of whitespace collapsed.
pub fn match_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Index of leads by normalized name. The first lead in feed order wins.
pub fn index_leads(leads: &[CrmLead]) -> HashMap<String, &CrmLead> {
    let mut index = HashMap::new();
    for lead in leads {
        let key = match_name(&lead.name);
        if key.is_empty() {
            continue;
        }
        index.entry(key).or_insert(lead);
    }
    index
}

/// Fills `origin` on every resolved client from the CRM feed.
///
/// Clients with no lead of the same name get `NO_CRM_RECORD`; leads with no
/// matching client are ignored.
pub fn attach_origins(resolved: Vec<ResolvedStatus>, leads: &[CrmLead]) -> Vec<ResolvedStatus> {
    let index = index_leads(leads);
    let mut matched = 0;

    let out: Vec<ResolvedStatus> = resolved
        .into_iter()
        .map(|mut status| {
            status.origin = match index.get(&match_name(&status.event.client_name)) {
                Some(lead) => {
                    matched += 1;
                    lead.origin_label()
                }
                None => NO_CRM_RECORD.to_string(),
            };
            status
        })
        .collect();

    log::debug!(
        "CRM join matched {matched} of {} clients against {} leads",
        out.len(),
        leads.len()
    );

    out
}

/// Leads captured within `[from, to]`, for the leads-to-analysis KPIs.
pub fn leads_captured_between(leads: &[CrmLead], from: NaiveDate, to: NaiveDate) -> usize {
    leads
        .iter()
        .filter_map(CrmLead::captured_on)
        .filter(|date| (from..=to).contains(date))
        .count()
}
