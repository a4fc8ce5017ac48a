// src/domain/status.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical pipeline status of a single sheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    InReview,
    ReReview,
    Approved,
    /// Approval by the central bank track ("APROVADO BACEN").
    ApprovedSpecial,
    Rejected,
    Pending,
    SaleGenerated,
    SaleInformed,
    Withdrawn,
    Unknown,
}

impl StatusCode {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::InReview => "IN_REVIEW",
            StatusCode::ReReview => "RE_REVIEW",
            StatusCode::Approved => "APPROVED",
            StatusCode::ApprovedSpecial => "APPROVED_SPECIAL",
            StatusCode::Rejected => "REJECTED",
            StatusCode::Pending => "PENDING",
            StatusCode::SaleGenerated => "SALE_GENERATED",
            StatusCode::SaleInformed => "SALE_INFORMED",
            StatusCode::Withdrawn => "WITHDRAWN",
            StatusCode::Unknown => "UNKNOWN",
        }
    }

    pub fn is_sale(self) -> bool {
        matches!(self, StatusCode::SaleGenerated | StatusCode::SaleInformed)
    }

    pub fn is_analysis(self) -> bool {
        matches!(self, StatusCode::InReview | StatusCode::ReReview)
    }

    pub fn is_approval(self, include_special: bool) -> bool {
        match self {
            StatusCode::Approved => true,
            StatusCode::ApprovedSpecial => include_special,
            _ => false,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered classification rules. First match wins.
///
/// The order is load-bearing: "DESIST" beats everything, "APROVADO BACEN"
/// must be seen before the generic "APROV", and the two sale phrases before
/// anything that could also appear in a sale description.
const STATUS_RULES: &[(&[&str], StatusCode)] = &[
    (&["DESIST"], StatusCode::Withdrawn),
    (&["APROVADO BACEN"], StatusCode::ApprovedSpecial),
    (&["EM ANÁLISE", "EM ANALISE"], StatusCode::InReview),
    (&["REANÁLISE", "REANALISE"], StatusCode::ReReview),
    (&["VENDA GERADA"], StatusCode::SaleGenerated),
    (&["VENDA INFORMADA"], StatusCode::SaleInformed),
    (&["REPROV"], StatusCode::Rejected),
    (&["PEND"], StatusCode::Pending),
    (&["APROV"], StatusCode::Approved),
];

/// Maps free-text sheet status to a `StatusCode`.
///
/// Total and deterministic: anything no rule recognizes is `Unknown`.
pub fn classify(raw_status: &str) -> StatusCode {
    let upper = raw_status.to_uppercase();

    STATUS_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| upper.contains(needle)))
        .map(|(_, code)| *code)
        .unwrap_or(StatusCode::Unknown)
}
