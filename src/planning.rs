// src/planning.rs

use crate::pipeline::GroupRollup;
use serde::Serialize;

/// What a broker or team needs in the funnel to hit a sales target, given
/// its own conversion history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetPlan {
    pub sales_target: u32,
    pub analyses_per_sale: f64,
    pub approvals_per_sale: f64,
    pub required_analyses: u32,
    pub required_approvals: u32,
}

/// Plans the funnel for `sales_target` sales from `history`.
///
/// Requirements round up. A history without sales gives no conversion to plan
/// with, so every ratio and requirement is zero.
pub fn plan_targets(history: &GroupRollup, sales_target: u32) -> TargetPlan {
    if history.sales == 0 {
        return TargetPlan {
            sales_target,
            analyses_per_sale: 0.0,
            approvals_per_sale: 0.0,
            required_analyses: 0,
            required_approvals: 0,
        };
    }

    let sales = history.sales as f64;
    let analyses_per_sale = history.analyses as f64 / sales;
    let approvals_per_sale = history.approvals as f64 / sales;
    let required = |per_sale: f64| (sales_target as f64 * per_sale).ceil() as u32;

    TargetPlan {
        sales_target,
        analyses_per_sale,
        approvals_per_sale,
        required_analyses: required(analyses_per_sale),
        required_approvals: required(approvals_per_sale),
    }
}
