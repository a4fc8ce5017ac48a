// src/pipeline/aggregate.rs

use crate::domain::{Event, Money, ResolvedStatus, StatusCode, UniqueSale, NO_CRM_RECORD};
use crate::errors::PipelineError;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// Dimension the KPIs are rolled up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupBy {
    Broker,
    Team,
    Origin,
}

impl GroupBy {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::Broker => "broker",
            GroupBy::Team => "team",
            GroupBy::Origin => "origin",
        }
    }

    fn key_of_event<'a>(self, event: &'a Event, origins: &HashMap<&str, &'a str>) -> &'a str {
        match self {
            GroupBy::Broker => &event.broker,
            GroupBy::Team => &event.team,
            GroupBy::Origin => origins
                .get(event.client_key.as_str())
                .copied()
                .unwrap_or(NO_CRM_RECORD),
        }
    }

    fn key_of_sale(self, sale: &UniqueSale) -> &str {
        match self {
            GroupBy::Broker => &sale.broker,
            GroupBy::Team => &sale.team,
            GroupBy::Origin => &sale.origin,
        }
    }
}

impl FromStr for GroupBy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "broker" | "corretor" => Ok(GroupBy::Broker),
            "team" | "equipe" => Ok(GroupBy::Team),
            "origin" | "origem" => Ok(GroupBy::Origin),
            other => Err(PipelineError::UnknownGroupBy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Count "APROVADO BACEN" as an approval too.
    pub include_special_approvals: bool,
}

/// Funnel KPIs of one broker, team or origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRollup {
    pub group: String,
    pub analyses: usize,
    pub approvals: usize,
    pub sales: usize,
    pub sales_value: Money,
    pub approval_rate: f64,
    pub sale_rate: f64,
    pub approval_to_sale_rate: f64,
}

impl GroupRollup {
    fn empty(group: &str) -> Self {
        GroupRollup {
            group: group.to_string(),
            analyses: 0,
            approvals: 0,
            sales: 0,
            sales_value: Money::ZERO,
            approval_rate: 0.0,
            sale_rate: 0.0,
            approval_to_sale_rate: 0.0,
        }
    }

    fn with_rates(mut self) -> Self {
        self.approval_rate = ratio(self.approvals, self.analyses);
        self.sale_rate = ratio(self.sales, self.analyses);
        self.approval_to_sale_rate = ratio(self.sales, self.approvals);
        self
    }

    /// Folds several rollups into one line, e.g. the whole brokerage.
    pub fn combined(label: &str, rollups: &[GroupRollup]) -> GroupRollup {
        let mut total = GroupRollup::empty(label);
        for r in rollups {
            total.analyses += r.analyses;
            total.approvals += r.approvals;
            total.sales += r.sales;
            total.sales_value = total.sales_value + r.sales_value;
        }
        total.with_rates()
    }
}

/// `numerator / denominator` as a share in [0, 1]; 0 when the denominator is 0.
///
/// Counts come from different populations (a client sold without an analysis
/// row still counts as a sale), so the share is capped at 1.
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64).min(1.0)
}

/// Presentation order: most sold value first, then most sales, then name.
fn ranking_order(a: &GroupRollup, b: &GroupRollup) -> Ordering {
    b.sales_value
        .cmp(&a.sales_value)
        .then_with(|| b.sales.cmp(&a.sales))
        .then_with(|| a.group.cmp(&b.group))
}

/// Rolls the funnel up by `group_by`.
///
/// Analyses and approvals are volumes: every IN_REVIEW/RE_REVIEW and APPROVED
/// row in `events` counts, so a client who moved on to approval or sale still
/// counts in the analyses of its broker. `UNKNOWN` rows never count. Rows are
/// grouped by their own broker and team; the origin comes from the client's
/// CRM join in `resolved`. Sales and their value come from `sales`.
pub fn aggregate(
    events: &[Event],
    resolved: &[ResolvedStatus],
    sales: &[UniqueSale],
    group_by: GroupBy,
    options: AggregateOptions,
) -> Vec<GroupRollup> {
    let origins: HashMap<&str, &str> = resolved
        .iter()
        .map(|r| (r.client_key(), r.origin.as_str()))
        .collect();
    let mut groups: BTreeMap<&str, GroupRollup> = BTreeMap::new();

    for event in events {
        let code = event.status_code;
        if code == StatusCode::Unknown {
            continue;
        }

        let key = group_by.key_of_event(event, &origins);
        let rollup = groups
            .entry(key)
            .or_insert_with(|| GroupRollup::empty(key));

        if code.is_analysis() {
            rollup.analyses += 1;
        } else if code.is_approval(options.include_special_approvals) {
            rollup.approvals += 1;
        }
    }

    for sale in sales {
        let key = group_by.key_of_sale(sale);
        let rollup = groups
            .entry(key)
            .or_insert_with(|| GroupRollup::empty(key));

        rollup.sales += 1;
        rollup.sales_value = rollup.sales_value + sale.value;
    }

    let mut rollups: Vec<GroupRollup> = groups.into_values().map(GroupRollup::with_rates).collect();
    rollups.sort_by(ranking_order);

    log::debug!(
        "Aggregated {} groups by {} from {} events and {} sales",
        rollups.len(),
        group_by.as_str(),
        events.len(),
        sales.len()
    );

    rollups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{dedupe_sales, resolve_all, SaleFilter};
    use crate::tests::utils::{ev, resolved};

    fn funnel() -> Vec<Event> {
        vec![
            ev("A1", 1, "EM ANÁLISE").with_broker("MARIA").with_team("ALPHA"),
            ev("A2", 1, "REANÁLISE").with_broker("MARIA").with_team("ALPHA"),
            ev("A3", 1, "APROVADO").with_broker("MARIA").with_team("ALPHA"),
            ev("A4", 1, "APROVADO BACEN").with_broker("MARIA").with_team("ALPHA"),
            ev("A5", 2, "VENDA GERADA")
                .with_broker("MARIA")
                .with_team("ALPHA")
                .with_value(Money::from_reais(200_000)),
            ev("B1", 1, "EM ANÁLISE").with_broker("JOSE").with_team("BETA"),
            ev("B2", 3, "VENDA INFORMADA")
                .with_broker("JOSE")
                .with_team("BETA")
                .with_value(Money::from_reais(500_000)),
            ev("B3", 3, "visita").with_broker("JOSE").with_team("BETA"),
        ]
    }

    fn rollup(events: &[Event], group_by: GroupBy, options: AggregateOptions) -> Vec<GroupRollup> {
        let resolved = resolve_all(events);
        let sales = dedupe_sales(&resolved, SaleFilter::GeneratedOrInformed);
        aggregate(events, &resolved, &sales, group_by, options)
    }

    #[test]
    fn counts_and_ratios_by_broker() {
        let rollups = rollup(&funnel(), GroupBy::Broker, AggregateOptions::default());

        assert_eq!(rollups.len(), 2);

        // JOSE sold more value, so ranks first.
        let jose = &rollups[0];
        assert_eq!(jose.group, "JOSE");
        assert_eq!(jose.analyses, 1);
        assert_eq!(jose.approvals, 0);
        assert_eq!(jose.sales, 1);
        assert_eq!(jose.sales_value, Money::from_reais(500_000));
        assert_eq!(jose.approval_rate, 0.0);
        assert_eq!(jose.sale_rate, 1.0);
        assert_eq!(jose.approval_to_sale_rate, 0.0);

        let maria = &rollups[1];
        assert_eq!(maria.group, "MARIA");
        assert_eq!(maria.analyses, 2);
        assert_eq!(maria.approvals, 1);
        assert_eq!(maria.sales, 1);
        assert_eq!(maria.approval_rate, 0.5);
        assert_eq!(maria.sale_rate, 0.5);
        assert_eq!(maria.approval_to_sale_rate, 1.0);
    }

    #[test]
    fn clients_that_moved_on_still_count_in_the_funnel() {
        let events = vec![
            ev("BRUNO", 1, "EM ANÁLISE").with_broker("JOSE"),
            ev("BRUNO", 2, "APROVADO").with_broker("JOSE"),
            ev("BRUNO", 3, "VENDA GERADA").with_broker("JOSE"),
            ev("CAIO", 1, "EM ANÁLISE").with_broker("JOSE"),
            ev("CAIO", 2, "APROVADO").with_broker("JOSE"),
        ];

        let rollups = rollup(&events, GroupBy::Broker, AggregateOptions::default());
        assert_eq!(rollups.len(), 1);

        let jose = &rollups[0];
        assert_eq!(jose.analyses, 2);
        assert_eq!(jose.approvals, 2);
        assert_eq!(jose.sales, 1);
        assert_eq!(jose.approval_rate, 1.0);
        assert_eq!(jose.sale_rate, 0.5);
        assert_eq!(jose.approval_to_sale_rate, 0.5);
    }

    #[test]
    fn origin_comes_from_the_client_join() {
        let events = vec![
            ev("ANA", 1, "EM ANÁLISE"),
            ev("ANA", 2, "APROVADO"),
            ev("BIA", 1, "EM ANÁLISE"),
        ];
        let mut statuses = resolve_all(&events);
        statuses[0].origin = "INSTAGRAM".to_string();

        let rollups = aggregate(&events, &statuses, &[], GroupBy::Origin, AggregateOptions::default());
        let summary: Vec<(&str, usize, usize)> = rollups
            .iter()
            .map(|r| (r.group.as_str(), r.analyses, r.approvals))
            .collect();
        assert_eq!(summary, vec![("INSTAGRAM", 1, 1), (NO_CRM_RECORD, 1, 0)]);
    }

    #[test]
    fn special_approvals_are_opt_in() {
        let options = AggregateOptions {
            include_special_approvals: true,
        };
        let rollups = rollup(&funnel(), GroupBy::Team, options);

        let alpha = rollups.iter().find(|r| r.group == "ALPHA").unwrap();
        assert_eq!(alpha.approvals, 2);
        assert_eq!(alpha.approval_rate, 1.0);
    }

    #[test]
    fn unknown_statuses_do_not_create_groups() {
        let only_unknown = vec![ev("X", 1, "visita").with_broker("NOBODY")];
        let statuses = vec![resolved(only_unknown[0].clone())];
        assert!(aggregate(&only_unknown, &statuses, &[], GroupBy::Broker, AggregateOptions::default()).is_empty());
    }

    #[test]
    fn ties_break_by_count_then_name() {
        let events = vec![
            ev("C1", 1, "EM ANÁLISE").with_broker("ZECA"),
            ev("C2", 1, "EM ANÁLISE").with_broker("BIA"),
            ev("C3", 1, "EM ANÁLISE").with_broker("ANA"),
            ev("C4", 2, "VENDA GERADA").with_broker("ZECA"),
        ];
        let rollups = rollup(&events, GroupBy::Broker, AggregateOptions::default());

        let order: Vec<&str> = rollups.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(order, vec!["ZECA", "ANA", "BIA"]);
    }

    #[test]
    fn all_zero_groups_have_zero_ratios() {
        let events = vec![ev("D1", 1, "REPROVADO").with_broker("LEO")];
        let rollups = rollup(&events, GroupBy::Broker, AggregateOptions::default());

        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].approval_rate, 0.0);
        assert_eq!(rollups[0].sale_rate, 0.0);
        assert_eq!(rollups[0].approval_to_sale_rate, 0.0);
    }

    #[test]
    fn ratio_is_capped_and_guarded() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(3, 0), 0.0);
        assert_eq!(ratio(1, 4), 0.25);
        assert_eq!(ratio(5, 2), 1.0);
    }

    #[test]
    fn group_by_parses_or_fails_loudly() {
        assert_eq!("Broker".parse::<GroupBy>().unwrap(), GroupBy::Broker);
        assert_eq!("equipe".parse::<GroupBy>().unwrap(), GroupBy::Team);
        assert_eq!("origin".parse::<GroupBy>().unwrap(), GroupBy::Origin);
        assert!(matches!(
            "construtora".parse::<GroupBy>(),
            Err(PipelineError::UnknownGroupBy(_))
        ));
    }

    #[test]
    fn combined_rollup_recomputes_rates() {
        let rollups = rollup(&funnel(), GroupBy::Team, AggregateOptions::default());

        let total = GroupRollup::combined("MR IMÓVEIS", &rollups);
        assert_eq!(total.analyses, 3);
        assert_eq!(total.approvals, 1);
        assert_eq!(total.sales, 2);
        assert_eq!(total.sales_value, Money::from_reais(700_000));
        assert!((total.sale_rate - 2.0 / 3.0).abs() < 1e-9);
    }
}
