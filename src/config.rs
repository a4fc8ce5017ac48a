// src/config.rs

use crate::errors::{PipelineError, Result};
use crate::normalize::{parse_base_month, parse_day_first};
use crate::pipeline::{AggregateOptions, EventScope, GroupBy, PipelineSettings, SaleFilter};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Command line of the `pipeline-report` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "pipeline-report")]
#[command(about = "Ranks brokers, teams or origins from a sales-pipeline sheet export", long_about = None)]
pub struct ReportConfig {
    /// Sheet export (CSV, comma or semicolon separated)
    pub sheet: PathBuf,

    /// CRM leads dump (JSON) used to attach origins
    #[arg(long)]
    pub crm: Option<PathBuf>,

    /// broker, team or origin
    #[arg(short, long, default_value = "broker")]
    pub group_by: String,

    /// generated or generated-informed
    #[arg(short, long, default_value = "generated-informed")]
    pub sales: String,

    /// Count "APROVADO BACEN" as an approval
    #[arg(long)]
    pub include_special_approvals: bool,

    /// First day of the period (dd/mm/yyyy or yyyy-mm-dd)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day of the period, inclusive
    #[arg(long)]
    pub to: Option<String>,

    #[arg(long)]
    pub team: Option<String>,

    #[arg(long)]
    pub broker: Option<String>,

    /// Commercial month, e.g. "novembro 2025" or "11/2025"; repeatable
    #[arg(long = "base-month")]
    pub base_months: Vec<String>,

    /// Date the alerts are computed against; defaults to today
    #[arg(long)]
    pub reference_date: Option<String>,

    /// Write the ranking to this XLSX file as well
    #[arg(long)]
    pub xlsx: Option<PathBuf>,
}

fn config_date(flag: &str, raw: &str) -> Result<NaiveDate> {
    parse_day_first(raw)
        .ok_or_else(|| PipelineError::Config(format!("--{flag}: unreadable date '{raw}'")))
}

impl ReportConfig {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Turns the command line into pipeline settings, failing on any value
    /// the pipeline cannot interpret.
    pub fn settings(&self) -> Result<PipelineSettings> {
        let mut scope = EventScope::all();

        if let Some(from) = &self.from {
            scope.from = Some(config_date("from", from)?);
        }
        if let Some(to) = &self.to {
            scope.to = Some(config_date("to", to)?);
        }
        if let (Some(from), Some(to)) = (scope.from, scope.to) {
            if from > to {
                return Err(PipelineError::Config(format!(
                    "--from {from} is after --to {to}"
                )));
            }
        }
        if let Some(team) = &self.team {
            scope = scope.with_team(team);
        }
        if let Some(broker) = &self.broker {
            scope = scope.with_broker(broker);
        }

        let base_months = self
            .base_months
            .iter()
            .map(|raw| {
                parse_base_month(raw).ok_or_else(|| {
                    PipelineError::Config(format!("--base-month: unreadable month '{raw}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        scope = scope.with_base_months(base_months);

        Ok(PipelineSettings {
            scope,
            sale_filter: self.sales.parse()?,
            group_by: Some(self.group_by.parse()?),
            options: AggregateOptions {
                include_special_approvals: self.include_special_approvals,
            },
        })
    }

    pub fn reference_date(&self, today: NaiveDate) -> Result<NaiveDate> {
        match &self.reference_date {
            Some(raw) => config_date("reference-date", raw),
            None => Ok(today),
        }
    }
}

/// Windows of the operational alerts, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    /// A broker is idle after this many days without an analysis.
    pub idle_days: i64,
    /// Only brokers with an analysis in this many days are considered.
    pub idle_window_days: i64,
    pub pending_days: i64,
    pub informed_sale_days: i64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        AlertThresholds {
            idle_days: 3,
            idle_window_days: 30,
            pending_days: 2,
            informed_sale_days: 5,
        }
    }
}
