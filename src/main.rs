use pipeline_status::alerts::{idle_brokers, stale_informed_sales, stale_pending};
use pipeline_status::config::{AlertThresholds, ReportConfig};
use pipeline_status::pipeline::GroupRollup;
use pipeline_status::sources::{read_crm_leads, read_sheet_rows};
use pipeline_status::spreadsheets::export_rollups_xlsx;
use pipeline_status::{run, PipelineReport, Result};
use std::fs::File;
use std::io::BufReader;

const PODIUM: usize = 3;

fn print_ranking(report: &PipelineReport, group_label: &str) {
    println!(
        "{:>3}  {:<28} {:>8} {:>10} {:>6} {:>20} {:>7} {:>7} {:>7}",
        "#", group_label, "ANÁLISES", "APROVAÇÕES", "VENDAS", "VGV", "APR/AN", "VEN/AN", "VEN/APR"
    );

    for (i, rollup) in report.rollups.iter().enumerate() {
        let marker = if i < PODIUM { "*" } else { " " };
        println!(
            "{:>2}{}  {:<28} {:>8} {:>10} {:>6} {:>20} {:>6.1}% {:>6.1}% {:>6.1}%",
            i + 1,
            marker,
            rollup.group,
            rollup.analyses,
            rollup.approvals,
            rollup.sales,
            rollup.sales_value.to_string(),
            rollup.approval_rate * 100.0,
            rollup.sale_rate * 100.0,
            rollup.approval_to_sale_rate * 100.0,
        );
    }

    let total = GroupRollup::combined("TOTAL", &report.rollups);
    println!(
        "     {:<28} {:>8} {:>10} {:>6} {:>20}",
        total.group,
        total.analyses,
        total.approvals,
        total.sales,
        total.sales_value.to_string()
    );
}

fn run_report(config: &ReportConfig) -> Result<()> {
    let settings = config.settings()?;
    let group_label = settings
        .group_by
        .map(|g| g.as_str().to_uppercase())
        .unwrap_or_default();

    let rows = read_sheet_rows(BufReader::new(File::open(&config.sheet)?))?;
    let leads = match &config.crm {
        Some(path) => read_crm_leads(BufReader::new(File::open(path)?))?,
        None => Vec::new(),
    };

    let report = run(&rows, &leads, &settings);

    print_ranking(&report, &group_label);
    println!();
    println!(
        "Excluded rows: {} without client, {} without a readable date",
        report.excluded.malformed_rows, report.excluded.undated_rows
    );

    let reference = config.reference_date(chrono::Local::now().date_naive())?;
    let thresholds = AlertThresholds::default();

    for broker in idle_brokers(&report.events, reference, &thresholds) {
        println!(
            "Idle broker: {} (last analysis {}, {} days)",
            broker.broker,
            broker.last_analysis.format("%d/%m/%Y"),
            broker.days_idle
        );
    }
    for stale in stale_pending(&report.resolved, reference, &thresholds)
        .into_iter()
        .chain(stale_informed_sales(&report.resolved, reference, &thresholds))
    {
        println!(
            "Stale {}: {} with {} ({} days)",
            stale.status_code, stale.client_key, stale.broker, stale.days
        );
    }

    if let Some(path) = &config.xlsx {
        let bytes = export_rollups_xlsx(&report.rollups, &group_label)?;
        std::fs::write(path, bytes)?;
        log::info!("Wrote ranking workbook to {}", path.display());
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ReportConfig::parse_args();

    if let Err(e) = run_report(&config) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
