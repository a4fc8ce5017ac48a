// src/tests/pipeline_tests.rs
//
// Sheet rows in, ranking out.

use crate::crm::CrmLead;
use crate::domain::{detect_changes, ChangeKind, Money, Snapshot, StatusCode};
use crate::normalize::RawRow;
use crate::pipeline::{run, EventScope, GroupBy, PipelineSettings, SaleFilter};
use crate::sources::read_sheet_rows;
use crate::tests::utils::{day, row};

fn sheet() -> Vec<RawRow> {
    vec![
        row(&[("DATA", "01/11/2025"), ("CLIENTE", "Ana Souza"), ("CPF", "111.111.111-11"), ("SITUAÇÃO", "EM ANÁLISE"), ("CORRETOR", "Maria"), ("EQUIPE", "Alpha")]),
        row(&[("DATA", "03/11/2025"), ("CLIENTE", "Ana Souza"), ("CPF", "111.111.111-11"), ("SITUAÇÃO", "VENDA INFORMADA"), ("CORRETOR", "Maria"), ("EQUIPE", "Alpha"), ("VGV", "R$ 200.000,00")]),
        row(&[("DATA", "05/11/2025"), ("CLIENTE", "Ana Souza"), ("CPF", "111.111.111-11"), ("SITUAÇÃO", "DESISTIU"), ("CORRETOR", "Maria"), ("EQUIPE", "Alpha")]),
        row(&[("DATA", "07/11/2025"), ("CLIENTE", "Ana Souza"), ("CPF", "111.111.111-11"), ("SITUAÇÃO", "EM ANÁLISE"), ("CORRETOR", "Maria"), ("EQUIPE", "Alpha")]),
        // Same name, different CPF: a different client.
        row(&[("DATA", "02/11/2025"), ("CLIENTE", "Ana Souza"), ("CPF", "222.222.222-22"), ("SITUAÇÃO", "APROVADO"), ("CORRETOR", "José"), ("EQUIPE", "Beta")]),
        row(&[("DATA", "01/11/2025"), ("CLIENTE", "Bruno Lima"), ("SITUAÇÃO", "EM ANÁLISE"), ("CORRETOR", "José"), ("EQUIPE", "Beta")]),
        row(&[("DATA", "02/11/2025"), ("CLIENTE", "Bruno Lima"), ("SITUAÇÃO", "APROVADO"), ("CORRETOR", "José"), ("EQUIPE", "Beta")]),
        row(&[("DATA", "03/11/2025"), ("CLIENTE", "Bruno Lima"), ("SITUAÇÃO", "VENDA GERADA"), ("CORRETOR", "José"), ("EQUIPE", "Beta"), ("VGV", "350.000,00")]),
        row(&[("DATA", "04/11/2025"), ("CLIENTE", "Bruno Lima"), ("SITUAÇÃO", "EM ANÁLISE"), ("CORRETOR", "José"), ("EQUIPE", "Beta")]),
        row(&[("DATA", "02/11/2025"), ("CLIENTE", "Carla Dias"), ("SITUAÇÃO", "APROVADO BACEN"), ("CORRETOR", "Maria"), ("EQUIPE", "Alpha")]),
        // Undated and malformed rows.
        row(&[("DATA", "sem data"), ("CLIENTE", "Diego"), ("SITUAÇÃO", "EM ANÁLISE")]),
        row(&[("DATA", "02/11/2025"), ("SITUAÇÃO", "APROVADO")]),
    ]
}

fn settings(group_by: GroupBy) -> PipelineSettings {
    PipelineSettings {
        group_by: Some(group_by),
        ..PipelineSettings::default()
    }
}

#[test]
fn full_run_resolves_dedupes_and_ranks() {
    let report = run(&sheet(), &[], &settings(GroupBy::Broker));

    assert_eq!(report.excluded.malformed_rows, 1);
    assert_eq!(report.excluded.undated_rows, 1);
    assert_eq!(report.undated.len(), 1);

    let resolved: Vec<(&str, StatusCode)> = report
        .resolved
        .iter()
        .map(|r| (r.client_key(), r.status_code()))
        .collect();
    assert_eq!(
        resolved,
        vec![
            ("ANA SOUZA | 11111111111", StatusCode::InReview),
            ("ANA SOUZA | 22222222222", StatusCode::Approved),
            ("BRUNO LIMA | ", StatusCode::SaleGenerated),
            ("CARLA DIAS | ", StatusCode::ApprovedSpecial),
        ]
    );

    // The informed sale before the withdrawal is forgotten.
    assert_eq!(report.sales.len(), 1);
    assert_eq!(report.sales[0].client_key, "BRUNO LIMA | ");
    assert_eq!(report.sales[0].value, Money::from_reais(350_000));

    let ranking: Vec<(&str, usize, usize, usize)> = report
        .rollups
        .iter()
        .map(|r| (r.group.as_str(), r.analyses, r.approvals, r.sales))
        .collect();
    // Analyses and approvals are row volumes: Bruno still counts in JOSÉ's
    // analyses after selling, Ana's two analysis rows both count for MARIA.
    assert_eq!(ranking, vec![("JOSÉ", 2, 2, 1), ("MARIA", 2, 0, 0)]);
    assert_eq!(report.rollups[0].approval_rate, 1.0);
    assert_eq!(report.rollups[0].sale_rate, 0.5);
}

#[test]
fn crm_origins_drive_the_origin_grouping() {
    let leads = vec![CrmLead::new("ana souza", "Instagram"), CrmLead::new("Bruno  Lima", "Site")];
    let report = run(&sheet(), &leads, &settings(GroupBy::Origin));

    let groups: Vec<&str> = report.rollups.iter().map(|r| r.group.as_str()).collect();
    assert_eq!(groups, vec!["SITE", "INSTAGRAM", "NO_CRM_RECORD"]);

    // Both Ana Souza clients share the lead by name.
    let instagram = &report.rollups[1];
    assert_eq!(instagram.analyses, 2);
    assert_eq!(instagram.approvals, 1);
}

#[test]
fn scope_and_generated_only_filter() {
    let mut settings = settings(GroupBy::Team);
    settings.scope = EventScope::between(day(1), day(3)).with_team("beta");
    settings.sale_filter = SaleFilter::GeneratedOnly;

    let report = run(&sheet(), &[], &settings);

    // Bruno's analysis on the 4th is out of range; the sale stands either way.
    assert_eq!(report.resolved.len(), 2);
    assert_eq!(report.sales.len(), 1);
    assert_eq!(report.rollups.len(), 1);
    assert_eq!(report.rollups[0].group, "BETA");
}

#[test]
fn reruns_are_identical() {
    let first = run(&sheet(), &[], &settings(GroupBy::Team));
    let second = run(&sheet(), &[], &settings(GroupBy::Team));

    assert_eq!(first.resolved, second.resolved);
    assert_eq!(first.sales, second.sales);
    assert_eq!(first.rollups, second.rollups);
}

#[test]
fn snapshots_of_consecutive_runs_report_changes() {
    let mut rows = sheet();
    let before = Snapshot::from_resolved(&run(&rows, &[], &PipelineSettings::default()).resolved);

    rows.push(row(&[("DATA", "10/11/2025"), ("CLIENTE", "Carla Dias"), ("SITUAÇÃO", "VENDA GERADA")]));
    rows.push(row(&[("DATA", "10/11/2025"), ("CLIENTE", "Eva"), ("SITUAÇÃO", "EM ANÁLISE")]));
    let after = Snapshot::from_resolved(&run(&rows, &[], &PipelineSettings::default()).resolved);

    let changes = detect_changes(&before, &after);
    let summary: Vec<(&str, ChangeKind)> = changes.iter().map(|c| (c.client_key.as_str(), c.kind)).collect();
    assert_eq!(
        summary,
        vec![("CARLA DIAS | ", ChangeKind::StatusChanged), ("EVA | ", ChangeKind::NewClient)]
    );
}

#[test]
fn csv_export_runs_end_to_end() {
    let csv = "DATA;NOME;STATUS;CORRETOR;VGV\n\
               01/11/2025;Ana;Em análise;Maria;\n\
               02/11/2025;Ana;Venda gerada;Maria;\"R$ 100.000,00\"\n";
    let rows = read_sheet_rows(csv.as_bytes()).unwrap();
    let report = run(&rows, &[], &settings(GroupBy::Broker));

    assert_eq!(report.rollups.len(), 1);
    assert_eq!(report.rollups[0].sales_value, Money::from_reais(100_000));
    assert_eq!(report.rollups[0].sales_value.to_string(), "R$ 100.000,00");
}
