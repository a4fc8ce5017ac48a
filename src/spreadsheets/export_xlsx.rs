use crate::errors::{PipelineError, Result};
use crate::pipeline::GroupRollup;
use crate::portfolio::PortfolioRow;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

const BRL_FORMAT: &str = "\"R$\" #,##0.00";
const PERCENT_FORMAT: &str = "0.0%";
const DATE_FORMAT: &str = "dd/mm/yyyy";

fn xlsx_err(what: &str) -> impl Fn(XlsxError) -> PipelineError + '_ {
    move |e| PipelineError::Xlsx(format!("Failed to write {what}: {e}"))
}

fn write_headers(worksheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    let bold = Format::new().set_bold();

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(|e| {
                PipelineError::Xlsx(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    Ok(())
}

/// Ranking workbook: one row per group, in the order given.
pub fn export_rollups_xlsx(rollups: &[GroupRollup], group_label: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let brl = Format::new().set_num_format(BRL_FORMAT);
    let percent = Format::new().set_num_format(PERCENT_FORMAT);

    write_headers(
        worksheet,
        &[
            "#",
            group_label,
            "Análises",
            "Aprovações",
            "Vendas",
            "VGV",
            "Aprovação / Análise",
            "Venda / Análise",
            "Venda / Aprovação",
        ],
    )?;

    for (i, rollup) in rollups.iter().enumerate() {
        let r = (i + 1) as u32;

        worksheet
            .write_number(r, 0, r as f64)
            .map_err(xlsx_err("position"))?;
        worksheet
            .write_string(r, 1, &rollup.group)
            .map_err(xlsx_err("group"))?;
        worksheet
            .write_number(r, 2, rollup.analyses as f64)
            .map_err(xlsx_err("analyses"))?;
        worksheet
            .write_number(r, 3, rollup.approvals as f64)
            .map_err(xlsx_err("approvals"))?;
        worksheet
            .write_number(r, 4, rollup.sales as f64)
            .map_err(xlsx_err("sales"))?;
        worksheet
            .write_number_with_format(r, 5, rollup.sales_value.as_f64(), &brl)
            .map_err(xlsx_err("sales value"))?;

        let rates = [
            rollup.approval_rate,
            rollup.sale_rate,
            rollup.approval_to_sale_rate,
        ];
        for (offset, rate) in rates.into_iter().enumerate() {
            worksheet
                .write_number_with_format(r, 6 + offset as u16, rate, &percent)
                .map_err(xlsx_err("rate"))?;
        }
    }

    worksheet
        .set_column_width(1, 28)
        .map_err(xlsx_err("column width"))?;

    workbook
        .save_to_buffer()
        .map_err(|e| PipelineError::Xlsx(format!("Failed to save workbook: {}", e)))
}

/// Client portfolio workbook.
pub fn export_portfolio_xlsx(rows: &[PortfolioRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let brl = Format::new().set_num_format(BRL_FORMAT);
    let date = Format::new().set_num_format(DATE_FORMAT);

    write_headers(
        worksheet,
        &[
            "Cliente",
            "Corretor",
            "Equipe",
            "Origem",
            "Situação",
            "Última movimentação",
            "Construtora",
            "Empreendimento",
            "Análises",
            "Aprovações",
            "Vendas",
            "VGV histórico",
        ],
    )?;

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;

        let text_cells = [
            &row.client_name,
            &row.broker,
            &row.team,
            &row.origin,
            &row.current_status,
        ];
        for (col, text) in text_cells.into_iter().enumerate() {
            worksheet
                .write_string(r, col as u16, text.as_str())
                .map_err(xlsx_err("client field"))?;
        }

        match row.last_movement {
            Some(day) => worksheet
                .write_date_with_format(r, 5, &day, &date)
                .map_err(xlsx_err("last movement"))?,
            None => worksheet
                .write_string(r, 5, "")
                .map_err(xlsx_err("last movement"))?,
        };

        worksheet
            .write_string(r, 6, &row.builder)
            .map_err(xlsx_err("builder"))?;
        worksheet
            .write_string(r, 7, &row.development)
            .map_err(xlsx_err("development"))?;
        worksheet
            .write_number(r, 8, row.analyses as f64)
            .map_err(xlsx_err("analyses"))?;
        worksheet
            .write_number(r, 9, row.approvals as f64)
            .map_err(xlsx_err("approvals"))?;
        worksheet
            .write_number(r, 10, row.sale_events as f64)
            .map_err(xlsx_err("sales"))?;
        worksheet
            .write_number_with_format(r, 11, row.historical_value.as_f64(), &brl)
            .map_err(xlsx_err("historical value"))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| PipelineError::Xlsx(format!("Failed to save workbook: {}", e)))
}
