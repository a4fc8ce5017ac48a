// src/sources.rs
//
// Readers for the two local inputs: the pipeline sheet exported as CSV and
// the CRM leads dump as JSON.

use crate::crm::CrmLead;
use crate::errors::Result;
use crate::normalize::RawRow;
use serde::Deserialize;
use std::io::Read;

/// Picks `;` when the header line has more of them than commas, which is how
/// spreadsheet tools in pt-BR locales export.
fn sniff_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Reads a sheet export into raw rows keyed by header.
///
/// Short rows are tolerated (missing cells are simply absent); a row longer
/// than the header keeps only the named columns.
pub fn read_sheet_rows<R: Read>(mut reader: R) -> Result<Vec<RawRow>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.trim_start_matches('\u{feff}');

    let delimiter = sniff_delimiter(text.lines().next().unwrap_or(""));

    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers = csv.headers()?.clone();
    let mut rows = Vec::new();

    for result in csv.records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();
        rows.push(row);
    }

    log::info!(
        "Read {} sheet rows ({} columns, delimiter '{}')",
        rows.len(),
        headers.len(),
        delimiter as char
    );

    Ok(rows)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LeadsPayload {
    Bare(Vec<CrmLead>),
    Wrapped { data: Vec<CrmLead> },
}

/// Reads a CRM leads dump: either a bare array or the API's `{"data": [...]}`.
pub fn read_crm_leads<R: Read>(reader: R) -> Result<Vec<CrmLead>> {
    let payload: LeadsPayload = serde_json::from_reader(reader)?;
    let leads = match payload {
        LeadsPayload::Bare(leads) => leads,
        LeadsPayload::Wrapped { data } => data,
    };

    log::info!("Read {} CRM leads", leads.len());
    Ok(leads)
}
