// src/normalize/aliases.rs

use std::collections::HashMap;

/// A raw sheet row: header -> cell text, headers exactly as exported.
pub type RawRow = HashMap<String, String>;

// Accepted headers per field, in priority order. Stored already normalized
// (trimmed, uppercase) because lookups normalize the sheet headers.
pub const DATE: &[&str] = &["DATA", "DIA"];
pub const STATUS: &[&str] = &[
    "SITUAÇÃO",
    "SITUAÇÃO ATUAL",
    "SITUACAO",
    "SITUACAO ATUAL",
    "STATUS",
    "STATUS_BASE",
];
pub const CLIENT_NAME: &[&str] = &[
    "NOME_CLIENTE_BASE",
    "NOME",
    "CLIENTE",
    "NOME CLIENTE",
    "NOME DO CLIENTE",
];
pub const TAX_ID: &[&str] = &["CPF_CLIENTE_BASE", "CPF", "CPF CLIENTE", "CPF DO CLIENTE"];
pub const BROKER: &[&str] = &["CORRETOR"];
pub const TEAM: &[&str] = &["EQUIPE"];
pub const VALUE: &[&str] = &["VGV", "VALOR"];
pub const BASE_MONTH: &[&str] = &["DATA BASE", "DATA_BASE"];
pub const BUILDER: &[&str] = &["CONSTRUTORA"];
pub const DEVELOPMENT: &[&str] = &["EMPREENDIMENTO"];

fn normalize_header(header: &str) -> String {
    header.trim().to_uppercase()
}

/// A row re-keyed by normalized header, so every field can be looked up by
/// its alias list regardless of how the export spelled the column.
#[derive(Debug)]
pub struct RowView<'a> {
    cells: HashMap<String, &'a str>,
}

impl<'a> RowView<'a> {
    pub fn new(row: &'a RawRow) -> Self {
        let cells = row
            .iter()
            .map(|(header, value)| (normalize_header(header), value.as_str()))
            .collect();

        RowView { cells }
    }

    /// First alias whose column exists and holds a non-blank value.
    pub fn lookup(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases.iter().find_map(|alias| {
            self.cells
                .get(*alias)
                .copied()
                .map(str::trim)
                .filter(|value| !value.is_empty())
        })
    }
}
