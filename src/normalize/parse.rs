// src/normalize/parse.rs
//
// Cell parsers for the pt-BR sheet. All of them return `None` on anything
// they cannot read; callers decide what a missing value means.

use crate::domain::Money;
use chrono::{Datelike, NaiveDate};

const ISO_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const SHORT_YEAR_FORMATS: &[&str] = &["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];

const DATE_SEPARATORS: [char; 3] = ['/', '-', '.'];

/// Parses a day-first date (`03/11/2025`, `3-11-25`, `03.11.2025`) or an ISO
/// date (`2025-11-03`). A trailing time of day is ignored.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let token = raw.split_whitespace().next()?;
    let token = token.split('T').next()?;

    // The field lengths pick the format family; chrono alone would read
    // `1/1/202` as the year 202.
    let first_len = token.find(DATE_SEPARATORS)?;
    let year_len = token.len() - token.rfind(DATE_SEPARATORS)? - 1;

    let formats = match (first_len, year_len) {
        (4, _) => ISO_FORMATS,
        (_, 4) => DAY_FIRST_FORMATS,
        (_, 2) => SHORT_YEAR_FORMATS,
        _ => return None,
    };

    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
}

/// Parses a money cell into centavos.
///
/// Accepts `R$` prefixes, pt-BR separators (`1.234.567,89`), plain decimals
/// (`250000.50`) and a leading minus. When only dots are present, a single dot
/// followed by exactly three digits is a thousands separator (`250.000`)
/// unless the integer part is a lone zero (`0.125`).
pub fn parse_money(raw: &str) -> Option<Money> {
    let trimmed = raw.trim();
    let (sign_first, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let cleaned: String = rest
        .trim_start()
        .trim_start_matches("R$")
        .trim_start_matches("r$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    // `-R$ 1,00` and `R$ -1,00` are both seen in the sheet.
    let (negative, body) = match cleaned.strip_prefix('-') {
        Some(rest) if !sign_first => (true, rest),
        Some(_) => return None,
        None => (sign_first, cleaned.as_str()),
    };

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let decimal_sep = decimal_separator(body);
    let (int_part, frac_part) = match decimal_sep {
        Some(idx) => (&body[..idx], &body[idx + 1..]),
        None => (body, ""),
    };

    if let Some(idx) = decimal_sep {
        let sep = &body[idx..idx + 1];
        if int_part.contains(sep) || frac_part.contains(['.', ',']) {
            return None;
        }
    }

    let int_digits: String = int_part.chars().filter(|c| c.is_ascii_digit()).collect();
    if int_digits.is_empty() && frac_part.is_empty() {
        return None;
    }

    let reais: i64 = if int_digits.is_empty() {
        0
    } else {
        int_digits.parse().ok()?
    };

    let mut frac_digits = frac_part.chars();
    let tens = frac_digits.next().and_then(|c| c.to_digit(10)).unwrap_or(0) as i64;
    let units = frac_digits.next().and_then(|c| c.to_digit(10)).unwrap_or(0) as i64;
    let round_up = frac_digits.next().and_then(|c| c.to_digit(10)).unwrap_or(0) >= 5;

    let centavos = reais
        .checked_mul(100)?
        .checked_add(tens * 10 + units + i64::from(round_up))?;

    Some(Money::from_centavos(if negative { -centavos } else { centavos }))
}

/// Byte index of the decimal separator in `body`, if it has one.
fn decimal_separator(body: &str) -> Option<usize> {
    let last_dot = body.rfind('.');
    let last_comma = body.rfind(',');

    match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => Some(dot.max(comma)),
        (None, Some(comma)) => {
            if body.matches(',').count() == 1 {
                Some(comma)
            } else {
                None
            }
        }
        (Some(dot), None) => {
            if body.matches('.').count() > 1 {
                return None;
            }
            let before = dot;
            let after = body.len() - dot - 1;
            if after == 3 && (1..=3).contains(&before) && !body.starts_with('0') {
                None
            } else {
                Some(dot)
            }
        }
        (None, None) => None,
    }
}

const MONTHS_PT: &[(&str, u32)] = &[
    ("janeiro", 1),
    ("fevereiro", 2),
    ("março", 3),
    ("marco", 3),
    ("abril", 4),
    ("maio", 5),
    ("junho", 6),
    ("julho", 7),
    ("agosto", 8),
    ("setembro", 9),
    ("outubro", 10),
    ("novembro", 11),
    ("dezembro", 12),
];

/// Parses the commercial month a row is booked under: `novembro 2025`,
/// `Novembro de 2025` or `11/2025`. Returns the first day of that month.
pub fn parse_base_month(raw: &str) -> Option<NaiveDate> {
    let lower = raw.trim().to_lowercase();

    let tokens: Vec<&str> = lower
        .split(|c: char| c.is_whitespace() || c == '/')
        .filter(|t| !t.is_empty() && *t != "de")
        .collect();
    if tokens.len() != 2 {
        return None;
    }

    let month = match tokens[0].parse::<u32>() {
        Ok(n) => n,
        Err(_) => MONTHS_PT
            .iter()
            .find(|(name, _)| *name == tokens[0])
            .map(|(_, n)| *n)?,
    };
    let year: i32 = tokens[1].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Uppercase + trim, the normalization every label in the sheet gets.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Keeps the digits of a tax id (CPF), dropping dots, dashes and spaces.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Label for a base month, as the dashboards show it (`11/2025`).
pub fn base_month_label(month: NaiveDate) -> String {
    format!("{:02}/{}", month.month(), month.year())
}
