// src/parser/records.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::parser::layout::{ColumnRoleMap, MergedRow};

// Amounts as printed: digits with an optional fractional part. Signs and
// currency words are never part of the figure itself.
static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("Failed to compile AMOUNT_RE"));

// A four-digit reporting year embedded in arbitrary text.
static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(20\d{2})\b").expect("Failed to compile YEAR_RE"));

// A three-digit income code token.
static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{3})\b").expect("Failed to compile CODE_RE"));

// Code and name fused into one cell, e.g. "101 - Заробітна плата".
static CODE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{3})\s*-\s*(.+)").expect("Failed to compile CODE_NAME_RE"));

/// One income line from the document.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeRecord {
    pub year: String,
    pub code: String,
    pub name: String,
    pub amount: f64,
}

/// A total printed in the document itself. Used only for reconciliation,
/// never aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct StatedTotal {
    pub year: String,
    pub amount: f64,
}

/// A data row whose amount text could not be read as a number. The row is
/// dropped but the rest of the document still parses.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("page {page} row {row}: amount text '{raw_text}' is not a number")]
pub struct AmountParseError {
    pub page: u32,
    pub row: u32,
    pub raw_text: String,
}

/// Output of the extraction pass over the merged rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedRows {
    pub records: Vec<IncomeRecord>,
    pub stated_totals: Vec<StatedTotal>,
    pub diagnostics: Vec<AmountParseError>,
}

/// Normalizes printed amount text and parses it as a number.
///
/// Strips spacing thousands separators (including non-breaking variants),
/// converts a decimal comma to a decimal point, then takes the first
/// numeric token. Returns None when no numeric token remains.
pub fn normalize_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    AMOUNT_RE.find(&cleaned)?.as_str().parse().ok()
}

fn contains_total_marker(text: &str, markers: &[String]) -> bool {
    let lowered = text.to_lowercase();
    markers.iter().any(|marker| lowered.contains(marker.as_str()))
}

fn first_year_token(text: &str) -> Option<String> {
    YEAR_RE
        .captures(text)
        .map(|captures| captures[1].to_string())
}

/// Classifies each merged row as an income record, a stated-total row, or
/// noise, reading cells through the column role map.
pub fn extract_rows(
    rows: &[MergedRow],
    roles: ColumnRoleMap,
    total_markers: &[String],
) -> ExtractedRows {
    let mut extracted = ExtractedRows::default();

    for row in rows {
        let year_text = row.text(roles.year).trim();
        let code_text = row.text(roles.code).trim();
        let name_text = row.text(roles.name).trim();
        let amount_raw = row.text(roles.amount);

        // Total rows are reconciliation input, not data. The year the total
        // belongs to may be printed in either labeled cell; failing that,
        // the total closes the year of the record right before it.
        if contains_total_marker(year_text, total_markers)
            || contains_total_marker(name_text, total_markers)
        {
            let year = first_year_token(year_text)
                .or_else(|| first_year_token(name_text))
                .or_else(|| extracted.records.last().map(|record| record.year.clone()));

            let year = match year {
                Some(year) => year,
                None => {
                    tracing::debug!(
                        "Page {} row {}: total row without a determinable year, ignoring",
                        row.page,
                        row.row
                    );
                    continue;
                }
            };

            match normalize_amount(amount_raw) {
                Some(amount) => {
                    tracing::debug!(
                        "Page {} row {}: stated total {} for year {}",
                        row.page,
                        row.row,
                        amount,
                        year
                    );
                    extracted.stated_totals.push(StatedTotal { year, amount });
                }
                None => {
                    tracing::debug!(
                        "Page {} row {}: total row amount '{}' is unreadable, ignoring",
                        row.page,
                        row.row,
                        amount_raw
                    );
                }
            }
            continue;
        }

        // Separator and decoration rows carry neither a year nor a code.
        if year_text.is_empty() && code_text.is_empty() {
            continue;
        }

        let code = match CODE_RE.captures(code_text) {
            Some(captures) => captures[1].to_string(),
            None => code_text.to_string(),
        };

        // The layout model sometimes fuses code and name into one cell.
        let name = if !name_text.is_empty() {
            name_text.to_string()
        } else {
            CODE_NAME_RE
                .captures(code_text)
                .map(|captures| captures[2].trim().to_string())
                .unwrap_or_default()
        };

        match normalize_amount(amount_raw) {
            Some(amount) => {
                extracted.records.push(IncomeRecord {
                    year: year_text.to_string(),
                    code,
                    name,
                    amount,
                });
            }
            None => {
                tracing::debug!(
                    "Page {} row {}: dropping data row with unreadable amount '{}'",
                    row.page,
                    row.row,
                    amount_raw
                );
                extracted.diagnostics.push(AmountParseError {
                    page: row.page,
                    row: row.row,
                    raw_text: amount_raw.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        "Extracted {} records, {} stated totals, {} diagnostics",
        extracted.records.len(),
        extracted.stated_totals.len(),
        extracted.diagnostics.len()
    );
    extracted
}
