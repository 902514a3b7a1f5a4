//! Adapter from engine summary rows to typed summary records.
//!
//! Engines return summary and count cells as numbers or as numeric text
//! (64-bit counts are often serialized as strings). Text is read by its
//! leading numeric prefix, so `"12.5%"` is 12.5 and `"42 rows"` is 42.
//! Missing cells read as zero. A null percentage that is present but has no
//! numeric prefix reads as NaN, which the completeness check fails.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{CellValue, Row, RowSet};

use super::models::deserialize_percentage;

/// Engine-side per-column summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Column name
    pub column_name: String,
    /// Engine-reported column type
    pub column_type: String,
    /// Percentage of null values, 0-100; NaN when unreadable
    #[serde(deserialize_with = "deserialize_percentage")]
    pub null_percentage: f64,
    /// Approximate distinct count
    pub approx_unique: u64,
    /// Minimum value as text
    pub min: Option<String>,
    /// Maximum value as text
    pub max: Option<String>,
}

impl SummaryRow {
    /// Reads a summary record from a result row.
    pub fn from_row(row: &Row) -> Self {
        let column_name = text_cell(row, "column_name").unwrap_or_default();
        let null_percentage = percentage_cell(row.get("null_percentage"), &column_name);
        let approx_unique = count_cell(row.get("approx_unique"), "approx_unique", &column_name);

        Self {
            column_type: text_cell(row, "column_type").unwrap_or_default(),
            null_percentage,
            approx_unique,
            min: text_cell(row, "min"),
            max: text_cell(row, "max"),
            column_name,
        }
    }
}

/// Reads every row of a summary result.
pub fn summary_rows(rows: &RowSet) -> Vec<SummaryRow> {
    rows.rows.iter().map(SummaryRow::from_row).collect()
}

/// Reads a count from the first row's `column`, or 0 when absent.
pub fn extract_count(rows: &RowSet, column: &str) -> u64 {
    count_cell(rows.first().and_then(|row| row.get(column)), column, column)
}

fn text_cell(row: &Row, column: &str) -> Option<String> {
    match row.get(column) {
        None | Some(CellValue::Null) => None,
        Some(value) => Some(value.to_text()),
    }
}

/// Reads a null percentage. Missing, null, `false`, and empty text read as
/// 0; anything else without a numeric prefix reads as NaN.
fn percentage_cell(value: Option<&CellValue>, column_name: &str) -> f64 {
    let parsed = match value {
        None | Some(CellValue::Null | CellValue::Bool(false)) => return 0.0,
        Some(CellValue::Text(text)) if text.is_empty() => return 0.0,
        Some(CellValue::Number(n)) => Some(*n),
        Some(CellValue::Text(text)) => float_prefix(text),
        Some(CellValue::Bool(true)) => None,
    };
    parsed.unwrap_or_else(|| {
        warn!(
            "Unreadable null_percentage '{}' for column '{}'",
            value.map(CellValue::to_text).unwrap_or_default(),
            column_name
        );
        f64::NAN
    })
}

/// Reads a non-negative count, truncating fractions. Unreadable counts are 0.
fn count_cell(value: Option<&CellValue>, column: &str, column_name: &str) -> u64 {
    let parsed = match value {
        None | Some(CellValue::Null | CellValue::Bool(false)) => return 0,
        Some(CellValue::Text(text)) if text.is_empty() => return 0,
        Some(CellValue::Number(n)) => Some(n.trunc()),
        Some(CellValue::Text(text)) => integer_prefix(text),
        Some(CellValue::Bool(true)) => None,
    };
    match parsed {
        Some(n) if n.is_finite() && n > 0.0 => n as u64,
        Some(_) => 0,
        None => {
            warn!(
                "Unreadable {} '{}' for column '{}'; reading as 0",
                column,
                value.map(CellValue::to_text).unwrap_or_default(),
                column_name
            );
            0
        }
    }
}

/// Longest leading decimal literal of `text`, after leading whitespace.
fn float_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;
    let mut mantissa_digits = int_digits;
    if bytes.get(end) == Some(&b'.') {
        let frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
            mantissa_digits += frac_digits;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = count_digits(&bytes[(end + 1 + sign).min(bytes.len())..]);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }
    text[..end].parse::<f64>().ok()
}

/// Leading integer of `text`, after leading whitespace.
fn integer_prefix(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = count_digits(&bytes[sign..]);
    if digits == 0 {
        return None;
    }
    text[..sign + digits].parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
