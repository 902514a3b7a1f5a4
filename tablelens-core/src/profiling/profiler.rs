//! Full-scan column profiler.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::Result;
use crate::error::TableLensError;
use crate::models::{CellValue, Row, RowSet};

use super::config::{ProfilerConfig, SchemaDriftPolicy};
use super::frequency::top_values;
use super::inference::infer_column_type;
use super::models::{ColumnProfile, ColumnType};
use super::stats::{numeric_stats, percentage};

/// Full-scan profiler over an in-memory row set.
///
/// The column list is fixed from the first row's keys. What happens when a
/// later row's keys differ is governed by [`SchemaDriftPolicy`].
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use tablelens_core::models::RowSet;
/// use tablelens_core::profiling::{Profiler, ProfilerConfig, SchemaDriftPolicy};
///
/// let rows = RowSet::from_json(&json!([{"a": 1}, {"b": 2}]));
/// let strict = Profiler::new(ProfilerConfig::new().with_drift_policy(SchemaDriftPolicy::Reject));
/// assert!(strict.profile(&rows).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Profiler {
    config: ProfilerConfig,
}

impl Profiler {
    /// Creates a profiler with the given configuration.
    pub fn new(config: ProfilerConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the profiler configuration.
    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profiles every column of `rows`, in first-row key order.
    ///
    /// An empty row set yields an empty profile list.
    ///
    /// # Errors
    /// Returns [`TableLensError::SchemaMismatch`] when the drift policy is
    /// [`SchemaDriftPolicy::Reject`] and some row's keys differ from the
    /// first row's.
    pub fn profile(&self, rows: &RowSet) -> Result<Vec<ColumnProfile>> {
        let columns = rows.column_names();
        if columns.is_empty() {
            debug!("No columns to profile ({} rows)", rows.len());
            return Ok(Vec::new());
        }

        let drifted = self.check_drift(rows, &columns)?;
        if drifted > 0 {
            warn!(
                "{} of {} rows do not match the first row's columns; missing cells count as null",
                drifted,
                rows.len()
            );
        }

        let profiles: Vec<ColumnProfile> = columns
            .iter()
            .enumerate()
            .map(|(position, name)| profile_column(rows, position, name))
            .collect();

        debug!(
            "Profiled {} columns over {} rows",
            profiles.len(),
            rows.len()
        );
        Ok(profiles)
    }

    /// Counts drifting rows, or fails on the first one under `Reject`.
    fn check_drift(&self, rows: &RowSet, columns: &[String]) -> Result<usize> {
        let mut drifted = 0usize;
        for (index, row) in rows.rows.iter().enumerate().skip(1) {
            let Some(detail) = drift_detail(row, columns) else {
                continue;
            };
            match self.config.drift_policy {
                SchemaDriftPolicy::Reject => {
                    return Err(TableLensError::schema_mismatch(index, detail));
                }
                SchemaDriftPolicy::Tolerate => drifted += 1,
            }
        }
        Ok(drifted)
    }
}

/// Profiles `rows`, tolerating schema drift.
///
/// Never fails: missing cells count as null and extra keys are ignored.
pub fn profile_rows(rows: &RowSet) -> Vec<ColumnProfile> {
    let columns = rows.column_names();
    columns
        .iter()
        .enumerate()
        .map(|(position, name)| profile_column(rows, position, name))
        .collect()
}

/// Describes how `row` differs from `columns`, if it does.
fn drift_detail(row: &Row, columns: &[String]) -> Option<String> {
    if let Some((_, missing)) = columns
        .iter()
        .enumerate()
        .find(|(position, name)| row.get_at(*position, name).is_none())
    {
        return Some(format!("missing column '{}'", missing));
    }
    row.columns()
        .find(|name| !columns.iter().any(|c| c == name))
        .map(|extra| format!("unexpected column '{}'", extra))
}

fn profile_column(rows: &RowSet, position: usize, name: &str) -> ColumnProfile {
    let total_count = rows.len() as u64;

    let non_null: Vec<&CellValue> = rows
        .rows
        .iter()
        .filter_map(|row| row.get_at(position, name))
        .filter(|value| !value.is_missing())
        .collect();
    let texts: Vec<String> = non_null.iter().map(|value| value.to_text()).collect();

    let non_null_count = non_null.len() as u64;
    let null_count = total_count - non_null_count;
    let unique_count = texts.iter().collect::<HashSet<_>>().len() as u64;
    let dtype = infer_column_type(non_null.iter().copied());

    let (numeric_stats, top_values) = match dtype {
        ColumnType::Numeric => {
            let numbers: Vec<f64> = non_null
                .iter()
                .filter_map(|value| value.as_number())
                .filter(|n| n.is_finite())
                .collect();
            (numeric_stats(numbers), None)
        }
        ColumnType::Text => (None, Some(top_values(texts.iter().map(String::as_str)))),
    };

    ColumnProfile {
        name: name.to_string(),
        total_count,
        null_count,
        null_pct: percentage(null_count, total_count),
        unique_count,
        unique_pct: percentage(unique_count, non_null_count),
        dtype,
        numeric_stats,
        top_values,
    }
}
