//! Rendering and file output for profiles and quality reports.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use tablelens_core::error::TableLensError;
use tablelens_core::profiling::{ColumnProfile, NumericStats, TopValue};
use tablelens_core::quality::{QualityReport, TableAssessment};
use tablelens_core::Result;

use crate::cli::OutputFormat;

/// Message shown when a result set has no rows.
pub const EMPTY_PROFILE_MESSAGE: &str = "No data to profile";

/// Renders column profiles.
pub fn render_profiles(profiles: &[ColumnProfile], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&profiles, "column profiles"),
        OutputFormat::Text if profiles.is_empty() => Ok(format!("{EMPTY_PROFILE_MESSAGE}\n")),
        OutputFormat::Text => Ok(profiles_text(profiles)),
    }
}

/// Renders a single quality report.
pub fn render_report(report: &QualityReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(report, "quality report"),
        OutputFormat::Text => Ok(report_text(report)),
    }
}

/// Renders the outcomes of a batch assessment, in input order.
pub fn render_assessments(assessments: &[TableAssessment], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let outcomes: Vec<_> = assessments.iter().map(TableAssessment::as_outcome).collect();
            to_json(&outcomes, "assessment outcomes")
        }
        OutputFormat::Text => {
            let mut out = String::new();
            for assessment in assessments {
                match &assessment.outcome {
                    Ok(report) => out.push_str(&report_text(report)),
                    Err(e) => {
                        let _ = writeln!(out, "Table: {}", assessment.table);
                        let _ = writeln!(out, "Assessment failed: {e}");
                    }
                }
                out.push('\n');
            }
            Ok(out)
        }
    }
}

/// Writes rendered output to `path`, or to stdout when no path is given.
pub async fn emit(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            save_output(rendered, path).await?;
            tracing::info!("Output saved to {}", path.display());
            Ok(())
        }
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}

/// Saves rendered output to a file.
pub async fn save_output(rendered: &str, output_path: &Path) -> Result<()> {
    tokio::fs::write(output_path, rendered)
        .await
        .map_err(|e| TableLensError::Io {
            context: format!("Failed to write to {}", output_path.display()),
            source: e,
        })
}

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)
        .map_err(|e| TableLensError::serialization(format!("Failed to encode {what}"), e))?;
    json.push('\n');
    Ok(json)
}

fn profiles_text(profiles: &[ColumnProfile]) -> String {
    let rows = profiles.first().map_or(0, |p| p.total_count);
    let mut out = String::new();
    let _ = writeln!(out, "Rows: {rows}  Columns: {}", profiles.len());

    for profile in profiles {
        out.push('\n');
        let _ = writeln!(out, "{} ({})", profile.name, profile.dtype);
        let _ = writeln!(
            out,
            "  nulls:  {} ({}%)",
            profile.null_count, profile.null_pct
        );
        let _ = writeln!(
            out,
            "  unique: {} ({}%)",
            profile.unique_count, profile.unique_pct
        );
        if let Some(stats) = &profile.numeric_stats {
            write_numeric_stats(&mut out, stats);
        }
        if let Some(top) = &profile.top_values {
            write_top_values(&mut out, top);
        }
    }
    out
}

fn write_numeric_stats(out: &mut String, stats: &NumericStats) {
    let _ = writeln!(
        out,
        "  min {}  max {}  mean {}  median {}  stddev {}",
        stats.min, stats.max, stats.mean, stats.median, stats.stddev
    );
    if let Some(histogram) = &stats.histogram {
        let bins: Vec<String> = histogram.iter().map(u64::to_string).collect();
        let _ = writeln!(out, "  histogram [{}]", bins.join(", "));
    }
}

fn write_top_values(out: &mut String, top: &[TopValue]) {
    if top.is_empty() {
        return;
    }
    let _ = writeln!(out, "  top values:");
    for entry in top {
        let _ = writeln!(out, "    {:<24} {:>8}  {}%", entry.value, entry.count, entry.pct);
    }
}

fn report_text(report: &QualityReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Table: {}", report.table_name);
    let _ = writeln!(
        out,
        "Rows: {}  Columns: {}  Duplicate rows: {}",
        report.total_rows, report.column_count, report.duplicate_row_count
    );
    let _ = writeln!(
        out,
        "Score: {} ({}), {}/{} checks passed",
        report.score,
        report.grade(),
        report.passed_checks(),
        report.total_checks()
    );

    for column in &report.columns {
        out.push('\n');
        let _ = writeln!(out, "{} ({})", column.column, column.column_type);
        if let (Some(min), Some(max)) = (&column.min, &column.max) {
            let _ = writeln!(out, "  range: {min} .. {max}");
        }
        for check in &column.checks {
            let _ = writeln!(out, "  [{}] {}: {}", check.status, check.name, check.detail);
        }
    }
    out
}
