//! Score aggregation and report assembly.

use super::completeness::check_completeness;
use super::models::{ColumnQualityReport, QualityCheck, QualityReport};
use super::summary::SummaryRow;
use super::uniqueness::{check_uniqueness, non_null_rows};

/// Percentage of passing checks, rounded; 100 when there are no checks.
pub fn quality_score(passed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let score = (100.0 * passed as f64 / total as f64).round();
    score.clamp(0.0, 100.0) as u8
}

/// Evaluates every check for one summarized column.
pub fn assess_column(summary: &SummaryRow, total_rows: u64) -> ColumnQualityReport {
    let total_non_null = non_null_rows(total_rows, summary.null_percentage);
    let checks: Vec<QualityCheck> = vec![
        check_completeness(summary.null_percentage),
        check_uniqueness(summary.approx_unique, total_non_null),
    ];

    ColumnQualityReport {
        column: summary.column_name.clone(),
        column_type: summary.column_type.clone(),
        min: summary.min.clone(),
        max: summary.max.clone(),
        null_pct: summary.null_percentage,
        approx_unique: summary.approx_unique,
        checks,
    }
}

/// Builds the final report from the three engine results.
///
/// Pure: identical inputs always produce an identical report. The duplicate
/// count is carried through but never affects the score.
pub fn assemble_report(
    table_name: impl Into<String>,
    summaries: &[SummaryRow],
    total_rows: u64,
    duplicate_row_count: u64,
) -> QualityReport {
    let columns: Vec<ColumnQualityReport> = summaries
        .iter()
        .map(|summary| assess_column(summary, total_rows))
        .collect();

    let total: usize = columns.iter().map(|c| c.checks.len()).sum();
    let passed = columns
        .iter()
        .flat_map(|c| &c.checks)
        .filter(|check| check.passed())
        .count();

    QualityReport {
        table_name: table_name.into(),
        total_rows,
        column_count: columns.len(),
        duplicate_row_count,
        score: quality_score(passed, total),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::models::{CheckStatus, ScoreGrade};

    fn summary(name: &str, null_percentage: f64, approx_unique: u64) -> SummaryRow {
        SummaryRow {
            column_name: name.to_string(),
            column_type: "BIGINT".to_string(),
            null_percentage,
            approx_unique,
            min: None,
            max: None,
        }
    }

    #[test]
    fn test_score_rounding() {
        assert_eq!(quality_score(0, 0), 100);
        assert_eq!(quality_score(1, 3), 33);
        assert_eq!(quality_score(2, 3), 67);
        assert_eq!(quality_score(1, 2), 50);
        assert_eq!(quality_score(4, 4), 100);
    }

    #[test]
    fn test_all_identifier_columns_score_100() {
        let summaries = vec![summary("a", 0.0, 100), summary("b", 0.0, 99), summary("c", 0.0, 97)];
        let report = assemble_report("t", &summaries, 100, 0);

        assert_eq!(report.score, 100);
        assert_eq!(report.total_checks(), 6);
        assert_eq!(report.passed_checks(), 6);
        assert_eq!(report.grade(), ScoreGrade::Good);
    }

    #[test]
    fn test_failing_column_scores_zero() {
        // 100 rows, 10% null -> 90 non-null; 27 / 90 = 0.3
        let report = assemble_report("t", &[summary("c", 10.0, 27)], 100, 0);

        assert_eq!(report.columns[0].checks[0].status, CheckStatus::Fail);
        assert_eq!(report.columns[0].checks[1].status, CheckStatus::Info);
        assert_eq!(report.passed_checks(), 0);
        assert_eq!(report.total_checks(), 2);
        assert_eq!(report.score, 0);
        assert_eq!(report.grade(), ScoreGrade::Poor);
    }

    #[test]
    fn test_no_columns_scores_100() {
        let report = assemble_report("empty", &[], 0, 0);
        assert_eq!(report.score, 100);
        assert_eq!(report.column_count, 0);
        assert_eq!(report.total_checks(), 0);
    }

    #[test]
    fn test_duplicates_do_not_affect_score() {
        let summaries = vec![summary("a", 0.0, 100)];
        let clean = assemble_report("t", &summaries, 100, 0);
        let dirty = assemble_report("t", &summaries, 100, 40);

        assert_eq!(clean.score, dirty.score);
        assert_eq!(dirty.duplicate_row_count, 40);
    }

    #[test]
    fn test_unreadable_null_percentage_does_not_pass() {
        use crate::models::Row;
        use serde_json::json;

        let row = Row::from(&json!({
            "column_name": "c",
            "column_type": "VARCHAR",
            "null_percentage": "lots",
            "approx_unique": 100
        }));
        let report = assemble_report("t", &[SummaryRow::from_row(&row)], 100, 0);

        assert_eq!(report.columns[0].checks[0].status, CheckStatus::Fail);
        assert_eq!(report.columns[0].checks[1].status, CheckStatus::Info);
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_assembly_is_pure() {
        let summaries = vec![summary("a", 2.5, 10), summary("b", 0.0, 100)];
        assert_eq!(
            assemble_report("t", &summaries, 100, 3),
            assemble_report("t", &summaries, 100, 3)
        );
    }
}
