//! Uniqueness check.
//!
//! Low cardinality is reported as information, never as a failure.

use super::models::{CheckKind, CheckStatus, QualityCheck};
use super::thresholds::{UNIQUENESS_ID_RATIO, UNIQUENESS_MODERATE_RATIO};

/// Non-null rows implied by a total count and a null percentage.
///
/// `total_rows - round(total_rows * null_pct / 100)`, floored at zero.
/// An unreadable (NaN) percentage implies no known non-null rows.
pub fn non_null_rows(total_rows: u64, null_pct: f64) -> u64 {
    if null_pct.is_nan() {
        return 0;
    }
    let nulls = (total_rows as f64 * null_pct / 100.0).round();
    if nulls <= 0.0 {
        return total_rows;
    }
    total_rows.saturating_sub(nulls as u64)
}

/// Distinct-to-non-null ratio, or 0 when there are no non-null rows.
pub fn uniqueness_ratio(approx_unique: u64, total_non_null: u64) -> f64 {
    if total_non_null == 0 {
        return 0.0;
    }
    approx_unique as f64 / total_non_null as f64
}

/// Evaluates uniqueness from an approximate distinct count.
pub fn check_uniqueness(approx_unique: u64, total_non_null: u64) -> QualityCheck {
    let ratio = uniqueness_ratio(approx_unique, total_non_null);

    if ratio > UNIQUENESS_ID_RATIO {
        QualityCheck::new(
            CheckKind::Uniqueness,
            CheckStatus::Pass,
            format!("{} unique (likely ID)", approx_unique),
        )
    } else if ratio > UNIQUENESS_MODERATE_RATIO {
        QualityCheck::new(
            CheckKind::Uniqueness,
            CheckStatus::Info,
            format!("{} unique values", approx_unique),
        )
    } else {
        QualityCheck::new(
            CheckKind::Uniqueness,
            CheckStatus::Info,
            format!("{} unique (categorical)", approx_unique),
        )
    }
}
