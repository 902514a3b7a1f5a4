//! Completeness check.

use super::models::{CheckKind, CheckStatus, QualityCheck};
use super::thresholds::COMPLETENESS_WARN_BELOW_PCT;

/// Evaluates completeness from an engine-reported null percentage.
///
/// Zero nulls pass, small amounts warn, everything else fails.
pub fn check_completeness(null_pct: f64) -> QualityCheck {
    if null_pct == 0.0 {
        QualityCheck::new(CheckKind::Completeness, CheckStatus::Pass, "No nulls")
    } else if null_pct < COMPLETENESS_WARN_BELOW_PCT {
        QualityCheck::new(
            CheckKind::Completeness,
            CheckStatus::Warn,
            format!("{}% null values", null_pct),
        )
    } else {
        QualityCheck::new(
            CheckKind::Completeness,
            CheckStatus::Fail,
            format!("{}% null values", null_pct),
        )
    }
}
