//! Fixed quality heuristics.
//!
//! These are constants rather than configuration; reports from different
//! runs are only comparable because every run uses the same cutoffs.

/// Null percentages below this (but above zero) warn; at or above, fail.
pub const COMPLETENESS_WARN_BELOW_PCT: f64 = 5.0;

/// Unique-to-non-null ratios above this mark the column as an identifier.
pub const UNIQUENESS_ID_RATIO: f64 = 0.95;

/// Unique-to-non-null ratios above this (up to the identifier cutoff) are
/// moderate cardinality; anything lower is categorical.
pub const UNIQUENESS_MODERATE_RATIO: f64 = 0.5;

/// Lowest score graded good.
pub const GOOD_SCORE_MIN: u8 = 80;

/// Lowest score graded fair.
pub const FAIR_SCORE_MIN: u8 = 50;
