//! Data quality report models.
//!
//! Reports are transient: they are rebuilt from engine results on every
//! assessment and carry no timestamps, so identical inputs produce
//! identical reports.

use serde::{Deserialize, Deserializer, Serialize};

use super::thresholds::{FAIR_SCORE_MIN, GOOD_SCORE_MIN};

/// Outcome of a single quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Check passed; the only status that counts toward the score
    Pass,
    /// Minor issue
    Warn,
    /// Significant issue
    Fail,
    /// Informational only
    Info,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Info => "info",
        };
        f.write_str(label)
    }
}

/// The rule a check evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckKind {
    /// Share of null values
    Completeness,
    /// Distinct values relative to non-null values
    Uniqueness,
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completeness => f.write_str("Completeness"),
            Self::Uniqueness => f.write_str("Uniqueness"),
        }
    }
}

/// A named check evaluated against one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityCheck {
    /// Which rule produced the check
    pub name: CheckKind,
    /// Outcome
    pub status: CheckStatus,
    /// Human-readable detail
    pub detail: String,
}

impl QualityCheck {
    /// Creates a new check.
    pub fn new(name: CheckKind, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name,
            status,
            detail: detail.into(),
        }
    }

    /// Returns true when the check passed.
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

/// Quality checks and summary statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQualityReport {
    /// Column name
    pub column: String,
    /// Engine-reported column type
    #[serde(rename = "type")]
    pub column_type: String,
    /// Minimum value as rendered by the engine
    pub min: Option<String>,
    /// Maximum value as rendered by the engine
    pub max: Option<String>,
    /// Null percentage reported by the engine; NaN (`null` in JSON) when
    /// the engine's value was unreadable
    #[serde(deserialize_with = "deserialize_percentage")]
    pub null_pct: f64,
    /// Approximate distinct count reported by the engine
    pub approx_unique: u64,
    /// Checks in evaluation order
    pub checks: Vec<QualityCheck>,
}

/// Reads a percentage written by serde_json, which encodes NaN as `null`.
pub(crate) fn deserialize_percentage<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Display band for a quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreGrade {
    /// Score of 80 or more
    Good,
    /// Score of 50 to 79
    Fair,
    /// Score below 50
    Poor,
}

impl ScoreGrade {
    /// Classifies a score.
    pub fn from_score(score: u8) -> Self {
        if score >= GOOD_SCORE_MIN {
            Self::Good
        } else if score >= FAIR_SCORE_MIN {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for ScoreGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => f.write_str("good"),
            Self::Fair => f.write_str("fair"),
            Self::Poor => f.write_str("poor"),
        }
    }
}

/// Table-level quality report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Table that was assessed
    pub table_name: String,
    /// Total row count
    pub total_rows: u64,
    /// Number of columns in the summary
    pub column_count: usize,
    /// Distinct row values occurring more than once; never affects the score
    pub duplicate_row_count: u64,
    /// Percentage of passing checks, 0-100
    pub score: u8,
    /// Per-column results in summary order
    pub columns: Vec<ColumnQualityReport>,
}

impl QualityReport {
    /// Total number of checks across all columns.
    pub fn total_checks(&self) -> usize {
        self.columns.iter().map(|c| c.checks.len()).sum()
    }

    /// Number of checks with status `pass`.
    pub fn passed_checks(&self) -> usize {
        self.columns
            .iter()
            .flat_map(|c| &c.checks)
            .filter(|check| check.passed())
            .count()
    }

    /// Display band for the score.
    pub fn grade(&self) -> ScoreGrade {
        ScoreGrade::from_score(self.score)
    }
}
