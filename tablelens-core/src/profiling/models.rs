//! Column profile models.

use serde::{Deserialize, Serialize};

/// Inferred column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every sampled value is numeric
    Numeric,
    /// Anything else, including columns with no values
    Text,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Distribution statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    /// Smallest parsed value
    pub min: f64,
    /// Largest parsed value
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Median (average of the two central values for even counts)
    pub median: f64,
    /// Population standard deviation
    pub stddev: f64,
    /// Equal-width bin counts over `[min, max]`; absent when `max == min`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<u64>>,
}

/// One entry of a text column's frequency ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopValue {
    /// The value, as text
    pub value: String,
    /// Occurrences among non-null values
    pub count: u64,
    /// Share of non-null values, percent rounded to one decimal
    pub pct: f64,
}

/// Profile of a single column from a full scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name
    pub name: String,
    /// Number of rows scanned
    pub total_count: u64,
    /// Null, absent, or empty-text cells
    pub null_count: u64,
    /// `null_count / total_count`, percent rounded to one decimal
    pub null_pct: f64,
    /// Distinct non-null values compared as text
    pub unique_count: u64,
    /// `unique_count / non_null`, percent rounded to one decimal
    pub unique_pct: f64,
    /// Inferred type
    pub dtype: ColumnType,
    /// Present for numeric columns with at least one parsable value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_stats: Option<NumericStats>,
    /// Present for text columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_values: Option<Vec<TopValue>>,
}

impl ColumnProfile {
    /// Number of non-null cells.
    pub fn non_null_count(&self) -> u64 {
        self.total_count.saturating_sub(self.null_count)
    }

    /// Returns true when the column was inferred numeric.
    pub fn is_numeric(&self) -> bool {
        self.dtype == ColumnType::Numeric
    }
}
