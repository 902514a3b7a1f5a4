//! Full-scan column profiling.
//!
//! This module profiles a row set that is already resident in memory:
//! - **Type inference**: numeric vs text from a sample of non-null values
//! - **Numeric statistics**: min, max, mean, median, population stddev,
//!   and a 5-bin equal-width histogram
//! - **Frequency ranking**: top-5 values for text columns
//!
//! Profiling is synchronous, performs no I/O, and is a pure function of its
//! input, so callers may memoize results.
//!
//! # Example
//! ```rust
//! use serde_json::json;
//! use tablelens_core::models::RowSet;
//! use tablelens_core::profiling::{ColumnType, profile_rows};
//!
//! let rows = RowSet::from_json(&json!([{"n": 1}, {"n": 2}, {"n": 3}]));
//! let profiles = profile_rows(&rows);
//! assert_eq!(profiles[0].dtype, ColumnType::Numeric);
//! ```

mod config;
mod frequency;
mod inference;
mod models;
mod profiler;
mod stats;

pub use config::{ProfilerConfig, SchemaDriftPolicy};
pub use frequency::{TOP_VALUE_LIMIT, top_values};
pub use inference::{INFERENCE_SAMPLE_SIZE, infer_column_type};
pub use models::{ColumnProfile, ColumnType, NumericStats, TopValue};
pub use profiler::{Profiler, profile_rows};
pub use stats::{HISTOGRAM_BINS, histogram, mean, median, numeric_stats, population_stddev, round_to};
