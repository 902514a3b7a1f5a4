//! Summary-based data quality assessment.
//!
//! This module turns engine-side column summaries into quality checks and a
//! table-level score:
//! - **Completeness**: share of null values per column
//! - **Uniqueness**: distinct values relative to non-null rows
//! - **Score**: percentage of checks that pass
//!
//! Thresholds are fixed constants (see [`thresholds`]). The duplicate-row
//! count is reported alongside the score but never affects it.
//!
//! # Example
//! ```rust,ignore
//! use tablelens_core::quality::QualityAssessor;
//!
//! let assessor = QualityAssessor::new(engine);
//! let report = assessor.assess("orders").await?;
//! println!("Quality score: {} ({})", report.score, report.grade());
//! ```

mod assessor;
mod completeness;
mod models;
pub mod queries;
mod scoring;
mod session;
pub mod summary;
pub mod thresholds;
mod uniqueness;

// Re-export public API
pub use assessor::{AssessmentOutcome, QualityAssessor, TableAssessment};
pub use completeness::check_completeness;
pub use models::{
    CheckKind, CheckStatus, ColumnQualityReport, QualityCheck, QualityReport, ScoreGrade,
};
pub use scoring::{assemble_report, assess_column, quality_score};
pub use session::{AssessmentSession, AssessmentState};
pub use summary::{SummaryRow, extract_count, summary_rows};
pub use uniqueness::{check_uniqueness, non_null_rows, uniqueness_ratio};
