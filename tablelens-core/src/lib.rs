//! Core profiling and data-quality engine for TableLens.
//!
//! This crate answers two questions about tabular data:
//! - "What does each column look like?" via full-scan profiling of rows
//!   already in memory ([`profiling`])
//! - "How trustworthy is this table?" via summary-based quality assessment
//!   against a query engine ([`quality`], [`engine`])
//!
//! # Guarantees
//! - Profiling is pure, synchronous, and never fails on well-formed input
//! - Assessment issues three independent read-only queries and fails as a
//!   whole when any of them fails, carrying the engine's message verbatim
//! - Only the most recently requested assessment is ever surfaced by an
//!   [`quality::AssessmentSession`]
//! - Connection strings are redacted before they are logged
//!
//! # Architecture
//! - Tagged cell values assigned once at ingestion ([`models`])
//! - Object-safe engine trait with a factory keyed on the URL scheme
//! - Notifications injected through the [`notify::Notifier`] trait

pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod profiling;
pub mod quality;

// Re-export commonly used types
pub use engine::{ConnectionConfig, EngineKind, QueryEngine, create_engine};
pub use error::{Result, TableLensError};
pub use models::{CellValue, Row, RowSet};
pub use notify::{NotificationService, Notifier};
pub use profiling::{ColumnProfile, Profiler, ProfilerConfig, SchemaDriftPolicy, profile_rows};
pub use quality::{AssessmentSession, AssessmentState, QualityAssessor, QualityReport};
