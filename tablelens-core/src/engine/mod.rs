//! Query engine boundary.
//!
//! The quality assessor talks to an external execution engine only through
//! the [`QueryEngine`] trait: a query string goes in, a row set or an error
//! message comes out. Engine drivers are feature-gated.
//!
//! # Module Structure
//! - `config`: connection configuration shared by all engines
//! - `sqlite`: SQLite files through `sqlx` (feature `sqlite`)
//! - `http`: a remote query service over HTTP (feature `http`)

use async_trait::async_trait;

use crate::Result;
use crate::error::TableLensError;
use crate::models::RowSet;
use crate::quality::queries::{
    DUP_COUNT_COLUMN, TOTAL_ROWS_COLUMN, duplicate_count_query, row_count_query, summarize_query,
};
use crate::quality::summary::extract_count;

pub mod config;

pub use config::ConnectionConfig;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "http")]
pub mod http;

/// Supported engine kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// SQLite database file or in-memory database
    Sqlite,
    /// Remote query service speaking `POST /api/query`
    Http,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "SQLite"),
            Self::Http => write!(f, "HTTP"),
        }
    }
}

/// A query execution engine.
///
/// Only [`QueryEngine::execute`] is required. The summary and count
/// operations default to the standard query shapes; engines whose dialect
/// lacks `SUMMARIZE` or `GROUP BY ALL` override them with native queries
/// that produce the same result columns.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn QueryEngine>` or `Arc<dyn QueryEngine>`.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Runs a query and returns its rows.
    ///
    /// # Errors
    /// Returns [`TableLensError::Query`] carrying the engine's message.
    async fn execute(&self, query: &str) -> Result<RowSet>;

    /// Returns the kind of engine.
    fn engine_kind(&self) -> EngineKind;

    /// Tests the engine connection without touching any table.
    async fn test_connection(&self) -> Result<()> {
        self.execute("SELECT 1").await.map(|_| ())
    }

    /// Per-column summary rows for `table`.
    ///
    /// Rows carry at least `column_name`, `column_type`, `null_percentage`,
    /// `approx_unique`, `min`, and `max`.
    async fn summarize(&self, table: &str) -> Result<RowSet> {
        self.execute(&summarize_query(table)).await
    }

    /// Total row count of `table`.
    async fn count_rows(&self, table: &str) -> Result<u64> {
        let rows = self.execute(&row_count_query(table)).await?;
        Ok(extract_count(&rows, TOTAL_ROWS_COLUMN))
    }

    /// Number of distinct row values in `table` occurring more than once.
    async fn count_duplicate_rows(&self, table: &str) -> Result<u64> {
        let rows = self.execute(&duplicate_count_query(table)).await?;
        Ok(extract_count(&rows, DUP_COUNT_COLUMN))
    }
}

/// Detects the engine kind from a connection string.
///
/// # Errors
/// Returns error if the connection string format is unrecognized
pub fn detect_engine_kind(connection_string: &str) -> Result<EngineKind> {
    if connection_string.starts_with("http://") || connection_string.starts_with("https://") {
        Ok(EngineKind::Http)
    } else if connection_string.starts_with("sqlite:")
        || connection_string == ":memory:"
        || connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        Ok(EngineKind::Sqlite)
    } else {
        Err(TableLensError::configuration(
            "Unrecognized engine connection string format",
        ))
    }
}

/// Creates an engine from a connection string with default configuration.
///
/// # Errors
/// Returns error if:
/// - Connection string format is invalid
/// - The engine kind is not compiled in
/// - The engine cannot be reached
pub async fn create_engine(connection_string: &str) -> Result<Box<dyn QueryEngine>> {
    let kind = detect_engine_kind(connection_string)?;
    create_engine_with_config(connection_string, ConnectionConfig::for_kind(kind)).await
}

/// Creates an engine from a connection string with explicit configuration.
pub async fn create_engine_with_config(
    connection_string: &str,
    config: ConnectionConfig,
) -> Result<Box<dyn QueryEngine>> {
    config.validate()?;
    let kind = detect_engine_kind(connection_string)?;
    tracing::debug!(
        "Creating {} engine for {}",
        kind,
        crate::error::redact_database_url(connection_string)
    );

    match kind {
        #[cfg(feature = "sqlite")]
        EngineKind::Sqlite => {
            let engine = sqlite::SqliteEngine::with_config(connection_string, config).await?;
            Ok(Box::new(engine))
        }
        #[cfg(not(feature = "sqlite"))]
        EngineKind::Sqlite => Err(TableLensError::unsupported_feature(
            "SQLite engine",
            "this build (compile with --features sqlite)",
        )),
        #[cfg(feature = "http")]
        EngineKind::Http => {
            let engine = http::HttpEngine::with_config(connection_string, config)?;
            Ok(Box::new(engine))
        }
        #[cfg(not(feature = "http"))]
        EngineKind::Http => Err(TableLensError::unsupported_feature(
            "HTTP engine",
            "this build (compile with --features http)",
        )),
    }
}
