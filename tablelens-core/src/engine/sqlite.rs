//! SQLite engine.
//!
//! SQLite has neither `SUMMARIZE` nor `GROUP BY ALL`, so the summary and
//! duplicate-count operations are rebuilt from `PRAGMA table_info` with the
//! same result columns the standard shapes produce.
//!
//! # Connection Modes
//! - File-based: `sqlite:///path/to/database.db` or `sqlite://./relative.db`
//! - Plain file path: `./data.db`, `/srv/data.sqlite3`
//! - In-memory: `sqlite::memory:` or `:memory:`

use std::str::FromStr;

use async_trait::async_trait;
use base64::Engine as _;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use tracing::debug;

use super::{ConnectionConfig, EngineKind, QueryEngine};
use crate::Result;
use crate::error::TableLensError;
use crate::models::{CellValue, Row, RowSet};
use crate::quality::queries::{DUP_COUNT_COLUMN, quote_identifier, quote_literal};
use crate::quality::summary::extract_count;

/// SQLite engine backed by an `sqlx` pool.
pub struct SqliteEngine {
    pool: SqlitePool,
    config: ConnectionConfig,
    connection_string: String,
}

impl std::fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEngine")
            .field("config", &self.config)
            .field("in_memory", &self.is_in_memory())
            .finish()
    }
}

/// A column as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableColumn {
    name: String,
    declared_type: String,
}

impl SqliteEngine {
    /// Opens a SQLite database with default configuration.
    ///
    /// # Errors
    /// Returns error if:
    /// - Connection string format is invalid
    /// - Database cannot be opened
    pub async fn new(connection_string: &str) -> Result<Self> {
        Self::with_config(
            connection_string,
            ConnectionConfig::for_kind(EngineKind::Sqlite),
        )
        .await
    }

    /// Opens a SQLite database with custom configuration.
    pub async fn with_config(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let pool = create_sqlite_pool(connection_string, &config).await?;

        Ok(Self {
            pool,
            config,
            connection_string: connection_string.to_string(),
        })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            config: ConnectionConfig::for_kind(EngineKind::Sqlite),
            connection_string: "sqlite::memory:".to_string(),
        }
    }

    /// Checks if the connection is to an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        is_memory_connection_string(&self.connection_string)
    }

    /// Returns the connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Closes the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn table_columns(&self, table: &str) -> Result<Vec<TableColumn>> {
        let query = format!("PRAGMA table_info({})", quote_identifier(table));
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        let columns: Vec<TableColumn> = rows
            .iter()
            .map(|row| TableColumn {
                name: row.try_get::<String, _>("name").unwrap_or_default(),
                declared_type: row.try_get::<String, _>("type").unwrap_or_default(),
            })
            .collect();

        // PRAGMA table_info returns nothing for unknown tables
        if columns.is_empty() {
            return Err(TableLensError::query_failed(format!(
                "no such table: {}",
                table
            )));
        }
        Ok(columns)
    }
}

#[async_trait]
impl QueryEngine for SqliteEngine {
    async fn execute(&self, query: &str) -> Result<RowSet> {
        debug!("Executing SQLite query: {}", query);
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(rows.iter().map(convert_row).collect::<Vec<_>>().into())
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::Sqlite
    }

    async fn summarize(&self, table: &str) -> Result<RowSet> {
        let columns = self.table_columns(table).await?;
        self.execute(&summary_query(table, &columns)).await
    }

    async fn count_duplicate_rows(&self, table: &str) -> Result<u64> {
        let columns = self.table_columns(table).await?;
        let group_by = columns
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "SELECT COUNT(*) AS {} FROM (SELECT COUNT(*) AS cnt FROM {} GROUP BY {} HAVING cnt > 1)",
            DUP_COUNT_COLUMN,
            quote_identifier(table),
            group_by
        );
        let rows = self.execute(&query).await?;
        Ok(extract_count(&rows, DUP_COUNT_COLUMN))
    }
}

/// One aggregate select per column, glued with `UNION ALL` and ordered by
/// column position.
fn summary_query(table: &str, columns: &[TableColumn]) -> String {
    let table = quote_identifier(table);
    let selects: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(ordinal, column)| {
            let ident = quote_identifier(&column.name);
            format!(
                "SELECT {ordinal} AS ordinal, {name} AS column_name, {ty} AS column_type, \
                 CASE WHEN COUNT(*) = 0 THEN 0.0 \
                 ELSE ROUND(100.0 * (COUNT(*) - COUNT({ident})) / COUNT(*), 2) END AS null_percentage, \
                 COUNT(DISTINCT {ident}) AS approx_unique, \
                 CAST(MIN({ident}) AS TEXT) AS \"min\", \
                 CAST(MAX({ident}) AS TEXT) AS \"max\" \
                 FROM {table}",
                name = quote_literal(&column.name),
                ty = quote_literal(&column.declared_type),
            )
        })
        .collect();

    format!("{} ORDER BY ordinal", selects.join(" UNION ALL "))
}

/// Maps an `sqlx` error to a query error carrying the database's message.
fn query_error(error: sqlx::Error) -> TableLensError {
    match &error {
        sqlx::Error::Database(db) => TableLensError::query_failed(db.message()),
        _ => TableLensError::query_failed(error.to_string()),
    }
}

fn convert_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .map(|column| (column.name().to_string(), extract_cell(row, column.ordinal())))
        .collect()
}

/// Extracts a cell by the value's storage class.
///
/// SQLite is dynamically typed, so the storage class of each value (not the
/// declared column type) decides the mapping.
fn extract_cell(row: &SqliteRow, index: usize) -> CellValue {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return CellValue::Null,
        Ok(raw) => raw.type_info().name().to_ascii_uppercase(),
        Err(_) => return CellValue::Null,
    };

    match type_name.as_str() {
        "INTEGER" => row
            .try_get::<i64, _>(index)
            .map(CellValue::from)
            .unwrap_or_else(|_| fallback_cell(row, index)),
        "REAL" => row
            .try_get::<f64, _>(index)
            .map(CellValue::Number)
            .unwrap_or_else(|_| fallback_cell(row, index)),
        "TEXT" => row
            .try_get::<String, _>(index)
            .map(CellValue::Text)
            .unwrap_or_else(|_| fallback_cell(row, index)),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|bytes| encode_blob(&bytes))
            .unwrap_or_else(|_| fallback_cell(row, index)),
        _ => fallback_cell(row, index),
    }
}

/// Tries each decodable type in order of likelihood.
fn fallback_cell(row: &SqliteRow, index: usize) -> CellValue {
    if let Ok(v) = row.try_get_unchecked::<Option<String>, _>(index) {
        return v.into();
    }
    if let Ok(v) = row.try_get_unchecked::<Option<i64>, _>(index) {
        return v.into();
    }
    if let Ok(v) = row.try_get_unchecked::<Option<f64>, _>(index) {
        return v.into();
    }
    if let Ok(v) = row.try_get_unchecked::<Option<Vec<u8>>, _>(index) {
        return v.map_or(CellValue::Null, |bytes| encode_blob(&bytes));
    }
    CellValue::Null
}

fn encode_blob(bytes: &[u8]) -> CellValue {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    CellValue::Text(format!("base64:{}", encoded))
}

fn is_memory_connection_string(connection_string: &str) -> bool {
    connection_string.contains(":memory:") || connection_string.contains("mode=memory")
}

/// Normalizes a connection string to SQLite URL format.
fn normalize_connection_string(connection_string: &str) -> String {
    if connection_string == ":memory:" {
        return "sqlite::memory:".to_string();
    }

    if connection_string.starts_with("sqlite:") {
        return connection_string.to_string();
    }

    // Convert file path to sqlite:// URL
    format!("sqlite://{}", connection_string)
}

/// Pool settings. An in-memory database lives only as long as its single
/// connection, so that connection is never retired.
fn pool_options(config: &ConnectionConfig, in_memory: bool) -> SqlitePoolOptions {
    let options = SqlitePoolOptions::new().acquire_timeout(config.connect_timeout);
    if in_memory {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options.max_connections(config.max_connections.max(1))
    }
}

/// Creates a SQLite pool with the given configuration.
async fn create_sqlite_pool(connection_string: &str, config: &ConnectionConfig) -> Result<SqlitePool> {
    let normalized = normalize_connection_string(connection_string);
    let in_memory = is_memory_connection_string(&normalized);

    let mut options = SqliteConnectOptions::from_str(&normalized).map_err(|e| {
        TableLensError::configuration(format!("Invalid SQLite connection string: {}", e))
    })?;

    // Each in-memory connection is its own database, so those stay writable
    // and single-connection.
    if config.read_only && !in_memory {
        options = options.read_only(true);
    }
    pool_options(config, in_memory)
        .connect_with(options)
        .await
        .map_err(|e| TableLensError::connection_failed("Failed to open SQLite database", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_connection_string() {
        assert_eq!(normalize_connection_string(":memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_connection_string("sqlite:///tmp/a.db"),
            "sqlite:///tmp/a.db"
        );
        assert_eq!(normalize_connection_string("./a.db"), "sqlite://./a.db");
    }

    #[test]
    fn test_in_memory_pool_never_retires_its_connection() {
        let config = ConnectionConfig::for_kind(EngineKind::Sqlite).with_max_connections(4);

        let memory = pool_options(&config, true);
        assert_eq!(memory.get_max_connections(), 1);
        assert_eq!(memory.get_idle_timeout(), None);
        assert_eq!(memory.get_max_lifetime(), None);

        let file = pool_options(&config, false);
        assert_eq!(file.get_max_connections(), 4);
    }

    #[test]
    fn test_summary_query_shape() {
        let columns = vec![
            TableColumn {
                name: "id".into(),
                declared_type: "INTEGER".into(),
            },
            TableColumn {
                name: "it's".into(),
                declared_type: "TEXT".into(),
            },
        ];
        let query = summary_query("t", &columns);

        assert!(query.starts_with("SELECT 0 AS ordinal, 'id' AS column_name, 'INTEGER' AS column_type"));
        assert!(query.contains(" UNION ALL SELECT 1 AS ordinal, 'it''s' AS column_name"));
        assert!(query.contains(r#"COUNT(DISTINCT "it's") AS approx_unique"#));
        assert!(query.ends_with("ORDER BY ordinal"));
    }

    #[test]
    fn test_blob_encoding() {
        assert_eq!(
            encode_blob(&[1, 2, 3]),
            CellValue::Text("base64:AQID".to_string())
        );
    }
}
