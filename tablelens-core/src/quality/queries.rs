//! The three query shapes issued per assessment.

/// Column holding the row count in [`row_count_query`] results.
pub const TOTAL_ROWS_COLUMN: &str = "total_rows";

/// Column holding the duplicate count in [`duplicate_count_query`] results.
pub const DUP_COUNT_COLUMN: &str = "dup_count";

/// Quotes a name as a standard SQL identifier.
///
/// Embedded double quotes are doubled; no other sanitization is applied.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes text as a SQL string literal.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Engine-native column summarization.
pub fn summarize_query(table: &str) -> String {
    format!("SUMMARIZE {}", quote_identifier(table))
}

/// Total row count.
pub fn row_count_query(table: &str) -> String {
    format!(
        "SELECT COUNT(*) AS {} FROM {}",
        TOTAL_ROWS_COLUMN,
        quote_identifier(table)
    )
}

/// Number of distinct row values that occur more than once.
pub fn duplicate_count_query(table: &str) -> String {
    format!(
        "SELECT COUNT(*) AS {} FROM (SELECT *, COUNT(*) AS cnt FROM {} GROUP BY ALL HAVING cnt > 1)",
        DUP_COUNT_COLUMN,
        quote_identifier(table)
    )
}
