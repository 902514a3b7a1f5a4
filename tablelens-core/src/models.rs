//! Row-set data model shared by the profiler and the query engines.
//!
//! Cell values are tagged once at ingestion so downstream statistics match
//! on a closed variant instead of re-inspecting raw values.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// A single cell of a result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// SQL NULL or JSON null
    Null,
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Text value (may be empty)
    Text(String),
}

impl CellValue {
    /// Returns true for values the profiler counts as missing.
    ///
    /// Null and empty text are missing. Whitespace-only text is present.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Renders the value as text for equality and frequency comparisons.
    ///
    /// Numbers use the shortest round-trip form, so `1.0` renders as `"1"`.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Coerces the value to a number.
    ///
    /// Text must parse completely (after trimming) as a finite decimal.
    /// Returns `None` for anything else, including NaN.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if !n.is_nan() => Some(*n),
            Self::Text(s) => parse_numeric_text(s),
            _ => None,
        }
    }

    /// Returns true when the value looks numeric to the type inferencer.
    ///
    /// Numbers always qualify; text qualifies when it is non-blank and
    /// parses fully as a number.
    pub fn looks_numeric(&self) -> bool {
        match self {
            Self::Number(_) => true,
            Self::Text(s) => parse_numeric_text(s).is_some(),
            _ => false,
        }
    }
}

impl From<&JsonValue> for CellValue {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            JsonValue::String(s) => Self::Text(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => Self::Text(value.to_string()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Parses trimmed text as a finite number.
pub(crate) fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    // -0.0 renders as "0" so that it groups with 0
    if n == 0.0 {
        return "0".to_string();
    }
    n.to_string()
}

/// One result row: ordered `(column, value)` cells.
///
/// Serializes as a JSON object in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a cell, replacing any existing cell with the same column.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        if let Some(cell) = self.cells.iter_mut().find(|(name, _)| *name == column) {
            cell.1 = value;
        } else {
            self.cells.push((column, value));
        }
    }

    /// Builder form of [`Row::push`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.push(column, value);
        self
    }

    /// Looks up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Looks up a cell, trying `position` first before scanning.
    ///
    /// Rows produced by a single query share one column order, so the
    /// positional lookup almost always hits.
    pub fn get_at(&self, position: usize, column: &str) -> Option<&CellValue> {
        match self.cells.get(position) {
            Some((name, value)) if name == column => Some(value),
            _ => self.get(column),
        }
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// Returns true when the row has a cell for `column`.
    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true when the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl From<&JsonValue> for Row {
    /// Non-object JSON values ingest as a row with no cells.
    fn from(value: &JsonValue) -> Self {
        match value.as_object() {
            Some(object) => Self {
                cells: object
                    .iter()
                    .map(|(key, value)| (key.clone(), CellValue::from(value)))
                    .collect(),
            },
            None => Self::default(),
        }
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.push(column, value);
        }
        row
    }
}

/// An ordered sequence of rows, as returned by a query engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RowSet {
    /// Rows in result order
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Creates a row set from rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Ingests a slice of JSON values (normally objects).
    pub fn from_json_rows(rows: &[JsonValue]) -> Self {
        Self {
            rows: rows.iter().map(Row::from).collect(),
        }
    }

    /// Ingests a JSON array of objects.
    ///
    /// A non-array value yields an empty row set.
    pub fn from_json(value: &JsonValue) -> Self {
        match value.as_array() {
            Some(rows) => Self::from_json_rows(rows),
            None => Self::default(),
        }
    }

    /// The canonical column list: the first row's keys, in order.
    pub fn column_names(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// First row, if any.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Row>> for RowSet {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_value_from_json() {
        assert_eq!(CellValue::from(&json!(null)), CellValue::Null);
        assert_eq!(CellValue::from(&json!(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from(&json!(42)), CellValue::Number(42.0));
        assert_eq!(CellValue::from(&json!("x")), CellValue::Text("x".into()));
        assert_eq!(
            CellValue::from(&json!([1, 2])),
            CellValue::Text("[1,2]".into())
        );
    }

    #[test]
    fn test_missing_values() {
        assert!(CellValue::Null.is_missing());
        assert!(CellValue::Text(String::new()).is_missing());
        assert!(!CellValue::Text("  ".into()).is_missing());
        assert!(!CellValue::Number(0.0).is_missing());
        assert!(!CellValue::Bool(false).is_missing());
    }

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Number(1.0).to_text(), "1");
        assert_eq!(CellValue::Number(1.5).to_text(), "1.5");
        assert_eq!(CellValue::Number(-0.0).to_text(), "0");
        assert_eq!(CellValue::Bool(false).to_text(), "false");
        assert_eq!(CellValue::Text("abc".into()).to_text(), "abc");
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(CellValue::Text(" 12.5 ".into()).as_number(), Some(12.5));
        assert_eq!(CellValue::Text("1e3".into()).as_number(), Some(1000.0));
        assert_eq!(CellValue::Text("12abc".into()).as_number(), None);
        assert_eq!(CellValue::Text("   ".into()).as_number(), None);
        assert_eq!(CellValue::Text("NaN".into()).as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_looks_numeric() {
        assert!(CellValue::Number(3.0).looks_numeric());
        assert!(CellValue::Text("3".into()).looks_numeric());
        assert!(!CellValue::Text(" ".into()).looks_numeric());
        assert!(!CellValue::Bool(true).looks_numeric());
    }

    #[test]
    fn test_row_preserves_key_order() {
        let row = Row::from(&json!({"zeta": 1, "alpha": 2, "mid": 3}));
        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_row_get_at_falls_back_to_scan() {
        let row = Row::new().with("a", 1.0).with("b", "x");
        assert_eq!(row.get_at(1, "b"), Some(&CellValue::Text("x".into())));
        assert_eq!(row.get_at(0, "b"), Some(&CellValue::Text("x".into())));
        assert_eq!(row.get_at(5, "missing"), None);
    }

    #[test]
    fn test_row_push_replaces_existing_column() {
        let mut row = Row::new().with("a", 1.0);
        row.push("a", 2.0);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("a"), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_non_object_row_is_empty() {
        let rows = RowSet::from_json(&json!([[1, 2, 3], {"a": 1}]));
        assert_eq!(rows.len(), 2);
        assert!(rows.rows[0].is_empty());
        assert!(rows.column_names().is_empty());
    }

    #[test]
    fn test_non_array_json_is_empty_row_set() {
        let rows = RowSet::from_json(&json!({"a": 1}));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_row_serializes_as_object() {
        let rows = RowSet::new(vec![Row::new().with("b", 2.0).with("a", Option::<f64>::None)]);
        let json = serde_json::to_string(&rows).unwrap();
        assert_eq!(json, r#"[{"b":2.0,"a":null}]"#);
    }

    #[test]
    fn test_column_names_from_first_row() {
        let rows = RowSet::from_json(&json!([
            {"id": 1, "name": "a"},
            {"id": 2, "name": "b", "extra": true}
        ]));
        assert_eq!(rows.column_names(), vec!["id", "name"]);
    }
}
