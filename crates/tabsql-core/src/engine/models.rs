//! Result data structures returned by the engine

use serde::Serialize;
use serde::ser::SerializeMap;
use std::fmt;

/// Column metadata: name plus the engine's declared type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A nullable scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interpret the value as a non-negative row count.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Value::Integer(n) => u64::try_from(*n).ok(),
            Value::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as u64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

/// One result row, positionally aligned with [`QueryResult::columns`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Look up a cell by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.values.get(idx)
    }

    /// Collect one column as display strings, skipping nulls.
    pub fn column_strings(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.values.get(idx))
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .collect()
    }

    /// Rows as JSON objects keyed by column name.
    pub fn records(&self) -> Vec<RowRecord<'_>> {
        self.rows
            .iter()
            .map(|row| RowRecord {
                columns: &self.columns,
                row,
            })
            .collect()
    }
}

/// Serializes a row as an object keyed by column name.
pub struct RowRecord<'a> {
    columns: &'a [Column],
    row: &'a Row,
}

impl Serialize for RowRecord<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.row.values.iter()) {
            map.serialize_entry(&column.name, value)?;
        }
        map.end()
    }
}

impl Serialize for QueryResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("columns", &self.columns)?;
        map.serialize_entry("rows", &self.records())?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        QueryResult::new(
            vec![Column::new("id", "Int64"), Column::new("name", "Utf8")],
            vec![
                Row::new(vec![Value::Integer(1), Value::from("alice")]),
                Row::new(vec![Value::Integer(2), Value::Null]),
            ],
        )
    }

    #[test]
    fn test_value_lookup_by_column_name() {
        let result = sample();
        assert_eq!(result.value(0, "name"), Some(&Value::from("alice")));
        assert_eq!(result.value(1, "name"), Some(&Value::Null));
        assert_eq!(result.value(0, "missing"), None);
        assert_eq!(result.value(5, "id"), None);
    }

    #[test]
    fn test_null_displays_as_marker() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from("").to_string(), "");
        assert!(!Value::from("").is_null());
    }

    #[test]
    fn test_as_count() {
        assert_eq!(Value::Integer(237).as_count(), Some(237));
        assert_eq!(Value::Integer(-1).as_count(), None);
        assert_eq!(Value::from("12").as_count(), Some(12));
        assert_eq!(Value::Null.as_count(), None);
    }

    #[test]
    fn test_column_strings_skip_nulls() {
        assert_eq!(sample().column_strings("name"), vec!["alice".to_string()]);
    }

    #[test]
    fn test_serialize_as_records() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["rows"][0]["name"], "alice");
        assert!(json["rows"][1]["name"].is_null());
        assert_eq!(json["columns"][0]["data_type"], "Int64");
    }
}
