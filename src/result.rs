use crate::structure::{Record, Value};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Run metadata attached to every statement result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    /// Milliseconds spent executing, from a monotonic clock.
    pub duration: f64,
    pub served_by: String,
    pub changes: usize,
    pub last_row_id: i64,
    pub rows_read: usize,
    pub rows_written: usize,
}

/// A result row keyed by column name, in declared column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(Vec<(String, Value)>);

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, &value.to_json())?;
        }
        map.end()
    }
}

/// The `all()` shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct D1Response {
    pub results: Vec<Row>,
    pub meta: Meta,
    pub success: bool,
}

/// Rows produced by one statement plus the labels they were declared with.
/// Every view below is computed from this, nothing is executed again.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Record>,
    meta: Meta,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Record>, meta: Meta) -> Self {
        Self {
            columns,
            rows,
            meta,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn to_row(&self, record: &Record) -> Row {
        Row(self
            .columns
            .iter()
            .cloned()
            .zip(record.0.iter().cloned())
            .collect())
    }

    pub fn all(&self) -> D1Response {
        D1Response {
            results: self.rows.iter().map(|record| self.to_row(record)).collect(),
            meta: self.meta.clone(),
            success: true,
        }
    }

    /// Same rows as `all()`, positional and without column names.
    pub fn raw(&self) -> Vec<Vec<Value>> {
        self.rows.iter().map(|record| record.0.clone()).collect()
    }

    /// First row, or `None` when nothing matched.
    pub fn first(&self) -> Option<Row> {
        self.rows.first().map(|record| self.to_row(record))
    }

    /// One column of the first row. `None` when there is no row or no
    /// such column.
    pub fn first_column(&self, column: &str) -> Option<Value> {
        let idx = self.columns.iter().position(|name| name == column)?;

        self.rows
            .first()
            .and_then(|record| record.0.get(idx))
            .cloned()
    }
}

/// Outcome of running a script.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExecResult {
    pub count: usize,
    pub duration: f64,
}
