use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;

/// A single scalar stored in a table cell, bound to a placeholder or
/// produced by a select.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Equality as used by `WHERE col = ?`. Null never matches anything,
    /// itself included.
    pub fn sql_eq(&self, other: &Value) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }

        self == other
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Null => "null",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Real(r) => serde_json::Number::from_f64(*r)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(text) => serde_json::Value::String(text.to_owned()),
            Self::Null => serde_json::Value::Null,
        }
    }

    // null < numbers < text, same as sqlite's storage class order
    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Integer(_) | Self::Real(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Integer(a), Self::Real(b)) | (Self::Real(b), Self::Integer(a)) => {
                (*a as f64) == *b
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Null, Self::Null) => true,
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.partial_cmp(b),
            (Self::Real(a), Self::Real(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Real(b)) => (*a as f64).partial_cmp(b),
            (Self::Real(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            _ => self.rank().partial_cmp(&other.rank()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Value::Null => write!(f, "NULL"),
            Value::Text(value) => write!(f, "{}", value),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One stored row. Always as long as its table's column list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Record(pub Vec<Value>);

impl Record {
    pub fn get_with(&self, idxs: &[usize]) -> Vec<Value> {
        idxs.iter()
            .filter_map(|idx| self.0.get(*idx).cloned())
            .collect::<Vec<Value>>()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Column affinity derived from the declared type name.
#[derive(Debug, PartialEq, Clone, Copy, Deserialize, Serialize)]
pub enum DataType {
    Integer,
    Real,
    Text,
    Any,
}

impl DataType {
    fn match_str(value: &str) -> DataType {
        if value.contains("int") {
            Self::Integer
        } else if value.contains("char") || value.contains("clob") || value.contains("text") {
            Self::Text
        } else if value.contains("real") || value.contains("floa") || value.contains("doub") {
            Self::Real
        } else {
            Self::Any
        }
    }

    /// Coerce `value` into this column kind, or `None` when the kind is
    /// rejected. Null passes through; the caller checks nullability.
    pub fn accept(&self, value: Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null) => Some(Value::Null),
            (Self::Any, v) => Some(v),
            (Self::Integer, Value::Integer(i)) => Some(Value::Integer(i)),
            (Self::Integer, Value::Real(r))
                if r.fract() == 0.0 && r >= i64::MIN as f64 && r < i64::MAX as f64 =>
            {
                Some(Value::Integer(r as i64))
            }
            (Self::Real, Value::Real(r)) => Some(Value::Real(r)),
            (Self::Real, Value::Integer(i)) => Some(Value::Real(i as f64)),
            (Self::Text, Value::Text(t)) => Some(Value::Text(t)),
            _ => None,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
            Self::Any => "any",
        };

        write!(f, "{}", result)
    }
}

impl From<&str> for DataType {
    fn from(value: &str) -> Self {
        DataType::match_str(&value.to_lowercase())
    }
}

impl From<&String> for DataType {
    fn from(value: &String) -> Self {
        DataType::match_str(&value.to_lowercase())
    }
}

#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
pub struct Col {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default_value: Option<Value>,
}

impl Col {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            unique: false,
            default_value: None,
        }
    }
}

/// Table schema. `primary_key` is the index of the auto-increment key, if any.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Table {
    pub table: String,
    pub cols: Vec<Col>,
    pub primary_key: Option<usize>,
}

impl Table {
    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.cols.iter().position(|col| col.name == name)
    }

    pub fn col_names(&self) -> Vec<String> {
        self.cols.iter().map(|col| col.name.clone()).collect()
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "==== {} ====\n{}",
            self.table,
            self.cols
                .iter()
                .map(|x| match x.primary_key {
                    true => format!("{}: {} (pk)", x.name, x.data_type),
                    false => format!("{}: {}", x.name, x.data_type),
                })
                .collect::<Vec<String>>()
                .join("|")
        )
    }
}
