//! Core Database Backend Traits
//!
//! The minimal surface the keyed layer needs from a storage engine: run a
//! parameterised SELECT and hand back rows.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{ModelError, OrmResult};

/// Abstract database connection trait
///
/// Implementations are used from a single task at a time; the caller owns
/// acquisition and release.
#[async_trait]
pub trait DatabaseConnection: Send {
    /// Execute a query and return the result rows
    async fn fetch_all(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Vec<Box<dyn DatabaseRow>>>;

    /// Execute a query and return the first result row
    async fn fetch_optional(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Option<Box<dyn DatabaseRow>>>;
}

/// Abstract database row trait
pub trait DatabaseRow: Send + Sync {
    /// Get a column value by index
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue>;

    /// Get a column value by name
    fn get_by_name(&self, name: &str) -> OrmResult<DatabaseValue>;

    /// Get column count
    fn column_count(&self) -> usize;

    /// Get column names
    fn column_names(&self) -> Vec<String>;

    /// Convert row to HashMap
    fn to_map(&self) -> OrmResult<HashMap<String, DatabaseValue>> {
        let mut map = HashMap::new();
        for (index, name) in self.column_names().into_iter().enumerate() {
            let value = self.get_by_index(index)?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

/// Extension trait for DatabaseRow to support typed column access for models
pub trait DatabaseRowExt {
    /// Get a typed value from a column
    fn get<T>(&self, column: &str) -> Result<T, ModelError>
    where
        T: for<'de> serde::Deserialize<'de>;

    /// Try to get an optional typed value from a column
    fn try_get<T>(&self, column: &str) -> Result<Option<T>, ModelError>
    where
        T: for<'de> serde::Deserialize<'de>;
}

impl<R: DatabaseRow + ?Sized> DatabaseRowExt for R {
    fn get<T>(&self, column: &str) -> Result<T, ModelError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let db_value = self.get_by_name(column)?;
        serde_json::from_value(db_value.to_json()).map_err(|e| {
            ModelError::Serialization(format!("Failed to deserialize column '{}': {}", column, e))
        })
    }

    fn try_get<T>(&self, column: &str) -> Result<Option<T>, ModelError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        match self.get_by_name(column) {
            Ok(db_value) if db_value.is_null() => Ok(None),
            Ok(db_value) => serde_json::from_value(db_value.to_json())
                .map(Some)
                .map_err(|e| {
                    ModelError::Serialization(format!(
                        "Failed to deserialize column '{}': {}",
                        column, e
                    ))
                }),
            Err(ModelError::ColumnNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Database value enumeration for type-safe parameter binding
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    DateTime(chrono::DateTime<chrono::Utc>),
    Json(JsonValue),
}

impl DatabaseValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int32(i) => JsonValue::Number(serde_json::Number::from(*i)),
            DatabaseValue::Int64(i) => JsonValue::Number(serde_json::Number::from(*i)),
            DatabaseValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::Bytes(b) => JsonValue::Array(
                b.iter()
                    .map(|&x| JsonValue::Number(serde_json::Number::from(x)))
                    .collect(),
            ),
            DatabaseValue::DateTime(dt) => JsonValue::String(dt.to_rfc3339()),
            DatabaseValue::Json(j) => j.clone(),
        }
    }
}

impl std::fmt::Display for DatabaseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseValue::Null => write!(f, "NULL"),
            DatabaseValue::Bool(b) => write!(f, "{}", b),
            DatabaseValue::Int32(i) => write!(f, "{}", i),
            DatabaseValue::Int64(i) => write!(f, "{}", i),
            DatabaseValue::Float64(v) => write!(f, "{}", v),
            DatabaseValue::String(s) => write!(f, "'{}'", s),
            DatabaseValue::Bytes(b) => write!(f, "'\\x{}'", hex::encode(b)),
            DatabaseValue::DateTime(dt) => write!(f, "'{}'", dt.to_rfc3339()),
            DatabaseValue::Json(j) => write!(f, "{}", j),
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Bool(value)
    }
}

impl From<i32> for DatabaseValue {
    fn from(value: i32) -> Self {
        DatabaseValue::Int32(value)
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Int64(value)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float64(value)
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::String(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::String(value.to_string())
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(value: Vec<u8>) -> Self {
        DatabaseValue::Bytes(value)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for DatabaseValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        DatabaseValue::DateTime(value)
    }
}

impl From<JsonValue> for DatabaseValue {
    fn from(value: JsonValue) -> Self {
        DatabaseValue::Json(value)
    }
}

impl<T> From<Option<T>> for DatabaseValue
where
    T: Into<DatabaseValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DatabaseValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MapRow {
        columns: Vec<(String, DatabaseValue)>,
    }

    impl DatabaseRow for MapRow {
        fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
            self.columns
                .get(index)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| ModelError::ColumnNotFound(format!("#{}", index)))
        }

        fn get_by_name(&self, name: &str) -> OrmResult<DatabaseValue> {
            self.columns
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| ModelError::ColumnNotFound(name.to_string()))
        }

        fn column_count(&self) -> usize {
            self.columns.len()
        }

        fn column_names(&self) -> Vec<String> {
            self.columns.iter().map(|(n, _)| n.clone()).collect()
        }
    }

    #[test]
    fn test_typed_column_access() {
        let row = MapRow {
            columns: vec![
                ("radio".to_string(), DatabaseValue::from("gsm")),
                ("cid".to_string(), DatabaseValue::Int64(42)),
                ("psc".to_string(), DatabaseValue::Null),
            ],
        };

        let radio: String = row.get("radio").unwrap();
        let cid: i64 = row.get("cid").unwrap();
        let psc: Option<i32> = row.try_get("psc").unwrap();
        let missing: Option<i32> = row.try_get("lat").unwrap();

        assert_eq!(radio, "gsm");
        assert_eq!(cid, 42);
        assert_eq!(psc, None);
        assert_eq!(missing, None);
        assert!(row.get::<i64>("radio").is_err());
        assert_eq!(row.to_map().unwrap().len(), 3);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(DatabaseValue::from(Some(3i64)), DatabaseValue::Int64(3));
        assert_eq!(DatabaseValue::from(None::<i64>), DatabaseValue::Null);
        assert_eq!(DatabaseValue::Bytes(vec![0xab, 0x01]).to_string(), "'\\xab01'");
        assert_eq!(
            DatabaseValue::Bytes(vec![1, 2]).to_json(),
            serde_json::json!([1, 2])
        );
    }
}
