//! PostgreSQL Backend Implementation
//!
//! Runs keyed queries through sqlx, binding [`DatabaseValue`] parameters in
//! placeholder order.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Pool, Postgres, Row as SqlxRow, TypeInfo, ValueRef};

use super::core::{DatabaseConnection, DatabaseRow, DatabaseValue};
use crate::error::{ModelError, OrmResult};

/// PostgreSQL connection implementation
pub struct PostgresConnection {
    conn: sqlx::pool::PoolConnection<Postgres>,
}

impl PostgresConnection {
    pub fn new(conn: sqlx::pool::PoolConnection<Postgres>) -> Self {
        Self { conn }
    }

    /// Acquire a connection from a sqlx pool
    pub async fn acquire(pool: &Pool<Postgres>) -> OrmResult<Self> {
        let conn = pool.acquire().await.map_err(|e| {
            tracing::error!("Failed to acquire database connection: {}", e);
            ModelError::Database(format!("Failed to acquire connection: {}", e))
        })?;
        tracing::debug!(
            "Database connection acquired (size: {}, idle: {})",
            pool.size(),
            pool.num_idle()
        );
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl DatabaseConnection for PostgresConnection {
    async fn fetch_all(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Vec<Box<dyn DatabaseRow>>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let rows = query
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| ModelError::Database(format!("Query fetch failed: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| Box::new(PostgresRow::new(row)) as Box<dyn DatabaseRow>)
            .collect())
    }

    async fn fetch_optional(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
    ) -> OrmResult<Option<Box<dyn DatabaseRow>>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_database_value(query, param);
        }

        let row = query
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| ModelError::Database(format!("Query fetch failed: {}", e)))?;

        Ok(row.map(|r| Box::new(PostgresRow::new(r)) as Box<dyn DatabaseRow>))
    }
}

/// PostgreSQL row implementation
pub struct PostgresRow {
    row: PgRow,
}

impl PostgresRow {
    pub fn new(row: PgRow) -> Self {
        Self { row }
    }
}

impl DatabaseRow for PostgresRow {
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
        if index >= self.row.len() {
            return Err(ModelError::ColumnNotFound(format!("#{}", index)));
        }
        postgres_value_to_database_value(&self.row, index)
    }

    fn get_by_name(&self, name: &str) -> OrmResult<DatabaseValue> {
        let index = self
            .row
            .columns()
            .iter()
            .position(|col| col.name() == name)
            .ok_or_else(|| ModelError::ColumnNotFound(name.to_string()))?;

        postgres_value_to_database_value(&self.row, index)
    }

    fn column_count(&self) -> usize {
        self.row.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.row
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect()
    }
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'a>(
    query: Query<'a, Postgres, PgArguments>,
    value: &DatabaseValue,
) -> Query<'a, Postgres, PgArguments> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int32(i) => query.bind(*i),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::DateTime(dt) => query.bind(*dt),
        DatabaseValue::Json(j) => query.bind(j.clone()),
    }
}

fn column_error(type_name: &str, e: sqlx::Error) -> ModelError {
    ModelError::Serialization(format!("Failed to decode {} value: {}", type_name, e))
}

/// Convert a PostgreSQL column value to DatabaseValue
fn postgres_value_to_database_value(row: &PgRow, index: usize) -> OrmResult<DatabaseValue> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| ModelError::ColumnNotFound(e.to_string()))?;
    if raw.is_null() {
        return Ok(DatabaseValue::Null);
    }

    let type_name = row.columns()[index].type_info().name().to_string();
    let value = match type_name.as_str() {
        "BOOL" => DatabaseValue::Bool(
            row.try_get(index)
                .map_err(|e| column_error(&type_name, e))?,
        ),
        "INT2" => {
            let value: i16 = row
                .try_get(index)
                .map_err(|e| column_error(&type_name, e))?;
            DatabaseValue::Int32(value as i32)
        }
        "INT4" => DatabaseValue::Int32(
            row.try_get(index)
                .map_err(|e| column_error(&type_name, e))?,
        ),
        "INT8" => DatabaseValue::Int64(
            row.try_get(index)
                .map_err(|e| column_error(&type_name, e))?,
        ),
        "FLOAT4" => {
            let value: f32 = row
                .try_get(index)
                .map_err(|e| column_error(&type_name, e))?;
            DatabaseValue::Float64(value as f64)
        }
        "FLOAT8" => DatabaseValue::Float64(
            row.try_get(index)
                .map_err(|e| column_error(&type_name, e))?,
        ),
        "BYTEA" => DatabaseValue::Bytes(
            row.try_get(index)
                .map_err(|e| column_error(&type_name, e))?,
        ),
        "TIMESTAMPTZ" => DatabaseValue::DateTime(
            row.try_get(index)
                .map_err(|e| column_error(&type_name, e))?,
        ),
        "TIMESTAMP" => {
            let value: chrono::NaiveDateTime = row
                .try_get(index)
                .map_err(|e| column_error(&type_name, e))?;
            DatabaseValue::DateTime(value.and_utc())
        }
        "JSON" | "JSONB" => {
            let value: JsonValue = row
                .try_get(index)
                .map_err(|e| column_error(&type_name, e))?;
            DatabaseValue::Json(value)
        }
        _ => DatabaseValue::String(
            row.try_get(index)
                .map_err(|e| column_error(&type_name, e))?,
        ),
    };

    Ok(value)
}
