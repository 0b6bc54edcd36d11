//! Core Model Trait - Base definition for database entities

use std::fmt::Debug;

use crate::backends::DatabaseRow;
use crate::error::ModelResult;
use crate::query::QueryBuilder;

/// Core trait for database models
pub trait Model: Send + Sync + Debug + Sized {
    /// Table name for this model
    fn table_name() -> &'static str;

    /// Create a model instance from a database row
    fn from_database_row(row: &dyn DatabaseRow) -> ModelResult<Self>;

    /// Get a query builder for this model
    fn query() -> QueryBuilder<Self> {
        QueryBuilder::new().from(Self::table_name())
    }
}
