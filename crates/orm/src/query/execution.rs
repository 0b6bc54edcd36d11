//! Query Builder execution for Model types

use super::builder::QueryBuilder;
use crate::backends::DatabaseConnection;
use crate::error::ModelResult;
use crate::model::Model;

// Implement specialized methods for Model-typed query builders
impl<M: Model> QueryBuilder<M> {
    /// Execute query and return models
    pub async fn get<C>(self, conn: &mut C) -> ModelResult<Vec<M>>
    where
        C: DatabaseConnection + ?Sized,
    {
        let (sql, params) = self.to_sql_with_params();
        tracing::trace!("{} ({} params)", sql, params.len());

        let rows = conn.fetch_all(&sql, &params).await?;

        let mut models = Vec::with_capacity(rows.len());
        for row in rows {
            models.push(M::from_database_row(row.as_ref())?);
        }

        Ok(models)
    }

    /// Execute query and return first model
    pub async fn first<C>(self, conn: &mut C) -> ModelResult<Option<M>>
    where
        C: DatabaseConnection + ?Sized,
    {
        let (sql, params) = self.limit(1).to_sql_with_params();
        tracing::trace!("{} ({} params)", sql, params.len());

        match conn.fetch_optional(&sql, &params).await? {
            Some(row) => Ok(Some(M::from_database_row(row.as_ref())?)),
            None => Ok(None),
        }
    }
}
