//! Query Builder WHERE clause operations

use super::builder::QueryBuilder;
use super::types::*;
use crate::backends::DatabaseValue;

impl<M> QueryBuilder<M> {
    /// Add a predicate; all predicates of a query are AND-ed together
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.where_conditions.push(predicate);
        self
    }

    /// Add several predicates at once
    pub fn filter_all<I>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        self.where_conditions.extend(predicates);
        self
    }

    /// Add WHERE condition with equality
    pub fn where_eq<T: Into<DatabaseValue>>(self, column: &str, value: T) -> Self {
        self.filter(Predicate::eq(column, value))
    }

    /// Add WHERE condition with IN
    pub fn where_in<T: Into<DatabaseValue>>(self, column: &str, values: Vec<T>) -> Self {
        self.filter(Predicate::in_list(column, values))
    }

    /// Add WHERE condition with IS NOT NULL
    pub fn where_not_null(self, column: &str) -> Self {
        self.filter(Predicate::null_check(column, false))
    }
}
