//! Query Builder Module - Predicates and a fluent SELECT builder

pub mod builder;
pub mod execution;
pub mod ordering;
pub mod pagination;
pub mod select;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use types::{OrderDirection, Predicate, QueryOperator, WhereCondition};
