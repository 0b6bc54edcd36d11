//! Query Builder Types - Core types and enums for query building

use std::fmt;

use crate::backends::DatabaseValue;

/// Query operator types
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Equal,
    In,
    IsNull,
    IsNotNull,
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperator::Equal => write!(f, "="),
            QueryOperator::In => write!(f, "IN"),
            QueryOperator::IsNull => write!(f, "IS NULL"),
            QueryOperator::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// Single-column condition
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub column: String,
    pub operator: QueryOperator,
    pub value: Option<DatabaseValue>,
    pub values: Vec<DatabaseValue>, // For IN
}

/// Boolean filter over one or more columns
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Condition(WhereCondition),
    /// All of the inner predicates hold; an empty group is always true
    And(Vec<Predicate>),
    /// Any of the inner predicates holds; an empty group is always false
    Or(Vec<Predicate>),
}

impl Predicate {
    /// `column = value`
    pub fn eq<T: Into<DatabaseValue>>(column: &str, value: T) -> Self {
        Predicate::Condition(WhereCondition {
            column: column.to_string(),
            operator: QueryOperator::Equal,
            value: Some(value.into()),
            values: Vec::new(),
        })
    }

    /// `column IN (values...)`, order preserved
    pub fn in_list<T, I>(column: &str, values: I) -> Self
    where
        T: Into<DatabaseValue>,
        I: IntoIterator<Item = T>,
    {
        Predicate::Condition(WhereCondition {
            column: column.to_string(),
            operator: QueryOperator::In,
            value: None,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// `column IS NULL` or `column IS NOT NULL`
    pub fn null_check(column: &str, is_null: bool) -> Self {
        Predicate::Condition(WhereCondition {
            column: column.to_string(),
            operator: if is_null {
                QueryOperator::IsNull
            } else {
                QueryOperator::IsNotNull
            },
            value: None,
            values: Vec::new(),
        })
    }

    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And(predicates)
    }

    pub fn or(predicates: Vec<Predicate>) -> Self {
        Predicate::Or(predicates)
    }

    /// Number of single-column conditions in this tree
    pub fn condition_count(&self) -> usize {
        match self {
            Predicate::Condition(_) => 1,
            Predicate::And(inner) | Predicate::Or(inner) => {
                inner.iter().map(Predicate::condition_count).sum()
            }
        }
    }
}

impl From<WhereCondition> for Predicate {
    fn from(condition: WhereCondition) -> Self {
        Predicate::Condition(condition)
    }
}

/// Order by direction
#[derive(Debug, Clone, PartialEq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}
