//! Database Backend Abstractions
//!
//! Keyed queries are handed to a [`DatabaseConnection`]; the storage engine
//! behind it is opaque to the rest of the crate.

pub mod core;
pub mod postgres;

// Re-export core traits and types
pub use core::*;
pub use postgres::{PostgresConnection, PostgresRow};
