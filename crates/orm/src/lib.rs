//! # keyed-orm: Composite-key lookups over a query builder
//!
//! Models declare a composite key shape; this crate turns keys, field maps
//! and related records into equality predicates, single-row lookups and
//! batched multi-key queries that run on a caller-owned connection.
//!
//! ```ignore
//! let access = KeyedAccess::<Cell>::new();
//! let cell = access.get_key(&mut conn, Some(key.into())).await?;
//! let cells = access.get_keys(&mut conn, keys, |q| q.order_by("cid")).await?;
//! ```

pub mod backends;
pub mod config;
pub mod error;
pub mod model;
pub mod query;


// Re-export core traits and types
pub use backends::{
    DatabaseConnection, DatabaseRow, DatabaseRowExt, DatabaseValue, PostgresConnection, PostgresRow,
};
pub use config::*;
pub use error::*;
pub use model::*;
pub use query::*;
