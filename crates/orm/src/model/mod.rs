//! Model System - Models and their composite keys
//!
//! - `core_trait`: Core Model trait definition
//! - `hash_key`: Composite key shapes and values
//! - `key_input`: Inputs accepted in place of a key
//! - `keyed`: Key normalization, predicates and batched lookups

pub mod core_trait;
pub mod hash_key;
pub mod key_input;
pub mod keyed;

// Re-export main types and traits for convenience
pub use core_trait::Model;
pub use hash_key::{HashKey, KeyShape, KeyValue};
pub use key_input::{KeyInput, KeySource};
pub use keyed::{HashKeyed, KeyedAccess};
