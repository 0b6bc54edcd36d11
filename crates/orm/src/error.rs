//! Error types for the keyed ORM layer
//!
//! Key normalization and query construction fail fast with local validation
//! errors; storage errors are carried through unchanged.

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// ORM error type alias
pub type OrmError = ModelError;

/// ORM result type alias
pub type OrmResult<T> = ModelResult<T>;

/// Error types for keyed model operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Input could not be shaped into a composite key
    #[error("Invalid key input: {0}")]
    InvalidKeyInput(String),

    /// A single key constrained no field at all
    #[error("Key for table '{0}' has no set fields")]
    EmptyKey(String),

    /// A batch operation received no keys
    #[error("Empty key collection for table '{0}'")]
    EmptyKeys(String),

    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(String),

    /// Column missing from a result row
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Row hydration failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ModelError {
    /// Whether this error was raised before any query reached the database
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            ModelError::InvalidKeyInput(_) | ModelError::EmptyKey(_) | ModelError::EmptyKeys(_)
        )
    }
}

// Convert from sqlx errors
impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        ModelError::Database(err.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ModelError::EmptyKey("cell".to_string()).to_string(),
            "Key for table 'cell' has no set fields"
        );
        assert_eq!(
            ModelError::EmptyKeys("wifi".to_string()).to_string(),
            "Empty key collection for table 'wifi'"
        );
        assert!(ModelError::InvalidKeyInput("bare scalar".to_string())
            .to_string()
            .contains("bare scalar"));
    }

    #[test]
    fn test_key_errors_are_classified() {
        assert!(ModelError::EmptyKeys("cell".to_string()).is_key_error());
        assert!(ModelError::InvalidKeyInput(String::new()).is_key_error());
        assert!(!ModelError::Database("boom".to_string()).is_key_error());
    }
}
