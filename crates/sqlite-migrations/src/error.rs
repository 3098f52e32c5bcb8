//! Error types for migration SQL generation.

/// Errors that can occur while generating migration SQL.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// An operation that needs a table rebuild reached the SQL generator.
    ///
    /// This happens when no target model was available, so the rebuild could
    /// not be planned.
    #[error(
        "SQLite does not support this migration operation ('{operation}'). \
         The table must be rebuilt, which requires the target model"
    )]
    UnsupportedOperation {
        /// Kind of the rejected operation.
        operation: &'static str,
    },

    /// SQLite lacks the feature the operation relies on.
    #[error("SQLite does not support {feature} ('{operation}')")]
    UnsupportedFeature {
        /// The missing feature.
        feature: &'static str,
        /// Kind of the rejected operation.
        operation: &'static str,
    },

    /// The operation is malformed.
    #[error("Invalid migration operation: {0}")]
    InvalidOperation(String),

    /// IO error (reading configuration or migration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MigrateError {
    /// Returns the kind of the operation this error was raised for, if any.
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedOperation { operation }
            | Self::UnsupportedFeature { operation, .. } => Some(operation),
            _ => None,
        }
    }
}

/// Result type for migration SQL generation.
pub type Result<T> = std::result::Result<T, MigrateError>;
