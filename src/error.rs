use thiserror::Error;

/// Main error type for query compilation
///
/// Only collaborator faults and broken invariants surface here. Unauthorized
/// fields and malformed query text degrade to literal terms instead.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Analysis error on field {field}: {message}")]
    Analysis { field: String, message: String },

    #[error("Field catalog error: {0}")]
    Catalog(String),

    #[error("Invalid boost {boost} for field {field}: boosts must be finite and positive")]
    InvalidBoost { field: String, boost: f32 },

    #[error("Field {field} is already resolved with a different definition")]
    ConflictingDefinition { field: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for query compilation
pub type Result<T> = std::result::Result<T, QueryError>;

impl QueryError {
    /// Build an analysis error for a field
    pub fn analysis(field: impl Into<String>, message: impl Into<String>) -> Self {
        QueryError::Analysis {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Check if this error was caused by configuration the caller supplied
    /// rather than by a failing collaborator
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            QueryError::InvalidBoost { .. } | QueryError::InvalidConfig(_) | QueryError::Json(_)
        )
    }
}
