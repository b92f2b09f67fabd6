use thiserror::Error;

/// Errors surfaced by query construction and by table backends.
///
/// Construction errors (`MissingKeyCondition`, `InvalidKeyCondition`,
/// `InvalidRequest`) are raised before anything is sent. Everything else is
/// reported by the backend and passed through without retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Key condition is required")]
    MissingKeyCondition,
    #[error("Invalid key condition: {0}")]
    InvalidKeyCondition(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Table not found: {table} ({message})")]
    TableNotFound { table: String, message: String },
    #[error("Throttled: {0}")]
    Throttled(String),
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Service error: {0}")]
    Service(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
