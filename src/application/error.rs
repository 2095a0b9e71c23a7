//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("invalid document: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Forest nests deeper than the JSON reader accepts back.
    #[error("forest too deep: {depth} levels, at most {limit} can be stored")]
    TooDeep { depth: usize, limit: usize },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
