//! Common error types for primitives

use thiserror::Error;

/// Primitive parsing or conversion error
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Entity id string or message is malformed
    #[error("invalid entity id: {0}")]
    InvalidEntityId(String),

    /// Transaction id string or message is malformed
    #[error("invalid transaction id: {0}")]
    InvalidTransactionId(String),

    /// Timestamp does not fit in nanoseconds since the epoch
    #[error("timestamp out of range: {0}")]
    InvalidTimestamp(String),

    /// Protobuf message lacks a required field
    #[error("missing protobuf field: {0}")]
    MissingField(&'static str),
}

/// Result alias for primitive operations
pub type PrimitiveResult<T> = Result<T, PrimitiveError>;
