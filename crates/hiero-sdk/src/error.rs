//! SDK error types

use std::time::Duration;

use hiero_primitives::TransactionId;
use thiserror::Error;

use crate::Status;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    // ==================== Validation ====================

    /// A field setter ran after the request was frozen
    #[error("request is frozen and can no longer be modified")]
    Frozen,

    /// The operation needs a frozen request
    #[error("request must be frozen first")]
    NotFrozen,

    /// A required field is not set
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The payload needs more chunks than allowed
    #[error("payload needs {required} chunks but at most {max} are allowed")]
    TooManyChunks {
        /// Chunks needed for the payload
        required: usize,
        /// Allowed maximum
        max: usize,
    },

    /// Manual signatures and single hashes are meaningless across several chunk bodies
    #[error("cannot manually sign or hash a request whose payload spans several chunks")]
    CannotSignLargeChunkedRequest,

    /// An externally produced signature was rejected
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // ==================== Network ====================

    /// Every known node is in backoff
    #[error("no healthy nodes available")]
    NoHealthyNodes,

    /// The node rejected the request at precheck
    #[error("precheck failed with status {} for transaction {}", .status, fmt_tx_id(.transaction_id))]
    PrecheckFailed {
        /// Precheck status
        status: Status,
        /// Transaction the status refers to
        transaction_id: Option<TransactionId>,
    },

    /// The transaction reached consensus with a failure status
    #[error("receipt for transaction {} contained error status {}", fmt_tx_id(.transaction_id), .status)]
    ReceiptStatusFailed {
        /// Consensus status
        status: Status,
        /// Transaction the receipt belongs to
        transaction_id: Option<TransactionId>,
    },

    /// The request deadline expired
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The attempt budget ran out
    #[error("network exhausted after {attempts} attempts")]
    NetworkExhausted {
        /// Attempts made
        attempts: usize,
    },

    /// The caller cancelled the request
    #[error("request cancelled")]
    Cancelled,

    /// Transport failure (connection, TLS, per-attempt deadline)
    #[error("transport error: {0}")]
    Transport(String),

    /// Mirror node REST request failed
    #[error("mirror node request failed: {0}")]
    MirrorRequest(String),

    // ==================== Encoding ====================

    /// Protobuf bytes could not be decoded
    #[error("decode error: {0}")]
    Decode(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be loaded or is invalid
    #[error("config error: {0}")]
    Config(String),

    /// Key or signature failure
    #[error(transparent)]
    Crypto(#[from] hiero_crypto::CryptoError),

    /// Malformed identifier
    #[error(transparent)]
    Primitive(#[from] hiero_primitives::PrimitiveError),
}

fn fmt_tx_id(id: &Option<TransactionId>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "<none>".to_string())
}

impl From<prost::DecodeError> for SdkError {
    fn from(e: prost::DecodeError) -> Self {
        SdkError::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<tonic::Status> for SdkError {
    fn from(status: tonic::Status) -> Self {
        SdkError::Transport(format!("{}: {}", status.code(), status.message()))
    }
}

impl From<tonic::transport::Error> for SdkError {
    fn from(e: tonic::transport::Error) -> Self {
        SdkError::Transport(e.to_string())
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        SdkError::MirrorRequest(e.to_string())
    }
}

/// Result alias for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hiero_primitives::{AccountId, Timestamp};

    #[test]
    fn test_error_display() {
        assert_eq!(
            SdkError::TooManyChunks { required: 5, max: 3 }.to_string(),
            "payload needs 5 chunks but at most 3 are allowed"
        );
        assert_eq!(SdkError::MissingField("topic_id").to_string(), "missing required field: topic_id");
        assert_eq!(
            SdkError::NetworkExhausted { attempts: 10 }.to_string(),
            "network exhausted after 10 attempts"
        );
    }

    #[test]
    fn test_precheck_display_includes_transaction() {
        let id = TransactionId::with_valid_start(AccountId::from_num(2), Timestamp::new(1, 5));
        let err = SdkError::PrecheckFailed {
            status: Status::InsufficientPayerBalance,
            transaction_id: Some(id),
        };
        assert_eq!(
            err.to_string(),
            "precheck failed with status INSUFFICIENT_PAYER_BALANCE for transaction 0.0.2@1.000000005"
        );

        let err = SdkError::ReceiptStatusFailed { status: Status::InvalidSignature, transaction_id: None };
        assert!(err.to_string().contains("<none>"));
    }

    #[test]
    fn test_from_decode_error() {
        use prost::Message;
        let err: SdkError = hiero_proto::TransactionList::decode(&[0xff][..]).unwrap_err().into();
        assert!(matches!(err, SdkError::Decode(_)));
    }
}
