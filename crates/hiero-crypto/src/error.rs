//! Cryptographic errors

use thiserror::Error;

/// Cryptographic operation error
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key bytes could not be parsed
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Public key bytes could not be parsed
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Signature bytes could not be parsed
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Signing failed
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Result alias for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;
