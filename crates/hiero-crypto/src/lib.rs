//! # hiero-crypto
//!
//! Cryptographic primitives for the Hiero SDK.
//!
//! - Ed25519 and ECDSA (secp256k1) private and public keys
//! - Signing and verification
//! - SHA-384 transaction hashes
//! - Keccak-256 (the ECDSA message digest)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod key;

pub use error::{CryptoError, CryptoResult};
pub use hash::{keccak256, sha384};
pub use key::{KeyKind, PrivateKey, PublicKey};
