//! SHA-384 and Keccak-256 hashing

use sha2::Sha384;
use sha3::{Digest, Keccak256};

/// Compute the SHA-384 digest of the input data
pub fn sha384(data: &[u8]) -> [u8; 48] {
    let mut hasher = Sha384::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the Keccak-256 digest of the input data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}
