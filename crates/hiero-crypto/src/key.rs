//! Ed25519 and ECDSA (secp256k1) keys

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signer as _, Verifier as _};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::{keccak256, CryptoError, CryptoResult};

const ED25519_PRIVATE_DER_PREFIX: &str = "302e020100300506032b657004220420";
const ED25519_PUBLIC_DER_PREFIX: &str = "302a300506032b6570032100";
const ECDSA_PRIVATE_DER_PREFIX: &str = "3030020100300706052b8104000a04220420";
const ECDSA_PUBLIC_DER_PREFIX: &str = "302d300706052a8648ce3d020106052b8104000a032200";

/// Signature algorithm of a key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Ed25519
    Ed25519,
    /// ECDSA over secp256k1 with Keccak-256 message digests
    EcdsaSecp256k1,
}

/// A private key
///
/// Clone is intentionally not implemented; share keys behind an `Arc`.
pub enum PrivateKey {
    /// Ed25519 signing key
    Ed25519(ed25519_dalek::SigningKey),
    /// secp256k1 signing key
    EcdsaSecp256k1(k256::ecdsa::SigningKey),
}

impl PrivateKey {
    /// Generate a random Ed25519 key
    pub fn generate_ed25519() -> Self {
        PrivateKey::Ed25519(ed25519_dalek::SigningKey::generate(&mut OsRng))
    }

    /// Generate a random secp256k1 key
    pub fn generate_ecdsa() -> Self {
        PrivateKey::EcdsaSecp256k1(k256::ecdsa::SigningKey::random(&mut OsRng))
    }

    /// Create an Ed25519 key from 32 raw bytes
    pub fn ed25519_from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let raw: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidPrivateKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Ok(PrivateKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(&raw)))
    }

    /// Create a secp256k1 key from 32 raw bytes
    pub fn ecdsa_from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let key = k256::ecdsa::SigningKey::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey::EcdsaSecp256k1(key))
    }

    /// Parse a DER-encoded key (hex), detecting the algorithm from the prefix
    pub fn from_str_der(s: &str) -> CryptoResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s).to_ascii_lowercase();
        if let Some(raw) = s.strip_prefix(ED25519_PRIVATE_DER_PREFIX) {
            return Self::decode_hex_with(raw, Self::ed25519_from_bytes);
        }
        if let Some(raw) = s.strip_prefix(ECDSA_PRIVATE_DER_PREFIX) {
            return Self::decode_hex_with(raw, Self::ecdsa_from_bytes);
        }
        Err(CryptoError::InvalidPrivateKey("unrecognized DER prefix".to_string()))
    }

    fn decode_hex_with(
        s: &str,
        parse: fn(&[u8]) -> CryptoResult<Self>,
    ) -> CryptoResult<Self> {
        let mut bytes =
            hex::decode(s).map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        let key = parse(&bytes);
        bytes.zeroize();
        key
    }

    /// Signature algorithm
    pub fn kind(&self) -> KeyKind {
        match self {
            PrivateKey::Ed25519(_) => KeyKind::Ed25519,
            PrivateKey::EcdsaSecp256k1(_) => KeyKind::EcdsaSecp256k1,
        }
    }

    /// The matching public key
    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
            PrivateKey::EcdsaSecp256k1(key) => PublicKey::EcdsaSecp256k1(*key.verifying_key()),
        }
    }

    /// Sign a message, returning a 64-byte signature
    ///
    /// ECDSA keys sign the Keccak-256 digest of the message and always produce
    /// a low-s `r || s` signature.
    pub fn sign(&self, message: &[u8]) -> CryptoResult<Vec<u8>> {
        match self {
            PrivateKey::Ed25519(key) => Ok(key.sign(message).to_bytes().to_vec()),
            PrivateKey::EcdsaSecp256k1(key) => {
                let signature: k256::ecdsa::Signature = key
                    .sign_prehash(&keccak256(message))
                    .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
                let signature = signature.normalize_s().unwrap_or(signature);
                Ok(signature.to_bytes().to_vec())
            }
        }
    }

    /// Raw 32 key bytes
    ///
    /// The caller is responsible for zeroizing the returned buffer.
    pub fn to_bytes_raw(&self) -> Vec<u8> {
        match self {
            PrivateKey::Ed25519(key) => key.to_bytes().to_vec(),
            PrivateKey::EcdsaSecp256k1(key) => key.to_bytes().to_vec(),
        }
    }
}

impl FromStr for PrivateKey {
    type Err = CryptoError;

    /// Parse a DER hex key, or a raw 32-byte hex key as Ed25519
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        if trimmed.len() == 64 {
            return Self::decode_hex_with(trimmed, Self::ed25519_from_bytes);
        }
        Self::from_str_der(trimmed)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("kind", &self.kind())
            .field("public_key", &self.public_key())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// A public key
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PublicKey {
    /// Ed25519 verifying key
    Ed25519(ed25519_dalek::VerifyingKey),
    /// secp256k1 verifying key
    EcdsaSecp256k1(k256::ecdsa::VerifyingKey),
}

impl PublicKey {
    /// Parse a 32-byte Ed25519 public key
    pub fn ed25519_from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let raw: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        ed25519_dalek::VerifyingKey::from_bytes(&raw)
            .map(PublicKey::Ed25519)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Parse a SEC1-encoded secp256k1 public key (compressed or not)
    pub fn ecdsa_from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        k256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map(PublicKey::EcdsaSecp256k1)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Parse raw bytes, inferring the algorithm from the length
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        match bytes.len() {
            32 => Self::ed25519_from_bytes(bytes),
            33 | 65 => Self::ecdsa_from_bytes(bytes),
            n => Err(CryptoError::InvalidPublicKey(format!("unexpected length {}", n))),
        }
    }

    /// Signature algorithm
    pub fn kind(&self) -> KeyKind {
        match self {
            PublicKey::Ed25519(_) => KeyKind::Ed25519,
            PublicKey::EcdsaSecp256k1(_) => KeyKind::EcdsaSecp256k1,
        }
    }

    /// Raw key bytes: 32 for Ed25519, 33 (compressed) for secp256k1
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Ed25519(key) => key.to_bytes().to_vec(),
            PublicKey::EcdsaSecp256k1(key) => key.to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    /// DER encoding of the key
    pub fn to_bytes_der(&self) -> Vec<u8> {
        let prefix = match self {
            PublicKey::Ed25519(_) => ED25519_PUBLIC_DER_PREFIX,
            PublicKey::EcdsaSecp256k1(_) => ECDSA_PUBLIC_DER_PREFIX,
        };
        // both prefixes are constant valid hex
        let mut der = hex::decode(prefix).unwrap_or_default();
        der.extend_from_slice(&self.to_bytes());
        der
    }

    /// Verify a 64-byte signature over a message
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> CryptoResult<()> {
        match self {
            PublicKey::Ed25519(key) => {
                let signature = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
                key.verify(message, &signature)
                    .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
            }
            PublicKey::EcdsaSecp256k1(key) => {
                let signature = k256::ecdsa::Signature::from_slice(signature)
                    .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
                key.verify_prehash(&keccak256(message), &signature)
                    .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
            }
        }
    }
}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        self.to_bytes().hash(state);
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes_der()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({:?}, {})", self.kind(), hex::encode(self.to_bytes()))
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    /// Parse a DER hex key or raw hex key bytes
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s).to_ascii_lowercase();
        let bytes = |raw: &str| {
            hex::decode(raw).map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
        };
        if let Some(raw) = s.strip_prefix(ED25519_PUBLIC_DER_PREFIX) {
            return Self::ed25519_from_bytes(&bytes(raw)?);
        }
        if let Some(raw) = s.strip_prefix(ECDSA_PUBLIC_DER_PREFIX) {
            return Self::ecdsa_from_bytes(&bytes(raw)?);
        }
        Self::from_bytes(&bytes(&s)?)
    }
}
