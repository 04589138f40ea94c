//! Key and signature conversions to the wire format

use hiero_crypto::{KeyKind, PublicKey};
use hiero_proto as proto;

use crate::{SdkError, SdkResult};

/// Wire form of a public key
pub(crate) fn key_to_proto(key: &PublicKey) -> proto::Key {
    let bytes = key.to_bytes();
    let key = match key.kind() {
        KeyKind::Ed25519 => proto::key::Key::Ed25519(bytes),
        KeyKind::EcdsaSecp256k1 => proto::key::Key::EcdsaSecp256k1(bytes),
    };
    proto::Key { key: Some(key) }
}

/// Public key from its wire form
pub(crate) fn key_from_proto(key: proto::Key) -> SdkResult<PublicKey> {
    match key.key {
        Some(proto::key::Key::Ed25519(bytes)) => Ok(PublicKey::ed25519_from_bytes(&bytes)?),
        Some(proto::key::Key::EcdsaSecp256k1(bytes)) => Ok(PublicKey::ecdsa_from_bytes(&bytes)?),
        None => Err(SdkError::Decode("key has no material".into())),
    }
}

/// Signature pair carrying the full public key as prefix
pub(crate) fn signature_pair(key: &PublicKey, signature: Vec<u8>) -> proto::SignaturePair {
    let signature = match key.kind() {
        KeyKind::Ed25519 => proto::signature_pair::Signature::Ed25519(signature),
        KeyKind::EcdsaSecp256k1 => proto::signature_pair::Signature::EcdsaSecp256k1(signature),
    };
    proto::SignaturePair { pub_key_prefix: key.to_bytes(), signature: Some(signature) }
}

/// Public key and signature bytes of a pair, if the key is complete
pub(crate) fn parse_signature_pair(pair: &proto::SignaturePair) -> Option<(PublicKey, Vec<u8>)> {
    use proto::signature_pair::Signature;
    let key = PublicKey::from_bytes(&pair.pub_key_prefix).ok()?;
    let signature = match pair.signature.as_ref()? {
        Signature::Ed25519(bytes) | Signature::EcdsaSecp256k1(bytes) => bytes.clone(),
        _ => return None,
    };
    Some((key, signature))
}

/// Wire form of a duration, whole seconds
pub(crate) fn duration_to_proto(duration: std::time::Duration) -> proto::Duration {
    proto::Duration { seconds: duration.as_secs() as i64 }
}

/// Duration from its wire form; negative values clamp to zero
pub(crate) fn duration_from_proto(duration: proto::Duration) -> std::time::Duration {
    std::time::Duration::from_secs(duration.seconds.max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiero_crypto::PrivateKey;

    #[test]
    fn test_key_roundtrip() {
        for key in [PrivateKey::generate_ed25519(), PrivateKey::generate_ecdsa()] {
            let public = key.public_key();
            assert_eq!(key_from_proto(key_to_proto(&public)).unwrap(), public);
        }
        assert!(key_from_proto(proto::Key::default()).is_err());
    }

    #[test]
    fn test_signature_pair_parse() {
        let key = PrivateKey::generate_ecdsa();
        let signature = key.sign(b"body").unwrap();
        let pair = signature_pair(&key.public_key(), signature.clone());
        assert!(matches!(
            pair.signature,
            Some(proto::signature_pair::Signature::EcdsaSecp256k1(_))
        ));
        assert_eq!(parse_signature_pair(&pair), Some((key.public_key(), signature)));
    }
}
