//! Basic types shared by every service

/// Seconds and nanoseconds since the epoch
#[derive(Clone, Copy, PartialEq, Eq, Hash, prost::Message)]
pub struct Timestamp {
    /// Whole seconds
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    /// Nanoseconds within the second
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

/// A length of time in seconds
#[derive(Clone, Copy, PartialEq, Eq, prost::Message)]
pub struct Duration {
    /// Whole seconds
    #[prost(int64, tag = "1")]
    pub seconds: i64,
}

/// An account identifier
#[derive(Clone, PartialEq, Eq, Hash, prost::Message)]
pub struct AccountId {
    /// Shard number
    #[prost(int64, tag = "1")]
    pub shard_num: i64,
    /// Realm number
    #[prost(int64, tag = "2")]
    pub realm_num: i64,
    /// Account number or alias
    #[prost(oneof = "account_id::Account", tags = "3, 4")]
    pub account: Option<account_id::Account>,
}

/// Nested types of [`AccountId`]
pub mod account_id {
    /// Account number or alias
    #[derive(Clone, PartialEq, Eq, Hash, prost::Oneof)]
    pub enum Account {
        /// Account number
        #[prost(int64, tag = "3")]
        AccountNum(i64),
        /// Key alias
        #[prost(bytes, tag = "4")]
        Alias(Vec<u8>),
    }
}

/// A topic identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, prost::Message)]
pub struct TopicId {
    /// Shard number
    #[prost(int64, tag = "1")]
    pub shard_num: i64,
    /// Realm number
    #[prost(int64, tag = "2")]
    pub realm_num: i64,
    /// Topic number
    #[prost(int64, tag = "3")]
    pub topic_num: i64,
}

/// A file identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, prost::Message)]
pub struct FileId {
    /// Shard number
    #[prost(int64, tag = "1")]
    pub shard_num: i64,
    /// Realm number
    #[prost(int64, tag = "2")]
    pub realm_num: i64,
    /// File number
    #[prost(int64, tag = "3")]
    pub file_num: i64,
}

/// A transaction identifier
#[derive(Clone, PartialEq, Eq, Hash, prost::Message)]
pub struct TransactionId {
    /// Start of the validity window
    #[prost(message, optional, tag = "1")]
    pub transaction_valid_start: Option<Timestamp>,
    /// Payer account
    #[prost(message, optional, tag = "2")]
    pub account_id: Option<AccountId>,
    /// Whether this id refers to a scheduled transaction
    #[prost(bool, tag = "3")]
    pub scheduled: bool,
    /// Child transaction nonce
    #[prost(int32, tag = "4")]
    pub nonce: i32,
}

/// A public key
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Key {
    /// Key material
    #[prost(oneof = "key::Key", tags = "2, 7")]
    pub key: Option<key::Key>,
}

/// Nested types of [`Key`]
pub mod key {
    /// Key material
    #[derive(Clone, PartialEq, Eq, prost::Oneof)]
    pub enum Key {
        /// 32-byte Ed25519 public key
        #[prost(bytes, tag = "2")]
        Ed25519(Vec<u8>),
        /// 33-byte compressed secp256k1 public key
        #[prost(bytes, tag = "7")]
        EcdsaSecp256k1(Vec<u8>),
    }
}

/// A public key prefix and the signature it made
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct SignaturePair {
    /// Prefix of the public key (the full key in this SDK)
    #[prost(bytes, tag = "1")]
    pub pub_key_prefix: Vec<u8>,
    /// Signature bytes
    #[prost(oneof = "signature_pair::Signature", tags = "2, 3, 4, 5, 6")]
    pub signature: Option<signature_pair::Signature>,
}

/// Nested types of [`SignaturePair`]
pub mod signature_pair {
    /// Signature bytes by algorithm
    #[derive(Clone, PartialEq, Eq, prost::Oneof)]
    pub enum Signature {
        /// Smart contract signature
        #[prost(bytes, tag = "2")]
        Contract(Vec<u8>),
        /// Ed25519 signature
        #[prost(bytes, tag = "3")]
        Ed25519(Vec<u8>),
        /// RSA-3072 signature
        #[prost(bytes, tag = "4")]
        Rsa3072(Vec<u8>),
        /// ECDSA P-384 signature
        #[prost(bytes, tag = "5")]
        Ecdsa384(Vec<u8>),
        /// ECDSA secp256k1 signature
        #[prost(bytes, tag = "6")]
        EcdsaSecp256k1(Vec<u8>),
    }
}

/// The signatures attached to a transaction body
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct SignatureMap {
    /// Signature pairs
    #[prost(message, repeated, tag = "1")]
    pub sig_pair: Vec<SignaturePair>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_account_id_wire_format() {
        let id = AccountId {
            shard_num: 0,
            realm_num: 0,
            account: Some(account_id::Account::AccountNum(3)),
        };
        // proto3 omits zero scalars, but a set oneof is always written
        assert_eq!(hex::encode(id.encode_to_vec()), "1803");
    }

    #[test]
    fn test_timestamp_wire_format() {
        let ts = Timestamp { seconds: 1, nanos: 2 };
        assert_eq!(hex::encode(ts.encode_to_vec()), "08011002");
        assert_eq!(Timestamp::decode(&[0x08, 0x01, 0x10, 0x02][..]).unwrap(), ts);
    }

    #[test]
    fn test_signature_pair_decode() {
        let pair = SignaturePair {
            pub_key_prefix: vec![1, 2, 3],
            signature: Some(signature_pair::Signature::Ed25519(vec![9; 64])),
        };
        let bytes = pair.encode_to_vec();
        assert_eq!(SignaturePair::decode(bytes.as_slice()).unwrap(), pair);
    }
}
