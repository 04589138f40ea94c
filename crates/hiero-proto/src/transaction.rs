//! The transaction envelope and transaction bodies

use crate::{AccountId, Duration, FileId, Key, SignatureMap, TopicId, TransactionId};

/// The outer transaction envelope sent to a node
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Transaction {
    /// A serialized [`SignedTransaction`]
    #[prost(bytes, tag = "5")]
    pub signed_transaction_bytes: Vec<u8>,
}

/// Body bytes plus the signatures over them
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct SignedTransaction {
    /// A serialized [`TransactionBody`]
    #[prost(bytes, tag = "1")]
    pub body_bytes: Vec<u8>,
    /// Signatures over `body_bytes`
    #[prost(message, optional, tag = "2")]
    pub sig_map: Option<SignatureMap>,
}

/// A list of transactions, used to serialize SDK builders
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct TransactionList {
    /// One entry per chunk and node
    #[prost(message, repeated, tag = "1")]
    pub transaction_list: Vec<Transaction>,
}

/// Fields common to every transaction plus the kind-specific body
#[derive(Clone, PartialEq, prost::Message)]
pub struct TransactionBody {
    /// Transaction identifier
    #[prost(message, optional, tag = "1")]
    pub transaction_id: Option<TransactionId>,
    /// Node the transaction is addressed to
    #[prost(message, optional, tag = "2")]
    pub node_account_id: Option<AccountId>,
    /// Maximum fee in tinybars
    #[prost(uint64, tag = "3")]
    pub transaction_fee: u64,
    /// Validity window length
    #[prost(message, optional, tag = "4")]
    pub transaction_valid_duration: Option<Duration>,
    /// Deprecated record flag
    #[prost(bool, tag = "5")]
    pub generate_record: bool,
    /// Transaction memo
    #[prost(string, tag = "6")]
    pub memo: String,
    /// Kind-specific body
    #[prost(oneof = "transaction_body::Data", tags = "11, 14, 16, 24, 27")]
    pub data: Option<transaction_body::Data>,
}

/// Nested types of [`TransactionBody`]
pub mod transaction_body {
    use super::*;

    /// Kind-specific body
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Data {
        /// Create an account
        #[prost(message, tag = "11")]
        CryptoCreateAccount(CryptoCreateTransactionBody),
        /// Transfer hbars
        #[prost(message, tag = "14")]
        CryptoTransfer(CryptoTransferTransactionBody),
        /// Append to a file
        #[prost(message, tag = "16")]
        FileAppend(FileAppendTransactionBody),
        /// Create a topic
        #[prost(message, tag = "24")]
        ConsensusCreateTopic(ConsensusCreateTopicTransactionBody),
        /// Submit a topic message
        #[prost(message, tag = "27")]
        ConsensusSubmitMessage(ConsensusSubmitMessageTransactionBody),
    }
}

/// A signed change to one account balance
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct AccountAmount {
    /// Account whose balance changes
    #[prost(message, optional, tag = "1")]
    pub account_id: Option<AccountId>,
    /// Change in tinybars
    #[prost(sint64, tag = "2")]
    pub amount: i64,
    /// Whether an allowance is spent
    #[prost(bool, tag = "3")]
    pub is_approval: bool,
}

/// Balance changes that sum to zero
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct TransferList {
    /// Individual changes
    #[prost(message, repeated, tag = "1")]
    pub account_amounts: Vec<AccountAmount>,
}

/// Body of a crypto transfer
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct CryptoTransferTransactionBody {
    /// Hbar transfers
    #[prost(message, optional, tag = "1")]
    pub transfers: Option<TransferList>,
}

/// Body of an account create
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct CryptoCreateTransactionBody {
    /// Account key
    #[prost(message, optional, tag = "1")]
    pub key: Option<Key>,
    /// Initial balance in tinybars
    #[prost(uint64, tag = "2")]
    pub initial_balance: u64,
    /// Whether incoming transfers need the account's signature
    #[prost(bool, tag = "8")]
    pub receiver_sig_required: bool,
    /// Auto renew period
    #[prost(message, optional, tag = "9")]
    pub auto_renew_period: Option<Duration>,
    /// Account memo
    #[prost(string, tag = "13")]
    pub memo: String,
    /// Maximum number of automatic token associations
    #[prost(int32, tag = "14")]
    pub max_automatic_token_associations: i32,
}

/// Body of a topic create
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ConsensusCreateTopicTransactionBody {
    /// Topic memo
    #[prost(string, tag = "1")]
    pub memo: String,
    /// Key allowed to update or delete the topic
    #[prost(message, optional, tag = "2")]
    pub admin_key: Option<Key>,
    /// Key allowed to submit messages
    #[prost(message, optional, tag = "3")]
    pub submit_key: Option<Key>,
    /// Auto renew period
    #[prost(message, optional, tag = "6")]
    pub auto_renew_period: Option<Duration>,
    /// Account charged for auto renewal
    #[prost(message, optional, tag = "7")]
    pub auto_renew_account: Option<AccountId>,
}

/// Position of one chunk inside a chunked message
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ConsensusMessageChunkInfo {
    /// Transaction id of the first chunk
    #[prost(message, optional, tag = "1")]
    pub initial_transaction_id: Option<TransactionId>,
    /// Number of chunks
    #[prost(int32, tag = "2")]
    pub total: i32,
    /// 1-based chunk number
    #[prost(int32, tag = "3")]
    pub number: i32,
}

/// Body of a topic message submit
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ConsensusSubmitMessageTransactionBody {
    /// Target topic
    #[prost(message, optional, tag = "1")]
    pub topic_id: Option<TopicId>,
    /// Message bytes of this chunk
    #[prost(bytes, tag = "2")]
    pub message: Vec<u8>,
    /// Chunk position, set only for multi-chunk messages
    #[prost(message, optional, tag = "3")]
    pub chunk_info: Option<ConsensusMessageChunkInfo>,
}

/// Body of a file append
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct FileAppendTransactionBody {
    /// Target file
    #[prost(message, optional, tag = "2")]
    pub file_id: Option<FileId>,
    /// Bytes appended by this chunk
    #[prost(bytes, tag = "4")]
    pub contents: Vec<u8>,
}

/// Precheck reply to a submitted transaction
#[derive(Clone, Copy, PartialEq, Eq, prost::Message)]
pub struct TransactionResponse {
    /// Precheck status code
    #[prost(int32, tag = "1")]
    pub node_transaction_precheck_code: i32,
    /// Fee the transaction would cost
    #[prost(uint64, tag = "2")]
    pub cost: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{account_id, Timestamp};
    use prost::Message;

    fn sample_body() -> TransactionBody {
        TransactionBody {
            transaction_id: Some(TransactionId {
                transaction_valid_start: Some(Timestamp { seconds: 100, nanos: 5 }),
                account_id: Some(AccountId {
                    shard_num: 0,
                    realm_num: 0,
                    account: Some(account_id::Account::AccountNum(2)),
                }),
                scheduled: false,
                nonce: 0,
            }),
            node_account_id: Some(AccountId {
                shard_num: 0,
                realm_num: 0,
                account: Some(account_id::Account::AccountNum(3)),
            }),
            transaction_fee: 200_000_000,
            transaction_valid_duration: Some(Duration { seconds: 120 }),
            generate_record: false,
            memo: "hello".to_string(),
            data: Some(transaction_body::Data::ConsensusSubmitMessage(
                ConsensusSubmitMessageTransactionBody {
                    topic_id: Some(TopicId { shard_num: 0, realm_num: 0, topic_num: 7 }),
                    message: b"chunk".to_vec(),
                    chunk_info: None,
                },
            )),
        }
    }

    #[test]
    fn test_body_roundtrip() {
        let body = sample_body();
        let decoded = TransactionBody::decode(body.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn test_envelope_nesting() {
        let signed = SignedTransaction {
            body_bytes: sample_body().encode_to_vec(),
            sig_map: Some(SignatureMap::default()),
        };
        let tx = Transaction { signed_transaction_bytes: signed.encode_to_vec() };
        let list = TransactionList { transaction_list: vec![tx.clone(), tx] };

        let decoded = TransactionList::decode(list.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.transaction_list.len(), 2);
        let inner = SignedTransaction::decode(
            decoded.transaction_list[0].signed_transaction_bytes.as_slice(),
        )
        .unwrap();
        assert_eq!(TransactionBody::decode(inner.body_bytes.as_slice()).unwrap(), sample_body());
    }

    #[test]
    fn test_negative_amount_uses_zigzag() {
        let amount = AccountAmount { account_id: None, amount: -1, is_approval: false };
        // sint64 -1 zigzags to 1
        assert_eq!(hex::encode(amount.encode_to_vec()), "1001");
    }
}
