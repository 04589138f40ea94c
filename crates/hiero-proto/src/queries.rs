//! Queries, responses and receipts

use crate::{AccountId, FileId, TopicId, Transaction, TransactionId};

/// Header common to every query
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct QueryHeader {
    /// Payment transaction, unset for free queries
    #[prost(message, optional, tag = "1")]
    pub payment: Option<Transaction>,
    /// Requested response type (0 = answer only)
    #[prost(int32, tag = "2")]
    pub response_type: i32,
}

/// Header common to every query response
#[derive(Clone, Copy, PartialEq, Eq, prost::Message)]
pub struct ResponseHeader {
    /// Precheck status code
    #[prost(int32, tag = "1")]
    pub node_transaction_precheck_code: i32,
    /// Echoed response type
    #[prost(int32, tag = "2")]
    pub response_type: i32,
    /// Query cost
    #[prost(uint64, tag = "3")]
    pub cost: u64,
}

/// A query sent to a node
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Query {
    /// Kind-specific query
    #[prost(oneof = "query::Query", tags = "7, 14")]
    pub query: Option<query::Query>,
}

/// Nested types of [`Query`]
pub mod query {
    use super::*;

    /// Kind-specific query
    #[derive(Clone, PartialEq, Eq, prost::Oneof)]
    pub enum Query {
        /// Account balance
        #[prost(message, tag = "7")]
        CryptogetAccountBalance(CryptoGetAccountBalanceQuery),
        /// Transaction receipt
        #[prost(message, tag = "14")]
        TransactionGetReceipt(TransactionGetReceiptQuery),
    }
}

/// A response from a node
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Response {
    /// Kind-specific response
    #[prost(oneof = "response::Response", tags = "7, 14")]
    pub response: Option<response::Response>,
}

/// Nested types of [`Response`]
pub mod response {
    use super::*;

    /// Kind-specific response
    #[derive(Clone, PartialEq, Eq, prost::Oneof)]
    pub enum Response {
        /// Account balance
        #[prost(message, tag = "7")]
        CryptogetAccountBalance(CryptoGetAccountBalanceResponse),
        /// Transaction receipt
        #[prost(message, tag = "14")]
        TransactionGetReceipt(TransactionGetReceiptResponse),
    }
}

impl Response {
    /// The response header, whichever kind this is
    pub fn header(&self) -> Option<&ResponseHeader> {
        match self.response.as_ref()? {
            response::Response::CryptogetAccountBalance(r) => r.header.as_ref(),
            response::Response::TransactionGetReceipt(r) => r.header.as_ref(),
        }
    }
}

/// Account balance query
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct CryptoGetAccountBalanceQuery {
    /// Query header
    #[prost(message, optional, tag = "1")]
    pub header: Option<QueryHeader>,
    /// Account to look up
    #[prost(message, optional, tag = "2")]
    pub account_id: Option<AccountId>,
}

/// Account balance response
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct CryptoGetAccountBalanceResponse {
    /// Response header
    #[prost(message, optional, tag = "1")]
    pub header: Option<ResponseHeader>,
    /// Account looked up
    #[prost(message, optional, tag = "2")]
    pub account_id: Option<AccountId>,
    /// Balance in tinybars
    #[prost(uint64, tag = "3")]
    pub balance: u64,
}

/// Transaction receipt query
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct TransactionGetReceiptQuery {
    /// Query header
    #[prost(message, optional, tag = "1")]
    pub header: Option<QueryHeader>,
    /// Transaction to look up
    #[prost(message, optional, tag = "2")]
    pub transaction_id: Option<TransactionId>,
    /// Also return receipts of duplicates
    #[prost(bool, tag = "3")]
    pub include_duplicates: bool,
    /// Also return receipts of child transactions
    #[prost(bool, tag = "4")]
    pub include_child_receipts: bool,
}

/// Transaction receipt response
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct TransactionGetReceiptResponse {
    /// Response header
    #[prost(message, optional, tag = "1")]
    pub header: Option<ResponseHeader>,
    /// Receipt of the transaction
    #[prost(message, optional, tag = "2")]
    pub receipt: Option<TransactionReceipt>,
    /// Receipts of duplicate submissions
    #[prost(message, repeated, tag = "4")]
    pub duplicate_transaction_receipts: Vec<TransactionReceipt>,
    /// Receipts of child transactions
    #[prost(message, repeated, tag = "5")]
    pub child_transaction_receipts: Vec<TransactionReceipt>,
}

/// Consensus outcome of a transaction
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct TransactionReceipt {
    /// Consensus status code
    #[prost(int32, tag = "1")]
    pub status: i32,
    /// Created account
    #[prost(message, optional, tag = "2")]
    pub account_id: Option<AccountId>,
    /// Created file
    #[prost(message, optional, tag = "3")]
    pub file_id: Option<FileId>,
    /// Created topic
    #[prost(message, optional, tag = "6")]
    pub topic_id: Option<TopicId>,
    /// Topic sequence number after a message submit
    #[prost(uint64, tag = "7")]
    pub topic_sequence_number: u64,
    /// Topic running hash after a message submit
    #[prost(bytes, tag = "8")]
    pub topic_running_hash: Vec<u8>,
    /// Running hash algorithm version
    #[prost(uint64, tag = "9")]
    pub topic_running_hash_version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_response_header_accessor() {
        let resp = Response {
            response: Some(response::Response::TransactionGetReceipt(
                TransactionGetReceiptResponse {
                    header: Some(ResponseHeader {
                        node_transaction_precheck_code: 0,
                        response_type: 0,
                        cost: 0,
                    }),
                    receipt: Some(TransactionReceipt { status: 22, ..Default::default() }),
                    ..Default::default()
                },
            )),
        };
        let decoded = Response::decode(resp.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.header().unwrap().node_transaction_precheck_code, 0);
        assert!(Response::default().header().is_none());
    }
}
