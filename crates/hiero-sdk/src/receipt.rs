//! Submission responses and receipt resolution

use hiero_primitives::{AccountId, FileId, TopicId, TransactionId};
use hiero_proto as proto;

use crate::execute::{self, Budget, Execute, ExecuteOptions};
use crate::transaction::TransactionHash;
use crate::transport::{NodeRequest, NodeResponse};
use crate::{Client, SdkError, SdkResult, Status, StatusClass};

/// A node's acceptance of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionResponse {
    /// Node that accepted the submission
    pub node_account_id: AccountId,
    /// Submitted transaction (the chunk's own id for chunked kinds)
    pub transaction_id: TransactionId,
    /// Hash of the submitted signed transaction
    pub transaction_hash: TransactionHash,
    /// Whether `get_receipt` fails on a non-success status
    pub validate_status: bool,
}

impl TransactionResponse {
    /// Receipt query for this submission, directed at the accepting node
    pub fn get_receipt_query(&self) -> TransactionReceiptQuery {
        TransactionReceiptQuery::new()
            .transaction_id(self.transaction_id)
            .node_account_ids(vec![self.node_account_id])
            .validate_status(self.validate_status)
    }

    /// Wait for the consensus receipt
    pub async fn get_receipt(&self, client: &Client) -> SdkResult<TransactionReceipt> {
        self.get_receipt_query().execute(client).await
    }

    /// Wait for the consensus receipt with explicit options
    pub async fn get_receipt_with(
        &self,
        client: &Client,
        options: ExecuteOptions,
    ) -> SdkResult<TransactionReceipt> {
        self.get_receipt_query().execute_with(client, options).await
    }
}

/// Consensus outcome of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Consensus status
    pub status: Status,
    /// Transaction the receipt belongs to
    pub transaction_id: Option<TransactionId>,
    /// Account created by the transaction
    pub account_id: Option<AccountId>,
    /// File created by the transaction
    pub file_id: Option<FileId>,
    /// Topic created by the transaction
    pub topic_id: Option<TopicId>,
    /// Topic sequence number after a message submit
    pub topic_sequence_number: u64,
    /// Topic running hash after a message submit
    pub topic_running_hash: Option<Vec<u8>>,
    /// Running hash algorithm version
    pub topic_running_hash_version: u64,
}

impl TransactionReceipt {
    fn from_proto(receipt: proto::TransactionReceipt, transaction_id: Option<TransactionId>) -> SdkResult<Self> {
        Ok(Self {
            status: Status::from_code(receipt.status),
            transaction_id,
            account_id: receipt.account_id.map(AccountId::try_from).transpose()?,
            file_id: receipt.file_id.map(FileId::try_from).transpose()?,
            topic_id: receipt.topic_id.map(TopicId::try_from).transpose()?,
            topic_sequence_number: receipt.topic_sequence_number,
            topic_running_hash: (!receipt.topic_running_hash.is_empty()).then_some(receipt.topic_running_hash),
            topic_running_hash_version: receipt.topic_running_hash_version,
        })
    }

    /// Fail with `ReceiptStatusFailed` unless the status is `SUCCESS`
    pub fn validate_status(self, validate: bool) -> SdkResult<Self> {
        if validate && self.status != Status::Success {
            return Err(SdkError::ReceiptStatusFailed {
                status: self.status,
                transaction_id: self.transaction_id,
            });
        }
        Ok(self)
    }
}

/// Polls a node for the receipt of a transaction
#[derive(Debug, Clone)]
pub struct TransactionReceiptQuery {
    transaction_id: Option<TransactionId>,
    node_account_ids: Option<Vec<AccountId>>,
    validate_status: bool,
}

impl Default for TransactionReceiptQuery {
    fn default() -> Self {
        Self { transaction_id: None, node_account_ids: None, validate_status: true }
    }
}

impl TransactionReceiptQuery {
    /// Create a receipt query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transaction to look up
    pub fn transaction_id(mut self, id: TransactionId) -> Self {
        self.transaction_id = Some(id);
        self
    }

    /// Restrict the query to these nodes
    pub fn node_account_ids(mut self, ids: Vec<AccountId>) -> Self {
        self.node_account_ids = Some(ids);
        self
    }

    /// Fail on a non-success receipt status (on by default)
    pub fn validate_status(mut self, validate: bool) -> Self {
        self.validate_status = validate;
        self
    }

    /// Poll until the receipt is final
    pub async fn execute(&self, client: &Client) -> SdkResult<TransactionReceipt> {
        self.execute_with(client, ExecuteOptions::default()).await
    }

    /// Poll with explicit deadline, cancellation and attempt budget
    pub async fn execute_with(&self, client: &Client, options: ExecuteOptions) -> SdkResult<TransactionReceipt> {
        let budget = Budget::new(client, &options);
        self.execute_with_budget(client, &budget).await
    }

    pub(crate) async fn execute_with_budget(&self, client: &Client, budget: &Budget) -> SdkResult<TransactionReceipt> {
        if self.transaction_id.is_none() {
            return Err(SdkError::MissingField("transaction_id"));
        }
        let receipt = execute::execute(client, self, budget).await?;
        receipt.validate_status(self.validate_status)
    }
}

impl Execute for TransactionReceiptQuery {
    type Output = TransactionReceipt;

    fn node_account_ids(&self) -> Option<&[AccountId]> {
        self.node_account_ids.as_deref()
    }

    fn transaction_id(&self) -> Option<TransactionId> {
        self.transaction_id
    }

    fn make_request(&self, _node: AccountId) -> SdkResult<NodeRequest> {
        let query = proto::TransactionGetReceiptQuery {
            header: Some(proto::QueryHeader::default()),
            transaction_id: self.transaction_id.map(Into::into),
            include_duplicates: false,
            include_child_receipts: false,
        };
        Ok(NodeRequest::Query {
            method: proto::services::CRYPTO_GET_RECEIPT,
            query: proto::Query { query: Some(proto::query::Query::TransactionGetReceipt(query)) },
        })
    }

    fn classify(&self, response: &NodeResponse) -> SdkResult<(Status, StatusClass)> {
        let response = receipt_response(response)?;
        let header = response.header.map_or(Status::Ok, |h| Status::from_code(h.node_transaction_precheck_code));
        if header != Status::Ok {
            // the node may not have the receipt yet
            return Ok(match header.receipt_class() {
                StatusClass::RetryableSameNode => (header, StatusClass::RetryableSameNode),
                _ => (header, header.precheck_class()),
            });
        }
        let status = response.receipt.as_ref().map_or(Status::Unknown, |r| Status::from_code(r.status));
        Ok((status, status.receipt_class()))
    }

    fn make_output(&self, response: NodeResponse, _node: AccountId) -> SdkResult<TransactionReceipt> {
        let receipt = match response {
            NodeResponse::Query(proto::Response {
                response: Some(proto::response::Response::TransactionGetReceipt(response)),
            }) => response.receipt.unwrap_or_default(),
            _ => return Err(SdkError::Decode("expected a receipt response".into())),
        };
        TransactionReceipt::from_proto(receipt, self.transaction_id)
    }
}

fn receipt_response(response: &NodeResponse) -> SdkResult<&proto::TransactionGetReceiptResponse> {
    match response {
        NodeResponse::Query(proto::Response {
            response: Some(proto::response::Response::TransactionGetReceipt(response)),
        }) => Ok(response),
        _ => Err(SdkError::Decode("expected a receipt response".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiero_primitives::Timestamp;

    fn query() -> TransactionReceiptQuery {
        TransactionReceiptQuery::new()
            .transaction_id(TransactionId::with_valid_start(AccountId::from_num(2), Timestamp::new(10, 0)))
    }

    fn response(header: Status, receipt: Option<Status>) -> NodeResponse {
        NodeResponse::Query(proto::Response {
            response: Some(proto::response::Response::TransactionGetReceipt(
                proto::TransactionGetReceiptResponse {
                    header: Some(proto::ResponseHeader {
                        node_transaction_precheck_code: header.code(),
                        response_type: 0,
                        cost: 0,
                    }),
                    receipt: receipt.map(|s| proto::TransactionReceipt { status: s.code(), ..Default::default() }),
                    ..Default::default()
                },
            )),
        })
    }

    #[test]
    fn test_classify_receipt_statuses() {
        let q = query();
        assert_eq!(
            q.classify(&response(Status::Ok, Some(Status::Success))).unwrap(),
            (Status::Success, StatusClass::Ok)
        );
        assert_eq!(
            q.classify(&response(Status::Ok, Some(Status::Unknown))).unwrap(),
            (Status::Unknown, StatusClass::RetryableSameNode)
        );
        assert_eq!(
            q.classify(&response(Status::ReceiptNotFound, None)).unwrap(),
            (Status::ReceiptNotFound, StatusClass::RetryableSameNode)
        );
        assert_eq!(
            q.classify(&response(Status::Busy, None)).unwrap(),
            (Status::Busy, StatusClass::RetryableSameNode)
        );
        assert_eq!(
            q.classify(&response(Status::InvalidTransactionId, None)).unwrap(),
            (Status::InvalidTransactionId, StatusClass::Terminal)
        );
        // a failed transaction is still a final receipt
        assert_eq!(
            q.classify(&response(Status::Ok, Some(Status::InvalidSignature))).unwrap().1,
            StatusClass::Ok
        );
    }

    #[test]
    fn test_make_output_and_validate() {
        let q = query();
        let receipt = q.make_output(response(Status::Ok, Some(Status::FailBalance)), AccountId::from_num(3)).unwrap();
        assert_eq!(receipt.status, Status::FailBalance);
        assert!(matches!(
            receipt.clone().validate_status(true),
            Err(SdkError::ReceiptStatusFailed { status: Status::FailBalance, .. })
        ));
        assert!(receipt.validate_status(false).is_ok());
    }

    #[test]
    fn test_receipt_ids() {
        let receipt = TransactionReceipt::from_proto(
            proto::TransactionReceipt {
                status: Status::Success.code(),
                topic_id: Some(TopicId::from_num(77).into()),
                topic_sequence_number: 4,
                topic_running_hash: vec![1; 48],
                ..Default::default()
            },
            None,
        )
        .unwrap();
        assert_eq!(receipt.topic_id, Some(TopicId::from_num(77)));
        assert_eq!(receipt.topic_sequence_number, 4);
        assert_eq!(receipt.topic_running_hash.as_deref(), Some(&[1u8; 48][..]));
        assert_eq!(receipt.account_id, None);
    }

    #[test]
    fn test_request_shape() {
        let NodeRequest::Query { method, query: q } = query().make_request(AccountId::from_num(3)).unwrap() else {
            panic!("expected a query");
        };
        assert_eq!(method, proto::services::CRYPTO_GET_RECEIPT);
        assert!(matches!(q.query, Some(proto::query::Query::TransactionGetReceipt(_))));
    }
}
