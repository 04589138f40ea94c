//! Transport layer for node and mirror communication

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hiero_primitives::AccountId;
use hiero_proto::{self as proto, Message};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use crate::{SdkError, SdkResult, Status};

/// A request bound for one consensus node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRequest {
    /// Submit a signed transaction
    Transaction {
        /// gRPC method path
        method: &'static str,
        /// The envelope
        transaction: proto::Transaction,
    },
    /// Run a query
    Query {
        /// gRPC method path
        method: &'static str,
        /// The query
        query: proto::Query,
    },
}

impl NodeRequest {
    /// gRPC method path
    pub fn method(&self) -> &'static str {
        match self {
            NodeRequest::Transaction { method, .. } | NodeRequest::Query { method, .. } => method,
        }
    }

    /// Decoded body of a transaction submission
    pub fn transaction_body(&self) -> Option<proto::TransactionBody> {
        let NodeRequest::Transaction { transaction, .. } = self else {
            return None;
        };
        let signed =
            proto::SignedTransaction::decode(transaction.signed_transaction_bytes.as_slice()).ok()?;
        proto::TransactionBody::decode(signed.body_bytes.as_slice()).ok()
    }
}

/// A node's reply
#[derive(Debug, Clone, PartialEq)]
pub enum NodeResponse {
    /// Precheck reply to a transaction
    Transaction(proto::TransactionResponse),
    /// Query response
    Query(proto::Response),
}

/// Items of a mirror topic stream
pub type TopicStream = mpsc::Receiver<Result<proto::ConsensusTopicResponse, tonic::Status>>;

/// Transport trait for node and mirror communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request to a node and wait for its reply
    async fn send(
        &self,
        node: AccountId,
        endpoint: &str,
        request: NodeRequest,
    ) -> SdkResult<NodeResponse>;

    /// Open a topic message stream on a mirror node
    async fn subscribe_topic(
        &self,
        mirror: &str,
        query: proto::ConsensusTopicQuery,
    ) -> SdkResult<TopicStream>;
}

/// Add a scheme to a bare `host:port`: plaintext for local hosts and
/// consensus node ports, TLS otherwise
pub(crate) fn endpoint_url(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }
    let local = endpoint.starts_with("localhost") || endpoint.starts_with("127.0.0.1");
    if local || endpoint.ends_with(":50211") || endpoint.ends_with(":5600") {
        format!("http://{}", endpoint)
    } else {
        format!("https://{}", endpoint)
    }
}

/// gRPC transport over tonic
///
/// Channels are created lazily on first use and shared by every request to
/// the same endpoint.
pub struct GrpcTransport {
    channels: Mutex<HashMap<String, Channel>>,
    connect_timeout: Duration,
}

impl GrpcTransport {
    /// Create a transport with a 10 s connect timeout
    pub fn new() -> Self {
        Self::with_connect_timeout(Duration::from_secs(10))
    }

    /// Create a transport with a custom connect timeout
    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self { channels: Mutex::new(HashMap::new()), connect_timeout }
    }

    fn channel(&self, endpoint: &str) -> SdkResult<Channel> {
        let mut channels = self.channels.lock();
        if let Some(channel) = channels.get(endpoint) {
            return Ok(channel.clone());
        }

        let url = endpoint_url(endpoint);
        let mut builder = Endpoint::from_shared(url.clone())
            .map_err(|e| SdkError::Transport(format!("invalid endpoint {}: {}", endpoint, e)))?
            .connect_timeout(self.connect_timeout)
            .tcp_keepalive(Some(Duration::from_secs(60)));
        if url.starts_with("https://") {
            builder = builder.tls_config(ClientTlsConfig::new())?;
        }
        let channel = builder.connect_lazy();
        channels.insert(endpoint.to_string(), channel.clone());
        Ok(channel)
    }

    async fn unary<Req, Resp>(
        &self,
        endpoint: &str,
        method: &'static str,
        request: Req,
    ) -> SdkResult<Resp>
    where
        Req: Message + Send + Sync + 'static,
        Resp: Message + Default + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel(endpoint)?);
        grpc.ready()
            .await
            .map_err(|e| SdkError::Transport(format!("{} not ready: {}", endpoint, e)))?;
        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response = grpc
            .unary(tonic::Request::new(request), PathAndQuery::from_static(method), codec)
            .await?;
        Ok(response.into_inner())
    }
}

impl Default for GrpcTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    async fn send(
        &self,
        _node: AccountId,
        endpoint: &str,
        request: NodeRequest,
    ) -> SdkResult<NodeResponse> {
        match request {
            NodeRequest::Transaction { method, transaction } => self
                .unary::<_, proto::TransactionResponse>(endpoint, method, transaction)
                .await
                .map(NodeResponse::Transaction),
            NodeRequest::Query { method, query } => self
                .unary::<_, proto::Response>(endpoint, method, query)
                .await
                .map(NodeResponse::Query),
        }
    }

    async fn subscribe_topic(
        &self,
        mirror: &str,
        query: proto::ConsensusTopicQuery,
    ) -> SdkResult<TopicStream> {
        let mut grpc = tonic::client::Grpc::new(self.channel(mirror)?);
        grpc.ready()
            .await
            .map_err(|e| SdkError::Transport(format!("{} not ready: {}", mirror, e)))?;
        let codec: ProstCodec<proto::ConsensusTopicQuery, proto::ConsensusTopicResponse> =
            ProstCodec::default();
        let mut stream = grpc
            .server_streaming(
                tonic::Request::new(query),
                PathAndQuery::from_static(proto::services::MIRROR_SUBSCRIBE_TOPIC),
                codec,
            )
            .await?
            .into_inner();

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            loop {
                let item = match stream.message().await {
                    Ok(Some(message)) => Ok(message),
                    Ok(None) => break,
                    Err(status) => Err(status),
                };
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    break;
                }
            }
        });
        Ok(rx)
    }
}

// ==================== Mock ====================

/// A scripted reply of [`MockTransport`]
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Precheck status for a transaction submission
    Precheck(Status),
    /// Receipt query answered with this consensus status
    Receipt(Status),
    /// Receipt query answered with a full receipt
    ReceiptWith(proto::TransactionReceipt),
    /// Any query answered with this header status and no body
    QueryPrecheck(Status),
    /// Balance query answer in tinybars
    Balance(u64),
    /// Connection-level failure
    TransportError(String),
    /// The node never answers
    Stall,
}

/// One call seen by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Node the request was sent to
    pub node: AccountId,
    /// Endpoint used
    pub endpoint: String,
    /// The request
    pub request: NodeRequest,
    /// When the call was made
    pub at: tokio::time::Instant,
}

#[derive(Default)]
struct MockState {
    transaction_replies: VecDeque<MockReply>,
    query_replies: VecDeque<MockReply>,
    topic_streams: VecDeque<Vec<Result<proto::ConsensusTopicResponse, tonic::Status>>>,
    calls: Vec<MockCall>,
    subscriptions: Vec<proto::ConsensusTopicQuery>,
}

/// Mock transport for testing
///
/// Replies are queued per request type; once a queue is empty, transactions
/// pass precheck, receipts report `SUCCESS` and balances are zero. Clones share
/// state, so a test keeps one handle and gives another to the client.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next transaction submission
    pub fn push_transaction_reply(&self, reply: MockReply) {
        self.state.lock().transaction_replies.push_back(reply);
    }

    /// Queue a reply for the next query
    pub fn push_query_reply(&self, reply: MockReply) {
        self.state.lock().query_replies.push_back(reply);
    }

    /// Queue the items of the next topic subscription
    pub fn push_topic_stream(
        &self,
        items: Vec<Result<proto::ConsensusTopicResponse, tonic::Status>>,
    ) {
        self.state.lock().topic_streams.push_back(items);
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Transaction submissions made so far
    pub fn transaction_calls(&self) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c.request, NodeRequest::Transaction { .. }))
            .collect()
    }

    /// Queries made so far
    pub fn query_calls(&self) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c.request, NodeRequest::Query { .. }))
            .collect()
    }

    /// Topic subscriptions opened so far
    pub fn subscriptions(&self) -> Vec<proto::ConsensusTopicQuery> {
        self.state.lock().subscriptions.clone()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn render(reply: MockReply, request: &NodeRequest) -> SdkResult<NodeResponse> {
        let header = |status: Status| proto::ResponseHeader {
            node_transaction_precheck_code: status.code(),
            response_type: 0,
            cost: 0,
        };
        let query = match request {
            NodeRequest::Transaction { .. } => {
                return match reply {
                    MockReply::Precheck(status) => {
                        Ok(NodeResponse::Transaction(proto::TransactionResponse {
                            node_transaction_precheck_code: status.code(),
                            cost: 0,
                        }))
                    }
                    other => Err(SdkError::Transport(format!(
                        "mock: {:?} cannot answer a transaction",
                        other
                    ))),
                };
            }
            NodeRequest::Query { query, .. } => query,
        };

        use proto::query::Query as Q;
        use proto::response::Response as R;
        let response = match (reply, &query.query) {
            (MockReply::Receipt(status), Some(Q::TransactionGetReceipt(_))) => {
                R::TransactionGetReceipt(proto::TransactionGetReceiptResponse {
                    header: Some(header(Status::Ok)),
                    receipt: Some(proto::TransactionReceipt {
                        status: status.code(),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
            }
            (MockReply::ReceiptWith(receipt), Some(Q::TransactionGetReceipt(_))) => {
                R::TransactionGetReceipt(proto::TransactionGetReceiptResponse {
                    header: Some(header(Status::Ok)),
                    receipt: Some(receipt),
                    ..Default::default()
                })
            }
            (MockReply::QueryPrecheck(status), Some(Q::TransactionGetReceipt(_))) => {
                R::TransactionGetReceipt(proto::TransactionGetReceiptResponse {
                    header: Some(header(status)),
                    ..Default::default()
                })
            }
            (MockReply::QueryPrecheck(status), Some(Q::CryptogetAccountBalance(_))) => {
                R::CryptogetAccountBalance(proto::CryptoGetAccountBalanceResponse {
                    header: Some(header(status)),
                    ..Default::default()
                })
            }
            (MockReply::Balance(balance), Some(Q::CryptogetAccountBalance(q))) => {
                R::CryptogetAccountBalance(proto::CryptoGetAccountBalanceResponse {
                    header: Some(header(Status::Ok)),
                    account_id: q.account_id.clone(),
                    balance,
                })
            }
            (other, _) => {
                return Err(SdkError::Transport(format!("mock: {:?} cannot answer this query", other)))
            }
        };
        Ok(NodeResponse::Query(proto::Response { response: Some(response) }))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        node: AccountId,
        endpoint: &str,
        request: NodeRequest,
    ) -> SdkResult<NodeResponse> {
        let reply = {
            let mut state = self.state.lock();
            state.calls.push(MockCall {
                node,
                endpoint: endpoint.to_string(),
                request: request.clone(),
                at: tokio::time::Instant::now(),
            });
            match &request {
                NodeRequest::Transaction { .. } => state
                    .transaction_replies
                    .pop_front()
                    .unwrap_or(MockReply::Precheck(Status::Ok)),
                NodeRequest::Query { query, .. } => state.query_replies.pop_front().unwrap_or(
                    match query.query {
                        Some(proto::query::Query::CryptogetAccountBalance(_)) => MockReply::Balance(0),
                        _ => MockReply::Receipt(Status::Success),
                    },
                ),
            }
        };

        match reply {
            MockReply::TransportError(message) => Err(SdkError::Transport(message)),
            MockReply::Stall => std::future::pending().await,
            reply => Self::render(reply, &request),
        }
    }

    async fn subscribe_topic(
        &self,
        _mirror: &str,
        query: proto::ConsensusTopicQuery,
    ) -> SdkResult<TopicStream> {
        let items = {
            let mut state = self.state.lock();
            state.subscriptions.push(query);
            state.topic_streams.pop_front().unwrap_or_default()
        };
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            // capacity covers every item
            let _ = tx.try_send(item);
        }
        Ok(rx)
    }
}
