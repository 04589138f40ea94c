//! Topic message subscription over the mirror node stream

use std::collections::HashMap;
use std::time::Duration;

use hiero_primitives::{Timestamp, TopicId, TransactionId};
use hiero_proto as proto;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::client::WeakClient;
use crate::{Client, SdkError, SdkResult};

/// Capacity of the delivery channel
const CHANNEL_CAPACITY: usize = 64;

/// How long after its first chunk an incomplete message is kept
const PENDING_CHUNK_WINDOW: Duration = Duration::from_secs(180);

/// One received piece of a chunked message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessageChunk {
    /// Consensus time of the chunk
    pub consensus_timestamp: Timestamp,
    /// Bytes carried by the chunk
    pub content_size: usize,
    /// Running hash after the chunk
    pub running_hash: Vec<u8>,
    /// Sequence number of the chunk
    pub sequence_number: u64,
}

/// A complete topic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMessage {
    /// Consensus time of the last chunk
    pub consensus_timestamp: Timestamp,
    /// Reassembled message bytes
    pub contents: Vec<u8>,
    /// Running hash after the last chunk
    pub running_hash: Vec<u8>,
    /// Running hash algorithm version
    pub running_hash_version: u64,
    /// Sequence number of the last chunk
    pub sequence_number: u64,
    /// Chunks, for messages submitted in several pieces
    pub chunks: Option<Vec<TopicMessageChunk>>,
    /// Transaction that submitted the first chunk
    pub transaction_id: Option<TransactionId>,
}

impl TopicMessage {
    fn single(response: proto::ConsensusTopicResponse) -> SdkResult<Self> {
        Ok(Self {
            consensus_timestamp: consensus_timestamp(&response)?,
            transaction_id: initial_transaction_id(&response)?,
            contents: response.message,
            running_hash: response.running_hash,
            running_hash_version: response.running_hash_version,
            sequence_number: response.sequence_number,
            chunks: None,
        })
    }

    fn assemble(mut responses: Vec<proto::ConsensusTopicResponse>) -> SdkResult<Self> {
        responses.sort_by_key(|r| r.chunk_info.as_ref().map_or(0, |info| info.number));
        let transaction_id = match responses.first() {
            Some(first) => initial_transaction_id(first)?,
            None => return Err(SdkError::Decode("no chunks to assemble".into())),
        };

        let mut contents = Vec::new();
        let mut chunks = Vec::with_capacity(responses.len());
        for response in &responses {
            contents.extend_from_slice(&response.message);
            chunks.push(TopicMessageChunk {
                consensus_timestamp: consensus_timestamp(response)?,
                content_size: response.message.len(),
                running_hash: response.running_hash.clone(),
                sequence_number: response.sequence_number,
            });
        }

        let last = chunks.last().cloned().ok_or(SdkError::Decode("no chunks to assemble".into()))?;
        let running_hash_version = responses.last().map_or(0, |r| r.running_hash_version);
        Ok(Self {
            consensus_timestamp: last.consensus_timestamp,
            contents,
            running_hash: last.running_hash,
            running_hash_version,
            sequence_number: last.sequence_number,
            chunks: Some(chunks),
            transaction_id,
        })
    }
}

fn consensus_timestamp(response: &proto::ConsensusTopicResponse) -> SdkResult<Timestamp> {
    let timestamp = response
        .consensus_timestamp
        .clone()
        .ok_or(SdkError::Decode("topic message has no consensus timestamp".into()))?;
    Ok(Timestamp::try_from(timestamp)?)
}

fn initial_transaction_id(response: &proto::ConsensusTopicResponse) -> SdkResult<Option<TransactionId>> {
    match response.chunk_info.as_ref().and_then(|info| info.initial_transaction_id.clone()) {
        Some(id) => Ok(Some(TransactionId::try_from(id)?)),
        None => Ok(None),
    }
}

/// Stream errors after which the subscription is reopened
fn is_retryable(status: &tonic::Status) -> bool {
    matches!(
        status.code(),
        tonic::Code::NotFound
            | tonic::Code::Unavailable
            | tonic::Code::ResourceExhausted
            | tonic::Code::Internal
            | tonic::Code::Unknown
    )
}

/// Chunks of one message received so far
struct PendingMessage {
    first_seen: Timestamp,
    pieces: Vec<proto::ConsensusTopicResponse>,
}

/// Collects chunks until every piece of a message has arrived
///
/// A message whose chunks stop arriving is dropped once newer traffic is
/// more than `PENDING_CHUNK_WINDOW` past its first chunk.
#[derive(Default)]
struct Reassembler {
    pending: HashMap<TransactionId, PendingMessage>,
}

impl Reassembler {
    fn push(&mut self, response: proto::ConsensusTopicResponse) -> SdkResult<Option<TopicMessage>> {
        let timestamp = consensus_timestamp(&response)?;
        self.evict_before(timestamp.minus(PENDING_CHUNK_WINDOW));

        let total = response.chunk_info.as_ref().map_or(1, |info| info.total);
        if total <= 1 {
            return TopicMessage::single(response).map(Some);
        }
        let Some(initial) = initial_transaction_id(&response)? else {
            return TopicMessage::single(response).map(Some);
        };

        let pending = self
            .pending
            .entry(initial)
            .or_insert_with(|| PendingMessage { first_seen: timestamp, pieces: Vec::new() });
        pending.pieces.push(response);
        if pending.pieces.len() < total as usize {
            return Ok(None);
        }
        match self.pending.remove(&initial) {
            Some(pending) => TopicMessage::assemble(pending.pieces).map(Some),
            None => Ok(None),
        }
    }

    fn evict_before(&mut self, cutoff: Timestamp) {
        let before = self.pending.len();
        self.pending.retain(|_, pending| pending.first_seen >= cutoff);
        let dropped = before - self.pending.len();
        if dropped > 0 {
            warn!(dropped, "discarding incomplete chunked topic messages");
        }
    }
}

/// Subscribes to the messages of a topic
#[derive(Debug, Clone, Default)]
pub struct TopicMessageQuery {
    topic_id: Option<TopicId>,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
    limit: u64,
    max_attempts: Option<usize>,
}

impl TopicMessageQuery {
    /// Create a subscription query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the topic
    pub fn topic_id(mut self, id: TopicId) -> Self {
        self.topic_id = Some(id);
        self
    }

    /// Only messages at or after this time
    pub fn start_time(mut self, time: Timestamp) -> Self {
        self.start_time = Some(time);
        self
    }

    /// Only messages before this time
    pub fn end_time(mut self, time: Timestamp) -> Self {
        self.end_time = Some(time);
        self
    }

    /// Stop after this many messages; 0 means unlimited
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Reconnect at most this many times in a row (defaults to the client setting)
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Open the subscription; messages arrive on the returned channel
    ///
    /// The channel closes when the stream ends. A final `Err` is delivered
    /// when the stream fails for good. Dropping the receiver stops the
    /// subscription, and so does closing or dropping the client: the
    /// subscription does not keep the client alive.
    pub fn subscribe(&self, client: &Client) -> SdkResult<mpsc::Receiver<SdkResult<TopicMessage>>> {
        let topic_id = self.topic_id.ok_or(SdkError::MissingField("topic_id"))?;
        let mirror = client.mirror()?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let subscription = Subscription {
            client: client.downgrade(),
            min_backoff: client.min_backoff(),
            max_backoff: client.max_backoff(),
            mirror,
            topic_id,
            start_time: self.start_time,
            end_time: self.end_time,
            remaining: self.limit,
            unlimited: self.limit == 0,
            max_attempts: self.max_attempts.unwrap_or_else(|| client.max_attempts()),
            tx,
        };
        tokio::spawn(subscription.run());
        Ok(rx)
    }

    /// Collect every message until the stream ends
    ///
    /// Meant for bounded queries with a limit or an end time.
    pub async fn execute(&self, client: &Client) -> SdkResult<Vec<TopicMessage>> {
        let mut rx = self.subscribe(client)?;
        let mut messages = Vec::new();
        while let Some(message) = rx.recv().await {
            messages.push(message?);
        }
        Ok(messages)
    }
}

struct Subscription {
    client: WeakClient,
    min_backoff: Duration,
    max_backoff: Duration,
    mirror: String,
    topic_id: TopicId,
    start_time: Option<Timestamp>,
    end_time: Option<Timestamp>,
    remaining: u64,
    unlimited: bool,
    max_attempts: usize,
    tx: mpsc::Sender<SdkResult<TopicMessage>>,
}

impl Subscription {
    fn query(&self) -> proto::ConsensusTopicQuery {
        proto::ConsensusTopicQuery {
            topic_id: Some(self.topic_id.into()),
            consensus_start_time: self.start_time.map(Into::into),
            consensus_end_time: self.end_time.map(Into::into),
            limit: if self.unlimited { 0 } else { self.remaining },
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let exp = attempt.min(16) as u32;
        self.min_backoff.saturating_mul(1u32 << exp).min(self.max_backoff)
    }

    async fn run(mut self) {
        let mut reassembler = Reassembler::default();
        let mut attempt = 0usize;

        loop {
            let opened = match self.client.upgrade() {
                Some(client) if !client.is_closed() => {
                    client.transport().subscribe_topic(&self.mirror, self.query()).await
                }
                _ => {
                    debug!(topic_id = %self.topic_id, "client closed, topic subscription stopped");
                    return;
                }
            };
            let error = match opened {
                Ok(mut stream) => {
                    let mut failure = None;
                    loop {
                        let item = tokio::select! {
                            item = stream.recv() => item,
                            _ = self.client.shutdown().cancelled() => {
                                debug!(topic_id = %self.topic_id, "client closed, topic subscription stopped");
                                return;
                            }
                        };
                        let Some(item) = item else { break };
                        match item {
                            Ok(response) => {
                                attempt = 0;
                                if !self.deliver(&mut reassembler, response).await {
                                    return;
                                }
                                if !self.unlimited && self.remaining == 0 {
                                    return;
                                }
                            }
                            Err(status) => {
                                failure = Some(status);
                                break;
                            }
                        }
                    }
                    match failure {
                        None => {
                            debug!(topic_id = %self.topic_id, "topic stream ended");
                            return;
                        }
                        Some(status) if is_retryable(&status) => SdkError::from(status),
                        Some(status) => {
                            let _ = self.tx.send(Err(status.into())).await;
                            return;
                        }
                    }
                }
                Err(err) => err,
            };

            attempt += 1;
            if attempt >= self.max_attempts {
                warn!(topic_id = %self.topic_id, error = %error, "topic subscription gave up");
                let _ = self.tx.send(Err(SdkError::NetworkExhausted { attempts: attempt })).await;
                return;
            }
            let delay = self.backoff(attempt);
            warn!(topic_id = %self.topic_id, error = %error, ?delay, "topic stream failed, resubscribing");
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.tx.closed() => return,
                _ = self.client.shutdown().cancelled() => {
                    debug!(topic_id = %self.topic_id, "client closed, topic subscription stopped");
                    return;
                }
            }
        }
    }

    /// Forward one response; false once the receiver is gone
    async fn deliver(&mut self, reassembler: &mut Reassembler, response: proto::ConsensusTopicResponse) -> bool {
        if let Ok(timestamp) = consensus_timestamp(&response) {
            self.start_time = Some(timestamp.plus_nanos(1));
        }
        if !self.unlimited {
            self.remaining = self.remaining.saturating_sub(1);
        }
        match reassembler.push(response) {
            Ok(Some(message)) => self.tx.send(Ok(message)).await.is_ok(),
            Ok(None) => true,
            Err(err) => self.tx.send(Err(err)).await.is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiero_primitives::AccountId;

    fn response(seq: u64, message: &[u8], chunk: Option<(i32, i32)>) -> proto::ConsensusTopicResponse {
        response_from(AccountId::from_num(2), 100 + seq as i64, seq, message, chunk)
    }

    fn response_from(
        payer: AccountId,
        secs: i64,
        seq: u64,
        message: &[u8],
        chunk: Option<(i32, i32)>,
    ) -> proto::ConsensusTopicResponse {
        let initial = TransactionId::with_valid_start(payer, Timestamp::new(50, 0));
        proto::ConsensusTopicResponse {
            consensus_timestamp: Some(Timestamp::new(secs, 0).into()),
            message: message.to_vec(),
            running_hash: vec![seq as u8; 48],
            sequence_number: seq,
            running_hash_version: 3,
            chunk_info: chunk.map(|(number, total)| proto::ConsensusMessageChunkInfo {
                initial_transaction_id: Some(initial.into()),
                total,
                number,
            }),
        }
    }

    #[test]
    fn test_single_message_passes_through() {
        let mut reassembler = Reassembler::default();
        let message = reassembler.push(response(1, b"hello", None)).unwrap().unwrap();
        assert_eq!(message.contents, b"hello");
        assert_eq!(message.sequence_number, 1);
        assert!(message.chunks.is_none());
    }

    #[test]
    fn test_chunks_reassemble_in_order() {
        let mut reassembler = Reassembler::default();
        assert!(reassembler.push(response(2, b"world", Some((2, 2)))).unwrap().is_none());
        let message = reassembler.push(response(1, b"hello ", Some((1, 2)))).unwrap().unwrap();
        assert_eq!(message.contents, b"hello world");
        assert_eq!(message.chunks.as_ref().map(Vec::len), Some(2));
        assert_eq!(message.sequence_number, 2);
        assert!(message.transaction_id.is_some());
        assert!(reassembler.pending.is_empty());
    }

    #[test]
    fn test_stale_partial_messages_evicted() {
        let mut reassembler = Reassembler::default();
        let stale = AccountId::from_num(2);
        let recent = AccountId::from_num(3);
        assert!(reassembler.push(response_from(stale, 1_000, 1, b"lost ", Some((1, 2)))).unwrap().is_none());
        assert!(reassembler.push(response_from(recent, 1_100, 2, b"kept ", Some((1, 2)))).unwrap().is_none());
        assert_eq!(reassembler.pending.len(), 2);

        // more than three minutes after the stale group started
        let message = reassembler.push(response_from(stale, 1_181, 3, b"later", None)).unwrap().unwrap();
        assert_eq!(message.contents, b"later");
        assert_eq!(reassembler.pending.len(), 1);

        let message = reassembler.push(response_from(recent, 1_182, 4, b"done", Some((2, 2)))).unwrap().unwrap();
        assert_eq!(message.contents, b"kept done");
        assert!(reassembler.pending.is_empty());
    }

    #[test]
    fn test_retryable_codes() {
        assert!(is_retryable(&tonic::Status::unavailable("down")));
        assert!(is_retryable(&tonic::Status::not_found("topic not yet visible")));
        assert!(!is_retryable(&tonic::Status::invalid_argument("bad topic")));
    }
}
