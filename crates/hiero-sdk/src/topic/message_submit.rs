//! Topic message submission, split into chunks when large

use hiero_primitives::TopicId;
use hiero_proto::{self as proto, transaction_body::Data};

use crate::transaction::{ChunkData, ChunkInfo, ChunkedTransactionData, Transaction, TransactionData};
use crate::{SdkError, SdkResult};

/// Bytes per message chunk
const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Allowed chunks per message
const DEFAULT_MAX_CHUNKS: usize = 20;

/// Submits a message to a consensus topic
pub type TopicMessageSubmitTransaction = Transaction<TopicMessageSubmitTransactionData>;

/// Data of a [`TopicMessageSubmitTransaction`]
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMessageSubmitTransactionData {
    topic_id: Option<TopicId>,
    chunks: ChunkData,
}

impl Default for TopicMessageSubmitTransactionData {
    fn default() -> Self {
        Self { topic_id: None, chunks: ChunkData::new(DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNKS) }
    }
}

impl TopicMessageSubmitTransactionData {
    /// Target topic
    pub fn topic_id(&self) -> Option<TopicId> {
        self.topic_id
    }

    /// The whole message
    pub fn message(&self) -> &[u8] {
        &self.chunks.data
    }
}

impl TransactionData for TopicMessageSubmitTransactionData {
    fn method(&self) -> &'static str {
        proto::services::CONSENSUS_SUBMIT_MESSAGE
    }

    fn to_body_data(&self, chunk: Option<&ChunkInfo>) -> Data {
        let (message, chunk_info) = match chunk {
            Some(info) if info.is_multi() => (
                self.chunks.chunk(info.current).to_vec(),
                Some(proto::ConsensusMessageChunkInfo {
                    initial_transaction_id: Some(info.initial_transaction_id.into()),
                    total: info.total as i32,
                    number: info.current as i32 + 1,
                }),
            ),
            _ => (self.chunks.data.clone(), None),
        };
        Data::ConsensusSubmitMessage(proto::ConsensusSubmitMessageTransactionBody {
            topic_id: self.topic_id.map(Into::into),
            message,
            chunk_info,
        })
    }

    fn from_body_data(data: Data) -> SdkResult<Self> {
        let Data::ConsensusSubmitMessage(body) = data else {
            return Err(SdkError::Decode("expected a topic message submit body".into()));
        };
        let mut chunks = ChunkData::new(DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNKS);
        chunks.data = body.message;
        Ok(Self { topic_id: body.topic_id.map(TopicId::try_from).transpose()?, chunks })
    }

    fn merge_chunk(&mut self, data: Data) -> SdkResult<()> {
        let Data::ConsensusSubmitMessage(body) = data else {
            return Err(SdkError::Decode("expected a topic message submit body".into()));
        };
        let topic_id = body.topic_id.map(TopicId::try_from).transpose()?;
        if topic_id != self.topic_id {
            return Err(SdkError::Decode("chunks target different topics".into()));
        }
        self.chunks.data.extend_from_slice(&body.message);
        Ok(())
    }

    fn chunk_data(&self) -> Option<&ChunkData> {
        Some(&self.chunks)
    }

    fn chunk_data_mut(&mut self) -> Option<&mut ChunkData> {
        Some(&mut self.chunks)
    }

    fn validate(&self) -> SdkResult<()> {
        if self.topic_id.is_none() {
            return Err(SdkError::MissingField("topic_id"));
        }
        Ok(())
    }
}

impl ChunkedTransactionData for TopicMessageSubmitTransactionData {}

impl Transaction<TopicMessageSubmitTransactionData> {
    /// Set the target topic
    pub fn set_topic_id(&mut self, id: TopicId) -> SdkResult<&mut Self> {
        self.data_mut()?.topic_id = Some(id);
        Ok(self)
    }

    /// Set the message
    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) -> SdkResult<&mut Self> {
        self.data_mut()?.chunks.data = message.into();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiero_primitives::{AccountId, Timestamp, TransactionId};

    fn chunk_info(current: usize, total: usize) -> ChunkInfo {
        let initial = TransactionId::with_valid_start(AccountId::from_num(2), Timestamp::new(100, 0));
        ChunkInfo {
            current,
            total,
            initial_transaction_id: initial,
            current_transaction_id: initial.plus_ticks(current as i64),
        }
    }

    fn data(len: usize) -> TopicMessageSubmitTransactionData {
        let mut data = TopicMessageSubmitTransactionData::default();
        data.topic_id = Some(TopicId::from_num(5));
        data.chunks.data = (0..len).map(|i| (i % 251) as u8).collect();
        data
    }

    #[test]
    fn test_defaults() {
        let tx = TopicMessageSubmitTransaction::new();
        assert_eq!(tx.chunk_size(), 1024);
        assert_eq!(tx.max_chunks(), 20);
        assert!(tx.should_get_receipt());
    }

    #[test]
    fn test_single_chunk_has_no_chunk_info() {
        let Data::ConsensusSubmitMessage(body) = data(10).to_body_data(Some(&chunk_info(0, 1))) else {
            panic!("wrong body");
        };
        assert_eq!(body.message.len(), 10);
        assert!(body.chunk_info.is_none());
    }

    #[test]
    fn test_chunk_info_numbers_from_one() {
        let data = data(2500);
        let Data::ConsensusSubmitMessage(body) = data.to_body_data(Some(&chunk_info(2, 3))) else {
            panic!("wrong body");
        };
        assert_eq!(body.message.len(), 2500 - 2048);
        let info = body.chunk_info.unwrap();
        assert_eq!((info.number, info.total), (3, 3));
        assert_eq!(info.initial_transaction_id, Some(chunk_info(0, 3).initial_transaction_id.into()));
    }

    #[test]
    fn test_merge_chunks_rebuilds_message() {
        let original = data(2500);
        let mut rebuilt =
            TopicMessageSubmitTransactionData::from_body_data(original.to_body_data(Some(&chunk_info(0, 3))))
                .unwrap();
        for k in 1..3 {
            rebuilt.merge_chunk(original.to_body_data(Some(&chunk_info(k, 3)))).unwrap();
        }
        assert_eq!(rebuilt.message(), original.message());
    }

    #[test]
    fn test_topic_required() {
        assert!(matches!(
            TopicMessageSubmitTransactionData::default().validate(),
            Err(SdkError::MissingField("topic_id"))
        ));
    }

    #[test]
    fn test_too_many_chunks_on_freeze() {
        let mut tx = TopicMessageSubmitTransaction::new();
        tx.set_topic_id(TopicId::from_num(5))
            .unwrap()
            .set_message(vec![0u8; 4 * 1024 + 1])
            .unwrap()
            .set_max_chunks(3)
            .unwrap()
            .set_node_account_ids(vec![AccountId::from_num(3)])
            .unwrap()
            .set_transaction_id(chunk_info(0, 1).initial_transaction_id)
            .unwrap();
        assert_eq!(tx.required_chunks(), 5);
        assert!(matches!(tx.freeze(), Err(SdkError::TooManyChunks { required: 5, max: 3 })));
    }
}
