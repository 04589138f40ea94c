//! Mirror node topic subscription messages

use crate::{ConsensusMessageChunkInfo, Timestamp, TopicId};

/// Subscription request for a topic's message stream
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ConsensusTopicQuery {
    /// Topic to subscribe to
    #[prost(message, optional, tag = "1")]
    pub topic_id: Option<TopicId>,
    /// Inclusive start of the stream
    #[prost(message, optional, tag = "2")]
    pub consensus_start_time: Option<Timestamp>,
    /// Exclusive end of the stream
    #[prost(message, optional, tag = "3")]
    pub consensus_end_time: Option<Timestamp>,
    /// Maximum number of messages, 0 for unlimited
    #[prost(uint64, tag = "4")]
    pub limit: u64,
}

/// One message of a topic stream
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct ConsensusTopicResponse {
    /// Consensus time of the message
    #[prost(message, optional, tag = "1")]
    pub consensus_timestamp: Option<Timestamp>,
    /// Message bytes
    #[prost(bytes, tag = "2")]
    pub message: Vec<u8>,
    /// Running hash after this message
    #[prost(bytes, tag = "3")]
    pub running_hash: Vec<u8>,
    /// Topic sequence number
    #[prost(uint64, tag = "4")]
    pub sequence_number: u64,
    /// Running hash algorithm version
    #[prost(uint64, tag = "5")]
    pub running_hash_version: u64,
    /// Chunk position, set for multi-chunk messages
    #[prost(message, optional, tag = "6")]
    pub chunk_info: Option<ConsensusMessageChunkInfo>,
}
