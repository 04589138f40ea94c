//! Consensus topics: creation, message submission and subscription

mod create;
mod message_query;
mod message_submit;

pub use create::{TopicCreateTransaction, TopicCreateTransactionData};
pub use message_query::{TopicMessage, TopicMessageChunk, TopicMessageQuery};
pub use message_submit::{TopicMessageSubmitTransaction, TopicMessageSubmitTransactionData};
