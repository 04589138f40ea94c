//! # hiero-primitives
//!
//! Primitive types for the Hiero SDK.
//!
//! - `shard.realm.num` entity identifiers for accounts, topics and files
//! - consensus [`Timestamp`]s with nanosecond precision
//! - [`TransactionId`]s (payer plus valid start)
//! - [`Hbar`] amounts

#![warn(missing_docs)]
#![warn(clippy::all)]

mod entity_id;
mod error;
mod hbar;
mod timestamp;
mod transaction_id;

pub use entity_id::{AccountId, FileId, TopicId};
pub use error::{PrimitiveError, PrimitiveResult};
pub use hbar::Hbar;
pub use timestamp::Timestamp;
pub use transaction_id::TransactionId;
