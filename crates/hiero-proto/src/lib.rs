//! # hiero-proto
//!
//! Protobuf messages of the Hiero API (HAPI) used by the SDK.
//!
//! The messages mirror the public schema field-for-field for the subset of
//! services the SDK speaks:
//!
//! - basic types: entity ids, timestamps, keys, signature maps
//! - the transaction envelope and the bodies of the supported kinds
//! - queries and responses (receipts, account balances)
//! - the mirror node topic subscription stream
//!
//! Fields not listed here are skipped on decode, which is how protobuf
//! treats unknown fields.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod basic;
mod mirror;
mod queries;
mod transaction;

pub mod services;

pub use basic::*;
pub use mirror::*;
pub use queries::*;
pub use transaction::*;

pub use prost::Message;
