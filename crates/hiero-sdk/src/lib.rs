//! # hiero-sdk
//!
//! Rust SDK for the Hiero network.
//!
//! ## Features
//!
//! - **Client**: node registry with health-aware rotation, mirror access and an operator
//! - **Transaction**: freeze, sign, serialize and submit, with large payloads split into chunks
//! - **Receipts**: polling until a transaction reaches consensus
//! - **Queries**: account balances, topic message subscriptions and fee estimates
//! - **MockTransport**: a scriptable transport for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hiero_sdk::{AccountId, Client, Hbar, PrivateKey, TransferTransaction};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::for_testnet()?;
//!     client.set_operator(AccountId::from_num(1001), PrivateKey::generate_ed25519());
//!
//!     let mut tx = TransferTransaction::new();
//!     tx.add_hbar_transfer(AccountId::from_num(1001), Hbar::new(-1))?
//!         .add_hbar_transfer(AccountId::from_num(1002), Hbar::new(1))?;
//!
//!     let response = tx.execute(&client).await?;
//!     let receipt = response.get_receipt(&client).await?;
//!     println!("status: {}", receipt.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Deadlines and cancellation
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use hiero_sdk::{AccountBalanceQuery, AccountId, Client, ExecuteOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run(client: Client) -> Result<(), hiero_sdk::SdkError> {
//! let cancel = CancellationToken::new();
//! let options = ExecuteOptions::new().timeout(Duration::from_secs(10)).cancel_token(cancel.clone());
//! let balance = AccountBalanceQuery::new()
//!     .account_id(AccountId::from_num(1001))
//!     .execute_with(&client, options)
//!     .await?;
//! println!("{}", balance.hbars);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod client;
pub mod config;
pub mod error;
mod execute;
pub mod file;
mod key;
pub mod mirror;
pub mod network;
pub mod receipt;
pub mod status;
pub mod topic;
pub mod transaction;
pub mod transfer;
pub mod transport;

pub use account::{AccountBalance, AccountBalanceQuery, AccountCreateTransaction};
pub use client::Client;
pub use config::{ClientConfig, NetworkSpec, OperatorConfig};
pub use error::{SdkError, SdkResult};
pub use execute::ExecuteOptions;
pub use file::FileAppendTransaction;
pub use mirror::{FeeEstimateMode, FeeEstimateQuery, FeeEstimateResponse};
pub use network::{NodeAddress, NodeHealth, NodeRegistry};
pub use receipt::{TransactionReceipt, TransactionReceiptQuery, TransactionResponse};
pub use status::{Status, StatusClass};
pub use topic::{TopicCreateTransaction, TopicMessage, TopicMessageQuery, TopicMessageSubmitTransaction};
pub use transaction::{AnyTransaction, Transaction, TransactionData, TransactionHash};
pub use transfer::TransferTransaction;
pub use transport::{GrpcTransport, MockCall, MockReply, MockTransport, NodeRequest, NodeResponse, Transport};

pub use hiero_crypto::{PrivateKey, PublicKey};
pub use hiero_primitives::{AccountId, FileId, Hbar, Timestamp, TopicId, TransactionId};
