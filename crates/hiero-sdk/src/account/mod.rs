//! Account transactions and queries

mod balance;
mod create;

pub use balance::{AccountBalance, AccountBalanceQuery};
pub use create::{AccountCreateTransaction, AccountCreateTransactionData};
