//! File service transactions

mod append;

pub use append::{FileAppendTransaction, FileAppendTransactionData};
