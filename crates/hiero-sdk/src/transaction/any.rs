//! Transactions whose kind is only known at runtime

use hiero_proto::transaction_body::Data;

use super::{ChunkData, ChunkInfo, Transaction, TransactionData};
use crate::account::AccountCreateTransactionData;
use crate::file::FileAppendTransactionData;
use crate::topic::{TopicCreateTransactionData, TopicMessageSubmitTransactionData};
use crate::transfer::TransferTransactionData;
use crate::SdkResult;

/// A transaction of any supported kind, as returned by `from_bytes`
pub type AnyTransaction = Transaction<AnyTransactionData>;

macro_rules! any_transaction_data {
    ($($variant:ident($data:ty),)*) => {
        /// Kind-specific data of any supported transaction kind
        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyTransactionData {
            $(
                #[doc = concat!("See [`", stringify!($data), "`]")]
                $variant($data),
            )*
        }

        $(
            impl From<$data> for AnyTransactionData {
                fn from(data: $data) -> Self {
                    AnyTransactionData::$variant(data)
                }
            }
        )*

        impl TransactionData for AnyTransactionData {
            fn method(&self) -> &'static str {
                match self {
                    $(AnyTransactionData::$variant(data) => data.method(),)*
                }
            }

            fn to_body_data(&self, chunk: Option<&ChunkInfo>) -> Data {
                match self {
                    $(AnyTransactionData::$variant(data) => data.to_body_data(chunk),)*
                }
            }

            fn from_body_data(data: Data) -> SdkResult<Self> {
                Ok(match data {
                    Data::CryptoTransfer(_) => {
                        AnyTransactionData::Transfer(TransferTransactionData::from_body_data(data)?)
                    }
                    Data::CryptoCreateAccount(_) => AnyTransactionData::AccountCreate(
                        AccountCreateTransactionData::from_body_data(data)?,
                    ),
                    Data::ConsensusCreateTopic(_) => AnyTransactionData::TopicCreate(
                        TopicCreateTransactionData::from_body_data(data)?,
                    ),
                    Data::ConsensusSubmitMessage(_) => AnyTransactionData::TopicMessageSubmit(
                        TopicMessageSubmitTransactionData::from_body_data(data)?,
                    ),
                    Data::FileAppend(_) => {
                        AnyTransactionData::FileAppend(FileAppendTransactionData::from_body_data(data)?)
                    }
                })
            }

            fn merge_chunk(&mut self, chunk: Data) -> SdkResult<()> {
                match self {
                    $(AnyTransactionData::$variant(data) => data.merge_chunk(chunk),)*
                }
            }

            fn chunk_data(&self) -> Option<&ChunkData> {
                match self {
                    $(AnyTransactionData::$variant(data) => data.chunk_data(),)*
                }
            }

            fn chunk_data_mut(&mut self) -> Option<&mut ChunkData> {
                match self {
                    $(AnyTransactionData::$variant(data) => data.chunk_data_mut(),)*
                }
            }

            fn validate(&self) -> SdkResult<()> {
                match self {
                    $(AnyTransactionData::$variant(data) => data.validate(),)*
                }
            }
        }
    };
}

any_transaction_data! {
    Transfer(TransferTransactionData),
    AccountCreate(AccountCreateTransactionData),
    TopicCreate(TopicCreateTransactionData),
    TopicMessageSubmit(TopicMessageSubmitTransactionData),
    FileAppend(FileAppendTransactionData),
}
