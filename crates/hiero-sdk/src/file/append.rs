//! File append, split into chunks when large

use hiero_primitives::FileId;
use hiero_proto::{self as proto, transaction_body::Data};

use crate::transaction::{ChunkData, ChunkInfo, ChunkedTransactionData, Transaction, TransactionData};
use crate::{SdkError, SdkResult};

const DEFAULT_CHUNK_SIZE: usize = 2048;
const DEFAULT_MAX_CHUNKS: usize = 20;

/// Appends bytes to a file
pub type FileAppendTransaction = Transaction<FileAppendTransactionData>;

/// Data of a [`FileAppendTransaction`]
#[derive(Debug, Clone, PartialEq)]
pub struct FileAppendTransactionData {
    file_id: Option<FileId>,
    chunks: ChunkData,
}

impl Default for FileAppendTransactionData {
    fn default() -> Self {
        Self { file_id: None, chunks: ChunkData::new(DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNKS) }
    }
}

impl FileAppendTransactionData {
    /// Target file
    pub fn file_id(&self) -> Option<FileId> {
        self.file_id
    }

    /// All bytes to append
    pub fn contents(&self) -> &[u8] {
        &self.chunks.data
    }
}

impl TransactionData for FileAppendTransactionData {
    fn method(&self) -> &'static str {
        proto::services::FILE_APPEND
    }

    fn to_body_data(&self, chunk: Option<&ChunkInfo>) -> Data {
        let contents = match chunk {
            Some(info) if info.is_multi() => self.chunks.chunk(info.current).to_vec(),
            _ => self.chunks.data.clone(),
        };
        Data::FileAppend(proto::FileAppendTransactionBody { file_id: self.file_id.map(Into::into), contents })
    }

    fn from_body_data(data: Data) -> SdkResult<Self> {
        let Data::FileAppend(body) = data else {
            return Err(SdkError::Decode("expected a file append body".into()));
        };
        let mut chunks = ChunkData::new(DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNKS);
        chunks.data = body.contents;
        Ok(Self { file_id: body.file_id.map(FileId::try_from).transpose()?, chunks })
    }

    fn merge_chunk(&mut self, data: Data) -> SdkResult<()> {
        let Data::FileAppend(body) = data else {
            return Err(SdkError::Decode("expected a file append body".into()));
        };
        if body.file_id.map(FileId::try_from).transpose()? != self.file_id {
            return Err(SdkError::Decode("chunks target different files".into()));
        }
        self.chunks.data.extend_from_slice(&body.contents);
        Ok(())
    }

    fn chunk_data(&self) -> Option<&ChunkData> {
        Some(&self.chunks)
    }

    fn chunk_data_mut(&mut self) -> Option<&mut ChunkData> {
        Some(&mut self.chunks)
    }

    fn validate(&self) -> SdkResult<()> {
        if self.file_id.is_none() {
            return Err(SdkError::MissingField("file_id"));
        }
        Ok(())
    }
}

impl ChunkedTransactionData for FileAppendTransactionData {}

impl Transaction<FileAppendTransactionData> {
    /// Set the target file
    pub fn set_file_id(&mut self, id: FileId) -> SdkResult<&mut Self> {
        self.data_mut()?.file_id = Some(id);
        Ok(self)
    }

    /// Set the bytes to append
    pub fn set_contents(&mut self, contents: impl Into<Vec<u8>>) -> SdkResult<&mut Self> {
        self.data_mut()?.chunks.data = contents.into();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiero_primitives::{AccountId, Timestamp, TransactionId};

    #[test]
    fn test_defaults() {
        let tx = FileAppendTransaction::new();
        assert_eq!(tx.chunk_size(), 2048);
        assert_eq!(tx.max_chunks(), 20);
    }

    #[test]
    fn test_freeze_splits_contents() {
        let mut tx = FileAppendTransaction::new();
        tx.set_file_id(FileId::from_num(150))
            .unwrap()
            .set_contents(vec![1u8; 5000])
            .unwrap()
            .set_node_account_ids(vec![AccountId::from_num(3)])
            .unwrap()
            .set_transaction_id(TransactionId::with_valid_start(AccountId::from_num(2), Timestamp::new(9, 0)))
            .unwrap()
            .freeze()
            .unwrap();

        assert_eq!(tx.required_chunks(), 3);
        assert_eq!(tx.all_transaction_hashes_per_node().unwrap().len(), 3);
        assert!(matches!(tx.set_chunk_size(10), Err(SdkError::Frozen)));
    }

    #[test]
    fn test_file_required() {
        assert!(matches!(
            FileAppendTransactionData::default().validate(),
            Err(SdkError::MissingField("file_id"))
        ));
    }
}
