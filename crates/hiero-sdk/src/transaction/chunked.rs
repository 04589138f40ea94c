//! Payload splitting for transactions larger than one frame

use hiero_primitives::TransactionId;

use super::{Transaction, TransactionData};
use crate::{SdkError, SdkResult};

/// Payload of a chunked transaction kind and its splitting limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkData {
    /// The whole payload
    pub data: Vec<u8>,
    /// Bytes per chunk
    pub chunk_size: usize,
    /// Allowed number of chunks
    pub max_chunks: usize,
    /// Wait for each chunk's receipt before sending the next one
    pub should_get_receipt: bool,
}

impl ChunkData {
    /// Empty payload with the given limits
    pub fn new(chunk_size: usize, max_chunks: usize) -> Self {
        Self {
            data: Vec::new(),
            chunk_size: chunk_size.max(1),
            max_chunks,
            should_get_receipt: true,
        }
    }

    /// `max(1, ceil(len / chunk_size))`
    pub fn required_chunks(&self) -> usize {
        self.data.len().div_ceil(self.chunk_size.max(1)).max(1)
    }

    /// Whether the payload spans more than one chunk
    pub fn is_multi_chunk(&self) -> bool {
        self.data.len() > self.chunk_size
    }

    /// Bytes of chunk `index`
    pub fn chunk(&self, index: usize) -> &[u8] {
        let start = index.saturating_mul(self.chunk_size).min(self.data.len());
        let end = start.saturating_add(self.chunk_size).min(self.data.len());
        &self.data[start..end]
    }

    /// Fail with `TooManyChunks` when the payload does not fit
    pub fn check_chunk_count(&self) -> SdkResult<usize> {
        let required = self.required_chunks();
        if required > self.max_chunks {
            return Err(SdkError::TooManyChunks { required, max: self.max_chunks });
        }
        Ok(required)
    }
}

/// Position of one chunk in a chunked execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    /// Zero-based chunk index
    pub current: usize,
    /// Number of chunks
    pub total: usize,
    /// Identifier of chunk 0, naming the logical transaction
    pub initial_transaction_id: TransactionId,
    /// Identifier of this chunk
    pub current_transaction_id: TransactionId,
}

impl ChunkInfo {
    /// Whether this chunk belongs to a multi-chunk execution
    pub fn is_multi(&self) -> bool {
        self.total > 1
    }
}

/// Marker for transaction kinds whose payload is split into chunks
pub trait ChunkedTransactionData: TransactionData {}

impl<D: ChunkedTransactionData> Transaction<D> {
    fn chunk_data_for_update(&mut self) -> SdkResult<&mut ChunkData> {
        self.data_mut()?
            .chunk_data_mut()
            .ok_or_else(|| SdkError::InvalidArgument("transaction kind carries no chunked payload".into()))
    }

    /// Set the bytes per chunk
    pub fn set_chunk_size(&mut self, size: usize) -> SdkResult<&mut Self> {
        if size == 0 {
            return Err(SdkError::InvalidArgument("chunk size must be positive".into()));
        }
        self.chunk_data_for_update()?.chunk_size = size;
        Ok(self)
    }

    /// Set the allowed number of chunks
    pub fn set_max_chunks(&mut self, max: usize) -> SdkResult<&mut Self> {
        self.chunk_data_for_update()?.max_chunks = max;
        Ok(self)
    }

    /// Choose whether each chunk waits for its receipt
    pub fn set_should_get_receipt(&mut self, value: bool) -> SdkResult<&mut Self> {
        self.chunk_data_for_update()?.should_get_receipt = value;
        Ok(self)
    }

    /// Bytes per chunk
    pub fn chunk_size(&self) -> usize {
        self.data.chunk_data().map_or(usize::MAX, |c| c.chunk_size)
    }

    /// Allowed number of chunks
    pub fn max_chunks(&self) -> usize {
        self.data.chunk_data().map_or(1, |c| c.max_chunks)
    }

    /// Whether each chunk waits for its receipt
    pub fn should_get_receipt(&self) -> bool {
        self.data.chunk_data().map_or(false, |c| c.should_get_receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(len: usize, size: usize, max: usize) -> ChunkData {
        let mut chunks = ChunkData::new(size, max);
        chunks.data = (0..len).map(|i| i as u8).collect();
        chunks
    }

    #[test]
    fn test_required_chunks() {
        assert_eq!(payload(0, 1024, 20).required_chunks(), 1);
        assert_eq!(payload(1024, 1024, 20).required_chunks(), 1);
        assert_eq!(payload(1025, 1024, 20).required_chunks(), 2);
        assert_eq!(payload(4 * 1024 + 1, 1024, 20).required_chunks(), 5);
    }

    #[test]
    fn test_chunk_slices_cover_payload() {
        let chunks = payload(10, 4, 5);
        assert_eq!(chunks.chunk(0), &[0, 1, 2, 3]);
        assert_eq!(chunks.chunk(2), &[8, 9]);
        assert!(chunks.chunk(3).is_empty());
        let joined: Vec<u8> = (0..chunks.required_chunks()).flat_map(|i| chunks.chunk(i).to_vec()).collect();
        assert_eq!(joined, chunks.data);
    }

    #[test]
    fn test_too_many_chunks() {
        assert!(matches!(
            payload(4 * 10 + 1, 10, 3).check_chunk_count(),
            Err(SdkError::TooManyChunks { required: 5, max: 3 })
        ));
        assert_eq!(payload(41, 10, 5).check_chunk_count().unwrap(), 5);
    }

    #[test]
    fn test_zero_chunk_size_clamped() {
        assert_eq!(ChunkData::new(0, 1).chunk_size, 1);
    }
}
