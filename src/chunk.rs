use std::sync::Arc;
use crate::chunk_range::ChunkRange;

/// A unit of work owned by exactly one worker. `offset` and `remaining`
/// move together as bytes land on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub url: Arc<String>,
    pub offset: u64,
    pub remaining: u64,
}

impl Chunk {
    pub fn new(url: Arc<String>, chunk_range: ChunkRange) -> Chunk {
        Chunk {
            url,
            offset: chunk_range.start,
            remaining: chunk_range.chunk_length(),
        }
    }

    pub fn advance(&mut self, length: u64) {
        self.offset += length;
        self.remaining -= length;
    }

    pub fn eof(&self) -> bool {
        self.remaining == 0
    }
}

/// Builds the chunk plan for a file of `total_size` bytes.
pub fn plan_chunks(url: &Arc<String>, total_size: u64, chunk_size: u64) -> Vec<Chunk> {
    ChunkRange::from_chunk_size(total_size, chunk_size)
        .into_iter()
        .map(|range| Chunk::new(url.clone(), range))
        .collect()
}
