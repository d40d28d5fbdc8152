/// Inclusive byte range `[start, end]` of the remote file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChunkRange {
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    pub fn from_start_end(start: u64, end: u64) -> ChunkRange {
        ChunkRange {
            start,
            end,
        }
    }

    /// Splits `[0, total_size)` into ascending, contiguous ranges of
    /// `chunk_size` bytes; the last range holds the remainder.
    pub fn from_chunk_size(total_size: u64, chunk_size: u64) -> Vec<ChunkRange> {
        if total_size == 0 || chunk_size == 0 {
            return Vec::new();
        }
        let chunk_count = total_size.div_ceil(chunk_size);
        let mut chunk_ranges: Vec<ChunkRange> = Vec::with_capacity(chunk_count as usize);
        for index in 0..chunk_count {
            let start_position = index * chunk_size;
            let end_position = (start_position + chunk_size).min(total_size) - 1;
            chunk_ranges.push(ChunkRange::from_start_end(start_position, end_position));
        }
        chunk_ranges
    }

    pub fn chunk_length(&self) -> u64 {
        self.end - self.start + 1
    }
}
