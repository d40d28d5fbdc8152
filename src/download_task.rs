use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use crate::chunk::Chunk;
use crate::download_tracker::DownloadTracker;
use crate::error::{DownloadError, Result};
use crate::file_store::FileStore;
use crate::remote_file::RangeFetcher;

pub const BUFFER_SIZE: usize = 32 * 1024;

/// Moves one chunk from the network onto disk.
pub struct DownloadTask {
    fetcher: Arc<dyn RangeFetcher>,
    file_store: Arc<dyn FileStore>,
    tracker: Arc<DownloadTracker>,
    file_path: PathBuf,
}

impl DownloadTask {
    pub fn new(
        fetcher: Arc<dyn RangeFetcher>,
        file_store: Arc<dyn FileStore>,
        tracker: Arc<DownloadTracker>,
        file_path: PathBuf,
    ) -> DownloadTask {
        DownloadTask {
            fetcher,
            file_store,
            tracker,
            file_path,
        }
    }

    /// Streams the chunk in [`BUFFER_SIZE`] reads, writing each read at the
    /// chunk's current offset. A failed read abandons the rest of the chunk;
    /// bytes already written stay on disk and stay counted.
    pub async fn start_download(&self, mut chunk: Chunk, cancel_token: &CancellationToken) -> Result<()> {
        let reader = self.fetcher.fetch_range(&chunk.url, chunk.offset, chunk.remaining).await?;
        // Never accept more than was asked for.
        let mut reader = reader.take(chunk.remaining);
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            if cancel_token.is_cancelled() {
                return Err(DownloadError::Cancelled);
            }
            let length = match reader.read(&mut buffer).await {
                Ok(0) => break,
                Ok(length) => length,
                Err(source) => {
                    return Err(DownloadError::PartialChunk {
                        offset: chunk.offset,
                        remaining: chunk.remaining,
                        source,
                    });
                }
            };
            self.file_store.write_at(&self.file_path, chunk.offset, &buffer[..length]).await?;
            chunk.advance(length as u64);
            self.tracker.add_downloaded(length as u64);
        }

        if !chunk.eof() {
            warn!(offset = chunk.offset, remaining = chunk.remaining, "stream ended before the chunk was complete");
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;
    use std::path::Path;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::io::{AsyncRead, ReadBuf};
    use crate::chunk_range::ChunkRange;
    use crate::remote_file::ChunkReader;
    use super::*;

    /// Fails every read.
    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset")))
        }
    }

    struct FakeFetcher {
        body: Vec<u8>,
        break_after: Option<usize>,
    }

    #[async_trait]
    impl RangeFetcher for FakeFetcher {
        async fn probe_size(&self, _url: &str) -> Result<u64> {
            Ok(self.body.len() as u64)
        }

        async fn fetch_range(&self, _url: &str, _offset: u64, _size: u64) -> Result<ChunkReader> {
            match self.break_after {
                Some(length) => Ok(Box::new(Cursor::new(self.body[..length].to_vec()).chain(BrokenReader))),
                None => Ok(Box::new(Cursor::new(self.body.clone()))),
            }
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<(u64, usize)>>,
    }

    #[async_trait]
    impl FileStore for RecordingStore {
        async fn create(&self, _path: &Path, _length: u64) -> Result<()> {
            Ok(())
        }

        async fn write_at(&self, _path: &Path, offset: u64, buffer: &[u8]) -> Result<()> {
            self.writes.lock().push((offset, buffer.len()));
            Ok(())
        }

        async fn size(&self, _path: &Path) -> Result<u64> {
            Ok(0)
        }
    }

    fn chunk(start: u64, end: u64) -> Chunk {
        Chunk::new(Arc::new("http://localhost/file".to_string()), ChunkRange::from_start_end(start, end))
    }

    fn task(fetcher: FakeFetcher, store: Arc<RecordingStore>, tracker: Arc<DownloadTracker>) -> DownloadTask {
        DownloadTask::new(Arc::new(fetcher), store, tracker, PathBuf::from("out.bin"))
    }

    #[tokio::test]
    async fn test_writes_in_buffer_sized_steps() {
        let store = Arc::new(RecordingStore::default());
        let tracker = Arc::new(DownloadTracker::new());
        let fetcher = FakeFetcher { body: vec![7u8; 100_000], break_after: None };

        task(fetcher, store.clone(), tracker.clone())
            .start_download(chunk(1000, 100_999), &CancellationToken::new())
            .await
            .unwrap();

        let writes = store.writes.lock().clone();
        let mut expected_offset = 1000u64;
        for (offset, length) in &writes {
            assert_eq!(*offset, expected_offset);
            assert!(*length <= BUFFER_SIZE);
            expected_offset += *length as u64;
        }
        assert_eq!(expected_offset, 101_000);
        assert_eq!(tracker.progress().downloaded_bytes, 100_000);
    }

    #[tokio::test]
    async fn test_extra_bytes_are_ignored() {
        let store = Arc::new(RecordingStore::default());
        let tracker = Arc::new(DownloadTracker::new());
        let fetcher = FakeFetcher { body: vec![1u8; 5000], break_after: None };

        task(fetcher, store, tracker.clone())
            .start_download(chunk(0, 999), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(tracker.progress().downloaded_bytes, 1000);
    }

    #[tokio::test]
    async fn test_read_failure_abandons_chunk() {
        let store = Arc::new(RecordingStore::default());
        let tracker = Arc::new(DownloadTracker::new());
        let fetcher = FakeFetcher { body: vec![1u8; 10_000], break_after: Some(4000) };

        let result = task(fetcher, store, tracker.clone())
            .start_download(chunk(0, 9999), &CancellationToken::new())
            .await;

        match result {
            Err(DownloadError::PartialChunk { offset, remaining, .. }) => {
                assert_eq!(offset, 4000);
                assert_eq!(remaining, 6000);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(tracker.progress().downloaded_bytes, 4000);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_read() {
        let store = Arc::new(RecordingStore::default());
        let tracker = Arc::new(DownloadTracker::new());
        let fetcher = FakeFetcher { body: vec![1u8; 1000], break_after: None };
        let cancel_token = CancellationToken::new();
        cancel_token.cancel();

        let result = task(fetcher, store.clone(), tracker)
            .start_download(chunk(0, 999), &cancel_token)
            .await;

        assert!(matches!(result, Err(DownloadError::Cancelled)));
        assert!(store.writes.lock().is_empty());
    }
}
