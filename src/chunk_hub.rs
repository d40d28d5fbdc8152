use std::collections::VecDeque;
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::spawn;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use crate::chunk::Chunk;
use crate::download_task::DownloadTask;
use crate::error::DownloadError;

/// Work queue of a single download. It is filled once at construction and
/// only ever drained afterwards.
pub struct ChunkHub {
    queue: Arc<Mutex<VecDeque<Chunk>>>,
}

impl ChunkHub {
    pub fn new(chunks: Vec<Chunk>) -> ChunkHub {
        ChunkHub {
            queue: Arc::new(Mutex::new(VecDeque::from(chunks))),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Spawns `worker_count` workers that pull chunks until the queue is
    /// drained or `cancel_token` fires.
    pub fn start_download(
        &self,
        worker_count: usize,
        task: Arc<DownloadTask>,
        cancel_token: CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let handle = spawn(run_worker(
                worker_id,
                self.queue.clone(),
                task.clone(),
                cancel_token.clone(),
            ));
            handles.push(handle);
        }
        handles
    }
}

async fn run_worker(
    worker_id: usize,
    queue: Arc<Mutex<VecDeque<Chunk>>>,
    task: Arc<DownloadTask>,
    cancel_token: CancellationToken,
) {
    loop {
        if cancel_token.is_cancelled() {
            debug!(worker_id, "worker observed cancellation");
            return;
        }
        let chunk = queue.lock().pop_front();
        let Some(chunk) = chunk else {
            debug!(worker_id, "queue drained, worker exiting");
            return;
        };
        let offset = chunk.offset;
        let size = chunk.remaining;
        match task.start_download(chunk, &cancel_token).await {
            Ok(()) => {}
            Err(DownloadError::Cancelled) => {
                debug!(worker_id, offset, "chunk interrupted by cancellation");
                return;
            }
            Err(e) => {
                warn!(worker_id, offset, size, error = %e, "chunk download failed");
            }
        }
    }
}
