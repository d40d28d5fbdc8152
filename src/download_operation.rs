use std::sync::Arc;
use std::time::Duration;
use tokio::spawn;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use crate::download_status::DownloadStatus;
use crate::download_tracker::DownloadProgress;
use crate::downloader::Downloader;
use crate::error::{DownloadError, Result};

/// Handle to a download running in the background, for observers that poll.
pub struct DownloadOperation {
    downloader: Arc<Downloader>,
    cancel_token: CancellationToken,
    handle: JoinHandle<Result<()>>,
}

impl DownloadOperation {
    /// Starts `downloader` on the current tokio runtime.
    pub fn spawn(downloader: Arc<Downloader>, cancel_token: CancellationToken) -> DownloadOperation {
        let handle = {
            let downloader = downloader.clone();
            let cancel_token = cancel_token.clone();
            spawn(async move { downloader.start_download(cancel_token).await })
        };
        DownloadOperation {
            downloader,
            cancel_token,
            handle,
        }
    }

    pub fn status(&self) -> DownloadStatus {
        self.downloader.status()
    }

    pub fn progress(&self) -> DownloadProgress {
        self.downloader.progress()
    }

    pub fn downloaded_size(&self) -> u64 {
        self.progress().downloaded_bytes
    }

    pub fn total_size(&self) -> u64 {
        self.progress().total_bytes
    }

    pub fn is_done(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    pub async fn join(self) -> Result<()> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(DownloadError::DownloadTask(e.to_string())),
        }
    }

    /// Waits for the run to end, or for the token to fire. After a stop the
    /// run gets `grace` to wind down before it is aborted; either way the
    /// result is [`DownloadError::Cancelled`].
    pub async fn wait(mut self, grace: Duration) -> Result<()> {
        tokio::select! {
            result = &mut self.handle => {
                if self.cancel_token.is_cancelled() {
                    return Err(DownloadError::Cancelled);
                }
                match result {
                    Ok(result) => result,
                    Err(e) => Err(DownloadError::DownloadTask(e.to_string())),
                }
            }
            _ = self.cancel_token.cancelled() => {
                if tokio::time::timeout(grace, &mut self.handle).await.is_err() {
                    warn!(grace_ms = grace.as_millis() as u64, "download did not stop in time, aborting");
                    self.handle.abort();
                }
                Err(DownloadError::Cancelled)
            }
        }
    }
}
