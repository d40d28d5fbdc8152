use std::sync::Arc;
use futures::future::join_all;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use crate::chunk::plan_chunks;
use crate::chunk_hub::ChunkHub;
use crate::download_configuration::DownloadConfiguration;
use crate::download_status::DownloadStatus;
use crate::download_task::DownloadTask;
use crate::download_tracker::{DownloadProgress, DownloadTracker};
use crate::error::Result;
use crate::file_store::{FileStore, LocalFileStore};
use crate::remote_file::{HttpRangeFetcher, RangeFetcher};

/// Drives one download through `Initializing -> Planning -> Running ->
/// Completed`. A failure before `Running` ends in `Failed` and is returned
/// to the caller; failures of individual chunks are only logged.
pub struct Downloader {
    config: Arc<DownloadConfiguration>,
    fetcher: Arc<dyn RangeFetcher>,
    file_store: Arc<dyn FileStore>,
    tracker: Arc<DownloadTracker>,
    status: RwLock<DownloadStatus>,
}

impl Downloader {
    pub fn new(config: DownloadConfiguration) -> Result<Downloader> {
        let fetcher = HttpRangeFetcher::new(config.timeout, config.retry_policy())?;
        Ok(Downloader::with_parts(config, Arc::new(fetcher), Arc::new(LocalFileStore::new())))
    }

    pub fn with_parts(
        config: DownloadConfiguration,
        fetcher: Arc<dyn RangeFetcher>,
        file_store: Arc<dyn FileStore>,
    ) -> Downloader {
        Downloader {
            config: Arc::new(config),
            fetcher,
            file_store,
            tracker: Arc::new(DownloadTracker::new()),
            status: RwLock::new(DownloadStatus::None),
        }
    }

    /// Snapshot of the progress counters. Safe to call from any thread at
    /// any time; `total_bytes` is zero until the size probe succeeds.
    pub fn progress(&self) -> DownloadProgress {
        self.tracker.progress()
    }

    pub fn status(&self) -> DownloadStatus {
        *self.status.read()
    }

    fn change_status(&self, to_status: DownloadStatus) {
        *self.status.write() = to_status;
        info!(status = %to_status, url = %self.config.url, "download status changed");
    }

    pub async fn start_download(&self, cancel_token: CancellationToken) -> Result<()> {
        self.change_status(DownloadStatus::Initializing);
        let total_length = match self.fetcher.probe_size(&self.config.url).await {
            Ok(total_length) => total_length,
            Err(e) => {
                self.change_status(DownloadStatus::Failed);
                return Err(e);
            }
        };
        self.tracker.set_total_size(total_length);

        self.change_status(DownloadStatus::Planning);
        if let Err(e) = self.file_store.create(&self.config.file_path, total_length).await {
            self.change_status(DownloadStatus::Failed);
            return Err(e);
        }
        let chunk_hub = ChunkHub::new(plan_chunks(&self.config.url, total_length, self.config.chunk_size));
        info!(
            total_length,
            chunk_count = chunk_hub.len(),
            worker_count = self.config.worker_count,
            "download planned"
        );

        self.change_status(DownloadStatus::Running);
        let task = Arc::new(DownloadTask::new(
            self.fetcher.clone(),
            self.file_store.clone(),
            self.tracker.clone(),
            self.config.file_path.clone(),
        ));
        let handles = chunk_hub.start_download(self.config.worker_count, task, cancel_token.clone());
        for result in join_all(handles).await {
            if let Err(e) = result {
                error!(error = %e, "download worker panicked");
            }
        }

        self.tracker.mark_completed();
        self.change_status(DownloadStatus::Completed);
        let progress = self.tracker.progress();
        info!(
            downloaded_bytes = progress.downloaded_bytes,
            total_bytes = progress.total_bytes,
            cancelled = cancel_token.is_cancelled(),
            "download finished"
        );
        Ok(())
    }
}
