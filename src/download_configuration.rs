use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use crate::error::{DownloadError, Result};
use crate::retry::RetryPolicy;

pub const DEFAULT_WORKER_COUNT: usize = 5;
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;
pub const DEFAULT_RETRY_TIMES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The immutable half of a download job.
#[derive(Debug, Clone)]
pub struct DownloadConfiguration {
    pub url: Arc<String>,
    pub file_path: PathBuf,
    pub worker_count: usize,
    pub chunk_size: u64,
    pub retry_times_on_failure: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

pub struct DownloadConfigurationBuilder {
    url: Option<String>,
    file_path: Option<PathBuf>,
    worker_count: usize,
    chunk_size: u64,
    retry_times_on_failure: u32,
    retry_delay: Duration,
    timeout: Duration,
}

impl DownloadConfigurationBuilder {
    fn new() -> Self {
        Self {
            url: None,
            file_path: None,
            worker_count: DEFAULT_WORKER_COUNT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry_times_on_failure: DEFAULT_RETRY_TIMES,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn set_url(mut self, url: impl Into<String>) -> DownloadConfigurationBuilder {
        self.url = Some(url.into());
        self
    }

    pub fn set_file_path(mut self, path: impl AsRef<Path>) -> DownloadConfigurationBuilder {
        self.file_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn set_worker_count(mut self, worker_count: usize) -> DownloadConfigurationBuilder {
        self.worker_count = worker_count;
        self
    }

    pub fn set_chunk_size(mut self, chunk_size: u64) -> DownloadConfigurationBuilder {
        self.chunk_size = chunk_size;
        self
    }

    pub fn set_retry_times_on_failure(mut self, retry_times: u32) -> DownloadConfigurationBuilder {
        self.retry_times_on_failure = retry_times;
        self
    }

    pub fn set_retry_delay(mut self, delay: Duration) -> DownloadConfigurationBuilder {
        self.retry_delay = delay;
        self
    }

    pub fn set_timeout(mut self, timeout: Duration) -> DownloadConfigurationBuilder {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<DownloadConfiguration> {
        let url = match self.url {
            Some(url) if !url.is_empty() => url,
            _ => return Err(DownloadError::Configuration("download url is not set".to_string())),
        };
        let file_path = match self.file_path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err(DownloadError::Configuration("output file path is not set".to_string())),
        };
        if self.worker_count == 0 {
            return Err(DownloadError::Configuration("worker count must be positive".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(DownloadError::Configuration("chunk size must be positive".to_string()));
        }

        Ok(DownloadConfiguration {
            url: Arc::new(url),
            file_path,
            worker_count: self.worker_count,
            chunk_size: self.chunk_size,
            retry_times_on_failure: self.retry_times_on_failure,
            retry_delay: self.retry_delay,
            timeout: self.timeout,
        })
    }
}

impl DownloadConfiguration {
    pub fn new() -> DownloadConfigurationBuilder {
        DownloadConfigurationBuilder::new()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_times_on_failure, self.retry_delay)
    }
}
