use std::io;
use std::time::Duration;
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};
use crate::error::{DownloadError, RequestError, Result};
use crate::retry::RetryPolicy;

/// Body of a range response, positioned at the first requested byte.
pub type ChunkReader = Box<dyn AsyncRead + Send + Unpin>;

/// Network side of a download. Both operations retry internally; once a
/// [`ChunkReader`] is handed out, read errors belong to the caller.
#[async_trait]
pub trait RangeFetcher: Send + Sync {
    /// Total length of the resource in bytes.
    async fn probe_size(&self, url: &str) -> Result<u64>;

    /// Streams `size` bytes starting at `offset`.
    async fn fetch_range(&self, url: &str, offset: u64, size: u64) -> Result<ChunkReader>;
}

pub fn range_header(offset: u64, size: u64) -> String {
    format!("bytes={}-{}", offset, offset + size - 1)
}

pub struct HttpRangeFetcher {
    client: Client,
    retry_policy: RetryPolicy,
}

impl HttpRangeFetcher {
    pub fn new(timeout: Duration, retry_policy: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DownloadError::Configuration(format!("failed to create http client: {}", e)))?;
        Ok(Self::with_client(client, retry_policy))
    }

    pub fn with_client(client: Client, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
        }
    }

    async fn probe_once(&self, url: &str) -> core::result::Result<u64, RequestError> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(RequestError::Status(response.status()));
        }
        // The body is never read; dropping the response releases the connection.
        response.content_length().ok_or(RequestError::MissingContentLength)
    }

    async fn fetch_range_once(&self, url: &str, offset: u64, size: u64) -> core::result::Result<reqwest::Response, RequestError> {
        let response = self.client
            .get(url)
            .header(RANGE, range_header(offset, size))
            .send()
            .await?;
        if response.status() != StatusCode::PARTIAL_CONTENT {
            return Err(RequestError::Status(response.status()));
        }
        Ok(response)
    }
}

#[async_trait]
impl RangeFetcher for HttpRangeFetcher {
    async fn probe_size(&self, url: &str) -> Result<u64> {
        let retries = self.retry_policy.max_retries;
        match self.retry_policy.run(|_| self.probe_once(url)).await {
            Ok(total_length) => {
                debug!(url, total_length, "probed remote file size");
                Ok(total_length)
            }
            Err(source) => {
                warn!(url, error = %source, "size probe failed");
                Err(DownloadError::SizeProbe { retries, source })
            }
        }
    }

    async fn fetch_range(&self, url: &str, offset: u64, size: u64) -> Result<ChunkReader> {
        let retries = self.retry_policy.max_retries;
        let response = self.retry_policy
            .run(|_| self.fetch_range_once(url, offset, size))
            .await
            .map_err(|source| DownloadError::RangeFetch { offset, size, retries, source })?;
        let body = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        Ok(Box::new(StreamReader::new(Box::pin(body))))
    }
}
