use std::io;
use std::path::PathBuf;
use reqwest::StatusCode;
use thiserror::Error;

/// Cause of a single failed request attempt.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(StatusCode),
    #[error("response has no content length")]
    MissingContentLength,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("failed to get file size after {retries} retries: {source}")]
    SizeProbe {
        retries: u32,
        #[source]
        source: RequestError,
    },
    #[error("failed to download range {offset}+{size} after {retries} retries: {source}")]
    RangeFetch {
        offset: u64,
        size: u64,
        retries: u32,
        #[source]
        source: RequestError,
    },
    #[error("failed to create output file {}: {source}", .path.display())]
    FileCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {} at offset {offset}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        offset: u64,
        #[source]
        source: io::Error,
    },
    #[error("failed to read metadata of {}: {source}", .path.display())]
    FileMetadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stream failed at offset {offset} with {remaining} bytes left: {source}")]
    PartialChunk {
        offset: u64,
        remaining: u64,
        #[source]
        source: io::Error,
    },
    #[error("download cancelled")]
    Cancelled,
    #[error("download task failed: {0}")]
    DownloadTask(String),
}

pub type Result<T> = core::result::Result<T, DownloadError>;
