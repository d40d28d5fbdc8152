//! # chunk-downloader
//!
//! Fetches one remote file over HTTP by splitting it into byte-range chunks
//! and downloading them concurrently with a fixed pool of workers.
//!
//! Features:
//! - Size probe and `Range` requests with fixed-delay retry
//! - Positioned writes straight into a pre-sized output file
//! - Lock-protected progress snapshots for polling observers
//! - Cooperative cancellation via `CancellationToken`

mod chunk_hub;
mod download_task;
pub mod chunk;
pub mod chunk_range;
pub mod error;
pub mod retry;
pub mod remote_file;
pub mod file_store;
pub mod file_name;
pub mod download_status;
pub mod download_tracker;
pub mod download_configuration;
pub mod downloader;
pub mod download_operation;

pub use tokio_util::sync::CancellationToken;
