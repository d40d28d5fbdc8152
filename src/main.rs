use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use chunk_downloader::download_configuration::{DownloadConfiguration, DEFAULT_CHUNK_SIZE, DEFAULT_WORKER_COUNT};
use chunk_downloader::download_operation::DownloadOperation;
use chunk_downloader::downloader::Downloader;
use chunk_downloader::error::DownloadError;
use chunk_downloader::file_name::generate_output_file;
use chunk_downloader::CancellationToken;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);
const INTERRUPTED: u8 = 130;

/// Download a file over HTTP using concurrent range requests.
#[derive(Parser)]
#[command(name = "chunk-downloader", version)]
struct Cli {
    /// URL of the file to download
    #[arg(long)]
    url: Option<String>,
    /// Output file name (derived from the URL when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Number of concurrent workers
    #[arg(short, long, default_value_t = DEFAULT_WORKER_COUNT)]
    workers: usize,
    /// Size of each chunk in bytes
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: u64,
    /// Additional attempts for a failed request
    #[arg(long, default_value_t = 3)]
    retries: u32,
    /// Seconds to wait between attempts
    #[arg(long, default_value_t = 3)]
    retry_delay: u64,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(url) = cli.url.clone() else {
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    match run(cli, url).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(DownloadError::Cancelled) => {
            eprintln!("{}", DownloadError::Cancelled);
            ExitCode::from(INTERRUPTED)
        }
        Err(e) => {
            eprintln!("fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, url: String) -> Result<(), DownloadError> {
    let output = cli.output.unwrap_or_else(|| PathBuf::from(generate_output_file(&url)));
    let config = DownloadConfiguration::new()
        .set_url(url.clone())
        .set_file_path(&output)
        .set_worker_count(cli.workers)
        .set_chunk_size(cli.chunk_size)
        .set_retry_times_on_failure(cli.retries)
        .set_retry_delay(Duration::from_secs(cli.retry_delay))
        .set_timeout(Duration::from_secs(cli.timeout))
        .build()?;
    let downloader = Arc::new(Downloader::new(config)?);

    println!("File Name:    {}", output.display());
    println!("Download URL: {}", url);
    println!();

    let cancel_token = CancellationToken::new();
    {
        let cancel_token = cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            eprintln!("\nReceived interrupt signal. Shutting down...");
            cancel_token.cancel();
            // A second interrupt does not wait for the workers.
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(INTERRUPTED as i32);
            }
        });
    }

    let started = Instant::now();
    let operation = DownloadOperation::spawn(downloader, cancel_token.clone());
    let progress_bar = render_progress(&operation, &cancel_token).await;
    match operation.wait(SHUTDOWN_GRACE).await {
        Ok(()) => {
            progress_bar.finish();
            println!("Download completed successfully! ({})", format_duration(started.elapsed()));
            Ok(())
        }
        Err(e) => {
            progress_bar.abandon();
            Err(e)
        }
    }
}

async fn render_progress(operation: &DownloadOperation, cancel_token: &CancellationToken) -> ProgressBar {
    let progress_bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] [{bar:40}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    );
    if let Ok(style) = style {
        progress_bar.set_style(style.progress_chars("=> "));
    }

    let mut interval = tokio::time::interval(PROGRESS_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = cancel_token.cancelled() => break,
        }
        let progress = operation.progress();
        progress_bar.set_length(progress.total_bytes);
        progress_bar.set_position(progress.downloaded_bytes);
        if operation.status().is_terminal() || operation.is_done() {
            break;
        }
    }
    progress_bar
}

fn format_duration(duration: Duration) -> String {
    let seconds = (duration.as_millis() + 500) / 1000;
    format!("{:02}:{:02}:{:02}", seconds / 3600, seconds % 3600 / 60, seconds % 60)
}
