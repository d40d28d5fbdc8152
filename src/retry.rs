use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Fixed-delay retry: one attempt plus up to `max_retries` more, with
/// `delay` slept between attempts and never after the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Runs `attempt` until it succeeds or the attempts are used up, returning
    /// the last error in the latter case. The closure receives the zero-based
    /// attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut attempt: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut retry = 0u32;
        loop {
            match attempt(retry).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if retry >= self.max_retries {
                        return Err(e);
                    }
                    debug!(attempt = retry + 1, max_attempts = self.max_attempts(), error = %e, "attempt failed, retrying");
                    retry += 1;
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
