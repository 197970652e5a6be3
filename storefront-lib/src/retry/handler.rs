//! Retry loop.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::RetryConfig;

/// Delay before retry number `attempt` (0-based): `initial × 2^attempt`.
///
/// Saturates at [`Duration::MAX`] instead of overflowing.
pub fn backoff_delay(initial: Duration, attempt: u32) -> Duration {
    2u32.checked_pow(attempt)
        .and_then(|factor| initial.checked_mul(factor))
        .unwrap_or(Duration::MAX)
}

/// Failure of a cancellable retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The cancellation token fired before the operation succeeded.
    Cancelled,
    /// The last attempt failed and no retries remain.
    Failed(E),
}

impl<E> RetryError<E> {
    /// Returns the operation's error, or `None` if the loop was cancelled.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Cancelled => None,
            Self::Failed(err) => Some(err),
        }
    }

    /// Returns `true` if the loop was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Per-call retry bookkeeping.
struct RetryState {
    attempt: u32,
    max_retries: u32,
    initial_delay: Duration,
}

impl RetryState {
    /// Returns the delay before the next attempt, or `None` once retries are exhausted.
    fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }
        let delay = backoff_delay(self.initial_delay, self.attempt);
        self.attempt += 1;
        log::warn!(
            "[retry] attempt failed, retry {}/{} in {:?}",
            self.attempt,
            self.max_retries,
            delay
        );
        Some(delay)
    }
}

/// Runs async operations with bounded exponential-backoff retry.
///
/// # Example
///
/// ```ignore
/// let handler = RetryHandler::new(RetryConfig::default().max_retries(2));
/// let body = handler.retry(|| fetch_cart(&client)).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct RetryHandler {
    config: RetryConfig,
}

impl RetryHandler {
    /// Creates a handler with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    fn state(&self) -> RetryState {
        RetryState {
            attempt: 0,
            max_retries: self.config.max_retries,
            initial_delay: self.config.initial_delay,
        }
    }

    /// Runs `op`, retrying every failure.
    ///
    /// Makes at most `max_retries + 1` attempts and returns the last error
    /// unchanged. Intermediate errors are dropped.
    pub async fn retry<T, E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.retry_if(op, |_| true).await
    }

    /// Runs `op`, retrying only the failures `should_retry` accepts.
    pub async fn retry_if<T, E, F, Fut, P>(&self, mut op: F, mut should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: FnMut(&E) -> bool,
    {
        let mut state = self.state();
        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !should_retry(&err) {
                log::debug!("[retry] failure is not retryable");
                return Err(err);
            }
            let Some(delay) = state.next_delay() else {
                log::warn!("[retry] giving up after {} attempt(s)", state.attempt + 1);
                return Err(err);
            };
            tokio::time::sleep(delay).await;
        }
    }

    /// Runs `op` like [`retry`](Self::retry), aborting the backoff when `cancel` fires.
    ///
    /// An attempt already in flight is not interrupted; cancellation is observed
    /// before each attempt and while waiting between attempts.
    pub async fn retry_until_cancelled<T, E, F, Fut>(
        &self,
        mut op: F,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut state = self.state();
        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled);
            }

            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let Some(delay) = state.next_delay() else {
                log::warn!("[retry] giving up after {} attempt(s)", state.attempt + 1);
                return Err(RetryError::Failed(err));
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    log::debug!("[retry] backoff cancelled");
                    return Err(RetryError::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

/// Runs `op` with `max_retries` retries starting at `initial_delay`.
pub async fn retry<T, E, F, Fut>(op: F, max_retries: u32, initial_delay: Duration) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    RetryHandler::new(RetryConfig {
        max_retries,
        initial_delay,
    })
    .retry(op)
    .await
}
