//! Bounded exponential-backoff retry for a single request.
//!
//! Delays are `min(1000ms * 2^attempt, 5000ms)` with no jitter. Client
//! errors (4xx other than 429) stop immediately.

use std::future::Future;
use std::time::Duration;

use backoff::future::retry_notify;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::error::ApiError;

/// Extra attempts after the first one.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const INITIAL_DELAY: Duration = Duration::from_millis(1000);
const MAX_DELAY: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: INITIAL_DELAY,
            max_delay: MAX_DELAY,
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_randomization_factor(0.0)
            .with_multiplier(2.0)
            .with_max_interval(self.max_delay)
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Runs `request` until it succeeds, fails with a final error, or the
/// retry budget is spent. The last error is returned unchanged.
pub async fn retry_request<T, F, Fut>(policy: &RetryPolicy, mut request: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let max_retries = policy.max_retries;
    let mut attempt: u32 = 0;

    retry_notify(
        policy.backoff(),
        || {
            let current = attempt;
            attempt += 1;
            let call = request();
            async move {
                call.await.map_err(|err| {
                    if current >= max_retries || !err.is_retryable() {
                        backoff::Error::permanent(err)
                    } else {
                        backoff::Error::transient(err)
                    }
                })
            }
        },
        |err: ApiError, delay: Duration| {
            tracing::warn!(
                error = %err,
                status = ?err.status,
                delay_ms = delay.as_millis() as u64,
                "Request failed, retrying"
            );
        },
    )
    .await
}
