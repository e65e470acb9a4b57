//! Linear back-off retry loop shared by every upstream call.
//!
//! Each call gets a fixed attempt budget. Attempt `n` waits
//! `backoff_step * (n - 1)` before it starts (0s, 3s, 6s, ... with the
//! default 3s step), and every attempt runs under its own timeout. Attempts
//! are strictly sequential.

use std::future::Future;
use std::time::Duration;

use starlane_core::AppConfig;

use crate::error::UpstreamError;

/// Attempt budget, back-off step and per-attempt timeout for one upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries including the first; never below 1.
    pub max_attempts: u32,
    pub backoff_step: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(3_000),
            attempt_timeout: Duration::from_millis(15_000),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, backoff_step: Duration, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
            attempt_timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.fetch_max_attempts,
            config.fetch_backoff_step(),
            config.fetch_timeout(),
        )
    }

    /// Wait before the 1-based `attempt`. Zero for the first attempt.
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt.saturating_sub(1))
    }
}

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// Failed, and budget remains for another try.
    Retryable(String),
    /// Failed, and no further attempt will be made.
    Terminal(String),
}

/// Record of one try inside a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    /// 1-based.
    pub index: u32,
    pub wait: Duration,
    pub outcome: AttemptOutcome,
}

/// Returns `true` for failures a later attempt might not repeat.
///
/// Network errors, timeouts, non-200 statuses, error markers and empty or
/// garbled bodies are all treated as transient. A malformed URL and an
/// already-exhausted budget are not.
pub(crate) fn is_retriable(err: &UpstreamError) -> bool {
    !matches!(
        err,
        UpstreamError::InvalidUrl { .. } | UpstreamError::Exhausted { .. }
    )
}

/// Runs `operation` under `policy`, returning the first success.
///
/// # Errors
///
/// Returns [`UpstreamError::Exhausted`] carrying the last failure's message
/// once every attempt has failed, or the error itself if it is not retriable.
pub async fn retry_linear<T, F, Fut>(
    policy: &RetryPolicy,
    target: &str,
    operation: F,
) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    retry_linear_traced(policy, target, operation).await.0
}

/// Same as [`retry_linear`] but also returns the record of every attempt made.
pub async fn retry_linear_traced<T, F, Fut>(
    policy: &RetryPolicy,
    target: &str,
    mut operation: F,
) -> (Result<T, UpstreamError>, Vec<FetchAttempt>)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    #[allow(clippy::cast_possible_truncation)]
    let timeout_ms = policy.attempt_timeout.as_millis() as u64;
    let mut trace = Vec::new();
    let mut attempt = 1u32;

    loop {
        let wait = policy.delay_before(attempt);
        #[allow(clippy::cast_possible_truncation)]
        let wait_ms = wait.as_millis() as u64;
        tracing::info!(attempt, max_attempts, target, wait_ms, "fetching upstream");
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let result = match tokio::time::timeout(policy.attempt_timeout, operation()).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout {
                url: target.to_owned(),
                timeout_ms,
            }),
        };

        let err = match result {
            Ok(value) => {
                trace.push(FetchAttempt {
                    index: attempt,
                    wait,
                    outcome: AttemptOutcome::Success,
                });
                return (Ok(value), trace);
            }
            Err(err) => err,
        };

        if !is_retriable(&err) {
            trace.push(FetchAttempt {
                index: attempt,
                wait,
                outcome: AttemptOutcome::Terminal(err.to_string()),
            });
            return (Err(err), trace);
        }

        if attempt >= max_attempts {
            tracing::warn!(
                attempt,
                max_attempts,
                target,
                error = %err,
                "upstream attempt budget exhausted"
            );
            let last_error = err.to_string();
            trace.push(FetchAttempt {
                index: attempt,
                wait,
                outcome: AttemptOutcome::Terminal(last_error.clone()),
            });
            return (
                Err(UpstreamError::Exhausted {
                    url: target.to_owned(),
                    attempts: attempt,
                    last_error,
                }),
                trace,
            );
        }

        tracing::warn!(
            attempt,
            max_attempts,
            target,
            error = %err,
            "upstream attempt failed, retrying"
        );
        trace.push(FetchAttempt {
            index: attempt,
            wait,
            outcome: AttemptOutcome::Retryable(err.to_string()),
        });
        attempt += 1;
    }
}
