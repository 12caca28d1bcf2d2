/// Fixed-count, fixed-delay retry for external tool invocations
use crate::core::config::RetryConfig;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included
    pub max_attempts: u32,
    /// Pause between attempts; never applied after the last one
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_retries.saturating_add(1),
            interval,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.retry_interval())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// An error that another attempt cannot fix. `with_retry` stops at the
/// first one instead of sleeping and trying again.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Permanent(pub anyhow::Error);

impl Permanent {
    pub fn new<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self(error.into())
    }
}

/// Retrying stopped: every attempt failed, or one failed permanently.
#[derive(Debug)]
pub struct Exhausted {
    pub attempts: u32,
    pub last_error: anyhow::Error,
}

/// Execute `operation` until it succeeds or the policy runs out.
///
/// The closure receives the 1-based attempt number.
pub fn with_retry<F, T>(mut operation: F, policy: &RetryPolicy, context: &str) -> Result<T, Exhausted>
where
    F: FnMut(u32) -> anyhow::Result<T>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt) {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", context, attempt);
                }
                return Ok(result);
            }
            Err(err) if err.is::<Permanent>() => {
                warn!("Not retrying {} after attempt {}: {:#}", context, attempt, err);
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: err,
                });
            }
            Err(err) if attempt < max_attempts => {
                warn!(
                    "Attempt {}/{} failed for {}: {:#}. Retrying in {:?}",
                    attempt, max_attempts, context, err, policy.interval
                );
                std::thread::sleep(policy.interval);
                attempt += 1;
            }
            Err(err) => {
                warn!("All {} attempts failed for {}: {:#}", max_attempts, context, err);
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: err,
                });
            }
        }
    }
}
