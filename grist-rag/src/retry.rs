//! Fixed-delay retry for transient backend failures.
//!
//! Embedding calls and vector index I/O share the same policy: up to 3
//! attempts with a fixed 2-second delay between them, then the last error
//! propagates. The delay is deliberately fixed rather than exponential —
//! observable timing is part of the contract.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry parameters: attempt count and the fixed inter-attempt delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, delay: Duration::from_secs(2) }
    }
}

/// Run `op` until it succeeds or the policy's attempts are exhausted,
/// sleeping the fixed delay between attempts.
///
/// Every error is treated as retryable; fatal configuration problems are
/// expected to be raised at construction time, before any retried call.
pub async fn retry_fixed<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> std::result::Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt >= policy.max_attempts => return Err(error),
            Err(error) => {
                warn!(attempt, max_attempts = policy.max_attempts, error = %error, "retrying after failure");
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
