//! Tests for the fixed-delay retry policy.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use grist_rag::retry::{RetryPolicy, retry_fixed};

#[tokio::test(start_paused = true)]
async fn succeeds_on_third_attempt_after_two_fixed_delays() {
    let policy = RetryPolicy::default();
    let attempts = AtomicU32::new(0);
    let started = tokio::time::Instant::now();

    let result: Result<&str, String> = retry_fixed(policy, || async {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt < 3 { Err(format!("transient failure {attempt}")) } else { Ok("embedded") }
    })
    .await;

    assert_eq!(result.unwrap(), "embedded");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    // Two inter-attempt waits at the fixed delay.
    assert!(started.elapsed() >= policy.delay * 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_propagate_the_last_error() {
    let policy = RetryPolicy { max_attempts: 3, delay: Duration::from_secs(2) };
    let attempts = AtomicU32::new(0);

    let result: Result<(), String> = retry_fixed(policy, || async {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        Err(format!("failure {attempt}"))
    })
    .await;

    assert_eq!(result.unwrap_err(), "failure 3");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn first_attempt_success_sleeps_nowhere() {
    let policy = RetryPolicy::default();
    let result: Result<u32, String> = retry_fixed(policy, || async { Ok(7) }).await;
    assert_eq!(result.unwrap(), 7);
}
