//! Bounded retry with exponential backoff for generation calls
//!
//! Transport failures (timeout, quota, HTTP) are retried up to the
//! configured attempt count with a doubling, capped delay. Anything else
//! propagates immediately. Exhausting retries aborts the caller's stage;
//! there is no unbounded retry anywhere in the pipeline.

use reqweave_common::{GenError, LogEntry, RetryConfig, TextGenerator};
use std::time::Duration;
use tracing::warn;

pub fn generate_with_retry(
    generator: &dyn TextGenerator,
    prompt: &str,
    context: &[LogEntry],
    retry: &RetryConfig,
) -> Result<String, GenError> {
    let max_attempts = retry.max_attempts.max(1);
    let mut delay = Duration::from_millis(retry.initial_delay_ms);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match generator.generate(prompt, context) {
            Ok(text) => return Ok(text),
            Err(e) => {
                if !e.is_retryable() || attempt >= max_attempts {
                    return Err(e);
                }
                warn!(
                    "generation attempt {}/{} failed: {} (retrying)",
                    attempt, max_attempts, e
                );
                std::thread::sleep(delay);
                delay = (delay * 2).min(Duration::from_millis(retry.max_delay_ms));
            }
        }
    }
}
