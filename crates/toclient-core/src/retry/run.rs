//! Retry loop: run a logical fetch until success or the policy says stop.

use super::classify;
use super::policy::{BackoffPolicy, RetryDecision};
use crate::error::ClientError;

/// Runs `fetch` once, then retries transient failures up to `max_retries`
/// times, sleeping `policy.delay(attempt)` between attempts.
///
/// Not-found, not-implemented and auth failures return immediately. Once the
/// budget is spent the last error is returned wrapped with `operation`, which
/// otherwise only shows up in logs.
pub fn with_retry<T, F>(
    policy: &BackoffPolicy,
    max_retries: u32,
    operation: &str,
    mut fetch: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Result<T, ClientError>,
{
    let mut attempt = 0u32;
    loop {
        match fetch() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let class = classify::classify(&e);
                match policy.decide(attempt, max_retries, class) {
                    RetryDecision::NoRetry => {
                        if attempt == 0 {
                            return Err(e);
                        }
                        return Err(e.context(format!(
                            "{} failed after {} attempts",
                            operation,
                            attempt + 1
                        )));
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(
                            operation,
                            attempt = attempt + 1,
                            max_retries,
                            delay_ms = d.as_millis() as u64,
                            error = %e,
                            "retrying fetch"
                        );
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}
