//! Retry and backoff policy.
//!
//! This module holds the error classifier, the exponential backoff policy and
//! the retry loop that higher-level fetchers wrap around whole logical
//! fetches (each of which may fall back or re-login inside the pipeline).

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_message, classify_status};
pub use policy::{BackoffPolicy, ErrorClass, RetryDecision, DEFAULT_MAX_DELAY};
pub use run::with_retry;
