use std::time::Duration;

/// High-level classification of a pipeline error.
///
/// The pipeline reacts to each kind differently: `NotImplemented` drives
/// version fallback, `AuthRequired` drives one re-login, and only `Transient`
/// errors consume the retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The resource does not exist; retrying cannot help.
    NotFound,
    /// The server does not implement the requested API version (501).
    NotImplemented,
    /// Session missing or expired (401/403).
    AuthRequired,
    /// Anything else.
    Transient,
}

/// Decision returned by the backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff: `delay(n) = min(unit * base^n, max_delay)`.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Growth factor; values below 2 are raised to 2 so delays strictly increase.
    pub base: u32,
    /// Delay for attempt 0.
    pub unit: Duration,
    /// Upper bound for a single wait.
    pub max_delay: Duration,
}

/// Default cap on a single backoff wait.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(300);

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: 2,
            unit: Duration::from_secs(1),
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl BackoffPolicy {
    pub fn new(base: u32, unit: Duration) -> Self {
        Self {
            base,
            unit,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    fn effective_unit(&self) -> Duration {
        if self.unit.is_zero() {
            Duration::from_millis(1)
        } else {
            self.unit
        }
    }

    /// Wait before retry number `attempt` (0-based).
    ///
    /// Strictly increasing until it reaches `max_delay` (raised to the unit
    /// when smaller), then constant.
    pub fn delay(&self, attempt: u32) -> Duration {
        let unit = self.effective_unit();
        let cap = self.max_delay.max(unit);
        let raw = match self.base.max(2).checked_pow(attempt) {
            Some(factor) => unit.saturating_mul(factor),
            None => Duration::MAX,
        };
        raw.min(cap)
    }

    /// Decide whether a failed attempt should be retried.
    ///
    /// `attempt` counts retries already performed (0 after the first call);
    /// only transient errors are retried, at most `max_retries` times.
    pub fn decide(&self, attempt: u32, max_retries: u32, class: ErrorClass) -> RetryDecision {
        if attempt >= max_retries {
            return RetryDecision::NoRetry;
        }
        match class {
            ErrorClass::Transient => RetryDecision::RetryAfter(self.delay(attempt)),
            ErrorClass::NotFound | ErrorClass::NotImplemented | ErrorClass::AuthRequired => {
                RetryDecision::NoRetry
            }
        }
    }
}
