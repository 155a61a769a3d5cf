//! API version identifiers and per-client version negotiation state.
//!
//! States are the supported versions plus an implicit "newest" (`None`).
//! `Fallback` moves one step older on a 501; `Reprobe` resets to newest once
//! the probe interval has elapsed.

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::ClientError;

/// Default minimum time between attempts to climb back to the newest version.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(60);

/// `<major>.<minor>` API version, rendered into paths as `/api/<major>.<minor>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Path prefix for this version, e.g. `/api/3.1`.
    pub fn prefix(&self) -> String {
        format!("/api/{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ClientError::Config(format!("invalid API version {s:?} (expected <major>.<minor>)"));
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

/// Parse a newest-first list of version strings.
pub fn parse_versions<S: AsRef<str>>(list: &[S]) -> Result<Vec<ApiVersion>, ClientError> {
    list.iter().map(|s| s.as_ref().parse()).collect()
}

#[derive(Debug)]
struct Negotiation {
    negotiated: Option<ApiVersion>,
    last_probe: Instant,
    probing: bool,
    probe_interval: Duration,
}

/// Shared, mutex-guarded negotiation state for one client.
#[derive(Debug)]
pub struct VersionState {
    supported: Vec<ApiVersion>,
    force_latest: bool,
    pinned: bool,
    inner: Mutex<Negotiation>,
}

/// Check a version configuration: `supported` must be non-empty and strictly
/// newest-first, and a pinned version must be a member that is not combined
/// with `force_latest`.
pub fn validate(
    supported: &[ApiVersion],
    pinned: Option<ApiVersion>,
    force_latest: bool,
) -> Result<(), ClientError> {
    if supported.is_empty() {
        return Err(ClientError::Config("no supported API versions".into()));
    }
    if let Some(pair) = supported.windows(2).find(|w| w[0] <= w[1]) {
        return Err(ClientError::Config(format!(
            "supported API versions must be listed newest first without duplicates ({} before {})",
            pair[0], pair[1]
        )));
    }
    if let Some(v) = pinned {
        if force_latest {
            return Err(ClientError::Config(format!(
                "cannot pin API version {v} while forcing the latest version"
            )));
        }
        if !supported.contains(&v) {
            return Err(ClientError::Config(format!(
                "pinned API version {v} is not in the supported list"
            )));
        }
    }
    Ok(())
}

impl VersionState {
    /// Fails unless `validate` accepts the configuration.
    pub fn new(
        supported: Vec<ApiVersion>,
        pinned: Option<ApiVersion>,
        force_latest: bool,
        probe_interval: Duration,
    ) -> Result<Self, ClientError> {
        validate(&supported, pinned, force_latest)?;
        Ok(Self {
            supported,
            force_latest,
            pinned: pinned.is_some(),
            inner: Mutex::new(Negotiation {
                negotiated: pinned,
                last_probe: Instant::now(),
                probing: false,
                probe_interval,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Negotiation> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn supported(&self) -> &[ApiVersion] {
        &self.supported
    }

    pub fn newest(&self) -> ApiVersion {
        self.supported[0]
    }

    pub fn force_latest(&self) -> bool {
        self.force_latest
    }

    /// Version explicitly negotiated so far; `None` means "newest".
    pub fn negotiated(&self) -> Option<ApiVersion> {
        self.lock().negotiated
    }

    /// Version the next request will use.
    pub fn current(&self) -> ApiVersion {
        self.negotiated().unwrap_or_else(|| self.newest())
    }

    pub fn probe_interval(&self) -> Duration {
        self.lock().probe_interval
    }

    pub fn set_probe_interval(&self, interval: Duration) {
        self.lock().probe_interval = interval;
    }

    /// Start a re-probe if one is due: resets to newest and blocks other
    /// probes until the returned guard is dropped.
    pub(crate) fn begin_probe(&self) -> Option<ProbeGuard<'_>> {
        if self.force_latest || self.pinned {
            return None;
        }
        let mut n = self.lock();
        if n.probing || n.last_probe.elapsed() < n.probe_interval {
            return None;
        }
        if let Some(previous) = n.negotiated.take() {
            tracing::debug!(from = %previous, to = %self.newest(), "re-probing newest API version");
        }
        n.probing = true;
        Some(ProbeGuard { state: self })
    }

    /// Drop the negotiated version without touching the probe clock.
    #[cfg(test)]
    pub(crate) fn forget_negotiated(&self) {
        self.lock().negotiated = None;
    }

    /// Step down to the version after `attempted`. Returns the new version,
    /// or `None` when `attempted` was the oldest (or fallback is disabled).
    pub(crate) fn step_down_from(&self, attempted: ApiVersion) -> Option<ApiVersion> {
        if self.force_latest {
            return None;
        }
        let idx = self.supported.iter().position(|v| *v == attempted)?;
        let next = *self.supported.get(idx + 1)?;
        self.lock().negotiated = Some(next);
        Some(next)
    }
}

/// Marks the end of a re-probe when dropped.
pub(crate) struct ProbeGuard<'a> {
    state: &'a VersionState,
}

impl Drop for ProbeGuard<'_> {
    fn drop(&mut self) {
        let mut n = self.state.lock();
        n.last_probe = Instant::now();
        n.probing = false;
    }
}
