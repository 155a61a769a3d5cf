//! Session cookie store shared by every request of one client.
//!
//! Cookies are captured from `Set-Cookie` response headers (parsed with the
//! `cookie` crate) and replayed as a single `Cookie:` request header.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use cookie::time::OffsetDateTime;
use cookie::Cookie;

/// A cookie as kept by the store and the session cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    /// Expiry as unix seconds, when the server set one.
    pub expires: Option<i64>,
}

impl StoredCookie {
    pub fn is_expired_at(&self, now_unix: i64) -> bool {
        matches!(self.expires, Some(t) if t <= now_unix)
    }
}

/// Thread-safe name-keyed cookie store.
#[derive(Debug, Default)]
pub struct CookieStore {
    cookies: Mutex<BTreeMap<String, StoredCookie>>,
}

pub(crate) fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

impl CookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, StoredCookie>> {
        self.cookies.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record one `Set-Cookie` header value. Unparseable values are ignored;
    /// an already-expired cookie removes any stored cookie of that name.
    pub fn record_set_cookie(&self, header_value: &str) {
        let parsed = match Cookie::parse(header_value.to_string()) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unparseable Set-Cookie");
                return;
            }
        };
        let now = now_unix();
        let expires = match (parsed.max_age(), parsed.expires_datetime()) {
            (Some(max_age), _) => Some(now + max_age.whole_seconds()),
            (None, Some(at)) => Some(at.unix_timestamp()),
            (None, None) => None,
        };
        let stored = StoredCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            expires,
        };
        let mut map = self.lock();
        if stored.is_expired_at(now) {
            map.remove(&stored.name);
        } else {
            map.insert(stored.name.clone(), stored);
        }
    }

    /// Value for the `Cookie:` request header, if any unexpired cookie exists.
    pub fn header_value(&self) -> Option<String> {
        let now = now_unix();
        let map = self.lock();
        let pairs: Vec<String> = map
            .values()
            .filter(|c| !c.is_expired_at(now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    /// Copy of all stored cookies (for the session cache).
    pub fn snapshot(&self) -> Vec<StoredCookie> {
        self.lock().values().cloned().collect()
    }

    /// Replace the store's content (session restore).
    pub fn restore(&self, cookies: impl IntoIterator<Item = StoredCookie>) {
        let mut map = self.lock();
        map.clear();
        for c in cookies {
            map.insert(c.name.clone(), c);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
