//! The API client: one per logical connection to the control plane.
//!
//! Owns the session state (base URL, credentials, cookie store, version
//! negotiation) and builds the middleware pipeline around its transport for
//! every call.

mod login;
mod request;

use std::fmt;
use std::sync::RwLock;
use std::time::Duration;

use url::Url;

use crate::cookies::CookieStore;
use crate::error::ClientError;
use crate::pipeline::Dispatch;
use crate::retry::BackoffPolicy;
use crate::session::SessionCache;
use crate::transport::{CurlOptions, CurlTransport, Transport};
use crate::version::{ApiVersion, VersionState, DEFAULT_PROBE_INTERVAL};

pub use request::ReqInf;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("toclient/", env!("CARGO_PKG_VERSION"));

/// Default number of retries for `Client::fetch_with_retry`.
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

#[derive(Clone)]
pub enum Credentials {
    Password { username: String, password: String },
    Token(String),
}

impl Credentials {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Username, when logging in with a password.
    pub fn username(&self) -> Option<&str> {
        match self {
            Credentials::Password { username, .. } => Some(username),
            Credentials::Token(_) => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
        }
    }
}

/// Everything needed to construct a `Client`.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub credentials: Credentials,
    pub user_agent: String,
    /// Supported API versions, newest first.
    pub api_versions: Vec<ApiVersion>,
    /// Start at this version instead of the newest; disables re-probing.
    pub pinned_version: Option<ApiVersion>,
    /// Only ever use the newest version; no fallback, no re-probing.
    pub force_latest: bool,
    pub probe_interval: Duration,
    pub retry_limit: u32,
    pub backoff: BackoffPolicy,
    /// Per-request timeout (connect + transfer).
    pub timeout: Duration,
    pub insecure: bool,
    pub session_cache: Option<SessionCache>,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>, credentials: Credentials, api_versions: Vec<ApiVersion>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            api_versions,
            pinned_version: None,
            force_latest: false,
            probe_interval: DEFAULT_PROBE_INTERVAL,
            retry_limit: DEFAULT_RETRY_LIMIT,
            backoff: BackoffPolicy::default(),
            timeout: CurlOptions::default().timeout,
            insecure: false,
            session_cache: None,
        }
    }
}

pub struct Client {
    base_url: RwLock<Url>,
    credentials: Credentials,
    user_agent: String,
    versions: VersionState,
    cookies: CookieStore,
    transport: Box<dyn Transport>,
    retry_limit: u32,
    backoff: BackoffPolicy,
    session_cache: Option<SessionCache>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url().as_str())
            .field("credentials", &self.credentials)
            .field("versions", &self.versions)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client over any transport. Does not contact the server.
    pub fn new(options: ClientOptions, transport: impl Transport + 'static) -> Result<Self, ClientError> {
        let base_url = Url::parse(&options.base_url)?;
        let versions = VersionState::new(
            options.api_versions,
            options.pinned_version,
            options.force_latest,
            options.probe_interval,
        )?;
        Ok(Self {
            base_url: RwLock::new(base_url),
            credentials: options.credentials,
            user_agent: options.user_agent,
            versions,
            cookies: CookieStore::new(),
            transport: Box::new(transport),
            retry_limit: options.retry_limit,
            backoff: options.backoff,
            session_cache: options.session_cache,
        })
    }

    /// Build a client over libcurl. Does not contact the server.
    pub fn with_curl(options: ClientOptions) -> Result<Self, ClientError> {
        let transport = CurlTransport::new(CurlOptions {
            timeout: options.timeout,
            insecure: options.insecure,
        });
        Self::new(options, transport)
    }

    /// Build a libcurl client and authenticate it, reusing a cached session
    /// when one is still valid.
    pub fn connect(options: ClientOptions) -> Result<Self, ClientError> {
        let client = Self::with_curl(options)?;
        if !client.restore_session() {
            client.login()?;
        }
        Ok(client)
    }

    /// Load cookies from the session cache. Returns true if a usable session
    /// was restored. A stale session is repaired by the re-login layer.
    pub fn restore_session(&self) -> bool {
        let (Some(cache), Some(username)) = (&self.session_cache, self.credentials.username()) else {
            return false;
        };
        match cache.load(username) {
            Ok(Some(cookies)) => {
                tracing::debug!(username, count = cookies.len(), "restored cached session");
                self.cookies.restore(cookies);
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "could not read session cache");
                false
            }
        }
    }

    pub fn base_url(&self) -> Url {
        self.base_url.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_base_url(&self, url: &str) -> Result<(), ClientError> {
        let parsed = Url::parse(url)?;
        *self.base_url.write().unwrap_or_else(|e| e.into_inner()) = parsed;
        Ok(())
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn supported_versions(&self) -> &[ApiVersion] {
        self.versions.supported()
    }

    /// Version the next request will use.
    pub fn api_version(&self) -> ApiVersion {
        self.versions.current()
    }

    /// Explicitly negotiated version; `None` means the newest is in use.
    pub fn negotiated_version(&self) -> Option<ApiVersion> {
        self.versions.negotiated()
    }

    pub fn set_probe_interval(&self, interval: Duration) {
        self.versions.set_probe_interval(interval);
    }

    pub fn cookies(&self) -> &CookieStore {
        &self.cookies
    }

    fn dispatch(&self) -> Dispatch<'_> {
        Dispatch::new(self.transport.as_ref(), &self.base_url, &self.cookies, &self.user_agent)
    }
}
