//! Error types for the request pipeline.
//!
//! `ClientError` carries the HTTP status through every wrapping layer so the
//! classifier can decide on status codes instead of re-parsing messages.

use thiserror::Error;

/// Error returned by the request pipeline and the client surface.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a status >= 300 (other than 304).
    #[error("{method} {path} failed: HTTP {status} {reason}{}{}", alerts_suffix(.alerts), addr_suffix(.remote_addr))]
    Http {
        method: String,
        /// Resolved (version-prefixed) path that was requested.
        path: String,
        status: u32,
        reason: String,
        remote_addr: Option<String>,
        /// Error/warning alert texts from the reply envelope, if any.
        alerts: String,
    },

    /// libcurl failed before a complete response was received.
    #[error("{method} {path}: {source}{}", addr_suffix(.remote_addr))]
    Transport {
        method: String,
        path: String,
        remote_addr: Option<String>,
        #[source]
        source: curl::Error,
    },

    /// Request body could not be serialized.
    #[error("encoding request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// Response body could not be parsed into the destination type.
    #[error("decoding response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Caller-supplied fetch failure (used by `with_retry` callers).
    #[error("{0}")]
    Fetch(String),

    /// Another error decorated with the operation that produced it.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ClientError>,
    },
}

/// Login failure, kept apart from transport failures so callers can decide
/// between prompting for new credentials and retrying.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The server answered but did not confirm the login.
    #[error("login rejected{}", alerts_suffix(.alerts))]
    Rejected { alerts: String },

    /// The login request itself failed (network, server error, ...).
    #[error("login request failed: {0}")]
    Request(#[source] Box<ClientError>),
}

impl ClientError {
    /// HTTP status carried by this error, looking through `Context` wrapping.
    pub fn status(&self) -> Option<u32> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Context { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Remote address contacted, when known.
    pub fn remote_addr(&self) -> Option<&str> {
        match self {
            ClientError::Http { remote_addr, .. } | ClientError::Transport { remote_addr, .. } => {
                remote_addr.as_deref()
            }
            ClientError::Context { source, .. } => source.remote_addr(),
            _ => None,
        }
    }

    /// Wrap with a context string.
    pub fn context(self, context: impl Into<String>) -> Self {
        ClientError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True when this is (or wraps) a login failure.
    pub fn is_login(&self) -> bool {
        match self {
            ClientError::Login(_) => true,
            ClientError::Context { source, .. } => source.is_login(),
            _ => false,
        }
    }
}

fn alerts_suffix(alerts: &str) -> String {
    if alerts.is_empty() {
        String::new()
    } else {
        format!(" ({alerts})")
    }
}

fn addr_suffix(remote_addr: &Option<String>) -> String {
    match remote_addr {
        Some(addr) => format!(" [remote {addr}]"),
        None => String::new(),
    }
}
