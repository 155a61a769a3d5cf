//! Request executor: one literal HTTP exchange.
//!
//! A `Transport` reports whatever status the server sent; interpreting
//! statuses is left to the pipeline's `Dispatch` service so every transport
//! (libcurl, test doubles) behaves the same way.

pub mod easy;

use std::fmt;

use crate::error::ClientError;

pub use self::easy::{CurlOptions, CurlTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved request handed to a transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL (base URL + version-qualified path).
    pub url: String,
    /// Path part of `url`, kept for error messages.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Raw result of one exchange. The body is not interpreted.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u32,
    /// Reason phrase from the status line, e.g. `Not Implemented`.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// `ip:port` actually contacted, for diagnostics.
    pub remote_addr: Option<String>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// All values of a (possibly repeated) header.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_not_modified(&self) -> bool {
        self.status == 304
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Performs a single HTTP exchange. Blocking; implementations must be
/// shareable across threads.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, ClientError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, ClientError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, ClientError> {
        (**self).send(request)
    }
}

/// Split one header line (`Name: value`) into a trimmed pair.
pub(crate) fn parse_header_line(line: &str) -> Option<(String, String)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// Parse `HTTP/1.1 501 Not Implemented` into its reason phrase.
pub(crate) fn parse_status_line(line: &str) -> Option<String> {
    let rest = line.strip_prefix("HTTP/")?;
    let mut parts = rest.splitn(3, ' ');
    let _version = parts.next()?;
    let _code = parts.next()?;
    Some(parts.next().unwrap_or("").trim().to_string())
}
