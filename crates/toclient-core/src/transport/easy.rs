//! libcurl transport.
//!
//! One `Easy` handle per exchange, run on the calling thread. Call from
//! `spawn_blocking` if used from async code.

use std::str;
use std::time::Duration;

use super::{parse_header_line, parse_status_line, HttpRequest, Method, RawResponse, Transport};
use crate::error::ClientError;

/// Per-handle curl settings taken from the client configuration.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    /// Overall request timeout (connect + transfer).
    pub timeout: Duration,
    /// Skip TLS certificate and host verification.
    pub insecure: bool,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            insecure: false,
        }
    }
}

/// Blocking HTTP transport backed by libcurl.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    opts: CurlOptions,
}

impl CurlTransport {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> CurlOptions {
        self.opts
    }

    fn perform(&self, request: &HttpRequest, easy: &mut curl::easy::Easy) -> Result<RawResponse, curl::Error> {
        easy.url(&request.url)?;
        match request.method {
            Method::Get => easy.get(true)?,
            Method::Head => easy.nobody(true)?,
            Method::Post => easy.post(true)?,
            Method::Put | Method::Delete => easy.custom_request(request.method.as_str())?,
        }
        if let Some(body) = &request.body {
            if request.method == Method::Post {
                easy.post_field_size(body.len() as u64)?;
            }
            easy.post_fields_copy(body)?;
            // post_fields switches the handle to POST; restore the verb.
            if request.method != Method::Post {
                easy.custom_request(request.method.as_str())?;
            }
        }
        easy.timeout(self.opts.timeout)?;
        easy.connect_timeout(self.opts.timeout.min(Duration::from_secs(15)))?;
        if self.opts.insecure {
            easy.ssl_verify_peer(false)?;
            easy.ssl_verify_host(false)?;
        }

        let mut list = curl::easy::List::new();
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        // Suppress curl's default `Expect: 100-continue` on larger bodies.
        list.append("Expect:")?;
        easy.http_headers(list)?;

        let mut header_lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        let remote_addr = remote_addr(easy);
        let (reason, headers) = parse_header_block(&header_lines);
        Ok(RawResponse {
            status,
            reason,
            headers,
            body,
            remote_addr,
        })
    }
}

impl Transport for CurlTransport {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, ClientError> {
        let mut easy = curl::easy::Easy::new();
        self.perform(request, &mut easy).map_err(|source| ClientError::Transport {
            method: request.method.to_string(),
            path: request.path.clone(),
            remote_addr: remote_addr(&mut easy),
            source,
        })
    }
}

fn remote_addr(easy: &mut curl::easy::Easy) -> Option<String> {
    let ip = easy.primary_ip().ok().flatten()?.to_string();
    if ip.is_empty() {
        return None;
    }
    match easy.primary_port() {
        Ok(port) if port > 0 => Some(format!("{}:{}", ip, port)),
        _ => Some(ip),
    }
}

/// Reason phrase and headers of the last response in the header stream.
/// Intermediate blocks (`100 Continue`, redirects) are discarded.
fn parse_header_block(lines: &[String]) -> (String, Vec<(String, String)>) {
    let mut reason = String::new();
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(r) = parse_status_line(line) {
            reason = r;
            headers.clear();
            continue;
        }
        if let Some(pair) = parse_header_line(line) {
            headers.push(pair);
        }
    }
    (reason, headers)
}
