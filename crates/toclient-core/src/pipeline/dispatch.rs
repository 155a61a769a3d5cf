//! Innermost service: resolves the physical path against the base URL,
//! attaches session state and interprets the status code.

use std::sync::RwLock;

use url::Url;

use super::{ApiRequest, PipelineResult, Service};
use crate::cookies::CookieStore;
use crate::envelope::Alerts;
use crate::error::ClientError;
use crate::transport::{HttpRequest, Method, RawResponse, Transport};

pub struct Dispatch<'a> {
    transport: &'a dyn Transport,
    base_url: &'a RwLock<Url>,
    cookies: &'a CookieStore,
    user_agent: &'a str,
}

impl<'a> Dispatch<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        base_url: &'a RwLock<Url>,
        cookies: &'a CookieStore,
        user_agent: &'a str,
    ) -> Self {
        Self {
            transport,
            base_url,
            cookies,
            user_agent,
        }
    }

    fn build(&self, request: &ApiRequest) -> HttpRequest {
        let base = self
            .base_url
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_str()
            .trim_end_matches('/')
            .to_string();
        let mut headers = vec![
            ("User-Agent".to_string(), self.user_agent.to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if request.body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers.extend(request.headers.iter().cloned());
        if let Some(cookie) = self.cookies.header_value() {
            headers.push(("Cookie".to_string(), cookie));
        }
        HttpRequest {
            method: request.method,
            url: format!("{}{}", base, request.path),
            path: request.path.clone(),
            headers,
            body: request.body.clone(),
        }
    }
}

impl Service for Dispatch<'_> {
    fn call(&self, request: &ApiRequest) -> PipelineResult {
        let http = self.build(request);
        let resp = self.transport.send(&http)?;
        for value in resp.header_values("set-cookie") {
            self.cookies.record_set_cookie(value);
        }
        interpret(request.method, &request.path, resp)
    }
}

/// 2xx passes through untouched, 304 is success with an empty body, and
/// everything else becomes `ClientError::Http`.
pub(crate) fn interpret(method: Method, path: &str, mut resp: RawResponse) -> PipelineResult {
    match resp.status {
        200..=299 => {
            if !resp.body.is_empty() {
                for w in Alerts::from_body(&resp.body).warnings() {
                    tracing::warn!(path, "server warning: {}", w.text);
                }
            }
            Ok(resp)
        }
        304 => {
            resp.body.clear();
            Ok(resp)
        }
        status => Err(ClientError::Http {
            method: method.to_string(),
            path: path.to_string(),
            status,
            reason: resp.reason,
            remote_addr: resp.remote_addr,
            alerts: Alerts::from_body(&resp.body).error_text(),
        }),
    }
}
