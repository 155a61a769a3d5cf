//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::ClientError;
use crate::transport::{HttpRequest, RawResponse, Transport};

type Handler = Box<dyn Fn(&HttpRequest) -> RawResponse + Send + Sync>;

/// Transport that answers from a closure and records every request.
pub(crate) struct ScriptedTransport {
    handler: Handler,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(handler: impl Fn(&HttpRequest) -> RawResponse + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Replays `responses` in order; answers 500 once they run out.
    pub(crate) fn sequence(responses: Vec<RawResponse>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::new(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| respond(500, "script exhausted"))
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, ClientError> {
        self.log.lock().unwrap().push(request.clone());
        Ok((self.handler)(request))
    }
}

pub(crate) fn respond(status: u32, body: &str) -> RawResponse {
    RawResponse {
        status,
        reason: match status {
            200 => "OK",
            304 => "Not Modified",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            501 => "Not Implemented",
            _ => "",
        }
        .to_string(),
        headers: Vec::new(),
        body: body.as_bytes().to_vec(),
        remote_addr: Some("127.0.0.1:443".to_string()),
    }
}
