//! Middleware pipeline wrapped around the request executor.
//!
//! - `Service`: handles a request and produces a raw response or an error.
//! - `Middleware`: wraps a `Service` and may inspect, rewrite or repeat the
//!   request.
//!
//! `(mw, svc)` is a `Service` and `(mw1, mw2)` is a `Middleware`, so a
//! pipeline is a nested tuple built per call from borrowed client state:
//!
//! ```text
//! request -> Reprobe -> Fallback -> PathPrefix -> Reauth -> Dispatch
//! ```
//!
//! The order is fixed: each layer relies on version state set up by the
//! layer outside it for this call. The login request uses the same chain
//! without `Reauth`.

mod dispatch;
mod fallback;
mod prefix;
mod reauth;
mod reprobe;

pub use dispatch::Dispatch;
pub use fallback::Fallback;
pub use prefix::PathPrefix;
pub use reauth::{Authenticator, Reauth};
pub use reprobe::Reprobe;

use crate::error::ClientError;
use crate::transport::{Method, RawResponse};
use crate::version::{ApiVersion, VersionState};

/// A logical request as seen by the pipeline. `path` is the logical path
/// (`/servers`) until `PathPrefix` rewrites it to `/api/<v>/servers`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Version chosen for this attempt by `Fallback`; `None` means the
    /// client's current version.
    pub version: Option<ApiVersion>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
            version: None,
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

pub type PipelineResult = Result<RawResponse, ClientError>;

/// Request -> response handler.
pub trait Service {
    fn call(&self, request: &ApiRequest) -> PipelineResult;
}

/// Wraps a `Service`; may delegate to `next` zero or more times.
pub trait Middleware {
    fn handle(&self, request: &ApiRequest, next: &impl Service) -> PipelineResult;
}

/// `(&mw, &svc).call(req)` runs the middleware with `svc` as its next step.
impl<M, S> Service for (&M, &S)
where
    M: Middleware,
    S: Service,
{
    fn call(&self, request: &ApiRequest) -> PipelineResult {
        self.0.handle(request, self.1)
    }
}

/// Left-to-right composition: `(mw1, mw2)` means `request -> mw1 -> mw2 -> next`.
impl<M1, M2> Middleware for (M1, M2)
where
    M1: Middleware,
    M2: Middleware,
{
    fn handle(&self, request: &ApiRequest, next: &impl Service) -> PipelineResult {
        let composed = (&self.1, next);
        self.0.handle(request, &composed)
    }
}

/// Chain used by the public request entry point.
pub fn authenticated<'a>(
    versions: &'a VersionState,
    auth: &'a dyn Authenticator,
) -> impl Middleware + 'a {
    (
        Reprobe::new(versions),
        (Fallback::new(versions), (PathPrefix::new(versions), Reauth::new(auth))),
    )
}

/// Chain used by login: no re-authentication layer, so a rejected login can
/// never recurse into another login.
pub fn unauthenticated(versions: &VersionState) -> impl Middleware + '_ {
    (
        Reprobe::new(versions),
        (Fallback::new(versions), PathPrefix::new(versions)),
    )
}
