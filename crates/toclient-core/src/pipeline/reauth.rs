use super::{ApiRequest, Middleware, PipelineResult, Service};
use crate::error::ClientError;
use crate::retry::{classify, ErrorClass};

/// Something that can establish a fresh session.
pub trait Authenticator {
    fn login(&self) -> Result<(), ClientError>;
}

/// Innermost layer of the public entry point: on 401/403 logs in once and,
/// if that worked, repeats the request once and returns whatever it yields.
/// A failed login returns the original error.
pub struct Reauth<'a> {
    auth: &'a dyn Authenticator,
}

impl<'a> Reauth<'a> {
    pub fn new(auth: &'a dyn Authenticator) -> Self {
        Self { auth }
    }
}

impl Middleware for Reauth<'_> {
    fn handle(&self, request: &ApiRequest, next: &impl Service) -> PipelineResult {
        let first = next.call(request);
        let auth_required = matches!(&first, Err(e) if classify(e) == ErrorClass::AuthRequired);
        if !auth_required {
            return first;
        }
        tracing::info!(path = %request.path, "session rejected, logging in again");
        // The retry keeps this attempt's version even if login fell back;
        // a resulting 501 is handled by `Fallback` further out.
        match self.auth.login() {
            Ok(()) => next.call(request),
            Err(e) => {
                tracing::warn!(error = %e, "re-login failed");
                first
            }
        }
    }
}
