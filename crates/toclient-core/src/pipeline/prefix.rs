use super::{ApiRequest, Middleware, PipelineResult, Service};
use crate::version::VersionState;

/// Rewrites a logical path (`/servers`) into the version-qualified path
/// (`/api/3.1/servers`) using the version chosen for the attempt, or the
/// negotiated one.
pub struct PathPrefix<'a> {
    versions: &'a VersionState,
}

impl<'a> PathPrefix<'a> {
    pub fn new(versions: &'a VersionState) -> Self {
        Self { versions }
    }
}

pub(crate) fn versioned_path(prefix: &str, logical: &str) -> String {
    if logical.starts_with('/') {
        format!("{}{}", prefix, logical)
    } else {
        format!("{}/{}", prefix, logical)
    }
}

impl Middleware for PathPrefix<'_> {
    fn handle(&self, request: &ApiRequest, next: &impl Service) -> PipelineResult {
        let version = request.version.unwrap_or_else(|| self.versions.current());
        let physical = ApiRequest {
            path: versioned_path(&version.prefix(), &request.path),
            ..request.clone()
        };
        next.call(&physical)
    }
}
