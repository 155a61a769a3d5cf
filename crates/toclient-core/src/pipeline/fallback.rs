use super::{ApiRequest, Middleware, PipelineResult, Service};
use crate::retry::{classify, ErrorClass};
use crate::version::VersionState;

/// Steps down one API version at a time while the server answers
/// "not implemented", retrying the same logical request each time.
///
/// Each attempt carries its version in `ApiRequest::version`, so the versions
/// tried by one call strictly descend even if another request resets the
/// shared state meanwhile. A call therefore makes at most one attempt per
/// supported version and always reaches the oldest.
pub struct Fallback<'a> {
    versions: &'a VersionState,
}

impl<'a> Fallback<'a> {
    pub fn new(versions: &'a VersionState) -> Self {
        Self { versions }
    }
}

impl Middleware for Fallback<'_> {
    fn handle(&self, request: &ApiRequest, next: &impl Service) -> PipelineResult {
        let mut version = request.version.unwrap_or_else(|| self.versions.current());
        let mut remaining = self.versions.supported().len();
        loop {
            let attempt = ApiRequest {
                version: Some(version),
                ..request.clone()
            };
            let result = next.call(&attempt);
            let not_implemented =
                matches!(&result, Err(e) if classify(e) == ErrorClass::NotImplemented);
            if !not_implemented {
                return result;
            }
            remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                return result;
            }
            match self.versions.step_down_from(version) {
                Some(older) => {
                    tracing::debug!(
                        path = %request.path,
                        from = %version,
                        to = %older,
                        "API version not implemented by server, falling back"
                    );
                    version = older;
                }
                None => return result,
            }
        }
    }
}
