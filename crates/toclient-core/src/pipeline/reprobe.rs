use super::{ApiRequest, Middleware, PipelineResult, Service};
use crate::version::VersionState;

/// Outermost layer: periodically resets the negotiated version to the newest
/// supported one so a client that fell back can climb back up after a server
/// upgrade.
///
/// While a probe is in flight no other request starts one; the probe clock is
/// restarted when the call (including any fallback it triggers) completes.
pub struct Reprobe<'a> {
    versions: &'a VersionState,
}

impl<'a> Reprobe<'a> {
    pub fn new(versions: &'a VersionState) -> Self {
        Self { versions }
    }
}

impl Middleware for Reprobe<'_> {
    fn handle(&self, request: &ApiRequest, next: &impl Service) -> PipelineResult {
        let _probe = self.versions.begin_probe();
        next.call(request)
    }
}
