//! Public request entry points.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Client;
use crate::envelope::Envelope;
use crate::error::ClientError;
use crate::params::Selector;
use crate::pipeline::{self, ApiRequest, Service};
use crate::retry::with_retry;
use crate::transport::{Method, RawResponse};

/// Request metadata returned next to decoded data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReqInf {
    pub status: u32,
    /// Address actually contacted (useful when DNS points at several backends).
    pub remote_addr: Option<String>,
}

impl From<&RawResponse> for ReqInf {
    fn from(resp: &RawResponse) -> Self {
        Self {
            status: resp.status,
            remote_addr: resp.remote_addr.clone(),
        }
    }
}

impl Client {
    /// Send a request through the full pipeline and return the raw response.
    ///
    /// `path` is the logical path (`/servers`); the version prefix is added
    /// by the pipeline. A 304 comes back as success with an empty body.
    pub fn request_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        headers: &[(String, String)],
    ) -> Result<RawResponse, ClientError> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            headers: headers.to_vec(),
            body,
            version: None,
        };
        let chain = pipeline::authenticated(&self.versions, self);
        let dispatch = self.dispatch();
        (&chain, &dispatch).call(&request)
    }

    /// JSON request: serializes `body`, decodes the reply into `dest`.
    /// On 304 or an empty body `dest` is left untouched.
    pub fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: &[(String, String)],
        dest: &mut T,
    ) -> Result<ReqInf, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body
            .map(|b| serde_json::to_vec(b))
            .transpose()
            .map_err(ClientError::Encode)?;
        let resp = self.request_raw(method, path, body, headers)?;
        let inf = ReqInf::from(&resp);
        if resp.is_not_modified() || resp.body.is_empty() {
            return Ok(inf);
        }
        *dest = serde_json::from_slice(&resp.body).map_err(|source| ClientError::Decode {
            path: path.to_string(),
            source,
        })?;
        Ok(inf)
    }

    /// GET decoding into `dest`.
    pub fn get<T: DeserializeOwned>(&self, path: &str, dest: &mut T) -> Result<ReqInf, ClientError> {
        self.request::<(), T>(Method::Get, path, None, &[], dest)
    }

    /// GET returning the decoded envelope.
    pub fn get_envelope<T: DeserializeOwned>(&self, path: &str) -> Result<(Envelope<T>, ReqInf), ClientError> {
        let mut env = Envelope::default();
        let inf = self.get(path, &mut env)?;
        Ok((env, inf))
    }

    /// GET on a list endpoint filtered by `selector`.
    pub fn get_selected<T: DeserializeOwned>(
        &self,
        path: &str,
        selector: &Selector,
    ) -> Result<(Envelope<T>, ReqInf), ClientError> {
        self.get_envelope(&selector.apply(path))
    }

    /// Cheap liveness check against `/ping`.
    pub fn ping(&self) -> Result<ReqInf, ClientError> {
        let mut ignored = serde_json::Value::Null;
        self.get("/ping", &mut ignored)
    }

    /// Run a logical fetch with the client's backoff policy and retry limit.
    pub fn fetch_with_retry<T, F>(&self, operation: &str, fetch: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Result<T, ClientError>,
    {
        with_retry(&self.backoff, self.retry_limit, operation, fetch)
    }
}
