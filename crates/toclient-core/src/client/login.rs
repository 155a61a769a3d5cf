//! Session login.
//!
//! Goes through re-probe, fallback and path prefixing but never through the
//! re-login layer. A 2xx status alone does not prove success: the reply must
//! carry a `success` alert.

use serde::Serialize;

use super::{Client, Credentials};
use crate::envelope::Alerts;
use crate::error::{ClientError, LoginError};
use crate::pipeline::{self, ApiRequest, Authenticator, Service};
use crate::retry::{classify, ErrorClass};
use crate::transport::Method;

#[derive(Serialize)]
struct PasswordLogin<'a> {
    u: &'a str,
    p: &'a str,
}

#[derive(Serialize)]
struct TokenLogin<'a> {
    t: &'a str,
}

impl Client {
    /// Log in with the client's credentials, replacing the session cookies.
    pub fn login(&self) -> Result<(), ClientError> {
        let (path, body) = match &self.credentials {
            Credentials::Password { username, password } => (
                "/user/login",
                serde_json::to_vec(&PasswordLogin {
                    u: username,
                    p: password,
                }),
            ),
            Credentials::Token(token) => ("/user/login/token", serde_json::to_vec(&TokenLogin { t: token })),
        };
        let body = body.map_err(ClientError::Encode)?;
        let request = ApiRequest::new(Method::Post, path).with_body(body);

        let chain = pipeline::unauthenticated(&self.versions);
        let dispatch = self.dispatch();
        let resp = (&chain, &dispatch).call(&request).map_err(login_failure)?;

        let alerts = Alerts::from_body(&resp.body);
        if !alerts.has_success() {
            return Err(LoginError::Rejected {
                alerts: alerts.summary(),
            }
            .into());
        }
        tracing::info!(
            user = self.credentials.username().unwrap_or("<token>"),
            version = %self.versions.current(),
            "logged in"
        );
        self.save_session();
        Ok(())
    }

    fn save_session(&self) {
        let (Some(cache), Some(username)) = (&self.session_cache, self.credentials.username()) else {
            return;
        };
        if let Err(e) = cache.save(username, &self.cookies.snapshot()) {
            tracing::warn!(error = %e, "could not write session cache");
        }
    }
}

/// 401/403 means the credentials were refused; anything else is a failed request.
fn login_failure(err: ClientError) -> ClientError {
    let login_err = if classify(&err) == ErrorClass::AuthRequired {
        let alerts = match &err {
            ClientError::Http { alerts, .. } if !alerts.is_empty() => alerts.clone(),
            other => other.to_string(),
        };
        LoginError::Rejected { alerts }
    } else {
        LoginError::Request(Box::new(err))
    };
    ClientError::Login(login_err)
}

impl Authenticator for Client {
    fn login(&self) -> Result<(), ClientError> {
        Client::login(self)
    }
}
