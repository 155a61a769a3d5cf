pub mod config;
pub mod logging;

pub mod client;
pub mod cookies;
pub mod envelope;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod retry;
pub mod session;
pub mod transport;
pub mod version;

#[cfg(test)]
mod testing;

pub use client::{Client, ClientOptions, Credentials, ReqInf};
pub use envelope::{Alert, AlertLevel, Alerts, Envelope};
pub use error::{ClientError, LoginError};
pub use params::Selector;
pub use retry::{BackoffPolicy, ErrorClass};
pub use transport::Method;
pub use version::ApiVersion;
