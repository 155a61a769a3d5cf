//! CLI command handlers, one per file.

mod config;
mod get;
mod login;
mod ping;
mod versions;

pub use config::run_config;
pub use get::run_get;
pub use login::run_login;
pub use ping::run_ping;
pub use versions::run_versions;
