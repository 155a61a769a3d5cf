use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{ClientOptions, Credentials, DEFAULT_USER_AGENT};
use crate::retry::{BackoffPolicy, DEFAULT_MAX_DELAY};
use crate::session::SessionCache;
use crate::version::{self, parse_versions, ApiVersion};

/// Retry policy for `Client::fetch_with_retry` (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Exponent base; values below 2 are raised to 2.
    pub backoff_base: u32,
    /// Delay unit in milliseconds; the n-th retry waits `unit * base^n`.
    pub backoff_unit_ms: u64,
    /// Longest single wait in milliseconds.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

fn default_backoff_max_ms() -> u64 {
    DEFAULT_MAX_DELAY.as_millis() as u64
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base: 2,
            backoff_unit_ms: 1000,
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

/// Client configuration loaded from `~/.config/toclient/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the API server, e.g. `https://to.example.net`.
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// API token; used instead of username/password when set.
    pub token: Option<String>,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    /// Supported API versions, newest first.
    pub api_versions: Vec<String>,
    /// Pin the client to one version instead of starting at the newest.
    pub api_version: Option<String>,
    pub force_latest: bool,
    pub probe_interval_secs: u64,
    /// Reuse login cookies across runs.
    pub session_cache: bool,
    pub retry: Option<RetryConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            token: None,
            insecure: false,
            timeout_secs: 30,
            user_agent: None,
            api_versions: ["4.1", "4.0", "3.1", "3.0"].map(String::from).to_vec(),
            api_version: None,
            force_latest: false,
            probe_interval_secs: 60,
            session_cache: true,
            retry: None,
        }
    }
}

impl ClientConfig {
    /// Credentials from the config: a token wins over username/password.
    pub fn credentials(&self) -> Result<Credentials> {
        if let Some(token) = &self.token {
            return Ok(Credentials::Token(token.clone()));
        }
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => Ok(Credentials::password(u.as_str(), p.as_str())),
            (Some(u), None) => bail!("no password configured for user {u}"),
            _ => bail!("no credentials configured (set `token` or `username` and `password`)"),
        }
    }

    /// Validate and convert into client options.
    pub fn to_options(&self) -> Result<ClientOptions> {
        let url = self
            .url
            .as_deref()
            .context("no server URL configured (set `url` or pass --url)")?;
        let versions = parse_versions(&self.api_versions).context("invalid `api_versions`")?;
        let pinned = self
            .api_version
            .as_deref()
            .map(str::parse::<ApiVersion>)
            .transpose()
            .context("invalid `api_version`")?;
        version::validate(&versions, pinned, self.force_latest).context("invalid API version settings")?;

        let mut opts = ClientOptions::new(url, self.credentials()?, versions);
        opts.pinned_version = pinned;
        opts.force_latest = self.force_latest;
        opts.insecure = self.insecure;
        opts.timeout = Duration::from_secs(self.timeout_secs);
        opts.probe_interval = Duration::from_secs(self.probe_interval_secs);
        opts.user_agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let retry = self.retry.clone().unwrap_or_default();
        opts.retry_limit = retry.max_retries;
        opts.backoff = BackoffPolicy::new(retry.backoff_base, Duration::from_millis(retry.backoff_unit_ms))
            .with_max_delay(Duration::from_millis(retry.backoff_max_ms));

        if self.session_cache {
            match SessionCache::open_default() {
                Ok(cache) => opts.session_cache = Some(cache),
                Err(e) => tracing::warn!("session cache disabled: {e:#}"),
            }
        }
        Ok(opts)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("toclient")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ClientConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ClientConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<ClientConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: ClientConfig = toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ClientConfig {
        ClientConfig {
            url: Some("https://to.example.net".into()),
            username: Some("admin".into()),
            password: Some("twelve".into()),
            session_cache: false,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn default_config_values() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.probe_interval_secs, 60);
        assert_eq!(cfg.api_versions, ["4.1", "4.0", "3.1", "3.0"]);
        assert!(cfg.session_cache);
        assert!(cfg.retry.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = base();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ClientConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.url, cfg.url);
        assert_eq!(parsed.api_versions, cfg.api_versions);
        assert_eq!(parsed.session_cache, cfg.session_cache);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            url = "https://to.cdn.local"
            token = "abc"
            api_versions = ["3.1", "3.0"]
            api_version = "3.0"

            [retry]
            max_retries = 2
            backoff_base = 3
            backoff_unit_ms = 50
        "#;
        let mut cfg: ClientConfig = toml::from_str(toml).unwrap();
        cfg.session_cache = false;
        assert_eq!(cfg.timeout_secs, 30);

        let opts = cfg.to_options().unwrap();
        assert!(matches!(opts.credentials, Credentials::Token(ref t) if t == "abc"));
        assert_eq!(opts.pinned_version.unwrap().to_string(), "3.0");
        assert_eq!(opts.retry_limit, 2);
        assert_eq!(opts.backoff.delay(1), Duration::from_millis(150));
        assert_eq!(opts.backoff.max_delay, DEFAULT_MAX_DELAY);
        assert!(opts.session_cache.is_none());
    }

    #[test]
    fn missing_url_or_credentials_is_an_error() {
        let cfg = ClientConfig { url: None, ..base() };
        assert!(cfg.to_options().unwrap_err().to_string().contains("URL"));

        let cfg = ClientConfig { password: None, ..base() };
        assert!(cfg.to_options().is_err());

        let cfg = ClientConfig {
            username: None,
            password: None,
            ..base()
        };
        assert!(cfg.credentials().is_err());
    }

    #[test]
    fn bad_versions_are_rejected() {
        let cfg = ClientConfig {
            api_versions: vec!["3.0".into(), "3.1".into()],
            ..base()
        };
        let err = format!("{:#}", cfg.to_options().unwrap_err());
        assert!(err.contains("newest first"), "{err}");

        let cfg = ClientConfig {
            api_version: Some("9.9".into()),
            ..base()
        };
        let err = format!("{:#}", cfg.to_options().unwrap_err());
        assert!(err.contains("not in the supported list"), "{err}");

        let cfg = ClientConfig {
            api_version: Some("4.0".into()),
            force_latest: true,
            ..base()
        };
        assert!(cfg.to_options().is_err());

        let cfg = ClientConfig {
            api_versions: Vec::new(),
            ..base()
        };
        assert!(cfg.to_options().is_err());
    }

    #[test]
    fn retry_section_without_cap_uses_default() {
        let toml = r#"
            [retry]
            max_retries = 40
            backoff_base = 2
            backoff_unit_ms = 1000
        "#;
        let cfg: ClientConfig = toml::from_str(toml).unwrap();
        let retry = cfg.retry.unwrap();
        assert_eq!(retry.backoff_max_ms, 300_000);
        let policy = BackoffPolicy::new(retry.backoff_base, Duration::from_millis(retry.backoff_unit_ms))
            .with_max_delay(Duration::from_millis(retry.backoff_max_ms));
        assert_eq!(policy.delay(39), Duration::from_secs(300));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "url = \"https://x\"\nforce_latest = true\n").unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.url.as_deref(), Some("https://x"));
        assert!(cfg.force_latest);
        assert!(load_from_path(&dir.path().join("missing.toml")).is_err());
    }
}
