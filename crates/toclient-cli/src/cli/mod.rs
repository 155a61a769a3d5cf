//! CLI for the toclient control-plane API client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toclient_core::config::{self, ClientConfig};

use commands::{run_config, run_get, run_login, run_ping, run_versions};

/// Environment variable consulted when no password is configured.
const PASSWORD_ENV: &str = "TOCLIENT_PASSWORD";

/// Top-level CLI for toclient.
#[derive(Debug, Parser)]
#[command(name = "toclient")]
#[command(about = "toclient: versioned API client for the CDN control plane", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/toclient/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Server base URL (overrides `url` in the config).
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Login name (overrides `username` in the config).
    #[arg(long, global = true, value_name = "NAME")]
    pub user: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Only use the newest API version; never fall back.
    #[arg(long, global = true)]
    pub force_latest: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// GET a resource and print its `response` as JSON.
    Get {
        /// Logical API path without the version prefix, e.g. /servers.
        path: String,
        /// Select a single object by ID.
        #[arg(long, conflicts_with = "name")]
        id: Option<u64>,
        /// Select objects by name.
        #[arg(long)]
        name: Option<String>,
        /// Retries on transient failures (default from config).
        #[arg(long, value_name = "N")]
        retries: Option<u32>,
    },

    /// Check that the server answers.
    Ping,

    /// Log in with fresh credentials and refresh the cached session.
    Login,

    /// Show the supported API versions and the one the server accepts.
    Versions,

    /// Show configuration, log and session locations.
    Config,
}

impl Cli {
    /// Config from `--config` or the default location, with flags applied.
    fn load_config(&self) -> Result<ClientConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };
        self.apply_overrides(&mut cfg);
        if cfg.password.is_none() && cfg.token.is_none() {
            cfg.password = std::env::var(PASSWORD_ENV).ok();
        }
        Ok(cfg)
    }

    fn apply_overrides(&self, cfg: &mut ClientConfig) {
        if let Some(url) = &self.url {
            cfg.url = Some(url.clone());
        }
        if let Some(user) = &self.user {
            cfg.username = Some(user.clone());
            cfg.token = None;
        }
        cfg.insecure |= self.insecure;
        if self.force_latest {
            cfg.force_latest = true;
            cfg.api_version = None;
        }
    }
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = cli.load_config()?;
        tracing::debug!(url = ?cfg.url, user = ?cfg.username, "loaded config");

        match cli.command {
            CliCommand::Get {
                path,
                id,
                name,
                retries,
            } => run_get(&cfg, &path, id, name, retries)?,
            CliCommand::Ping => run_ping(&cfg)?,
            CliCommand::Login => run_login(&cfg)?,
            CliCommand::Versions => run_versions(&cfg)?,
            CliCommand::Config => run_config(&cfg, cli.config.as_deref())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
