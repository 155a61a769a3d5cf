//! `toclient config` – show where things live and the effective settings.

use anyhow::Result;
use std::path::Path;
use toclient_core::config::{self, ClientConfig};
use toclient_core::logging;
use toclient_core::session::SessionCache;

const REDACTED: &str = "<redacted>";

pub fn run_config(cfg: &ClientConfig, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("config:   {}", path.display());
    println!("log:      {}", logging::log_path()?.display());
    if cfg.session_cache {
        println!("sessions: {}", SessionCache::default_dir()?.display());
    }
    println!();
    print!("{}", toml::to_string_pretty(&redacted(cfg))?);
    Ok(())
}

fn redacted(cfg: &ClientConfig) -> ClientConfig {
    let mut shown = cfg.clone();
    if shown.password.is_some() {
        shown.password = Some(REDACTED.to_string());
    }
    if shown.token.is_some() {
        shown.token = Some(REDACTED.to_string());
    }
    shown
}
