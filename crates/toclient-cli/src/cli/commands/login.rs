//! `toclient login` – log in and refresh the cached session.

use anyhow::Result;
use toclient_core::config::ClientConfig;
use toclient_core::Client;

pub fn run_login(cfg: &ClientConfig) -> Result<()> {
    let client = Client::with_curl(cfg.to_options()?)?;
    client.login()?;
    let who = client.credentials().username().unwrap_or("token");
    println!("Logged in as {who} using API {}.", client.api_version());
    Ok(())
}
