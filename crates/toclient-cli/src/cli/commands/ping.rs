//! `toclient ping` – check that the server answers.

use anyhow::Result;
use toclient_core::config::ClientConfig;
use toclient_core::Client;

pub fn run_ping(cfg: &ClientConfig) -> Result<()> {
    let client = Client::connect(cfg.to_options()?)?;
    let inf = client.ping()?;
    println!(
        "pong from {} (API {}, status {})",
        inf.remote_addr.as_deref().unwrap_or("-"),
        client.api_version(),
        inf.status
    );
    Ok(())
}
