//! `toclient versions` – show supported versions and the negotiated one.

use anyhow::Result;
use toclient_core::config::ClientConfig;
use toclient_core::Client;

pub fn run_versions(cfg: &ClientConfig) -> Result<()> {
    let client = Client::connect(cfg.to_options()?)?;
    client.ping()?;
    let current = client.api_version();
    for v in client.supported_versions() {
        let mark = if *v == current { "*" } else { " " };
        println!("{mark} {v}");
    }
    Ok(())
}
