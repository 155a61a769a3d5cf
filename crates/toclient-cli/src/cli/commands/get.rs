//! `toclient get` – fetch a resource and print its payload.

use anyhow::{Context, Result};
use serde_json::Value;
use toclient_core::config::ClientConfig;
use toclient_core::{AlertLevel, Client, Envelope, Selector};

pub fn run_get(
    cfg: &ClientConfig,
    path: &str,
    id: Option<u64>,
    name: Option<String>,
    retries: Option<u32>,
) -> Result<()> {
    let selector = match (id, name) {
        (Some(id), _) => Selector::id(id),
        (None, Some(name)) => Selector::name(name),
        (None, None) => Selector::All,
    };

    let mut opts = cfg.to_options()?;
    if let Some(n) = retries {
        opts.retry_limit = n;
    }
    let client = Client::connect(opts)?;

    let operation = format!("GET {}", selector.apply(path));
    let (env, _inf): (Envelope<Value>, _) = client
        .fetch_with_retry(&operation, || client.get_selected(path, &selector))
        .with_context(|| operation.clone())?;

    for alert in env.alerts.iter().filter(|a| a.level != AlertLevel::Success) {
        eprintln!("{:?}: {}", alert.level, alert.text);
    }
    let payload = env.response.unwrap_or(Value::Null);
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
