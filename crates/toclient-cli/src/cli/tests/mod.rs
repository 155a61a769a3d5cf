//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use toclient_core::config::ClientConfig;

pub(super) fn parse_cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

pub(super) fn parse(args: &[&str]) -> CliCommand {
    parse_cli(args).command
}

mod commands;
mod global;

#[test]
fn overrides_replace_config_values() {
    let cli = parse_cli(&[
        "toclient",
        "--url",
        "https://to2.example.net",
        "--user",
        "ops",
        "--insecure",
        "ping",
    ]);
    let mut cfg = ClientConfig {
        url: Some("https://to.example.net".into()),
        token: Some("abc".into()),
        ..ClientConfig::default()
    };
    cli.apply_overrides(&mut cfg);
    assert_eq!(cfg.url.as_deref(), Some("https://to2.example.net"));
    assert_eq!(cfg.username.as_deref(), Some("ops"));
    assert!(cfg.token.is_none(), "--user switches to password login");
    assert!(cfg.insecure);
}

#[test]
fn force_latest_clears_pin() {
    let cli = parse_cli(&["toclient", "versions", "--force-latest"]);
    let mut cfg = ClientConfig {
        api_version: Some("3.0".into()),
        ..ClientConfig::default()
    };
    cli.apply_overrides(&mut cfg);
    assert!(cfg.force_latest);
    assert!(cfg.api_version.is_none());
}
