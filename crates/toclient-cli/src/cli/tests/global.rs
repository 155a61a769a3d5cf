//! Tests for global flags.

use super::parse_cli;
use std::path::Path;

#[test]
fn cli_global_flags_before_subcommand() {
    let cli = parse_cli(&["toclient", "--config", "/tmp/to.toml", "--force-latest", "ping"]);
    assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/to.toml")));
    assert!(cli.force_latest);
    assert!(!cli.insecure);
}

#[test]
fn cli_global_flags_after_subcommand() {
    let cli = parse_cli(&["toclient", "get", "/servers", "--user", "admin", "--insecure"]);
    assert_eq!(cli.user.as_deref(), Some("admin"));
    assert!(cli.insecure);
    assert!(cli.url.is_none());
}
