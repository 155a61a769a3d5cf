//! Tests for get, ping, login, versions, config.

use super::parse;
use crate::cli::CliCommand;
use crate::cli::Cli;
use clap::Parser;

#[test]
fn cli_parse_get_path_only() {
    match parse(&["toclient", "get", "/servers"]) {
        CliCommand::Get {
            path,
            id,
            name,
            retries,
        } => {
            assert_eq!(path, "/servers");
            assert!(id.is_none());
            assert!(name.is_none());
            assert!(retries.is_none());
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_with_selector() {
    match parse(&["toclient", "get", "/cdns", "--id", "4", "--retries", "2"]) {
        CliCommand::Get { id, retries, .. } => {
            assert_eq!(id, Some(4));
            assert_eq!(retries, Some(2));
        }
        _ => panic!("expected Get"),
    }
    match parse(&["toclient", "get", "/cdns", "--name", "cdn1"]) {
        CliCommand::Get { name, .. } => assert_eq!(name.as_deref(), Some("cdn1")),
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_rejects_id_and_name_together() {
    assert!(Cli::try_parse_from(["toclient", "get", "/cdns", "--id", "1", "--name", "x"]).is_err());
}

#[test]
fn cli_parse_simple_commands() {
    assert!(matches!(parse(&["toclient", "ping"]), CliCommand::Ping));
    assert!(matches!(parse(&["toclient", "login"]), CliCommand::Login));
    assert!(matches!(parse(&["toclient", "versions"]), CliCommand::Versions));
    assert!(matches!(parse(&["toclient", "config"]), CliCommand::Config));
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["toclient"]).is_err());
}
