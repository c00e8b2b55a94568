//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_default_is_update() {
    let cli = parse(&["arcup"]);
    assert!(cli.command.is_none());
    assert!(matches!(cli.command(), CliCommand::Update));
    assert!(cli.config.is_none());
    assert!(!cli.no_pause);
    assert!(!cli.log_file);
}

#[test]
fn cli_parse_update_with_globals() {
    let cli = parse(&["arcup", "update", "--config", "/etc/arcup.toml", "--no-pause"]);
    assert!(matches!(cli.command(), CliCommand::Update));
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/etc/arcup.toml"))
    );
    assert!(cli.no_pause);
    assert!(!cli.should_pause());
}

#[test]
fn cli_parse_check() {
    let cli = parse(&["arcup", "-c", "cfg.toml", "check", "--log-file"]);
    assert!(matches!(cli.command(), CliCommand::Check));
    assert!(cli.log_file);
    assert!(!cli.should_pause(), "check never pauses");
}

#[test]
fn cli_parse_hash() {
    match parse(&["arcup", "hash", "bin64/d3d11.dll"]).command() {
        CliCommand::Hash { path } => assert_eq!(path, std::path::Path::new("bin64/d3d11.dll")),
        other => panic!("expected Hash, got {:?}", other),
    }
}

#[test]
fn cli_parse_hash_requires_path() {
    assert!(Cli::try_parse_from(["arcup", "hash"]).is_err());
}

#[test]
fn hash_of_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let cli = parse(&["arcup", "hash", dir.path().join("nope.dll").to_str().unwrap()]);
    assert!(cli.run().is_err());
}

#[test]
fn update_with_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("config.toml");
    let cli = parse(&["arcup", "--config", cfg.to_str().unwrap(), "--no-pause"]);
    let err = cli.run().unwrap_err();
    assert!(format!("{:#}", err).contains("config.toml"));
}
