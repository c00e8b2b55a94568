//! CLI for the arcup ArcDPS updater.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use commands::{run_check, run_hash, run_update};

/// Top-level CLI. Without a subcommand, runs `update`.
#[derive(Debug, Parser)]
#[command(name = "arcup")]
#[command(about = "arcup: keep ArcDPS in sync with the latest published build", long_about = None)]
pub struct Cli {
    /// Config file (default: ./config.toml, then ~/.config/arcup/config.toml).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Exit immediately instead of waiting for Enter at the end of an update.
    #[arg(long, global = true)]
    pub no_pause: bool,

    /// Also append log lines to ~/.local/state/arcup/arcup.log.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Download the published build if the installed one differs (default).
    Update,

    /// Compare installed and published fingerprints without downloading.
    Check,

    /// Print the MD5 fingerprint of a file in md5sum format.
    Hash {
        /// Path to the file.
        path: PathBuf,
    },
}

impl Cli {
    fn command(&self) -> CliCommand {
        self.command.clone().unwrap_or(CliCommand::Update)
    }

    /// Runs the selected command. Any error, including a post-download
    /// mismatch, means a non-zero exit.
    pub fn run(&self) -> Result<()> {
        match self.command() {
            CliCommand::Update => run_update(self.config.as_deref()),
            CliCommand::Check => run_check(self.config.as_deref()),
            CliCommand::Hash { path } => run_hash(&path),
        }
    }

    /// Pause only for interactive update runs, so a console window opened by
    /// double-click stays readable.
    pub fn should_pause(&self) -> bool {
        !self.no_pause
            && matches!(self.command(), CliCommand::Update)
            && io::stdin().is_terminal()
    }
}

pub fn wait_for_enter() {
    print!("Press the <Enter> key on the keyboard to exit.");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

#[cfg(test)]
mod tests;
