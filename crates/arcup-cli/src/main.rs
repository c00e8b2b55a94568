use arcup_core::logging;

mod cli;

use crate::cli::Cli;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    // Initialize logging as early as possible; fall back to plain stderr.
    if let Err(err) = logging::init_logging(cli.log_file) {
        logging::init_logging_stderr();
        tracing::warn!("log file unavailable ({:#}), logging to stderr only", err);
    }

    let success = match cli.run() {
        Ok(()) => true,
        Err(err) => {
            tracing::error!("arcup error: {:#}", err);
            false
        }
    };

    if cli.should_pause() {
        cli::wait_for_enter();
    }
    std::process::exit(if success { 0 } else { 1 });
}
