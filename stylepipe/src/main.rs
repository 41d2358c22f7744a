// stylepipe/src/main.rs
//! Stylepipe entry point.
//!
//! Parses the command line, sets up logging and dispatches to the
//! subcommand handlers in `commands`.

use anyhow::Result;
use clap::Parser;
use log::debug;
use std::process::ExitCode;

use stylepipe::cli::{Cli, Commands};
use stylepipe::commands::{build, dedupe, error_msg, targets};
use stylepipe::logger;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug, cli.disable_debug));
    debug!("Parsed arguments: {:?}", cli);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error_msg(format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Build(cmd) => {
            let report = build::run_build(cmd, quiet).await?;
            Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Dedupe(cmd) => {
            dedupe::run_dedupe(cmd, quiet)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Targets(cmd) => {
            targets::run_targets(cmd)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
