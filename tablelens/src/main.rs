//! Column profiling and data-quality assessment tool.
//!
//! Profiles result sets column by column and scores tables with
//! completeness and uniqueness checks computed by a query engine.
//!
//! # Guarantees
//! - Read-only queries only
//! - Connection strings are redacted before they are logged
//! - Engine error messages are printed verbatim

use std::process::ExitCode;

use clap::Parser;
use tablelens::cli::{Cli, Command};
use tablelens::commands;
use tablelens_core::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet, cli.global.log_format.into()) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let database_url = cli.global.database_url.as_deref();

    match &cli.command {
        Command::Profile(args) => commands::profile(args, database_url).await,
        Command::Assess(args) => commands::assess(args, database_url).await,
        Command::Test => commands::test_connection(database_url).await,
        Command::List => {
            commands::list_supported_engines();
            Ok(())
        }
    }
}
