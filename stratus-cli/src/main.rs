//! Main entry point for the stratus CLI.
//!
//! Operator tooling around the stratus library:
//! - `reconcile`: Classify desired and existing network reservations
//! - `cpi`: Invoke a single CPI method through the configured provider
//! - `validate`: Validate a director configuration file

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let logger = stratus::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
        logger,
    };

    let result = match cli.command {
        cli::Command::Reconcile(cmd) => cmd.execute(&global),
        cli::Command::Cpi(cmd) => cmd.execute(&global),
        cli::Command::Validate(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
