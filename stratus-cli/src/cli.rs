//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{CpiCommand, ReconcileCommand, ValidateCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Operator tooling for network reservations and CPI providers.
#[derive(Parser)]
#[command(name = "stratus")]
#[command(
    version,
    about = "Reconcile network reservations and talk to CPI providers",
    long_about = None
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Director configuration file (defaults to ~/.stratus/director.yaml)
    #[arg(long, value_name = "PATH", global = true, env = "STRATUS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Classify desired and existing reservations into plans
    Reconcile(ReconcileCommand),

    /// Invoke one CPI method through the configured provider
    Cpi(CpiCommand),

    /// Validate a director configuration file
    Validate(ValidateCommand),
}
