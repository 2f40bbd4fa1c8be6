//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including configuration loading and reading reservation documents.

use crate::error::CliError;
use std::path::{Path, PathBuf};
use stratus::{Config, ConfigBuilder, LogLevel, Logger, Reservation};

/// Environment variable that selects the log level when no flag is given.
const LOG_MODE_ENV: &str = "STRATUS_LOG_MODE";

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Explicit director configuration file.
    pub config: Option<PathBuf>,

    /// Logger built from the verbosity flags.
    pub logger: Logger,
}

/// Load the director configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Environment variables (highest priority)
/// 2. The `--config` file, or `~/.stratus/director.yaml` when it exists
/// 3. Built-in defaults (lowest priority)
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new();
    if let Some(ref path) = global.config {
        builder = builder.with_path(path);
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

/// Logger for commands that loaded a configuration.
///
/// `--verbose`/`--quiet` and `STRATUS_LOG_MODE` win; otherwise the file's
/// `log_mode` applies.
pub fn configured_logger(global: &GlobalOptions, config: &Config) -> Logger {
    let env_level = std::env::var(LOG_MODE_ENV)
        .ok()
        .and_then(|value| LogLevel::parse(&value).ok());
    if global.verbose || global.quiet || env_level.is_some() {
        return global.logger.clone();
    }
    config
        .log_level()
        .map_or_else(|| global.logger.clone(), Logger::new)
}

/// Read a list of reservations from a YAML or JSON document.
///
/// Files ending in `.json` are parsed as JSON; everything else as YAML.
pub fn read_reservations(path: &Path) -> Result<Vec<Reservation>, CliError> {
    if !path.exists() {
        return Err(CliError::InvalidArguments(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&contents).map_err(|e| e.to_string())
    };

    parsed.map_err(|e| {
        CliError::InvalidArguments(format!("Failed to parse {}: {e}", path.display()))
    })
}
