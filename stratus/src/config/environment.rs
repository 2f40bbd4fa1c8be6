//! Environment variable handling for configuration overrides.
//!
//! This module provides support for STRATUS_* environment variables that
//! override configuration file values.

use crate::config::schema::Config;
use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use stratus::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not hold a non-negative
    /// integer.
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(uuid) = env::var("STRATUS_DIRECTOR_UUID") {
            config.director_uuid = uuid;
        }

        if let Ok(path) = env::var("STRATUS_CPI_PATH") {
            config.cpi.path = PathBuf::from(path);
        }

        if let Ok(val) = env::var("STRATUS_CPI_API_VERSION") {
            config.cpi.api_version = Self::parse_version("STRATUS_CPI_API_VERSION", &val)?;
        }

        if let Ok(val) = env::var("STRATUS_MAX_CPI_API_VERSION") {
            config.cpi.max_supported_api_version =
                Self::parse_version("STRATUS_MAX_CPI_API_VERSION", &val)?;
        }

        if let Ok(val) = env::var("STRATUS_STEMCELL_API_VERSION") {
            config.cpi.stemcell_api_version =
                Some(Self::parse_version("STRATUS_STEMCELL_API_VERSION", &val)?);
        }

        if let Ok(path) = env::var("STRATUS_CPI_TASK_LOG") {
            config.cpi.task_log = Some(PathBuf::from(path));
        }

        Ok(())
    }

    /// Parse an API version number.
    fn parse_version(field: &str, s: &str) -> Result<u32> {
        s.trim().parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Invalid API version: '{s}' (expected a non-negative integer)"),
        })
    }
}
