//! Configuration validation.
//!
//! This module checks a fully assembled configuration before any CPI call is
//! attempted with it.

use crate::config::schema::{Config, CpiConfig};
use crate::cpi::MAX_KNOWN_API_VERSION;
use crate::error::{Error, Result};
use crate::logging::LogLevel;

/// Validates director configuration.
///
/// # Examples
///
/// ```
/// use stratus::config::{Config, ConfigValidator};
///
/// let mut config = Config::default();
/// assert!(ConfigValidator::validate(&config).is_err());
///
/// config.director_uuid = "fake-director-uuid".into();
/// config.cpi.path = "/var/vcap/jobs/cpi/bin/cpi".into();
/// ConfigValidator::validate(&config).unwrap();
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(config: &Config) -> Result<()> {
        Self::validate_identifier("director_uuid", &config.director_uuid)?;
        Self::validate_cpi(&config.cpi)?;

        if let Some(ref mode) = config.log_mode {
            LogLevel::parse(mode).map_err(|message| Error::Validation {
                field: "log_mode".into(),
                message,
            })?;
        }

        Ok(())
    }

    /// Checks that the identifier is non-empty after trimming and contains no
    /// null bytes.
    fn validate_identifier(field: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot be empty or only whitespace".into(),
            });
        }

        if trimmed.contains('\0') {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot contain null bytes".into(),
            });
        }

        Ok(())
    }

    /// Validate the CPI section.
    ///
    /// The maximum supported version must be one the adapter knows, and the
    /// requested version must lie between 1 and that maximum.
    fn validate_cpi(cpi: &CpiConfig) -> Result<()> {
        if cpi.path.as_os_str().is_empty() {
            return Err(Error::Validation {
                field: "cpi.path".into(),
                message: "Cannot be empty".into(),
            });
        }

        if cpi.max_supported_api_version == 0 || cpi.max_supported_api_version > MAX_KNOWN_API_VERSION {
            return Err(Error::Validation {
                field: "cpi.max_supported_api_version".into(),
                message: format!("Must be between 1 and {MAX_KNOWN_API_VERSION}"),
            });
        }

        if cpi.api_version == 0 {
            return Err(Error::Validation {
                field: "cpi.api_version".into(),
                message: "Must be at least 1".into(),
            });
        }

        if cpi.api_version > cpi.max_supported_api_version {
            return Err(Error::NotSupported {
                requested: cpi.api_version,
                max_supported: cpi.max_supported_api_version,
            });
        }

        if cpi.stemcell_api_version == Some(0) {
            return Err(Error::Validation {
                field: "cpi.stemcell_api_version".into(),
                message: "Must be at least 1".into(),
            });
        }

        Ok(())
    }
}
