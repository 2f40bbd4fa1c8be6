//! Configuration schema definitions.
//!
//! This module defines the director configuration: the director's identity,
//! how to reach the CPI provider and which API version to speak to it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cpi::{ExternalCpi, ExternalCpiResponseWrapper};
use crate::error::Result;
use crate::logging::{LogLevel, Logger};

/// Complete director configuration.
///
/// # Examples
///
/// ```
/// use stratus::config::{Config, CpiConfig};
///
/// let config: Config = serde_yaml::from_str(
///     "director_uuid: fake-director-uuid\ncpi:\n  path: /var/vcap/jobs/cpi/bin/cpi\n",
/// )
/// .unwrap();
/// assert_eq!(config.cpi.api_version, 1);
/// assert_eq!(config.cpi.max_supported_api_version, 3);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Identity of this director, sent in every CPI request context.
    #[serde(default)]
    pub director_uuid: String,

    /// CPI provider settings.
    #[serde(default)]
    pub cpi: CpiConfig,

    /// Log verbosity (`quiet`, `normal` or `verbose`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_mode: Option<String>,
}

impl Config {
    /// The configured log level, if `log_mode` is set and valid.
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_mode.as_deref().and_then(|mode| LogLevel::parse(mode).ok())
    }

    /// Builds the subprocess transport described by the `cpi` section.
    #[must_use]
    pub fn external_cpi(&self, logger: &Logger) -> ExternalCpi {
        ExternalCpi::new(self.cpi.path.clone(), self.director_uuid.as_str())
            .with_properties_from_cpi_config(self.cpi.properties.clone())
            .with_stemcell_api_version(self.cpi.stemcell_api_version)
            .with_task_log(self.cpi.task_log.clone())
            .with_logger(logger)
    }

    /// Builds the version adapter around [`Config::external_cpi`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotSupported`] if the requested API version
    /// exceeds the configured maximum.
    pub fn response_wrapper(&self, logger: &Logger) -> Result<ExternalCpiResponseWrapper<ExternalCpi>> {
        ExternalCpiResponseWrapper::new(
            self.external_cpi(logger),
            self.cpi.api_version,
            self.cpi.max_supported_api_version,
        )
    }
}

/// How to reach the CPI provider.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CpiConfig {
    /// Path to the provider executable.
    #[serde(default)]
    pub path: PathBuf,

    /// API version requested from the provider.
    #[serde(default = "default_api_version")]
    pub api_version: u32,

    /// Highest API version the director accepts.
    #[serde(default = "default_max_supported_api_version")]
    pub max_supported_api_version: u32,

    /// Stemcell API version advertised in the request context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stemcell_api_version: Option<u32>,

    /// Properties from the CPI config, merged into every request context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,

    /// File receiving provider stderr and response logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_log: Option<PathBuf>,
}

const fn default_api_version() -> u32 {
    1
}

const fn default_max_supported_api_version() -> u32 {
    crate::cpi::MAX_KNOWN_API_VERSION
}

impl Default for CpiConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            api_version: default_api_version(),
            max_supported_api_version: default_max_supported_api_version(),
            stemcell_api_version: None,
            properties: None,
            task_log: None,
        }
    }
}
