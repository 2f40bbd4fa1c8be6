//! Configuration builder.

use std::path::PathBuf;

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::ConfigLoader;
use crate::config::schema::Config;
use crate::config::validator::ConfigValidator;
use crate::error::Result;

/// Assembles and validates the director configuration.
///
/// Sources are applied in order: the configuration file (or a programmatic
/// base given with [`ConfigBuilder::with_config`]), then `STRATUS_*`
/// environment variables.
///
/// # Examples
///
/// ```
/// use stratus::config::{Config, ConfigBuilder};
///
/// let mut base = Config::default();
/// base.director_uuid = "fake-director-uuid".into();
/// base.cpi.path = "/var/vcap/jobs/cpi/bin/cpi".into();
///
/// let config = ConfigBuilder::new()
///     .skip_env()
///     .with_config(base)
///     .build()
///     .unwrap();
/// assert_eq!(config.cpi.api_version, 1);
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    path: Option<PathBuf>,
    base: Option<Config>,
    skip_files: bool,
    skip_env: bool,
}

impl ConfigBuilder {
    /// Create a builder reading the default file and the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from `path` instead of the default location.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Use `config` as the base instead of reading any file.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.base = Some(config);
        self
    }

    /// Do not read configuration files.
    #[must_use]
    pub const fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Do not apply environment variable overrides.
    #[must_use]
    pub const fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Assemble the configuration without validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be loaded or an environment variable
    /// is malformed.
    pub fn build_unvalidated(self) -> Result<Config> {
        let mut config = match self.base {
            Some(base) => base,
            None if self.skip_files => Config::default(),
            None => ConfigLoader::load(self.path.as_deref())?.unwrap_or_default(),
        };

        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut config)?;
        }

        Ok(config)
    }

    /// Assemble and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the result does not validate.
    pub fn build(self) -> Result<Config> {
        let config = self.build_unvalidated()?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }
}
