//! Configuration file discovery and loading.
//!
//! The director configuration lives in one YAML file: either the path given
//! explicitly or `~/.stratus/director.yaml`.

use crate::config::schema::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the home directory holding the default configuration.
pub const CONFIG_DIR: &str = ".stratus";

/// File name of the default configuration.
pub const CONFIG_FILE: &str = "director.yaml";

/// Loads the director configuration.
///
/// # Examples
///
/// ```no_run
/// use stratus::config::ConfigLoader;
///
/// if let Some(config) = ConfigLoader::load(None).unwrap() {
///     println!("director {}", config.director_uuid);
/// }
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, if a file cannot be
    /// read or parsed, or if the home directory cannot be determined.
    pub fn load(path: Option<&Path>) -> Result<Option<Config>> {
        if let Some(path) = path {
            return Self::load_file(path).map(Some);
        }

        let default_path = Self::default_path()?;
        if !default_path.exists() {
            return Ok(None);
        }
        Self::load_file(&default_path).map(Some)
    }

    /// Load and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path).map_err(|e| Error::Validation {
            field: format!("{}", path.display()),
            message: format!("Failed to read configuration file: {e}"),
        })?;

        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Path of the default configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home = home::home_dir().ok_or_else(|| Error::Validation {
            field: "home".into(),
            message: "Cannot determine home directory".into(),
        })?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }
}
