//! Configuration system for stratus.
//!
//! This module provides the director configuration with support for:
//! - A YAML configuration file (`~/.stratus/director.yaml` or an explicit path)
//! - Environment variable overrides (`STRATUS_*`)
//! - Programmatic configuration via builder pattern
//! - Validation of the CPI version settings
//!
//! # Examples
//!
//! Loading from a specific file:
//!
//! ```no_run
//! use stratus::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_path("/var/vcap/jobs/director/config/director.yaml")
//!     .build()
//!     .unwrap();
//! ```
//!
//! Building the CPI stack from configuration:
//!
//! ```no_run
//! use stratus::config::ConfigBuilder;
//! use stratus::Logger;
//!
//! let config = ConfigBuilder::new().build().unwrap();
//! let cpi = config.response_wrapper(&Logger::default()).unwrap();
//! println!("{}", cpi.info().unwrap());
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod schema;
pub mod validator;

pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::ConfigLoader;
pub use schema::{Config, CpiConfig};
pub use validator::ConfigValidator;
