//! Error types for the stratus library.
//!
//! This module provides the error hierarchy shared by network reconciliation,
//! the CPI protocol client and configuration loading, using `thiserror` for
//! ergonomic error handling.

use std::path::PathBuf;

use thiserror::Error;

use crate::cpi::CloudErrorKind;

/// Result type alias for operations that may fail with a stratus error.
///
/// # Examples
///
/// ```
/// use stratus::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(2)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the stratus library.
#[derive(Debug, Error)]
pub enum Error {
    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred, including failure to spawn or talk to a provider.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No static IP is left in a job network's pool for the requested AZ.
    #[error("failed to reserve static IP on network '{network}' in availability zone '{az}': no static IPs left")]
    StaticIpExhausted {
        /// The job network whose pool was searched.
        network: String,
        /// The availability zone that was requested.
        az: String,
    },

    /// The requested CPI method is not part of the protocol.
    #[error("unknown CPI method '{method}'")]
    UnknownCpiMethod {
        /// The rejected method name.
        method: String,
    },

    /// The CPI executable does not exist or cannot be run.
    #[error("Failed to run cpi: '{}' is not executable", path.display())]
    NonExecutable {
        /// Path to the CPI executable.
        path: PathBuf,
    },

    /// The provider produced a response that is not valid JSON or violates
    /// the response schema.
    #[error("Invalid CPI response - {reason}")]
    InvalidResponse {
        /// What was wrong with the response.
        reason: String,
    },

    /// The provider reported one of the known cloud error types.
    #[error("CPI error '{error_type}' with message '{message}' in '{method}' CPI method (CPI request ID: '{request_id}')")]
    Cloud {
        /// The typed error class.
        kind: CloudErrorKind,
        /// The error type string exactly as the provider reported it.
        error_type: String,
        /// The provider's error message.
        message: String,
        /// Retry hint; only present for retriable kinds.
        ok_to_retry: Option<bool>,
        /// The CPI method that failed.
        method: String,
        /// The request id of the failed call.
        request_id: String,
    },

    /// The provider reported an error type the director does not know.
    #[error("Unknown CPI error '{error_type}' with message '{message}' in '{method}' CPI method (CPI request ID: '{request_id}')")]
    UnknownCpiError {
        /// The unrecognized error type string.
        error_type: String,
        /// The provider's error message.
        message: String,
        /// The CPI method that failed.
        method: String,
        /// The request id of the failed call.
        request_id: String,
    },

    /// The requested CPI API version is above what the director supports.
    #[error("CPI API version {requested} is not supported (maximum supported version is {max_supported})")]
    NotSupported {
        /// The version that was requested.
        requested: u32,
        /// The configured maximum supported version.
        max_supported: u32,
    },

    /// A v2+ provider returned no disk hint from `attach_disk`.
    #[error("No disk_hint: {message}")]
    AttachDiskResponse {
        /// Details about the missing hint.
        message: String,
    },
}

impl From<crate::network::reservation::ValidationError> for Error {
    fn from(err: crate::network::reservation::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl Error {
    /// Returns the typed cloud error class, if this error came from a
    /// provider-declared error.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus::Error;
    ///
    /// let err = Error::InvalidResponse { reason: "ParserError".into() };
    /// assert!(err.cloud_error_kind().is_none());
    /// ```
    #[must_use]
    pub fn cloud_error_kind(&self) -> Option<CloudErrorKind> {
        match self {
            Self::Cloud { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the provider's `ok_to_retry` flag for retriable cloud errors.
    #[must_use]
    pub fn ok_to_retry(&self) -> Option<bool> {
        match self {
            Self::Cloud { ok_to_retry, .. } => *ok_to_retry,
            _ => None,
        }
    }

    /// Check if the caller may retry the failed call unchanged.
    ///
    /// Only retriable cloud error kinds whose provider set `ok_to_retry` are
    /// retriable. Protocol failures and unknown errors never are.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus::Error;
    /// use stratus::cpi::CloudErrorKind;
    ///
    /// let err = Error::Cloud {
    ///     kind: CloudErrorKind::NoDiskSpace,
    ///     error_type: "NoDiskSpace".into(),
    ///     message: "full".into(),
    ///     ok_to_retry: Some(true),
    ///     method: "create_disk".into(),
    ///     request_id: "cpi-123456".into(),
    /// };
    /// assert!(err.is_retriable());
    /// ```
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        self.ok_to_retry().unwrap_or(false)
    }

    /// Check if the error is a protocol-level failure of the CPI boundary.
    #[must_use]
    pub fn is_protocol_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidResponse { .. } | Self::NonExecutable { .. } | Self::UnknownCpiMethod { .. }
        )
    }
}
