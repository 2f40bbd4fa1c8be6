//! Cloud error classes a provider may report.

use std::fmt;

/// Prefix some providers put in front of error type names.
const LEGACY_NAMESPACE: &str = "Bosh::Clouds::";

/// The closed set of error types the director understands.
///
/// Anything else a provider reports becomes [`crate::Error::UnknownCpiError`].
///
/// # Examples
///
/// ```
/// use stratus::cpi::CloudErrorKind;
///
/// assert_eq!(CloudErrorKind::from_type("DiskNotFound"), Some(CloudErrorKind::DiskNotFound));
/// assert_eq!(
///     CloudErrorKind::from_type("Bosh::Clouds::NoDiskSpace"),
///     Some(CloudErrorKind::NoDiskSpace)
/// );
/// assert_eq!(CloudErrorKind::from_type("InvalidCall"), None);
/// assert!(CloudErrorKind::VMCreationFailed.is_retriable());
/// assert!(!CloudErrorKind::CloudError.is_retriable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudErrorKind {
    /// Generic CPI failure.
    CpiError,
    /// The provider does not support the request.
    NotSupported,
    /// The provider does not implement the method.
    NotImplemented,
    /// Generic IaaS failure.
    CloudError,
    /// The VM does not exist.
    VMNotFound,
    /// The network does not exist.
    NetworkNotFound,
    /// No room for the requested disk.
    NoDiskSpace,
    /// The disk is not attached to the VM.
    DiskNotAttached,
    /// The disk does not exist.
    DiskNotFound,
    /// The VM could not be created.
    VMCreationFailed,
}

impl CloudErrorKind {
    /// Every known kind.
    pub const ALL: [Self; 10] = [
        Self::CpiError,
        Self::NotSupported,
        Self::NotImplemented,
        Self::CloudError,
        Self::VMNotFound,
        Self::NetworkNotFound,
        Self::NoDiskSpace,
        Self::DiskNotAttached,
        Self::DiskNotFound,
        Self::VMCreationFailed,
    ];

    /// Maps a provider error type string, with or without the legacy
    /// namespace prefix, to a known kind.
    #[must_use]
    pub fn from_type(error_type: &str) -> Option<Self> {
        let name = error_type.strip_prefix(LEGACY_NAMESPACE).unwrap_or(error_type);
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Returns the bare type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CpiError => "CpiError",
            Self::NotSupported => "NotSupported",
            Self::NotImplemented => "NotImplemented",
            Self::CloudError => "CloudError",
            Self::VMNotFound => "VMNotFound",
            Self::NetworkNotFound => "NetworkNotFound",
            Self::NoDiskSpace => "NoDiskSpace",
            Self::DiskNotAttached => "DiskNotAttached",
            Self::DiskNotFound => "DiskNotFound",
            Self::VMCreationFailed => "VMCreationFailed",
        }
    }

    /// Retriable kinds carry the provider's `ok_to_retry` flag.
    #[must_use]
    pub const fn is_retriable(self) -> bool {
        matches!(
            self,
            Self::NoDiskSpace | Self::DiskNotAttached | Self::DiskNotFound | Self::VMCreationFailed
        )
    }
}

impl fmt::Display for CloudErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps legacy "method not implemented" replies to [`CloudErrorKind::NotImplemented`].
///
/// Older providers answer unknown methods with `InvalidCall` or `CloudError`
/// and a recognizable message instead of `NotImplemented`.
#[must_use]
pub(crate) fn legacy_not_implemented(error_type: &str, message: &str) -> bool {
    let name = error_type.strip_prefix(LEGACY_NAMESPACE).unwrap_or(error_type);
    (name == "InvalidCall" && message.starts_with("Method is not known, got"))
        || (name == "CloudError" && message.starts_with("Invalid Method:"))
}
