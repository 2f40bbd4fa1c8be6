//! The transport seam between the director and a provider.
//!
//! [`CpiTransport`] is the narrow interface the version adapter talks to.
//! [`crate::cpi::ExternalCpi`] implements it by spawning the provider
//! executable; [`FakeCpi`] implements it in memory for tests and tooling.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use crate::cpi::{CpiErrorPayload, CpiMethod};
use crate::error::Result;

/// Something that can invoke CPI methods.
///
/// # Examples
///
/// ```
/// use stratus::cpi::{CpiMethod, CpiTransport, FakeCpi};
/// use serde_json::json;
///
/// let cpi = FakeCpi::new().respond_with(CpiMethod::CurrentVmId, json!("vm-1"));
/// assert_eq!(cpi.invoke(CpiMethod::CurrentVmId, vec![]).unwrap(), json!("vm-1"));
/// ```
pub trait CpiTransport: Send + Sync {
    /// Invoke `method` with positional `arguments` and return its result.
    ///
    /// # Errors
    ///
    /// Returns a protocol failure if the provider could not be run or
    /// answered with an invalid document, and the typed cloud error if the
    /// provider declared one.
    fn invoke(&self, method: CpiMethod, arguments: Vec<Value>) -> Result<Value>;

    /// The API version sent with every request, if any.
    fn request_api_version(&self) -> Option<u32>;

    /// Set the API version sent with every request.
    fn set_request_api_version(&mut self, version: Option<u32>);
}

/// One invocation seen by a [`FakeCpi`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// The invoked method.
    pub method: CpiMethod,
    /// Arguments exactly as received.
    pub arguments: Vec<Value>,
    /// Request API version in effect for the call.
    pub api_version: Option<u32>,
}

/// In-memory CPI with scripted replies.
///
/// Methods without a scripted reply return `null`.
///
/// # Examples
///
/// ```
/// use stratus::cpi::{CpiErrorPayload, CpiMethod, CpiTransport, FakeCpi};
///
/// let cpi = FakeCpi::new().fail_with(
///     CpiMethod::AttachDisk,
///     CpiErrorPayload {
///         error_type: "DiskNotFound".into(),
///         message: "no disk".into(),
///         ok_to_retry: false,
///     },
/// );
/// let err = cpi.invoke(CpiMethod::AttachDisk, vec![]).unwrap_err();
/// assert!(err.to_string().contains("no disk"));
/// assert_eq!(cpi.calls().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FakeCpi {
    replies: HashMap<CpiMethod, std::result::Result<Value, CpiErrorPayload>>,
    request_api_version: Option<u32>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeCpi {
    /// Request id reported in errors raised by the fake.
    pub const REQUEST_ID: &'static str = "cpi-000000";

    /// Create a fake with no scripted replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `result` as the reply to every call of `method`.
    #[must_use]
    pub fn respond_with(mut self, method: CpiMethod, result: Value) -> Self {
        self.replies.insert(method, Ok(result));
        self
    }

    /// Script a provider error as the reply to every call of `method`.
    #[must_use]
    pub fn fail_with(mut self, method: CpiMethod, error: CpiErrorPayload) -> Self {
        self.replies.insert(method, Err(error));
        self
    }

    /// Every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent call, if any.
    #[must_use]
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls().pop()
    }
}

impl CpiTransport for FakeCpi {
    fn invoke(&self, method: CpiMethod, arguments: Vec<Value>) -> Result<Value> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                method,
                arguments,
                api_version: self.request_api_version,
            });

        match self.replies.get(&method) {
            Some(Ok(result)) => Ok(result.clone()),
            Some(Err(error)) => Err(error.clone().into_error(method, Self::REQUEST_ID)),
            None => Ok(Value::Null),
        }
    }

    fn request_api_version(&self) -> Option<u32> {
        self.request_api_version
    }

    fn set_request_api_version(&mut self, version: Option<u32>) {
        self.request_api_version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpi::CloudErrorKind;
    use serde_json::json;

    #[test]
    fn test_unscripted_method_returns_null() {
        let cpi = FakeCpi::new();
        assert_eq!(cpi.invoke(CpiMethod::Ping, vec![]).unwrap(), Value::Null);
    }

    #[test]
    fn test_records_calls_with_api_version() {
        let mut cpi = FakeCpi::new();
        cpi.invoke(CpiMethod::DeleteVm, vec![json!("vm-1")]).unwrap();
        cpi.set_request_api_version(Some(2));
        cpi.invoke(CpiMethod::HasVm, vec![json!("vm-2")]).unwrap();

        let calls = cpi.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].api_version, None);
        assert_eq!(calls[1].method, CpiMethod::HasVm);
        assert_eq!(calls[1].arguments, vec![json!("vm-2")]);
        assert_eq!(calls[1].api_version, Some(2));
        assert_eq!(cpi.last_call(), Some(calls[1].clone()));
    }

    #[test]
    fn test_scripted_error_is_typed() {
        let cpi = FakeCpi::new().fail_with(
            CpiMethod::CreateVm,
            CpiErrorPayload {
                error_type: "VMCreationFailed".into(),
                message: "quota".into(),
                ok_to_retry: true,
            },
        );
        let err = cpi.invoke(CpiMethod::CreateVm, vec![]).unwrap_err();
        assert_eq!(err.cloud_error_kind(), Some(CloudErrorKind::VMCreationFailed));
        assert!(err.is_retriable());
    }

    #[test]
    fn test_transport_is_object_safe() {
        let cpi: Box<dyn CpiTransport> = Box::new(FakeCpi::new().respond_with(CpiMethod::Info, json!({})));
        assert_eq!(cpi.invoke(CpiMethod::Info, vec![]).unwrap(), json!({}));
    }
}
