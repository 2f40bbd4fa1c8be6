//! Version adapter between the director and a CPI transport.
//!
//! Providers speak one of several API versions. The wrapper pins the
//! requested version on the transport and hides the differences:
//!
//! - `create_vm` returns a bare VM id in v1 and `[vm_cid, networks]` from v2
//!   on; callers always get a [`CreateVmResponse`].
//! - `attach_disk` returns nothing in v1 and a disk hint from v2 on; a v2+
//!   provider that omits the hint is an error.
//! - `create_stemcell` only receives its first two arguments below v3.

use serde_json::{Map, Value};

use crate::cpi::{CpiCall, CpiMethod, CpiTransport};
use crate::error::{Error, Result};

/// Highest CPI API version this adapter knows how to translate.
pub const MAX_KNOWN_API_VERSION: u32 = 3;

/// Normalized result of `create_vm`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateVmResponse {
    /// Id of the created VM.
    pub vm_cid: String,
    /// Network settings the provider resolved, keyed by network name. Empty
    /// for v1 providers.
    pub networks: Map<String, Value>,
}

impl CreateVmResponse {
    /// The v2 wire shape `[vm_cid, networks]`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::from(self.vm_cid.as_str()),
            Value::Object(self.networks.clone()),
        ])
    }
}

/// Adapts calls and results to the negotiated CPI API version.
///
/// # Examples
///
/// ```
/// use stratus::cpi::{CpiMethod, ExternalCpiResponseWrapper, FakeCpi};
/// use serde_json::json;
///
/// let cpi = FakeCpi::new().respond_with(CpiMethod::CreateVm, json!("vm-123"));
/// let wrapper = ExternalCpiResponseWrapper::new(cpi, 1, 3).unwrap();
/// let response = wrapper
///     .create_vm("agent", "stemcell", json!({}), json!({}), vec![], json!({}))
///     .unwrap();
/// assert_eq!(response.vm_cid, "vm-123");
/// assert!(response.networks.is_empty());
///
/// assert!(ExternalCpiResponseWrapper::new(FakeCpi::new(), 99, 2).is_err());
/// ```
#[derive(Debug)]
pub struct ExternalCpiResponseWrapper<C: CpiTransport> {
    cpi: C,
    api_version: u32,
}

impl<C: CpiTransport> ExternalCpiResponseWrapper<C> {
    /// Wraps `cpi`, requesting `requested_api_version` on every call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if the requested version is zero or
    /// above `max_supported_api_version`.
    pub fn new(mut cpi: C, requested_api_version: u32, max_supported_api_version: u32) -> Result<Self> {
        if requested_api_version == 0 || requested_api_version > max_supported_api_version {
            return Err(Error::NotSupported {
                requested: requested_api_version,
                max_supported: max_supported_api_version,
            });
        }
        cpi.set_request_api_version(Some(requested_api_version));
        Ok(Self {
            cpi,
            api_version: requested_api_version,
        })
    }

    /// The negotiated API version.
    #[must_use]
    pub const fn api_version(&self) -> u32 {
        self.api_version
    }

    /// The wrapped transport.
    #[must_use]
    pub const fn cpi(&self) -> &C {
        &self.cpi
    }

    /// Unwraps the transport.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.cpi
    }

    /// Invokes any CPI operation.
    ///
    /// Results of `create_vm` and `attach_disk` are normalized the same way
    /// as the typed methods: `create_vm` always yields `[vm_cid, networks]`
    /// and `attach_disk` yields the hint or `null`.
    ///
    /// # Errors
    ///
    /// Propagates transport errors and the version-specific response errors.
    pub fn call(&self, call: CpiCall) -> Result<Value> {
        match call.method() {
            CpiMethod::CreateVm => {
                let result = self.invoke(call)?;
                Ok(self.normalize_create_vm(result)?.to_value())
            }
            CpiMethod::AttachDisk => {
                let result = self.invoke(call)?;
                Ok(self.normalize_attach_disk(result)?.unwrap_or(Value::Null))
            }
            _ => self.invoke(call),
        }
    }

    fn invoke(&self, call: CpiCall) -> Result<Value> {
        let method = call.method();
        let mut arguments = call.into_arguments();
        if method == CpiMethod::CreateStemcell && self.api_version < 3 {
            arguments.truncate(2);
        }
        self.cpi.invoke(method, arguments)
    }

    /// Creates a VM.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] if the result does not have the
    /// shape of the negotiated version.
    pub fn create_vm(
        &self,
        agent_id: &str,
        stemcell_cid: &str,
        cloud_properties: Value,
        networks: Value,
        disk_cids: Vec<String>,
        env: Value,
    ) -> Result<CreateVmResponse> {
        let result = self.invoke(CpiCall::CreateVm {
            agent_id: agent_id.to_string(),
            stemcell_cid: stemcell_cid.to_string(),
            cloud_properties,
            networks,
            disk_cids,
            env,
        })?;
        self.normalize_create_vm(result)
    }

    fn normalize_create_vm(&self, result: Value) -> Result<CreateVmResponse> {
        if self.api_version < 2 {
            return match result {
                Value::String(vm_cid) => Ok(CreateVmResponse {
                    vm_cid,
                    networks: Map::new(),
                }),
                other => Err(Error::InvalidResponse {
                    reason: format!("create_vm expected a VM id, got {other}"),
                }),
            };
        }

        if let Value::Array(mut items) = result {
            if items.len() == 2 {
                let networks = items.pop();
                let vm_cid = items.pop();
                match (vm_cid, networks) {
                    (Some(Value::String(vm_cid)), Some(Value::Object(networks))) => {
                        return Ok(CreateVmResponse { vm_cid, networks });
                    }
                    (Some(Value::String(vm_cid)), Some(Value::Null)) => {
                        return Ok(CreateVmResponse {
                            vm_cid,
                            networks: Map::new(),
                        });
                    }
                    _ => {}
                }
            }
        }
        Err(Error::InvalidResponse {
            reason: "create_vm expected [vm_cid, networks]".to_string(),
        })
    }

    /// Attaches a disk, returning the provider's disk hint from v2 on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttachDiskResponse`] if a v2+ provider returns no
    /// hint.
    pub fn attach_disk(&self, vm_cid: &str, disk_cid: &str) -> Result<Option<Value>> {
        let result = self.invoke(CpiCall::AttachDisk {
            vm_cid: vm_cid.to_string(),
            disk_cid: disk_cid.to_string(),
        })?;
        self.normalize_attach_disk(result)
    }

    fn normalize_attach_disk(&self, result: Value) -> Result<Option<Value>> {
        if self.api_version < 2 {
            return Ok(None);
        }
        let empty = match &result {
            Value::Null => true,
            Value::String(hint) => hint.is_empty(),
            Value::Object(hint) => hint.is_empty(),
            _ => false,
        };
        if empty {
            return Err(Error::AttachDiskResponse {
                message: format!("attach_disk returned {result} for CPI API version {}", self.api_version),
            });
        }
        Ok(Some(result))
    }

    /// Uploads a stemcell. `extras` are dropped below v3.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub fn create_stemcell(&self, image_path: &str, cloud_properties: Value, extras: Vec<Value>) -> Result<String> {
        let result = self.invoke(CpiCall::CreateStemcell {
            image_path: image_path.to_string(),
            cloud_properties,
            extras,
        })?;
        expect_string(CpiMethod::CreateStemcell, result)
    }

    /// Checks whether a VM exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] if the result is not a boolean.
    pub fn has_vm(&self, vm_cid: &str) -> Result<bool> {
        let result = self.invoke(CpiCall::HasVm {
            vm_cid: vm_cid.to_string(),
        })?;
        expect_bool(CpiMethod::HasVm, result)
    }

    /// Checks whether a disk exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] if the result is not a boolean.
    pub fn has_disk(&self, disk_cid: &str) -> Result<bool> {
        let result = self.invoke(CpiCall::HasDisk {
            disk_cid: disk_cid.to_string(),
        })?;
        expect_bool(CpiMethod::HasDisk, result)
    }

    /// Creates a persistent disk and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] if the result is not a disk id.
    pub fn create_disk(&self, size_mb: u64, cloud_properties: Value, vm_locality: Option<&str>) -> Result<String> {
        let result = self.invoke(CpiCall::CreateDisk {
            size_mb,
            cloud_properties,
            vm_locality: vm_locality.map(str::to_string),
        })?;
        expect_string(CpiMethod::CreateDisk, result)
    }

    /// Deletes a VM.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub fn delete_vm(&self, vm_cid: &str) -> Result<()> {
        self.invoke(CpiCall::DeleteVm {
            vm_cid: vm_cid.to_string(),
        })
        .map(drop)
    }

    /// Detaches a disk from a VM.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub fn detach_disk(&self, vm_cid: &str, disk_cid: &str) -> Result<()> {
        self.invoke(CpiCall::DetachDisk {
            vm_cid: vm_cid.to_string(),
            disk_cid: disk_cid.to_string(),
        })
        .map(drop)
    }

    /// Returns the provider's capability document.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub fn info(&self) -> Result<Value> {
        self.invoke(CpiCall::Info)
    }
}

fn expect_string(method: CpiMethod, result: Value) -> Result<String> {
    match result {
        Value::String(value) => Ok(value),
        other => Err(Error::InvalidResponse {
            reason: format!("{method} expected a string result, got {other}"),
        }),
    }
}

fn expect_bool(method: CpiMethod, result: Value) -> Result<bool> {
    match result {
        Value::Bool(value) => Ok(value),
        other => Err(Error::InvalidResponse {
            reason: format!("{method} expected a boolean result, got {other}"),
        }),
    }
}
