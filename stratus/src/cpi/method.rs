//! The CPI method allow-list and typed operations.
//!
//! [`CpiMethod`] is the closed set of method names a provider may be asked to
//! run; nothing outside it is ever dispatched. [`CpiCall`] pairs each method
//! with its positional argument shape.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

use crate::error::Error;

/// A method of the CPI protocol.
///
/// # Examples
///
/// ```
/// use stratus::cpi::CpiMethod;
///
/// let method: CpiMethod = "attach_disk".parse().unwrap();
/// assert_eq!(method, CpiMethod::AttachDisk);
/// assert_eq!("has_vm?".parse::<CpiMethod>().unwrap().as_str(), "has_vm");
/// assert!("create_network".parse::<CpiMethod>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpiMethod {
    /// `current_vm_id`
    CurrentVmId,
    /// `create_stemcell`
    CreateStemcell,
    /// `delete_stemcell`
    DeleteStemcell,
    /// `create_vm`
    CreateVm,
    /// `delete_vm`
    DeleteVm,
    /// `has_vm`
    HasVm,
    /// `reboot_vm`
    RebootVm,
    /// `set_vm_metadata`
    SetVmMetadata,
    /// `set_disk_metadata`
    SetDiskMetadata,
    /// `create_disk`
    CreateDisk,
    /// `has_disk`
    HasDisk,
    /// `delete_disk`
    DeleteDisk,
    /// `attach_disk`
    AttachDisk,
    /// `detach_disk`
    DetachDisk,
    /// `snapshot_disk`
    SnapshotDisk,
    /// `delete_snapshot`
    DeleteSnapshot,
    /// `get_disks`
    GetDisks,
    /// `resize_disk`
    ResizeDisk,
    /// `ping`
    Ping,
    /// `calculate_vm_cloud_properties`
    CalculateVmCloudProperties,
    /// `info`
    Info,
}

impl CpiMethod {
    /// Every method of the protocol.
    pub const ALL: [Self; 21] = [
        Self::CurrentVmId,
        Self::CreateStemcell,
        Self::DeleteStemcell,
        Self::CreateVm,
        Self::DeleteVm,
        Self::HasVm,
        Self::RebootVm,
        Self::SetVmMetadata,
        Self::SetDiskMetadata,
        Self::CreateDisk,
        Self::HasDisk,
        Self::DeleteDisk,
        Self::AttachDisk,
        Self::DetachDisk,
        Self::SnapshotDisk,
        Self::DeleteSnapshot,
        Self::GetDisks,
        Self::ResizeDisk,
        Self::Ping,
        Self::CalculateVmCloudProperties,
        Self::Info,
    ];

    /// Returns the wire name sent to the provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentVmId => "current_vm_id",
            Self::CreateStemcell => "create_stemcell",
            Self::DeleteStemcell => "delete_stemcell",
            Self::CreateVm => "create_vm",
            Self::DeleteVm => "delete_vm",
            Self::HasVm => "has_vm",
            Self::RebootVm => "reboot_vm",
            Self::SetVmMetadata => "set_vm_metadata",
            Self::SetDiskMetadata => "set_disk_metadata",
            Self::CreateDisk => "create_disk",
            Self::HasDisk => "has_disk",
            Self::DeleteDisk => "delete_disk",
            Self::AttachDisk => "attach_disk",
            Self::DetachDisk => "detach_disk",
            Self::SnapshotDisk => "snapshot_disk",
            Self::DeleteSnapshot => "delete_snapshot",
            Self::GetDisks => "get_disks",
            Self::ResizeDisk => "resize_disk",
            Self::Ping => "ping",
            Self::CalculateVmCloudProperties => "calculate_vm_cloud_properties",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for CpiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CpiMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s {
            "has_vm?" => "has_vm",
            "has_disk?" => "has_disk",
            other => other,
        };
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == name)
            .ok_or_else(|| Error::UnknownCpiMethod {
                method: s.to_string(),
            })
    }
}

/// One CPI operation with its typed arguments.
///
/// # Examples
///
/// ```
/// use stratus::cpi::{CpiCall, CpiMethod};
///
/// let call = CpiCall::AttachDisk {
///     vm_cid: "vm-1".into(),
///     disk_cid: "disk-1".into(),
/// };
/// assert_eq!(call.method(), CpiMethod::AttachDisk);
/// assert_eq!(call.into_arguments(), vec![serde_json::json!("vm-1"), serde_json::json!("disk-1")]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CpiCall {
    /// Id of the VM the director itself runs on.
    CurrentVmId,
    /// Upload a stemcell image.
    CreateStemcell {
        /// Path to the image on the director.
        image_path: String,
        /// Stemcell cloud properties.
        cloud_properties: Value,
        /// Arguments only understood by API version 3 and later.
        extras: Vec<Value>,
    },
    /// Delete a stemcell.
    DeleteStemcell {
        /// Stemcell id.
        stemcell_cid: String,
    },
    /// Create a VM.
    CreateVm {
        /// Agent id the VM should boot with.
        agent_id: String,
        /// Stemcell id.
        stemcell_cid: String,
        /// VM cloud properties.
        cloud_properties: Value,
        /// Network settings keyed by network name.
        networks: Value,
        /// Disks the VM should be placed near.
        disk_cids: Vec<String>,
        /// Agent environment.
        env: Value,
    },
    /// Delete a VM.
    DeleteVm {
        /// VM id.
        vm_cid: String,
    },
    /// Check VM existence.
    HasVm {
        /// VM id.
        vm_cid: String,
    },
    /// Reboot a VM.
    RebootVm {
        /// VM id.
        vm_cid: String,
    },
    /// Tag a VM.
    SetVmMetadata {
        /// VM id.
        vm_cid: String,
        /// Metadata key/value pairs.
        metadata: Map<String, Value>,
    },
    /// Tag a disk.
    SetDiskMetadata {
        /// Disk id.
        disk_cid: String,
        /// Metadata key/value pairs.
        metadata: Map<String, Value>,
    },
    /// Create a persistent disk.
    CreateDisk {
        /// Size in MiB.
        size_mb: u64,
        /// Disk cloud properties.
        cloud_properties: Value,
        /// VM the disk should be created near.
        vm_locality: Option<String>,
    },
    /// Check disk existence.
    HasDisk {
        /// Disk id.
        disk_cid: String,
    },
    /// Delete a disk.
    DeleteDisk {
        /// Disk id.
        disk_cid: String,
    },
    /// Attach a disk to a VM.
    AttachDisk {
        /// VM id.
        vm_cid: String,
        /// Disk id.
        disk_cid: String,
    },
    /// Detach a disk from a VM.
    DetachDisk {
        /// VM id.
        vm_cid: String,
        /// Disk id.
        disk_cid: String,
    },
    /// Snapshot a disk.
    SnapshotDisk {
        /// Disk id.
        disk_cid: String,
        /// Snapshot metadata.
        metadata: Map<String, Value>,
    },
    /// Delete a snapshot.
    DeleteSnapshot {
        /// Snapshot id.
        snapshot_cid: String,
    },
    /// List disks attached to a VM.
    GetDisks {
        /// VM id.
        vm_cid: String,
    },
    /// Grow a disk.
    ResizeDisk {
        /// Disk id.
        disk_cid: String,
        /// New size in MiB.
        new_size_mb: u64,
    },
    /// Liveness check.
    Ping,
    /// Translate VM resource requirements into cloud properties.
    CalculateVmCloudProperties {
        /// Requested resources (cpu, ram, ephemeral disk size).
        vm_resources: Value,
    },
    /// Provider capabilities.
    Info,
}

impl CpiCall {
    /// Builds a typed call from a method and its positional wire arguments.
    ///
    /// Trailing optional arguments (`disk_cids` and `env` of `create_vm`,
    /// the VM locality of `create_disk`) may be omitted. `create_stemcell`
    /// keeps any arguments after the second as extras.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if an argument is missing, has the wrong
    /// JSON type, or is not expected by the method.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus::cpi::{CpiCall, CpiMethod};
    /// use serde_json::json;
    ///
    /// let call = CpiCall::from_arguments(CpiMethod::DeleteVm, vec![json!("vm-1")]).unwrap();
    /// assert_eq!(call, CpiCall::DeleteVm { vm_cid: "vm-1".into() });
    /// assert!(CpiCall::from_arguments(CpiMethod::DeleteVm, vec![]).is_err());
    /// ```
    pub fn from_arguments(method: CpiMethod, arguments: Vec<Value>) -> Result<Self, Error> {
        let mut args = Arguments::new(method, arguments);
        let call = match method {
            CpiMethod::CurrentVmId => Self::CurrentVmId,
            CpiMethod::Ping => Self::Ping,
            CpiMethod::Info => Self::Info,
            CpiMethod::CreateStemcell => Self::CreateStemcell {
                image_path: args.string()?,
                cloud_properties: args.required()?,
                extras: args.values.by_ref().collect(),
            },
            CpiMethod::DeleteStemcell => Self::DeleteStemcell {
                stemcell_cid: args.string()?,
            },
            CpiMethod::CreateVm => Self::CreateVm {
                agent_id: args.string()?,
                stemcell_cid: args.string()?,
                cloud_properties: args.required()?,
                networks: args.required()?,
                disk_cids: args.strings()?,
                env: args.optional(),
            },
            CpiMethod::DeleteVm => Self::DeleteVm {
                vm_cid: args.string()?,
            },
            CpiMethod::HasVm => Self::HasVm {
                vm_cid: args.string()?,
            },
            CpiMethod::RebootVm => Self::RebootVm {
                vm_cid: args.string()?,
            },
            CpiMethod::GetDisks => Self::GetDisks {
                vm_cid: args.string()?,
            },
            CpiMethod::SetVmMetadata => Self::SetVmMetadata {
                vm_cid: args.string()?,
                metadata: args.object()?,
            },
            CpiMethod::SetDiskMetadata => Self::SetDiskMetadata {
                disk_cid: args.string()?,
                metadata: args.object()?,
            },
            CpiMethod::SnapshotDisk => Self::SnapshotDisk {
                disk_cid: args.string()?,
                metadata: args.object()?,
            },
            CpiMethod::CreateDisk => Self::CreateDisk {
                size_mb: args.size()?,
                cloud_properties: args.required()?,
                vm_locality: match args.optional() {
                    Value::Null => None,
                    Value::String(vm_cid) => Some(vm_cid),
                    other => return Err(args.invalid(format!("expected a VM id, got {other}"))),
                },
            },
            CpiMethod::HasDisk => Self::HasDisk {
                disk_cid: args.string()?,
            },
            CpiMethod::DeleteDisk => Self::DeleteDisk {
                disk_cid: args.string()?,
            },
            CpiMethod::AttachDisk => Self::AttachDisk {
                vm_cid: args.string()?,
                disk_cid: args.string()?,
            },
            CpiMethod::DetachDisk => Self::DetachDisk {
                vm_cid: args.string()?,
                disk_cid: args.string()?,
            },
            CpiMethod::DeleteSnapshot => Self::DeleteSnapshot {
                snapshot_cid: args.string()?,
            },
            CpiMethod::ResizeDisk => Self::ResizeDisk {
                disk_cid: args.string()?,
                new_size_mb: args.size()?,
            },
            CpiMethod::CalculateVmCloudProperties => Self::CalculateVmCloudProperties {
                vm_resources: args.required()?,
            },
        };
        args.finish()?;
        Ok(call)
    }

    /// Returns the method this call invokes.
    #[must_use]
    pub const fn method(&self) -> CpiMethod {
        match self {
            Self::CurrentVmId => CpiMethod::CurrentVmId,
            Self::CreateStemcell { .. } => CpiMethod::CreateStemcell,
            Self::DeleteStemcell { .. } => CpiMethod::DeleteStemcell,
            Self::CreateVm { .. } => CpiMethod::CreateVm,
            Self::DeleteVm { .. } => CpiMethod::DeleteVm,
            Self::HasVm { .. } => CpiMethod::HasVm,
            Self::RebootVm { .. } => CpiMethod::RebootVm,
            Self::SetVmMetadata { .. } => CpiMethod::SetVmMetadata,
            Self::SetDiskMetadata { .. } => CpiMethod::SetDiskMetadata,
            Self::CreateDisk { .. } => CpiMethod::CreateDisk,
            Self::HasDisk { .. } => CpiMethod::HasDisk,
            Self::DeleteDisk { .. } => CpiMethod::DeleteDisk,
            Self::AttachDisk { .. } => CpiMethod::AttachDisk,
            Self::DetachDisk { .. } => CpiMethod::DetachDisk,
            Self::SnapshotDisk { .. } => CpiMethod::SnapshotDisk,
            Self::DeleteSnapshot { .. } => CpiMethod::DeleteSnapshot,
            Self::GetDisks { .. } => CpiMethod::GetDisks,
            Self::ResizeDisk { .. } => CpiMethod::ResizeDisk,
            Self::Ping => CpiMethod::Ping,
            Self::CalculateVmCloudProperties { .. } => CpiMethod::CalculateVmCloudProperties,
            Self::Info => CpiMethod::Info,
        }
    }

    /// Converts the call into the positional argument list of the wire request.
    #[must_use]
    pub fn into_arguments(self) -> Vec<Value> {
        match self {
            Self::CurrentVmId | Self::Ping | Self::Info => Vec::new(),
            Self::CreateStemcell {
                image_path,
                cloud_properties,
                extras,
            } => {
                let mut arguments = vec![json!(image_path), cloud_properties];
                arguments.extend(extras);
                arguments
            }
            Self::DeleteStemcell { stemcell_cid } => vec![json!(stemcell_cid)],
            Self::CreateVm {
                agent_id,
                stemcell_cid,
                cloud_properties,
                networks,
                disk_cids,
                env,
            } => vec![
                json!(agent_id),
                json!(stemcell_cid),
                cloud_properties,
                networks,
                json!(disk_cids),
                env,
            ],
            Self::DeleteVm { vm_cid }
            | Self::HasVm { vm_cid }
            | Self::RebootVm { vm_cid }
            | Self::GetDisks { vm_cid } => vec![json!(vm_cid)],
            Self::SetVmMetadata { vm_cid, metadata } => {
                vec![json!(vm_cid), Value::Object(metadata)]
            }
            Self::SetDiskMetadata { disk_cid, metadata }
            | Self::SnapshotDisk { disk_cid, metadata } => {
                vec![json!(disk_cid), Value::Object(metadata)]
            }
            Self::CreateDisk {
                size_mb,
                cloud_properties,
                vm_locality,
            } => vec![json!(size_mb), cloud_properties, json!(vm_locality)],
            Self::HasDisk { disk_cid } | Self::DeleteDisk { disk_cid } => vec![json!(disk_cid)],
            Self::AttachDisk { vm_cid, disk_cid } | Self::DetachDisk { vm_cid, disk_cid } => {
                vec![json!(vm_cid), json!(disk_cid)]
            }
            Self::DeleteSnapshot { snapshot_cid } => vec![json!(snapshot_cid)],
            Self::ResizeDisk {
                disk_cid,
                new_size_mb,
            } => vec![json!(disk_cid), json!(new_size_mb)],
            Self::CalculateVmCloudProperties { vm_resources } => vec![vm_resources],
        }
    }
}

/// Positional argument reader used by [`CpiCall::from_arguments`].
struct Arguments {
    method: CpiMethod,
    values: std::vec::IntoIter<Value>,
    position: usize,
}

impl Arguments {
    fn new(method: CpiMethod, values: Vec<Value>) -> Self {
        Self {
            method,
            values: values.into_iter(),
            position: 0,
        }
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        Error::Validation {
            field: format!("{} argument {}", self.method, self.position),
            message: message.into(),
        }
    }

    fn required(&mut self) -> Result<Value, Error> {
        self.position += 1;
        self.values
            .next()
            .ok_or_else(|| self.invalid("missing argument"))
    }

    fn optional(&mut self) -> Value {
        self.position += 1;
        self.values.next().unwrap_or(Value::Null)
    }

    fn string(&mut self) -> Result<String, Error> {
        match self.required()? {
            Value::String(s) => Ok(s),
            other => Err(self.invalid(format!("expected a string, got {other}"))),
        }
    }

    fn size(&mut self) -> Result<u64, Error> {
        let value = self.required()?;
        value
            .as_u64()
            .ok_or_else(|| self.invalid(format!("expected a size in MiB, got {value}")))
    }

    fn object(&mut self) -> Result<Map<String, Value>, Error> {
        match self.required()? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(self.invalid(format!("expected an object, got {other}"))),
        }
    }

    fn strings(&mut self) -> Result<Vec<String>, Error> {
        match self.optional() {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(self.invalid(format!("expected a list of strings, got {other}"))),
                })
                .collect(),
            other => Err(self.invalid(format!("expected a list of strings, got {other}"))),
        }
    }

    fn finish(mut self) -> Result<(), Error> {
        if self.values.next().is_some() {
            self.position += 1;
            return Err(self.invalid("unexpected extra argument"));
        }
        Ok(())
    }
}
