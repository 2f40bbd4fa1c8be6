//! Redaction of secrets from logged CPI requests.
//!
//! Cloud properties and agent environments routinely carry credentials, so
//! the debug log only ever sees a copy of the arguments with their values
//! replaced. The request actually sent to the provider is never touched.

use serde_json::{Map, Value};

use crate::cpi::protocol::REDACTED;
use crate::cpi::CpiMethod;

// Positional argument indexes.
const CREATE_VM_CLOUD_PROPERTIES: usize = 2;
const CREATE_VM_NETWORKS: usize = 3;
const CREATE_VM_ENV: usize = 5;
const CREATE_DISK_CLOUD_PROPERTIES: usize = 1;

const ENV_KEPT_KEYS: &[&str] = &["bosh"];
const BOSH_ENV_KEPT_KEYS: &[&str] = &["group", "groups", "tags"];

/// Returns a copy of `arguments` safe to write to logs.
///
/// # Examples
///
/// ```
/// use stratus::cpi::{redact_arguments, CpiMethod};
/// use serde_json::json;
///
/// let arguments = vec![json!(1024), json!({"access_key": "secret"}), json!(null)];
/// let redacted = redact_arguments(CpiMethod::CreateDisk, &arguments);
/// assert_eq!(redacted[1], json!({"access_key": "<redacted>"}));
/// ```
#[must_use]
pub fn redact_arguments(method: CpiMethod, arguments: &[Value]) -> Vec<Value> {
    let mut redacted = arguments.to_vec();
    match method {
        CpiMethod::CreateVm => {
            if let Some(Value::Object(env)) = redacted.get_mut(CREATE_VM_ENV) {
                redact_all_but(env, ENV_KEPT_KEYS);
                if let Some(Value::Object(bosh)) = env.get_mut("bosh") {
                    redact_all_but(bosh, BOSH_ENV_KEPT_KEYS);
                }
            }
            if let Some(Value::Object(networks)) = redacted.get_mut(CREATE_VM_NETWORKS) {
                for network in networks.values_mut() {
                    if let Some(Value::Object(cloud_properties)) = network.get_mut("cloud_properties") {
                        redact_all_but(cloud_properties, &[]);
                    }
                }
            }
            redact_object_at(&mut redacted, CREATE_VM_CLOUD_PROPERTIES);
        }
        CpiMethod::CreateDisk => redact_object_at(&mut redacted, CREATE_DISK_CLOUD_PROPERTIES),
        _ => {}
    }
    redacted
}

fn redact_object_at(arguments: &mut [Value], position: usize) {
    if let Some(Value::Object(object)) = arguments.get_mut(position) {
        redact_all_but(object, &[]);
    }
}

fn redact_all_but(object: &mut Map<String, Value>, kept: &[&str]) {
    for (key, value) in object.iter_mut() {
        if !kept.contains(&key.as_str()) {
            *value = Value::from(REDACTED);
        }
    }
}
