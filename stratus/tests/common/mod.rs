//! Common test utilities for integration tests.
//!
//! This module provides fixture providers (small shell scripts standing in for
//! a CPI executable) and reservation helpers for testing the stratus library.

use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use stratus::Reservation;

/// A throwaway CPI executable that records its request and replies with a
/// canned response.
///
/// The script captures stdin to `request.json`, its environment to `env.txt`,
/// writes `stderr` to its standard error and prints `response`.
#[allow(dead_code)]
pub struct FixtureProvider {
    dir: TempDir,
    path: PathBuf,
}

#[allow(dead_code)]
impl FixtureProvider {
    /// Creates a provider that replies with `response`.
    pub fn new(response: &str) -> Self {
        Self::with_stderr(response, "")
    }

    /// Creates a provider that replies with `response` and writes `stderr`.
    pub fn with_stderr(response: &str, stderr: &str) -> Self {
        let dir = TempDir::new().expect("failed to create fixture directory");
        let path = dir.path().join("cpi");
        let request_path = dir.path().join("request.json");
        let env_path = dir.path().join("env.txt");

        let mut script = String::from("#!/bin/sh\n");
        script.push_str(&format!("cat > '{}'\n", request_path.display()));
        script.push_str(&format!("env > '{}'\n", env_path.display()));
        if !stderr.is_empty() {
            script.push_str("cat <<'STRATUS_STDERR' 1>&2\n");
            script.push_str(stderr);
            script.push_str("\nSTRATUS_STDERR\n");
        }
        script.push_str("cat <<'STRATUS_RESPONSE'\n");
        script.push_str(response);
        script.push_str("\nSTRATUS_RESPONSE\n");

        write_executable(&path, &script);
        Self { dir, path }
    }

    /// Creates a provider from a literal script body.
    pub fn from_script(script: &str) -> Self {
        let dir = TempDir::new().expect("failed to create fixture directory");
        let path = dir.path().join("cpi");
        write_executable(&path, script);
        Self { dir, path }
    }

    /// Path of the executable.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scratch directory owned by the fixture.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// The request document the provider received, parsed.
    pub fn request(&self) -> serde_json::Value {
        let raw = fs::read_to_string(self.dir.path().join("request.json"))
            .expect("provider was not invoked");
        serde_json::from_str(&raw).expect("request is not valid JSON")
    }

    /// Environment variable names the provider ran with.
    pub fn env_names(&self) -> Vec<String> {
        let raw = fs::read_to_string(self.dir.path().join("env.txt")).expect("provider was not invoked");
        raw.lines()
            .filter_map(|line| line.split_once('=').map(|(name, _)| name.to_string()))
            .collect()
    }

    /// Value of one environment variable the provider ran with.
    pub fn env_value(&self, name: &str) -> Option<String> {
        let raw = fs::read_to_string(self.dir.path().join("env.txt")).expect("provider was not invoked");
        raw.lines()
            .filter_map(|line| line.split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

/// A successful response document carrying `result`.
#[allow(dead_code)]
pub fn ok_response(result: serde_json::Value) -> String {
    serde_json::json!({"result": result, "error": null, "log": ""}).to_string()
}

/// An error response document.
#[allow(dead_code)]
pub fn error_response(error_type: &str, message: &str, ok_to_retry: bool) -> String {
    serde_json::json!({
        "result": null,
        "error": {"type": error_type, "message": message, "ok_to_retry": ok_to_retry},
        "log": ""
    })
    .to_string()
}

fn write_executable(path: &Path, script: &str) {
    fs::write(path, script).expect("failed to write fixture script");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("failed to chmod fixture");
    }
}

/// Parses an IP literal.
#[allow(dead_code)]
pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("invalid IP literal")
}

/// A reserved dynamic reservation.
#[allow(dead_code)]
pub fn reserved_dynamic(network: &str, resolved: Option<&str>) -> Reservation {
    let mut reservation = Reservation::new_dynamic(network).expect("valid reservation");
    if let Some(addr) = resolved {
        reservation.resolve_ip(ip(addr)).expect("dynamic reservation accepts an IP");
    }
    reservation.mark_reserved();
    reservation
}

/// A reserved static reservation.
#[allow(dead_code)]
pub fn reserved_static(network: &str, addr: &str) -> Reservation {
    let mut reservation = Reservation::new_static(network, ip(addr)).expect("valid reservation");
    reservation.mark_reserved();
    reservation
}

/// RAII guard for setting and restoring an environment variable.
#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    old_value: Option<std::ffi::OsString>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn new(key: &str, value: &str) -> Self {
        let old_value = std::env::var_os(key);
        std::env::set_var(key, value);
        Self {
            key: key.to_string(),
            old_value,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.old_value {
            Some(val) => std::env::set_var(&self.key, val),
            None => std::env::remove_var(&self.key),
        }
    }
}
