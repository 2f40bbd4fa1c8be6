//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with an isolated home directory
//! - Fixture files for reservations and director configuration
//! - A fake CPI provider script

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment variables that would leak host configuration into a test.
const STRATUS_ENV_VARS: [&str; 9] = [
    "STRATUS_CONFIG",
    "STRATUS_DIRECTOR_UUID",
    "STRATUS_CPI_PATH",
    "STRATUS_CPI_API_VERSION",
    "STRATUS_MAX_CPI_API_VERSION",
    "STRATUS_STEMCELL_API_VERSION",
    "STRATUS_CPI_TASK_LOG",
    "STRATUS_LOG_MODE",
    "STRATUS_OUTPUT_FORMAT",
];

/// Test environment with an isolated home directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Get a command builder for the stratus binary.
    ///
    /// `HOME` points at the temporary directory and every `STRATUS_*`
    /// variable is removed, so no host configuration is picked up.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("stratus").expect("Failed to find stratus binary");
        for var in STRATUS_ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.env("HOME", &self.temp_path);
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file under the temporary directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Write a director configuration pointing at `cpi_path`.
    pub fn write_config(&self, cpi_path: &Path, api_version: u32) -> PathBuf {
        let contents = format!(
            "director_uuid: fake-director-uuid\ncpi:\n  path: {}\n  api_version: {api_version}\n",
            cpi_path.display()
        );
        self.write_file("director.yaml", &contents)
    }

    /// Write an executable provider script that drains its request and
    /// prints `response`.
    #[cfg(unix)]
    pub fn write_provider(&self, response: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.temp_path.join("cpi");
        let request = self.request_path();
        let script = format!(
            "#!/bin/sh\ncat > '{}'\ncat <<'STRATUS_EOF'\n{response}\nSTRATUS_EOF\n",
            request.display()
        );
        std::fs::write(&path, script).expect("Failed to write provider script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make provider executable");
        path
    }

    /// Where the provider script stores the last request it received.
    pub fn request_path(&self) -> PathBuf {
        self.temp_path.join("request.json")
    }

    /// The last request document the provider script received.
    pub fn request(&self) -> serde_json::Value {
        let contents =
            std::fs::read_to_string(self.request_path()).expect("Provider received no request");
        serde_json::from_str(&contents).expect("Request is not JSON")
    }
}
