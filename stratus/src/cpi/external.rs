//! The subprocess CPI transport.
//!
//! Every call spawns the provider executable once with a scrubbed
//! environment, writes one JSON request to its stdin and reads one JSON
//! response from its stdout. The process exit status is logged but otherwise
//! ignored; providers report failure through the response's `error` member.

use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use rand::Rng;
use serde_json::{Map, Value};

use crate::cpi::redact::redact_arguments;
use crate::cpi::{CpiMethod, CpiRequest, CpiResponse, CpiTransport, RequestContext};
use crate::error::{Error, Result};
use crate::logging::Logger;

/// `PATH` the provider runs with. No other variable but `TMPDIR` is passed.
pub const PROVIDER_PATH: &str = "/usr/sbin:/usr/bin:/sbin:/bin";

/// A CPI provider reached by spawning its executable.
///
/// `ExternalCpi` holds no per-call state, so one value can be shared by many
/// worker threads.
///
/// # Examples
///
/// ```no_run
/// use stratus::cpi::{CpiMethod, CpiTransport, ExternalCpi};
///
/// let cpi = ExternalCpi::new("/var/vcap/jobs/aws_cpi/bin/cpi", "fake-director-uuid")
///     .with_stemcell_api_version(Some(2));
/// let vm_cid = cpi.invoke(CpiMethod::CurrentVmId, vec![]).unwrap();
/// println!("director runs on {vm_cid}");
/// ```
#[derive(Debug, Clone)]
pub struct ExternalCpi {
    cpi_path: PathBuf,
    director_uuid: String,
    properties_from_cpi_config: Option<Map<String, Value>>,
    stemcell_api_version: Option<u32>,
    request_api_version: Option<u32>,
    task_log: Option<PathBuf>,
    logger: Option<Logger>,
}

impl ExternalCpi {
    /// Creates a client for the provider at `cpi_path`.
    #[must_use]
    pub fn new(cpi_path: impl Into<PathBuf>, director_uuid: impl Into<String>) -> Self {
        Self {
            cpi_path: cpi_path.into(),
            director_uuid: director_uuid.into(),
            properties_from_cpi_config: None,
            stemcell_api_version: None,
            request_api_version: None,
            task_log: None,
            logger: None,
        }
    }

    /// Adds properties from the CPI config to every request context. Their
    /// values are redacted in logs.
    #[must_use]
    pub fn with_properties_from_cpi_config(mut self, properties: Option<Map<String, Value>>) -> Self {
        self.properties_from_cpi_config = properties;
        self
    }

    /// Sends `vm.stemcell.api_version` in every request context.
    #[must_use]
    pub fn with_stemcell_api_version(mut self, version: Option<u32>) -> Self {
        self.stemcell_api_version = version;
        self
    }

    /// Appends provider stderr and response logs to `path`.
    #[must_use]
    pub fn with_task_log(mut self, path: Option<PathBuf>) -> Self {
        self.task_log = path;
        self
    }

    /// Routes debug output through `logger` instead of the `log` facade.
    #[must_use]
    pub fn with_logger(mut self, logger: &Logger) -> Self {
        self.logger = Some(logger.tagged("external-cpi"));
        self
    }

    /// Path of the provider executable.
    #[must_use]
    pub fn cpi_path(&self) -> &Path {
        &self.cpi_path
    }

    /// Director identity sent in every request context.
    #[must_use]
    pub fn director_uuid(&self) -> &str {
        &self.director_uuid
    }

    fn debug(&self, request_id: &str, message: &str) {
        match &self.logger {
            Some(logger) => logger.tagged(request_id).debug(message),
            None => log::debug!("[external-cpi] [{request_id}] {message}"),
        }
    }

    fn checked_cpi_exec_path(&self) -> Result<&Path> {
        let non_executable = || Error::NonExecutable {
            path: self.cpi_path.clone(),
        };
        let metadata = fs::metadata(&self.cpi_path).map_err(|_| non_executable())?;
        if !metadata.is_file() {
            return Err(non_executable());
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(non_executable());
            }
        }
        Ok(&self.cpi_path)
    }

    fn save_cpi_log(&self, output: &str) -> Result<()> {
        let Some(path) = &self.task_log else {
            return Ok(());
        };
        if output.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(output.as_bytes())?;
        Ok(())
    }

    fn run_provider(
        &self,
        exec_path: &Path,
        request: String,
    ) -> Result<(Vec<u8>, String, Option<i32>)> {
        let mut command = Command::new(exec_path);
        command
            .env_clear()
            .env("PATH", PROVIDER_PATH)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(tmpdir) = env::var_os("TMPDIR") {
            command.env("TMPDIR", tmpdir);
        }

        let mut child = command.spawn()?;

        // Written from a separate thread so a provider that answers before
        // draining stdin cannot deadlock against a full stdout pipe.
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || -> io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(request.as_bytes())?;
            }
            Ok(())
        });

        let output = child.wait_with_output()?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(io::Error::other("request writer thread panicked").into()),
        }

        Ok((
            output.stdout,
            String::from_utf8_lossy(&output.stderr).into_owned(),
            output.status.code(),
        ))
    }
}

impl CpiTransport for ExternalCpi {
    fn invoke(&self, method: CpiMethod, arguments: Vec<Value>) -> Result<Value> {
        let request_id = format!("cpi-{}", rand::thread_rng().gen_range(100_000..=999_999));

        let context = RequestContext::new(self.director_uuid.as_str(), request_id.as_str())
            .with_stemcell_api_version(self.stemcell_api_version)
            .with_properties(self.properties_from_cpi_config.clone().unwrap_or_default());

        let redacted = CpiRequest::new(
            method,
            redact_arguments(method, &arguments),
            context.to_redacted_map(),
            self.request_api_version,
        )
        .to_json()?;
        let request = CpiRequest::new(method, arguments, context.to_map(), self.request_api_version).to_json()?;

        let exec_path = self.checked_cpi_exec_path()?;
        self.debug(
            &request_id,
            &format!("request: {redacted} with command: {}", exec_path.display()),
        );

        let (stdout, stderr, exit_status) = self.run_provider(exec_path, request)?;
        self.save_cpi_log(&stderr)?;

        let exit_status = exit_status.map_or_else(|| "signal".to_string(), |code| code.to_string());
        self.debug(
            &request_id,
            &format!(
                "response: {}, err: {stderr}, exit_status: {exit_status}",
                String::from_utf8_lossy(&stdout)
            ),
        );

        let response = CpiResponse::parse(&stdout)?;
        self.save_cpi_log(&response.log)?;
        response.into_result(method, &request_id)
    }

    fn request_api_version(&self) -> Option<u32> {
        self.request_api_version
    }

    fn set_request_api_version(&mut self, version: Option<u32>) {
        self.request_api_version = version;
    }
}
