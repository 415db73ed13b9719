//! Post-install smoke test.
//!
//! Runs the installed binary with `--version` and checks that it names
//! itself as the PIAM Admin Network Configurator. The child process is
//! bounded by a timeout so that a hung binary cannot stall the installer.

use crate::error::{InstallerError, Result};
use camino::Utf8Path;
use log::debug;
use std::io::{self, Read};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Identity string the installed tool prints for `--version`.
pub const PRODUCT_NAME: &str = "PIAM Admin Network Configurator";

/// Default bound on the `--version` invocation.
pub const SMOKE_TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Abstraction for running the installed binary.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs `program` with `args` and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::SmokeTestFailed`] if the program cannot
    /// be started or does not finish in time.
    fn run<'a>(&self, program: &Utf8Path, args: &[&'a str]) -> Result<Output>;
}

/// Executes the binary on the host system with a timeout.
#[derive(Debug, Clone, Copy)]
pub struct SystemCommandExecutor {
    timeout: Duration,
}

impl SystemCommandExecutor {
    /// Create an executor with a custom timeout.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemCommandExecutor {
    fn default() -> Self {
        Self::with_timeout(SMOKE_TEST_TIMEOUT)
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, program: &Utf8Path, args: &[&str]) -> Result<Output> {
        let failed = |reason: String| InstallerError::SmokeTestFailed {
            binary: program.to_owned(),
            reason,
        };

        let mut child = Command::new(program.as_std_path())
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| failed(format!("could not start: {e}")))?;

        // Drain both pipes while waiting so a chatty child cannot block on
        // a full pipe buffer.
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let waited = child
            .wait_timeout(self.timeout)
            .map_err(|e| failed(format!("could not wait for process: {e}")))?;
        let Some(status) = waited else {
            // The child may already have exited between the timeout and
            // the kill; either way it is reaped below. The readers are left
            // detached since a grandchild may still hold the pipes open.
            if let Err(e) = child.kill() {
                debug!("kill after timeout failed: {e}");
            }
            if let Err(e) = child.wait() {
                debug!("reaping timed-out child failed: {e}");
            }
            return Err(failed(format!(
                "timed out after {} seconds",
                self.timeout.as_secs()
            )));
        };

        let stdout =
            collect(stdout_reader).map_err(|e| failed(format!("could not read stdout: {e}")))?;
        let stderr =
            collect(stderr_reader).map_err(|e| failed(format!("could not read stderr: {e}")))?;

        Ok(Output {
            status,
            stdout,
            stderr,
        })
    }
}

type Reader = JoinHandle<io::Result<Vec<u8>>>;

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> Reader {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(reader: Option<Reader>) -> io::Result<Vec<u8>> {
    reader.map_or_else(
        || Ok(Vec::new()),
        |handle| {
            handle
                .join()
                .map_err(|_| io::Error::other("output reader panicked"))
                .and_then(std::convert::identity)
        },
    )
}

/// Run the smoke test against `binary` on the host.
///
/// Returns the trimmed `--version` output on success.
///
/// # Errors
///
/// Returns [`InstallerError::SmokeTestFailed`] when the binary cannot be
/// run, exits non-zero, times out, or does not print [`PRODUCT_NAME`].
pub fn smoke_test(binary: &Utf8Path) -> Result<String> {
    smoke_test_with(&SystemCommandExecutor::default(), binary)
}

/// Testable inner function with an injected executor.
///
/// # Errors
///
/// See [`smoke_test`].
pub fn smoke_test_with(executor: &dyn CommandExecutor, binary: &Utf8Path) -> Result<String> {
    debug!("running {binary} --version");
    let output = executor.run(binary, &["--version"])?;
    let failed = |reason: String| InstallerError::SmokeTestFailed {
        binary: binary.to_owned(),
        reason,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failed(format!(
            "--version exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains(PRODUCT_NAME) {
        return Err(failed(format!(
            "--version output does not mention {PRODUCT_NAME}: {}",
            stdout.trim()
        )));
    }
    Ok(stdout.trim().to_owned())
}
