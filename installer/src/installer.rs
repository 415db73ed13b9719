//! Release installation pipeline.
//!
//! Fetches the pinned archive for one platform, verifies its SHA-256
//! digest, extracts the `piam-anc` executable, places it atomically in
//! the bin directory and provisions the state directory. Every
//! intermediate file lives in a temporary directory scoped to the call
//! and removed on every exit path. Failures are reported as distinct
//! [`InstallerError`] kinds and never retried.

use camino::Utf8PathBuf;
use log::debug;
use serde::Serialize;
use std::io::Write;

use crate::artefact::descriptor::ArtefactDescriptor;
use crate::artefact::download::{ArtefactDownloader, DownloadError, ReleaseDownloader};
use crate::artefact::extraction::{ArtefactExtractor, TarGzExtractor};
use crate::artefact::verification::verify_archive;
use crate::error::{InstallerError, Result};
use crate::layout::{EXECUTABLE_NAME, InstallLayout};
use crate::output::write_stderr_line;
use crate::placement::{place_executable, provision_state_dir};

/// The outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPackage {
    binary_path: Utf8PathBuf,
    state_dir: Utf8PathBuf,
    version: String,
}

impl InstalledPackage {
    /// Path of the installed executable.
    #[must_use]
    pub fn binary_path(&self) -> &Utf8PathBuf {
        &self.binary_path
    }

    /// The provisioned state directory.
    #[must_use]
    pub fn state_dir(&self) -> &Utf8PathBuf {
        &self.state_dir
    }

    /// The installed release version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Inputs for one install.
#[derive(Debug, Clone, Copy)]
pub struct InstallRequest<'a> {
    /// The artefact to install.
    pub descriptor: &'a ArtefactDescriptor,
    /// The release version the descriptor belongs to.
    pub version: &'a str,
    /// Where to put the executable and state directory.
    pub layout: &'a InstallLayout,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// Install using the production downloader and extractor.
///
/// # Errors
///
/// Returns the [`InstallerError`] for the first step that fails; see
/// [`install_with`].
pub fn install(request: &InstallRequest<'_>, stderr: &mut dyn Write) -> Result<InstalledPackage> {
    install_with(request, &ReleaseDownloader, &TarGzExtractor, stderr)
}

/// Testable inner function with injected dependencies.
///
/// The production entry point [`install`] delegates here with real
/// implementations; tests inject mocks.
///
/// # Errors
///
/// - [`InstallerError::Fetch`] when the archive cannot be retrieved.
/// - [`InstallerError::Integrity`] when its digest differs from the
///   pinned one; nothing is extracted or installed.
/// - [`InstallerError::Extraction`] when the executable cannot be
///   unpacked.
/// - [`InstallerError::Placement`] when the bin or state directory cannot
///   be written.
pub fn install_with(
    request: &InstallRequest<'_>,
    downloader: &dyn ArtefactDownloader,
    extractor: &dyn ArtefactExtractor,
    stderr: &mut dyn Write,
) -> Result<InstalledPackage> {
    let descriptor = request.descriptor;
    let work_dir = tempfile::Builder::new()
        .prefix("piam-anc-install-")
        .tempdir()
        .map_err(DownloadError::Io)?;
    debug!("working directory {}", work_dir.path().display());

    // Step 1: Fetch.
    let archive_path = work_dir.path().join(descriptor.file_name());
    if !request.quiet {
        write_stderr_line(stderr, format!("Downloading {}...", descriptor.url()));
    }
    downloader.download(descriptor.url(), &archive_path)?;

    // Step 2: Verify before anything is unpacked.
    let verification =
        verify_archive(&archive_path, descriptor.sha256()).map_err(DownloadError::Io)?;
    if !verification.ok() {
        return Err(InstallerError::Integrity {
            url: descriptor.url().to_owned(),
            expected: descriptor.sha256().to_string(),
            actual: verification.computed().to_string(),
        });
    }
    debug!("sha256 {} verified", descriptor.sha256());

    // Step 3: Extract into the working directory.
    if !request.quiet {
        write_stderr_line(stderr, format!("Extracting {EXECUTABLE_NAME}..."));
    }
    let extracted = work_dir.path().join(format!("{EXECUTABLE_NAME}.extracted"));
    extractor.extract_executable(&archive_path, EXECUTABLE_NAME, &extracted)?;

    // Step 4: Place atomically.
    let binary_path = place_executable(&extracted, request.layout.bin_dir(), EXECUTABLE_NAME)?;

    // Step 5: Provision state directory.
    provision_state_dir(request.layout.state_dir())?;

    if !request.quiet {
        write_stderr_line(
            stderr,
            format!("Installed piam-anc {} to {binary_path}", request.version),
        );
    }

    Ok(InstalledPackage {
        binary_path,
        state_dir: request.layout.state_dir().to_owned(),
        version: request.version.to_owned(),
    })
}

#[cfg(test)]
#[path = "installer_tests.rs"]
mod tests;
