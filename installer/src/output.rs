//! Output formatting for the installer CLI.
//!
//! Progress lines go to stderr through [`write_stderr_line`]. The fixed
//! post-install guidance and the dry-run summary are rendered here so
//! that both the binary and tests see the same text.

use crate::artefact::descriptor::ArtefactDescriptor;
use crate::installer::InstalledPackage;
use crate::layout::InstallLayout;
use crate::platform::Platform;
use serde::Serialize;
use std::io::Write;

/// Guidance printed after a successful install.
///
/// Authentication and permissions are documented here only; the
/// installer never checks them.
pub const CAVEATS: &str = concat!(
    "PIAM Admin Network Configurator has been installed!\n",
    "\n",
    "Before using piam-anc, ensure you're authenticated with Google Cloud:\n",
    "  gcloud auth application-default login\n",
    "\n",
    "To get started:\n",
    "  piam-anc\n",
    "\n",
    "For help:\n",
    "  piam-anc --help\n",
    "\n",
    "Required GCP permissions:\n",
    "  - cloudsql.instances.list/get/update\n",
    "  - container.clusters.list/get/update\n",
    "  - resourcemanager.projects.list",
);

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress output; ignore write failures.
    }
}

/// Format a success message after installation.
#[must_use]
pub fn success_message(installed: &InstalledPackage) -> String {
    format!(
        concat!(
            "Successfully installed piam-anc {}\n",
            "  executable: {}\n",
            "  state directory: {}"
        ),
        installed.version(),
        installed.binary_path(),
        installed.state_dir()
    )
}

/// Human-readable description of a release descriptor.
#[must_use]
pub fn descriptor_text(descriptor: &ArtefactDescriptor, version: &str) -> String {
    format!(
        concat!("Platform: {}\n", "Version: {}\n", "URL: {}\n", "SHA-256: {}"),
        descriptor.platform(),
        version,
        descriptor.url(),
        descriptor.sha256()
    )
}

/// Machine-readable form of a resolved artefact, for `resolve --json`.
///
/// Serialises as the descriptor's fields plus the release version.
#[derive(Debug, Serialize)]
pub struct ResolvedArtefact<'a> {
    /// The release version.
    pub version: &'a str,
    /// The selected descriptor.
    #[serde(flatten)]
    pub descriptor: &'a ArtefactDescriptor,
}

impl ResolvedArtefact<'_> {
    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialisation fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Configuration information for dry-run output.
///
/// # Example
///
/// ```
/// use camino::Utf8Path;
/// use piam_anc_installer::artefact::release_table::ReleaseTable;
/// use piam_anc_installer::layout::InstallLayout;
/// use piam_anc_installer::output::DryRunInfo;
/// use piam_anc_installer::platform::{Arch, Os, Platform};
///
/// let table = ReleaseTable::pinned().expect("pinned table is valid");
/// let platform = Platform::new(Os::Linux, Arch::Arm64);
/// let layout = InstallLayout::from_prefix(Utf8Path::new("/usr/local"));
///
/// let info = DryRunInfo {
///     platform,
///     descriptor: table.resolve(platform).expect("published"),
///     version: table.version(),
///     layout: &layout,
///     smoke_test: true,
/// };
///
/// let output = info.display_text();
/// assert!(output.contains("Dry run"));
/// assert!(output.contains("piam-anc-linux-arm64.tar.gz"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// The resolved platform.
    pub platform: Platform,
    /// The descriptor that would be installed.
    pub descriptor: &'a ArtefactDescriptor,
    /// The release version.
    pub version: &'a str,
    /// Where the executable and state directory would go.
    pub layout: &'a InstallLayout,
    /// Whether the smoke test would run afterwards.
    pub smoke_test: bool,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        [
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Platform: {}", self.platform),
            format!("Version: {}", self.version),
            format!("Archive: {}", self.descriptor.url()),
            format!("SHA-256: {}", self.descriptor.sha256()),
            format!("Executable: {}", self.layout.binary_path()),
            format!("State directory: {}", self.layout.state_dir()),
            format!("Smoke test: {}", if self.smoke_test { "yes" } else { "no" }),
        ]
        .join("\n")
    }
}
