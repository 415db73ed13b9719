//! Shared test utilities for the installer crate.
//!
//! Builds release-shaped `.tar.gz` archives, release tables and stand-in
//! executables so unit and behaviour tests can run the full pipeline
//! without network access.

use crate::artefact::naming::AssetName;
use crate::platform::Platform;
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Output};

/// Shell script standing in for the released tool; answers `--version`
/// the way the real binary does.
pub const FAKE_TOOL_SCRIPT: &str = concat!(
    "#!/bin/sh\n",
    "if [ \"$1\" = \"--version\" ]; then\n",
    "  echo \"piam-anc version 1.0.0\"\n",
    "  echo \"PIAM Admin Network Configurator\"\n",
    "  exit 0\n",
    "fi\n",
    "echo \"usage: piam-anc [--help] [--version]\" >&2\n",
    "exit 2\n",
);

/// One regular file to place in a test archive.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveEntry<'a> {
    /// Path inside the archive.
    pub path: &'a str,
    /// File contents.
    pub contents: &'a [u8],
    /// Unix mode bits.
    pub mode: u32,
}

impl<'a> ArchiveEntry<'a> {
    /// A plain `0644` file.
    #[must_use]
    pub const fn file(path: &'a str, contents: &'a [u8]) -> Self {
        Self {
            path,
            contents,
            mode: 0o644,
        }
    }

    /// An executable `0755` file.
    #[must_use]
    pub const fn executable(path: &'a str, contents: &'a [u8]) -> Self {
        Self {
            path,
            contents,
            mode: 0o755,
        }
    }
}

/// Encode `entries` as a gzip-compressed tarball.
///
/// # Errors
///
/// Returns an I/O error if the archive cannot be built.
pub fn tar_gz_bytes(entries: &[ArchiveEntry<'_>]) -> io::Result<Vec<u8>> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(entry.contents.len() as u64);
        header.set_mode(entry.mode);
        header.set_entry_type(tar::EntryType::Regular);
        builder.append_data(&mut header, entry.path, entry.contents)?;
    }
    builder.into_inner()?.finish()
}

/// Write a gzip-compressed tarball of `entries` to `path`.
///
/// # Errors
///
/// Returns an I/O error if the archive cannot be built or written.
pub fn write_tar_gz(path: &Path, entries: &[ArchiveEntry<'_>]) -> io::Result<()> {
    std::fs::write(path, tar_gz_bytes(entries)?)
}

/// A release-shaped archive for `platform`: the stand-in tool inside a
/// single top-level folder, next to a README.
///
/// # Errors
///
/// Returns an I/O error if the archive cannot be built.
pub fn release_archive_bytes(platform: Platform) -> io::Result<Vec<u8>> {
    let folder = format!("piam-anc-{}", platform.asset_suffix());
    let binary = format!("{folder}/piam-anc");
    let readme = format!("{folder}/README.md");
    tar_gz_bytes(&[
        ArchiveEntry::file(&readme, b"PIAM Admin Network Configurator\n"),
        ArchiveEntry::executable(&binary, FAKE_TOOL_SCRIPT.as_bytes()),
    ])
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// `file://` URL for a local path.
#[must_use]
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Render a complete release table whose archives live under `base_url`
/// with their published asset names, all pinned to `sha256`.
#[must_use]
pub fn release_table_toml(version: &str, base_url: &str, sha256: &str) -> String {
    let mut doc = format!("version = \"{version}\"\n");
    for platform in Platform::ALL {
        doc.push_str(&format!(
            concat!(
                "\n[[artefact]]\n",
                "os = \"{}\"\n",
                "arch = \"{}\"\n",
                "url = \"{}/{}\"\n",
                "sha256 = \"{}\"\n",
            ),
            platform.os(),
            platform.arch(),
            base_url,
            AssetName::new(platform).filename(),
            sha256,
        ));
    }
    doc
}

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code.unsigned_abs())
}

/// Creates a command `Output` with the given exit code and streams.
#[must_use]
pub fn command_output(code: i32, stdout: &str, stderr: &str) -> Output {
    Output {
        status: exit_status(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
    }
}
