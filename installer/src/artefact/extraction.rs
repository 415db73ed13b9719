//! Executable extraction from release archives.
//!
//! Release archives are gzip-compressed tarballs holding the `piam-anc`
//! executable, either at the archive root or inside a single top-level
//! folder. Exactly one regular-file entry with the expected name must be
//! present. Entry paths are validated before anything is written to guard
//! against path traversal.

use flate2::read::GzDecoder;
use log::trace;
use std::fs::File;
use std::io;
use std::path::{Component, Path};

/// Trait for extracting the executable from an archive, enabling test
/// mocking.
///
/// # Examples
///
/// ```
/// use piam_anc_installer::artefact::extraction::TarGzExtractor;
///
/// let extractor = TarGzExtractor;
/// // Use extractor.extract_executable(archive, "piam-anc", dest) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactExtractor {
    /// Locate the entry named `entry_name` in the archive at
    /// `archive_path` and write its contents to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidArchive`] if the archive cannot be
    /// decoded, [`ExtractionError::PathTraversal`] for entries escaping
    /// the archive root, [`ExtractionError::MissingEntry`] or
    /// [`ExtractionError::DuplicateEntry`] when the expected entry is not
    /// present exactly once, and [`ExtractionError::Io`] when `dest`
    /// cannot be written.
    fn extract_executable(
        &self,
        archive_path: &Path,
        entry_name: &str,
        dest: &Path,
    ) -> Result<(), ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error writing the extracted file.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive is not a readable gzip-compressed tarball.
    #[error("archive is not a valid .tar.gz: {reason}")]
    InvalidArchive {
        /// The decoder's description of the failure.
        reason: String,
    },

    /// A path in the archive attempts to traverse outside the archive root.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive has no regular file with the expected name.
    #[error("archive does not contain an executable named {name}")]
    MissingEntry {
        /// The expected entry name.
        name: String,
    },

    /// The archive has more than one regular file with the expected name.
    #[error("archive contains more than one executable named {name}")]
    DuplicateEntry {
        /// The expected entry name.
        name: String,
    },
}

/// Default extractor using the `flate2` and `tar` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl ArtefactExtractor for TarGzExtractor {
    fn extract_executable(
        &self,
        archive_path: &Path,
        entry_name: &str,
        dest: &Path,
    ) -> Result<(), ExtractionError> {
        let file = File::open(archive_path)?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        let mut found = false;

        for entry_result in archive.entries().map_err(invalid_archive)? {
            let mut entry = entry_result.map_err(invalid_archive)?;
            let entry_path = entry.path().map_err(invalid_archive)?.into_owned();
            trace!("archive entry {}", entry_path.display());

            validate_entry_path(&entry_path)?;

            let is_match = entry.header().entry_type().is_file()
                && entry_path
                    .file_name()
                    .is_some_and(|name| name == entry_name);
            if !is_match {
                continue;
            }
            if found {
                return Err(ExtractionError::DuplicateEntry {
                    name: entry_name.to_owned(),
                });
            }

            let mut out = File::create(dest)?;
            io::copy(&mut entry, &mut out).map_err(invalid_archive)?;
            out.sync_all()?;
            found = true;
        }

        if found {
            Ok(())
        } else {
            Err(ExtractionError::MissingEntry {
                name: entry_name.to_owned(),
            })
        }
    }
}

/// Map a decode-side I/O failure to [`ExtractionError::InvalidArchive`].
fn invalid_archive(err: io::Error) -> ExtractionError {
    ExtractionError::InvalidArchive {
        reason: err.to_string(),
    }
}

/// Validate that a tar entry path does not escape the archive root via
/// `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir | Component::RootDir));
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ArchiveEntry, write_tar_gz};
    use rstest::rstest;
    use std::path::PathBuf;

    const NAME: &str = "piam-anc";

    fn extract(entries: &[ArchiveEntry<'_>]) -> (tempfile::TempDir, Result<(), ExtractionError>) {
        let temp = tempfile::tempdir().expect("temp dir");
        let archive = temp.path().join("release.tar.gz");
        write_tar_gz(&archive, entries).expect("write archive");
        let result = TarGzExtractor.extract_executable(&archive, NAME, &temp.path().join("out"));
        (temp, result)
    }

    #[rstest]
    #[case::root_entry("piam-anc")]
    #[case::nested_entry("piam-anc-linux-amd64/piam-anc")]
    fn extracts_named_entry(#[case] entry_path: &str) {
        let (temp, result) = extract(&[
            ArchiveEntry::file("README.md", b"docs"),
            ArchiveEntry::executable(entry_path, b"binary bytes"),
        ]);
        result.expect("extract");
        let extracted = std::fs::read(temp.path().join("out")).expect("read extracted");
        assert_eq!(extracted, b"binary bytes");
    }

    #[test]
    fn missing_entry_is_reported() {
        let (_temp, result) = extract(&[ArchiveEntry::file("LICENSE", b"MIT")]);
        assert!(matches!(result, Err(ExtractionError::MissingEntry { .. })));
    }

    #[test]
    fn similarly_named_entries_do_not_match() {
        let (_temp, result) = extract(&[ArchiveEntry::file("piam-anc.sha256", b"digest")]);
        assert!(matches!(result, Err(ExtractionError::MissingEntry { .. })));
    }

    #[test]
    fn duplicate_entry_is_reported() {
        let (_temp, result) = extract(&[
            ArchiveEntry::executable("piam-anc", b"one"),
            ArchiveEntry::executable("nested/piam-anc", b"two"),
        ]);
        assert!(matches!(result, Err(ExtractionError::DuplicateEntry { .. })));
    }

    #[test]
    fn non_gzip_input_is_invalid_archive() {
        let temp = tempfile::tempdir().expect("temp dir");
        let archive = temp.path().join("release.tar.gz");
        std::fs::write(&archive, b"this is not gzip").expect("write");
        let result = TarGzExtractor.extract_executable(&archive, NAME, &temp.path().join("out"));
        assert!(matches!(result, Err(ExtractionError::InvalidArchive { .. })));
    }

    #[rstest]
    #[case::parent_dir("../escape")]
    #[case::nested_parent("foo/../../escape")]
    #[case::absolute("/etc/passwd")]
    fn rejects_path_traversal(#[case] bad_path: &str) {
        let path = PathBuf::from(bad_path);
        let result = validate_entry_path(&path);
        assert!(
            matches!(result, Err(ExtractionError::PathTraversal { .. })),
            "expected PathTraversal for {bad_path}"
        );
    }

    #[test]
    fn accepts_normal_paths() {
        assert!(validate_entry_path(&PathBuf::from("piam-anc-linux-amd64/piam-anc")).is_ok());
    }
}
