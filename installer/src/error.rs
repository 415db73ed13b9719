//! Error types for the piam-anc installer.
//!
//! Every failure the installer can report maps to one [`ErrorKind`], and
//! each kind has its own process exit code so that scripted callers can
//! tell a bad checksum from a network outage without parsing messages.
//! Nothing here is retried automatically; all errors propagate to the
//! top-level caller.

use crate::artefact::download::DownloadError;
use crate::artefact::error::ArtefactError;
use crate::artefact::extraction::ExtractionError;
use crate::platform::UnsupportedPlatform;
use camino::Utf8PathBuf;
use std::fmt;
use thiserror::Error;

/// Errors that can occur during installation.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// No release artefact is published for the requested platform.
    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatform),

    /// The archive could not be retrieved.
    #[error("fetch failed: {source}")]
    Fetch {
        /// The underlying download failure.
        #[source]
        source: DownloadError,
    },

    /// The archive's SHA-256 digest differs from the pinned digest.
    #[error("integrity check failed for {url}: expected sha256 {expected}, got {actual}")]
    Integrity {
        /// The URL the archive was fetched from.
        url: String,
        /// The pinned digest.
        expected: String,
        /// The digest of the bytes actually received.
        actual: String,
    },

    /// The archive could not be unpacked or lacks the expected executable.
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// The executable or state directory could not be written.
    #[error("placement failed at {path}: {reason}")]
    Placement {
        /// The path being written.
        path: Utf8PathBuf,
        /// Description of the underlying I/O error.
        reason: String,
    },

    /// No install location could be derived from the environment.
    #[error("could not determine install location: {reason}")]
    LayoutUnavailable {
        /// Why the location could not be determined.
        reason: String,
    },

    /// The release table is malformed.
    #[error("invalid release table: {0}")]
    InvalidReleaseTable(#[from] ArtefactError),

    /// The installed binary did not identify itself as expected.
    #[error("smoke test of {binary} failed: {reason}")]
    SmokeTestFailed {
        /// The binary that was invoked.
        binary: Utf8PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl From<DownloadError> for InstallerError {
    fn from(source: DownloadError) -> Self {
        Self::Fetch { source }
    }
}

/// Coarse classification of an [`InstallerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`InstallerError::UnsupportedPlatform`].
    UnsupportedPlatform,
    /// Transport failure or HTTP error status.
    Fetch,
    /// The fetch exceeded its timeout.
    FetchTimeout,
    /// See [`InstallerError::Integrity`].
    Integrity,
    /// See [`InstallerError::Extraction`].
    Extraction,
    /// See [`InstallerError::Placement`] and
    /// [`InstallerError::LayoutUnavailable`].
    Placement,
    /// See [`InstallerError::InvalidReleaseTable`].
    InvalidReleaseTable,
    /// See [`InstallerError::SmokeTestFailed`].
    SmokeTestFailed,
    /// Output could not be written.
    Output,
}

impl ErrorKind {
    /// Stable name used in user-facing error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UnsupportedPlatform => "UnsupportedPlatform",
            Self::Fetch => "FetchError",
            Self::FetchTimeout => "FetchTimeout",
            Self::Integrity => "IntegrityError",
            Self::Extraction => "ExtractionError",
            Self::Placement => "PlacementError",
            Self::InvalidReleaseTable => "InvalidReleaseTable",
            Self::SmokeTestFailed => "SmokeTestFailed",
            Self::Output => "OutputError",
        }
    }

    /// Process exit code reported for this kind.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Output => 1,
            Self::UnsupportedPlatform => 2,
            Self::Fetch => 3,
            Self::FetchTimeout => 4,
            Self::Integrity => 5,
            Self::Extraction => 6,
            Self::Placement => 7,
            Self::InvalidReleaseTable => 8,
            Self::SmokeTestFailed => 9,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl InstallerError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedPlatform(_) => ErrorKind::UnsupportedPlatform,
            Self::Fetch { source } if source.is_timeout() => ErrorKind::FetchTimeout,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Integrity { .. } => ErrorKind::Integrity,
            Self::Extraction(_) => ErrorKind::Extraction,
            Self::Placement { .. } | Self::LayoutUnavailable { .. } => ErrorKind::Placement,
            Self::InvalidReleaseTable(_) => ErrorKind::InvalidReleaseTable,
            Self::SmokeTestFailed { .. } => ErrorKind::SmokeTestFailed,
            Self::WriteFailed { .. } => ErrorKind::Output,
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }

    /// Build a [`InstallerError::Placement`] from an I/O failure at `path`.
    pub(crate) fn placement(path: impl Into<Utf8PathBuf>, err: &std::io::Error) -> Self {
        Self::Placement {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
