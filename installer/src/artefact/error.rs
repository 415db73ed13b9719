//! Error types for release table entries and artefact descriptors.
//!
//! Each variant identifies the offending value and the constraint it broke,
//! so a malformed pinned table is reported as a configuration error rather
//! than truncated or accepted.

use thiserror::Error;

/// Errors arising from invalid release table data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// A SHA-256 digest is not a 64-character lowercase hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },

    /// A download URL is empty, malformed, or uses an unsupported scheme.
    #[error("invalid artefact URL \"{url}\": {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A table entry names an operating system or architecture outside the
    /// supported set.
    #[error("unknown platform {os}/{arch} in release table")]
    UnknownPlatform {
        /// Operating system as written in the table.
        os: String,
        /// Architecture as written in the table.
        arch: String,
    },

    /// A single entry failed validation.
    #[error("release table entry for {platform} is invalid: {reason}")]
    InvalidEntry {
        /// The platform the entry describes.
        platform: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// The table has no entry for a supported platform.
    #[error("release table has no entry for {platform}")]
    MissingPlatform {
        /// The uncovered platform.
        platform: String,
    },

    /// The table has more than one entry for a platform.
    #[error("release table has more than one entry for {platform}")]
    DuplicatePlatform {
        /// The platform listed twice.
        platform: String,
    },

    /// The release version string is empty or contains whitespace.
    #[error("invalid release version \"{value}\"")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
    },

    /// The table file could not be read.
    #[error("release table {path} could not be read: {reason}")]
    Unreadable {
        /// Path of the table file.
        path: String,
        /// Description of the I/O failure.
        reason: String,
    },

    /// The table document could not be parsed.
    #[error("release table could not be parsed: {reason}")]
    Parse {
        /// The parser's description of the failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
