//! Integrity verification for downloaded archives.
//!
//! The archive's SHA-256 digest is computed over the exact bytes on disk
//! and compared against the digest pinned in the release table. A
//! mismatch is terminal: the caller must not extract or install anything
//! from an archive that failed verification.

use super::sha256_digest::{DIGEST_LEN, Sha256Digest};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

/// The outcome of comparing an archive against its pinned digest.
///
/// Transient; never persisted.
///
/// # Examples
///
/// ```
/// use piam_anc_installer::artefact::sha256_digest::Sha256Digest;
/// use piam_anc_installer::artefact::verification::verify_archive;
///
/// let temp = tempfile::tempdir().unwrap();
/// let path = temp.path().join("archive.tar.gz");
/// std::fs::write(&path, b"abc").unwrap();
///
/// let pinned = Sha256Digest::try_from(
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
/// )
/// .unwrap();
/// let result = verify_archive(&path, &pinned).unwrap();
/// assert!(result.ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    ok: bool,
    computed: Sha256Digest,
}

impl VerificationResult {
    /// Whether the computed digest equals the pinned digest.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.ok
    }

    /// The digest of the bytes actually on disk.
    #[must_use]
    pub const fn computed(&self) -> &Sha256Digest {
        &self.computed
    }
}

/// Compute the SHA-256 digest of a file.
///
/// Streams the file through the hasher without loading it into memory.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn compute_sha256(path: &Path) -> io::Result<Sha256Digest> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    let bytes: [u8; DIGEST_LEN] = hasher.finalize().into();
    Ok(Sha256Digest::from(bytes))
}

/// Hash the file at `path` and compare it with `pinned`.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn verify_archive(path: &Path, pinned: &Sha256Digest) -> io::Result<VerificationResult> {
    let computed = compute_sha256(path)?;
    Ok(VerificationResult {
        ok: computed == *pinned,
        computed,
    })
}
