//! Artefact descriptor: the pinned (URL, digest) pair for one platform.

use super::error::{ArtefactError, Result};
use super::sha256_digest::Sha256Digest;
use crate::platform::{Arch, Os, Platform};
use serde::Serialize;

/// URL schemes the fetcher knows how to retrieve.
const SUPPORTED_SCHEMES: &[&str] = &["https://", "http://", "file://"];

/// The download location and pinned content hash of one platform's
/// release archive.
///
/// Descriptors are immutable once built. Construction validates both the
/// URL and the digest, so a descriptor in hand is always well-formed.
///
/// # Examples
///
/// ```
/// use piam_anc_installer::artefact::descriptor::ArtefactDescriptor;
/// use piam_anc_installer::platform::{Arch, Os, Platform};
///
/// let descriptor = ArtefactDescriptor::new(
///     Platform::new(Os::Linux, Arch::Amd64),
///     "https://example.test/piam-anc-linux-amd64.tar.gz",
///     &"0".repeat(64),
/// )
/// .expect("valid descriptor");
/// assert_eq!(descriptor.file_name(), "piam-anc-linux-amd64.tar.gz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtefactDescriptor {
    os: Os,
    arch: Arch,
    url: String,
    sha256: Sha256Digest,
}

impl ArtefactDescriptor {
    /// Build a descriptor from raw table values.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidUrl`] or
    /// [`ArtefactError::InvalidSha256Digest`] when either value is
    /// malformed.
    pub fn new(platform: Platform, url: &str, sha256: &str) -> Result<Self> {
        validate_url(url)?;
        let digest = Sha256Digest::try_from(sha256)?;
        Ok(Self {
            os: platform.os(),
            arch: platform.arch(),
            url: url.to_owned(),
            sha256: digest,
        })
    }

    /// The platform this artefact was built for.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        Platform::new(self.os, self.arch)
    }

    /// The download URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The pinned SHA-256 digest of the archive bytes.
    #[must_use]
    pub const fn sha256(&self) -> &Sha256Digest {
        &self.sha256
    }

    /// The last path segment of the URL, used to name the download.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("artefact.tar.gz")
    }

    /// Return a copy of this descriptor pinned to a different digest.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidSha256Digest`] when `sha256` is
    /// malformed.
    pub fn with_sha256(&self, sha256: &str) -> Result<Self> {
        Self::new(self.platform(), &self.url, sha256)
    }
}

/// Validate that `url` names a retrievable archive.
fn validate_url(url: &str) -> Result<()> {
    let invalid = |reason: &str| ArtefactError::InvalidUrl {
        url: url.to_owned(),
        reason: reason.to_owned(),
    };

    let Some(rest) = SUPPORTED_SCHEMES
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
    else {
        return Err(invalid("expected an https://, http://, or file:// URL"));
    };
    if rest.is_empty() || rest.ends_with('/') {
        return Err(invalid("URL does not name a file"));
    }
    if url.chars().any(char::is_whitespace) {
        return Err(invalid("URL contains whitespace"));
    }
    Ok(())
}
