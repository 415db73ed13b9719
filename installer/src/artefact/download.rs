//! Artefact retrieval.
//!
//! Provides a trait-based abstraction for fetching a release archive into
//! a local file, enabling dependency injection for testing. The production
//! [`ReleaseDownloader`] speaks HTTP(S) through `ureq` and also accepts
//! `file://` URLs so that a local mirror can stand in for the release
//! host.

use log::debug;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout for a single archive download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Trait for downloading an artefact archive.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
///
/// # Examples
///
/// ```
/// use piam_anc_installer::artefact::download::ReleaseDownloader;
///
/// let downloader = ReleaseDownloader;
/// // Use downloader.download(url, dest) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactDownloader {
    /// Download the resource at `url` into the file at `dest`.
    ///
    /// Each call makes exactly one attempt; retrying is the caller's
    /// decision.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] describing the transport, status, or
    /// file-write failure.
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from artefact download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested artefact was not found (HTTP 404 or missing file).
    #[error("artefact not found: {url}")]
    NotFound {
        /// The URL that could not be found.
        url: String,
    },

    /// The download did not complete within the timeout.
    #[error("download of {url} timed out after {} seconds", timeout.as_secs())]
    Timeout {
        /// The URL that was requested.
        url: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The URL uses a scheme the downloader cannot retrieve.
    #[error("unsupported URL scheme: {url}")]
    UnsupportedScheme {
        /// The rejected URL.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] io::Error),
}

impl DownloadError {
    /// Whether this failure was a timeout rather than a hard error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Downloader for release URLs (`https://`, `http://`, `file://`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseDownloader;

impl ArtefactDownloader for ReleaseDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        if let Some(local) = url.strip_prefix("file://") {
            debug!("copying local artefact {local}");
            return copy_local(url, Path::new(local), dest);
        }
        if url.starts_with("https://") || url.starts_with("http://") {
            debug!("downloading {url}");
            return download_to_file(url, dest);
        }
        Err(DownloadError::UnsupportedScheme {
            url: url.to_owned(),
        })
    }
}

/// Copy a `file://` artefact into place.
fn copy_local(url: &str, source: &Path, dest: &Path) -> Result<(), DownloadError> {
    match std::fs::copy(source, dest) {
        Ok(bytes) => {
            debug!("copied {bytes} bytes from {}", source.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DownloadError::NotFound {
            url: url.to_owned(),
        }),
        Err(e) => Err(DownloadError::Io(e)),
    }
}

/// Download a URL and write the body to a file.
fn download_to_file(url: &str, dest: &Path) -> Result<(), DownloadError> {
    let response = http_agent()
        .get(url)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;
    let mut file = std::fs::File::create(dest)?;
    let bytes = io::copy(&mut response.into_body().as_reader(), &mut file)
        .map_err(|e| map_body_error(url, e))?;
    file.sync_all()?;
    debug!("downloaded {bytes} bytes from {url}");
    Ok(())
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::Timeout(_) => DownloadError::Timeout {
            url: url.to_owned(),
            timeout: DOWNLOAD_TIMEOUT,
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Map an error raised while streaming the response body.
fn map_body_error(url: &str, err: io::Error) -> DownloadError {
    if err.kind() == io::ErrorKind::TimedOut {
        DownloadError::Timeout {
            url: url.to_owned(),
            timeout: DOWNLOAD_TIMEOUT,
        }
    } else {
        DownloadError::HttpError {
            url: url.to_owned(),
            reason: err.to_string(),
        }
    }
}
