//! Release artefacts: what to fetch, and how to trust what was fetched.
//!
//! # Sub-modules
//!
//! - [`descriptor`] - Pinned URL and digest for one platform (`ArtefactDescriptor`).
//! - [`download`] - Artefact download trait and HTTP/file implementation.
//! - [`error`] - Semantic error types for release table validation.
//! - [`extraction`] - `.tar.gz` extraction with path traversal protection.
//! - [`naming`] - Release asset naming convention (`AssetName`).
//! - [`release_table`] - The immutable per-platform table (`ReleaseTable`).
//! - [`sha256_digest`] - SHA-256 digest newtype (`Sha256Digest`).
//! - [`verification`] - Archive digest verification (`VerificationResult`).

pub mod descriptor;
pub mod download;
pub mod error;
pub mod extraction;
pub mod naming;
pub mod release_table;
pub mod sha256_digest;
pub mod verification;
