//! The pinned release table.
//!
//! Maps each supported [`Platform`] to exactly one [`ArtefactDescriptor`].
//! The table is loaded once at startup (from the copy compiled into the
//! binary, or from a TOML file supplied by the operator), validated in
//! full, and never mutated afterwards. Lookups are total over
//! [`Platform::ALL`]; names outside the supported set surface as
//! [`UnsupportedPlatform`].

use super::descriptor::ArtefactDescriptor;
use super::error::{ArtefactError, Result};
use super::naming::AssetName;
use crate::platform::{Platform, UnsupportedPlatform};
use camino::Utf8Path;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;

/// The release table compiled into the installer.
const PINNED_RELEASE_TABLE: &str = include_str!("release.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    version: String,
    #[serde(default)]
    artefact: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    os: String,
    arch: String,
    url: String,
    sha256: String,
}

/// An immutable, fully validated table of release artefacts.
///
/// # Examples
///
/// ```
/// use piam_anc_installer::artefact::release_table::ReleaseTable;
/// use piam_anc_installer::platform::{Arch, Os, Platform};
///
/// let table = ReleaseTable::pinned().expect("pinned table is valid");
/// let descriptor = table
///     .resolve(Platform::new(Os::Linux, Arch::Amd64))
///     .expect("linux/amd64 is published");
/// assert!(descriptor.url().ends_with("piam-anc-linux-amd64.tar.gz"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTable {
    version: String,
    descriptors: BTreeMap<Platform, ArtefactDescriptor>,
}

impl ReleaseTable {
    /// Load the table compiled into the installer.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtefactError`] if the compiled-in table is malformed.
    pub fn pinned() -> Result<Self> {
        Self::from_toml_str(PINNED_RELEASE_TABLE)
    }

    /// Load a table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::Unreadable`] when the file cannot be read,
    /// or any validation error from [`Self::from_toml_str`].
    pub fn from_file(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ArtefactError::Unreadable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        debug!("loading release table from {path}");
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a table document.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::Parse`] for malformed TOML and the
    /// specific validation error for a bad version, entry, duplicate, or
    /// missing platform.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawTable = toml::from_str(contents).map_err(|e| ArtefactError::Parse {
            reason: e.to_string(),
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawTable) -> Result<Self> {
        validate_version(&raw.version)?;

        let mut descriptors = BTreeMap::new();
        for entry in raw.artefact {
            let descriptor = build_descriptor(&entry)?;
            let platform = descriptor.platform();
            if descriptors.insert(platform, descriptor).is_some() {
                return Err(ArtefactError::DuplicatePlatform {
                    platform: platform.to_string(),
                });
            }
        }

        if let Some(missing) = Platform::ALL
            .iter()
            .find(|platform| !descriptors.contains_key(platform))
        {
            return Err(ArtefactError::MissingPlatform {
                platform: missing.to_string(),
            });
        }

        Ok(Self {
            version: raw.version,
            descriptors,
        })
    }

    /// The release version every descriptor is pinned to.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up the descriptor for a canonical platform.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatform`] if the table has no entry for the
    /// platform.
    pub fn resolve(
        &self,
        platform: Platform,
    ) -> std::result::Result<&ArtefactDescriptor, UnsupportedPlatform> {
        self.descriptors
            .get(&platform)
            .ok_or_else(|| UnsupportedPlatform {
                os: platform.os().to_string(),
                arch: platform.arch().to_string(),
            })
    }

    /// Canonicalise a pair of names, then look up its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatform`] if either name is unknown or the
    /// pair has no entry.
    pub fn resolve_names(
        &self,
        os: &str,
        arch: &str,
    ) -> std::result::Result<&ArtefactDescriptor, UnsupportedPlatform> {
        let platform = Platform::from_names(os, arch)?;
        self.resolve(platform)
    }

    /// Iterate over every descriptor in platform order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ArtefactDescriptor> {
        self.descriptors.values()
    }
}

fn validate_version(version: &str) -> Result<()> {
    if version.is_empty() || version.chars().any(char::is_whitespace) {
        return Err(ArtefactError::InvalidVersion {
            value: version.to_owned(),
        });
    }
    Ok(())
}

fn build_descriptor(entry: &RawEntry) -> Result<ArtefactDescriptor> {
    let platform =
        Platform::from_names(&entry.os, &entry.arch).map_err(|_| ArtefactError::UnknownPlatform {
            os: entry.os.clone(),
            arch: entry.arch.clone(),
        })?;
    let invalid = |reason: String| ArtefactError::InvalidEntry {
        platform: platform.to_string(),
        reason,
    };
    let descriptor = ArtefactDescriptor::new(platform, &entry.url, &entry.sha256)
        .map_err(|e| invalid(e.to_string()))?;

    // Naming each archive after its platform keeps every URL distinct.
    let asset = AssetName::new(platform);
    if descriptor.file_name() != asset.filename() {
        return Err(invalid(format!("{} must name the {asset} asset", entry.url)));
    }
    Ok(descriptor)
}

#[cfg(test)]
#[path = "release_table_tests.rs"]
mod tests;
