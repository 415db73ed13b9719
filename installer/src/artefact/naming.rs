//! Release asset naming policy.
//!
//! Published archives follow the format
//! `piam-anc-<os>-<arch>.tar.gz`. Release tables must point each platform
//! at the archive carrying its own name.

use crate::platform::Platform;
use std::fmt;

/// The fixed prefix for all asset names; also the executable's name.
const ASSET_PREFIX: &str = "piam-anc";

/// The fixed file extension for release archives.
const ASSET_EXTENSION: &str = ".tar.gz";

/// A fully-qualified release asset name.
///
/// # Examples
///
/// ```
/// use piam_anc_installer::artefact::naming::AssetName;
/// use piam_anc_installer::platform::{Arch, Os, Platform};
///
/// let name = AssetName::new(Platform::new(Os::Linux, Arch::Amd64));
/// assert_eq!(name.to_string(), "piam-anc-linux-amd64.tar.gz");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetName {
    platform: Platform,
}

impl AssetName {
    /// Create the asset name for a platform.
    #[must_use]
    pub const fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Return the filename as a string without consuming the value.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ASSET_PREFIX}-{}{ASSET_EXTENSION}",
            self.platform.asset_suffix()
        )
    }
}
