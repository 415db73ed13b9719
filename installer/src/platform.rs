//! Host platform canonicalisation.
//!
//! Releases ship one archive per operating system and CPU architecture
//! pair. Detected or user-supplied names are normalised here into the two
//! closed enums [`Os`] and [`Arch`]; anything outside those sets is an
//! [`UnsupportedPlatform`] error raised at the call site rather than a
//! silent fallback.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Operating system families with published release archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Apple macOS.
    Macos,
    /// Linux (glibc or musl; the release binary is static).
    Linux,
}

/// CPU architectures with published release archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 64-bit x86 (Intel and AMD).
    Amd64,
    /// 64-bit ARM (Apple silicon, Graviton, Ampere).
    Arm64,
}

/// A canonical (operating system, architecture) pair.
///
/// # Examples
///
/// ```
/// use piam_anc_installer::platform::{Arch, Os, Platform};
///
/// let platform = Platform::from_names("darwin", "aarch64").expect("supported");
/// assert_eq!(platform, Platform::new(Os::Macos, Arch::Arm64));
/// assert_eq!(platform.to_string(), "macos/arm64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Platform {
    os: Os,
    arch: Arch,
}

/// Raised when an operating system or architecture name has no
/// canonical counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported platform {os}/{arch}; releases exist for macos and linux on amd64 and arm64")]
pub struct UnsupportedPlatform {
    /// The operating system name as detected or supplied.
    pub os: String,
    /// The architecture name as detected or supplied.
    pub arch: String,
}

impl Os {
    /// Every supported operating system.
    pub const ALL: [Self; 2] = [Self::Macos, Self::Linux];

    /// Canonicalise an operating system name.
    ///
    /// Accepts the Rust `std::env::consts::OS` spelling as well as the
    /// Go-style `darwin` used in release asset names.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "macos" | "darwin" | "osx" => Some(Self::Macos),
            "linux" => Some(Self::Linux),
            _ => None,
        }
    }

    /// The canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Macos => "macos",
            Self::Linux => "linux",
        }
    }

    /// The spelling used in release asset file names.
    #[must_use]
    pub const fn asset_name(self) -> &'static str {
        match self {
            Self::Macos => "darwin",
            Self::Linux => "linux",
        }
    }
}

impl Arch {
    /// Every supported architecture.
    pub const ALL: [Self; 2] = [Self::Amd64, Self::Arm64];

    /// Canonicalise an architecture name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "amd64" | "x86_64" | "x64" => Some(Self::Amd64),
            "arm64" | "aarch64" => Some(Self::Arm64),
            _ => None,
        }
    }

    /// The canonical lowercase name, also used in asset file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl Platform {
    /// All four supported pairs, in table order.
    pub const ALL: [Self; 4] = [
        Self::new(Os::Macos, Arch::Amd64),
        Self::new(Os::Macos, Arch::Arm64),
        Self::new(Os::Linux, Arch::Amd64),
        Self::new(Os::Linux, Arch::Arm64),
    ];

    /// Build a platform from already-canonical parts.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Canonicalise a pair of names.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatform`] when either name has no canonical
    /// counterpart.
    pub fn from_names(os: &str, arch: &str) -> Result<Self, UnsupportedPlatform> {
        match (Os::parse(os), Arch::parse(arch)) {
            (Some(os_value), Some(arch_value)) => Ok(Self::new(os_value, arch_value)),
            _ => Err(UnsupportedPlatform {
                os: os.to_owned(),
                arch: arch.to_owned(),
            }),
        }
    }

    /// Detect the platform this binary is running on.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatform`] on hosts without a release archive
    /// (for example Windows or RISC-V).
    pub fn host() -> Result<Self, UnsupportedPlatform> {
        Self::from_names(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Resolve a platform from optional overrides, filling gaps from the
    /// host.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedPlatform`] when the effective pair is not
    /// supported.
    pub fn from_overrides(os: Option<&str>, arch: Option<&str>) -> Result<Self, UnsupportedPlatform> {
        match (os, arch) {
            (None, None) => Self::host(),
            _ => Self::from_names(
                os.unwrap_or(std::env::consts::OS),
                arch.unwrap_or(std::env::consts::ARCH),
            ),
        }
    }

    /// The operating system family.
    #[must_use]
    pub const fn os(self) -> Os {
        self.os
    }

    /// The CPU architecture.
    #[must_use]
    pub const fn arch(self) -> Arch {
        self.arch
    }

    /// The `<os>-<arch>` suffix used in release asset names.
    #[must_use]
    pub fn asset_suffix(self) -> String {
        format!("{}-{}", self.os.asset_name(), self.arch.as_str())
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
