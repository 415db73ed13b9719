//! Install layout resolution.
//!
//! An install writes two locations: the directory that receives the
//! `piam-anc` executable and the tool's variable-data directory. Both
//! derive from a prefix (`<prefix>/bin` and `<prefix>/var/piam-anc`),
//! and either may be overridden independently. Without an explicit
//! prefix the user's `~/.local` is used.

use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// Name of the executable placed in the bin directory.
pub const EXECUTABLE_NAME: &str = "piam-anc";

/// Name of the tool's directory under `<prefix>/var`.
pub const STATE_DIR_NAME: &str = "piam-anc";

/// Caller-supplied location overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOverrides<'a> {
    /// Install prefix.
    pub prefix: Option<&'a Utf8Path>,
    /// Explicit bin directory; wins over the prefix.
    pub bin_dir: Option<&'a Utf8Path>,
    /// Explicit state directory; wins over the prefix.
    pub state_dir: Option<&'a Utf8Path>,
}

/// The pair of directories an install writes to.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use piam_anc_installer::layout::InstallLayout;
///
/// let layout = InstallLayout::from_prefix(Utf8Path::new("/opt/homebrew"));
/// assert_eq!(layout.bin_dir(), "/opt/homebrew/bin");
/// assert_eq!(layout.state_dir(), "/opt/homebrew/var/piam-anc");
/// assert_eq!(layout.binary_path(), "/opt/homebrew/bin/piam-anc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallLayout {
    bin_dir: Utf8PathBuf,
    state_dir: Utf8PathBuf,
}

impl InstallLayout {
    /// Build a layout from explicit directories.
    #[must_use]
    pub const fn new(bin_dir: Utf8PathBuf, state_dir: Utf8PathBuf) -> Self {
        Self { bin_dir, state_dir }
    }

    /// Derive both directories from an install prefix.
    #[must_use]
    pub fn from_prefix(prefix: &Utf8Path) -> Self {
        Self {
            bin_dir: prefix.join("bin"),
            state_dir: prefix.join("var").join(STATE_DIR_NAME),
        }
    }

    /// Resolve the layout from overrides, falling back to the default
    /// prefix for anything not given explicitly.
    ///
    /// The home directory is only consulted when a location is missing.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::LayoutUnavailable`] when a default is
    /// needed but the home directory is unknown or not valid UTF-8.
    pub fn resolve(dirs: &dyn BaseDirs, overrides: &LayoutOverrides<'_>) -> Result<Self> {
        if let (Some(bin_dir), Some(state_dir)) = (overrides.bin_dir, overrides.state_dir) {
            return Ok(Self::new(bin_dir.to_owned(), state_dir.to_owned()));
        }

        let prefix = overrides
            .prefix
            .map_or_else(|| default_prefix(dirs), |prefix| Ok(prefix.to_owned()))?;
        let base = Self::from_prefix(&prefix);
        Ok(Self {
            bin_dir: overrides
                .bin_dir
                .map_or(base.bin_dir, Utf8Path::to_path_buf),
            state_dir: overrides
                .state_dir
                .map_or(base.state_dir, Utf8Path::to_path_buf),
        })
    }

    /// Directory that receives the executable.
    #[must_use]
    pub fn bin_dir(&self) -> &Utf8Path {
        &self.bin_dir
    }

    /// The tool's variable-data directory.
    #[must_use]
    pub fn state_dir(&self) -> &Utf8Path {
        &self.state_dir
    }

    /// Final path of the installed executable.
    #[must_use]
    pub fn binary_path(&self) -> Utf8PathBuf {
        self.bin_dir.join(EXECUTABLE_NAME)
    }
}

/// The default install prefix, `~/.local`.
///
/// # Errors
///
/// Returns [`InstallerError::LayoutUnavailable`] when the home directory
/// cannot be determined or is not valid UTF-8.
pub fn default_prefix(dirs: &dyn BaseDirs) -> Result<Utf8PathBuf> {
    let home = dirs
        .home_dir()
        .ok_or_else(|| InstallerError::LayoutUnavailable {
            reason: "could not determine home directory".to_owned(),
        })?;
    let home_utf8 =
        Utf8PathBuf::from_path_buf(home).map_err(|path| InstallerError::LayoutUnavailable {
            reason: format!("home directory is not valid UTF-8: {}", path.display()),
        })?;
    Ok(home_utf8.join(".local"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirs::MockBaseDirs;
    use rstest::rstest;
    use std::path::PathBuf;

    fn home_at(path: &'static str) -> MockBaseDirs {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_home_dir()
            .returning(move || Some(PathBuf::from(path)));
        dirs
    }

    #[test]
    fn defaults_to_home_local_prefix() {
        let dirs = home_at("/home/ops");
        let layout =
            InstallLayout::resolve(&dirs, &LayoutOverrides::default()).expect("layout resolves");
        assert_eq!(layout.bin_dir(), "/home/ops/.local/bin");
        assert_eq!(layout.state_dir(), "/home/ops/.local/var/piam-anc");
    }

    #[test]
    fn prefix_override_skips_home_lookup() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_home_dir().never();
        let overrides = LayoutOverrides {
            prefix: Some(Utf8Path::new("/usr/local")),
            ..LayoutOverrides::default()
        };
        let layout = InstallLayout::resolve(&dirs, &overrides).expect("layout resolves");
        assert_eq!(layout.binary_path(), "/usr/local/bin/piam-anc");
    }

    #[rstest]
    #[case::bin_only(Some("/srv/bin"), None, "/srv/bin", "/usr/local/var/piam-anc")]
    #[case::state_only(None, Some("/srv/state"), "/usr/local/bin", "/srv/state")]
    fn single_override_wins_over_prefix(
        #[case] bin_dir: Option<&str>,
        #[case] state_dir: Option<&str>,
        #[case] expected_bin: &str,
        #[case] expected_state: &str,
    ) {
        let dirs = MockBaseDirs::new();
        let overrides = LayoutOverrides {
            prefix: Some(Utf8Path::new("/usr/local")),
            bin_dir: bin_dir.map(Utf8Path::new),
            state_dir: state_dir.map(Utf8Path::new),
        };
        let layout = InstallLayout::resolve(&dirs, &overrides).expect("layout resolves");
        assert_eq!(layout.bin_dir(), expected_bin);
        assert_eq!(layout.state_dir(), expected_state);
    }

    #[test]
    fn both_overrides_need_no_prefix() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_home_dir().never();
        let overrides = LayoutOverrides {
            prefix: None,
            bin_dir: Some(Utf8Path::new("/a/bin")),
            state_dir: Some(Utf8Path::new("/b/state")),
        };
        let layout = InstallLayout::resolve(&dirs, &overrides).expect("layout resolves");
        assert_eq!(layout, InstallLayout::new("/a/bin".into(), "/b/state".into()));
    }

    #[test]
    fn missing_home_is_layout_error() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_home_dir().returning(|| None);
        let err = InstallLayout::resolve(&dirs, &LayoutOverrides::default())
            .expect_err("no home directory");
        assert!(
            matches!(err, InstallerError::LayoutUnavailable { ref reason } if reason.contains("home directory")),
            "unexpected error: {err}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_home_is_layout_error() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let mut dirs = MockBaseDirs::new();
        dirs.expect_home_dir().return_once(|| {
            Some(PathBuf::from(OsString::from_vec(vec![
                b'/', b'h', b'o', b'm', b'e', b'/', 0xff,
            ])))
        });
        let err = default_prefix(&dirs).expect_err("non UTF-8 home");
        assert!(
            matches!(err, InstallerError::LayoutUnavailable { ref reason } if reason.contains("not valid UTF-8")),
            "unexpected error: {err}"
        );
    }
}
