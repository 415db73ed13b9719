//! Atomic placement of the executable and provisioning of the state
//! directory.
//!
//! The executable is first written to a uniquely named temporary file in
//! the destination directory and only renamed over the final name once
//! its contents and mode are complete. A failure at any point drops the
//! temporary file, so the final path either keeps its previous contents
//! or receives the complete new binary.

use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io;
use std::path::Path;

/// Prefix for temporary files created next to their final destination.
const TEMP_PREFIX: &str = ".piam-anc-";

/// Copy `source` into `bin_dir` as `name` with mode `0755`.
///
/// Creates `bin_dir` if it does not exist. Any existing file at the
/// destination is replaced atomically.
///
/// # Errors
///
/// Returns [`InstallerError::Placement`] when the directory cannot be
/// created or written, or the rename fails.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use piam_anc_installer::placement::place_executable;
///
/// let temp = tempfile::tempdir().unwrap();
/// let source = temp.path().join("extracted");
/// std::fs::write(&source, b"#!/bin/sh\n").unwrap();
/// let bin_dir = Utf8PathBuf::try_from(temp.path().join("bin")).unwrap();
///
/// let installed = place_executable(&source, &bin_dir, "piam-anc").unwrap();
/// assert_eq!(installed, bin_dir.join("piam-anc"));
/// ```
pub fn place_executable(source: &Path, bin_dir: &Utf8Path, name: &str) -> Result<Utf8PathBuf> {
    let dest = bin_dir.join(name);
    fs::create_dir_all(bin_dir).map_err(|e| InstallerError::placement(bin_dir, &e))?;

    let mut staged = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(bin_dir)
        .map_err(|e| InstallerError::placement(bin_dir, &e))?;

    let mut input = fs::File::open(source).map_err(|e| InstallerError::Placement {
        path: dest.clone(),
        reason: format!("cannot read extracted executable {}: {e}", source.display()),
    })?;
    io::copy(&mut input, staged.as_file_mut()).map_err(|e| InstallerError::placement(&dest, &e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| InstallerError::placement(&dest, &e))?;
    set_executable(staged.path()).map_err(|e| InstallerError::placement(&dest, &e))?;

    debug!("renaming {} to {dest}", staged.path().display());
    staged
        .persist(&dest)
        .map_err(|e| InstallerError::placement(&dest, &e.error))?;
    Ok(dest)
}

/// Ensure `state_dir` exists and the current user can write to it.
///
/// Idempotent; existing contents are left untouched.
///
/// # Errors
///
/// Returns [`InstallerError::Placement`] when the directory cannot be
/// created or is not writable.
pub fn provision_state_dir(state_dir: &Utf8Path) -> Result<()> {
    fs::create_dir_all(state_dir).map_err(|e| InstallerError::placement(state_dir, &e))?;
    ensure_owner_access(state_dir.as_std_path())
        .map_err(|e| InstallerError::placement(state_dir, &e))?;

    // Dropping the probe removes it.
    let probe = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(state_dir)
        .map_err(|e| InstallerError::Placement {
            path: state_dir.to_owned(),
            reason: format!("directory is not writable: {e}"),
        })?;
    debug!("state directory {state_dir} is writable");
    drop(probe);
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Grant the owner read, write and search permission if any is missing.
#[cfg(unix)]
fn ensure_owner_access(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    let mode = perms.mode();
    if mode & 0o700 != 0o700 {
        perms.set_mode(mode | 0o700);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_owner_access(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(path: &Path) -> Utf8PathBuf {
        Utf8PathBuf::try_from(path.to_path_buf()).expect("temp paths are UTF-8")
    }

    fn source_file(temp: &TempDir, bytes: &[u8]) -> std::path::PathBuf {
        let source = temp.path().join("extracted");
        fs::write(&source, bytes).expect("write source");
        source
    }

    fn leftover_temp_files(dir: &Utf8Path) -> Vec<String> {
        fs::read_dir(dir)
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(TEMP_PREFIX))
            .collect()
    }

    #[test]
    fn places_executable_with_exact_bytes() {
        let temp = TempDir::new().expect("temp dir");
        let source = source_file(&temp, b"release binary");
        let bin_dir = utf8(&temp.path().join("prefix/bin"));

        let dest = place_executable(&source, &bin_dir, "piam-anc").expect("placement");

        assert_eq!(dest, bin_dir.join("piam-anc"));
        assert_eq!(fs::read(&dest).expect("read"), b"release binary");
        assert!(leftover_temp_files(&bin_dir).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn placed_executable_has_mode_0755() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("temp dir");
        let source = source_file(&temp, b"release binary");
        let bin_dir = utf8(&temp.path().join("bin"));

        let dest = place_executable(&source, &bin_dir, "piam-anc").expect("placement");
        let mode = fs::metadata(&dest).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn replaces_existing_executable() {
        let temp = TempDir::new().expect("temp dir");
        let bin_dir = utf8(&temp.path().join("bin"));
        fs::create_dir_all(&bin_dir).expect("mkdir");
        fs::write(bin_dir.join("piam-anc"), b"old").expect("seed");

        let source = source_file(&temp, b"new");
        place_executable(&source, &bin_dir, "piam-anc").expect("placement");
        assert_eq!(fs::read(bin_dir.join("piam-anc")).expect("read"), b"new");
    }

    #[test]
    fn unreadable_source_leaves_destination_untouched() {
        let temp = TempDir::new().expect("temp dir");
        let bin_dir = utf8(&temp.path().join("bin"));
        fs::create_dir_all(&bin_dir).expect("mkdir");
        fs::write(bin_dir.join("piam-anc"), b"old").expect("seed");

        let err = place_executable(&temp.path().join("absent"), &bin_dir, "piam-anc")
            .expect_err("missing source");
        assert!(matches!(err, InstallerError::Placement { .. }));
        assert_eq!(fs::read(bin_dir.join("piam-anc")).expect("read"), b"old");
        assert!(leftover_temp_files(&bin_dir).is_empty());
    }

    #[test]
    fn bin_dir_blocked_by_file_is_placement_error() {
        let temp = TempDir::new().expect("temp dir");
        let blocker = utf8(&temp.path().join("bin"));
        fs::write(&blocker, b"not a directory").expect("write blocker");
        let source = source_file(&temp, b"bytes");

        let err = place_executable(&source, &blocker, "piam-anc").expect_err("blocked");
        assert!(matches!(err, InstallerError::Placement { .. }), "got {err:?}");
    }

    #[test]
    fn provisions_state_dir_idempotently() {
        let temp = TempDir::new().expect("temp dir");
        let state_dir = utf8(&temp.path().join("var/piam-anc"));

        provision_state_dir(&state_dir).expect("first run");
        fs::write(state_dir.join("cache.json"), b"{}").expect("seed state");
        provision_state_dir(&state_dir).expect("second run");

        assert!(state_dir.is_dir());
        assert_eq!(fs::read(state_dir.join("cache.json")).expect("read"), b"{}");
        assert!(leftover_temp_files(&state_dir).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn provisioning_restores_owner_access() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("temp dir");
        let state_dir = utf8(&temp.path().join("state"));
        fs::create_dir_all(&state_dir).expect("mkdir");
        fs::set_permissions(&state_dir, fs::Permissions::from_mode(0o500)).expect("chmod");

        provision_state_dir(&state_dir).expect("provision");
        let mode = fs::metadata(&state_dir).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o700, 0o700);
    }
}
