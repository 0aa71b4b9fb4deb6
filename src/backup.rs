//! `.backup` sibling files: create, verify, restore, remove.
//!
//! Every destructive write in this crate is preceded by [`create_backup`],
//! which copies the original to `<name>.backup` next to it, fsyncs the copy
//! and checks that its SHA-256 matches the source before returning. A backup
//! that fails verification is reported as an error and the caller must not
//! proceed.
//!
//! Backups are never removed implicitly. [`remove_backup`] is the explicit
//! cleanup step once the cropped assets have been checked; [`restore_backup`]
//! copies the backup back over the original and keeps the backup.
//!
//! ```text
//! rural_kenya/
//! ├── house_1.jpg           # cropped
//! └── house_1.jpg.backup    # pre-crop bytes
//! ```

use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Suffix appended to the full file name of a backup.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Path of the backup for `path`: the same name with `.backup` appended.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Whether `path` names a backup file (case-insensitive suffix match).
pub fn is_backup_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().ends_with(BACKUP_SUFFIX))
        .unwrap_or(false)
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Copy `src` to `dst` and fsync `dst`. Both handles close on return.
fn copy_synced(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut reader = File::open(src)?;
    let mut writer = File::create(dst)?;
    let copied = io::copy(&mut reader, &mut writer)?;
    writer.sync_all()?;
    Ok(copied)
}

/// Staging name a backup is written under until it has been verified.
fn staging_path(path: &Path) -> PathBuf {
    let mut name: OsString = backup_path(path).into_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

/// Copy `path` to `staging` and check the copy hashes the same as the source.
fn write_verified(path: &Path, staging: &Path) -> io::Result<u64> {
    let copied = copy_synced(path, staging)?;
    if hash_file(path)? != hash_file(staging)? {
        return Err(io::Error::other(format!(
            "backup verification failed for {}",
            staging.display()
        )));
    }
    Ok(copied)
}

/// Write a verified byte-for-byte copy of `path` to [`backup_path`].
///
/// The copy is staged under `<name>.backup.partial` and renamed into place
/// only after its hash matches the source. On failure the staging file is
/// removed and any existing `.backup` is left as it was. Otherwise a stale
/// backup is replaced. Returns the backup path.
pub fn create_backup(path: &Path) -> io::Result<PathBuf> {
    let backup = backup_path(path);
    let staging = staging_path(path);

    let copied = match write_verified(path, &staging).and_then(|copied| {
        fs::rename(&staging, &backup)?;
        Ok(copied)
    }) {
        Ok(copied) => copied,
        Err(e) => {
            match fs::remove_file(&staging) {
                Err(cleanup) if cleanup.kind() != io::ErrorKind::NotFound => {
                    tracing::warn!(path = %staging.display(), error = %cleanup, "could not remove partial backup");
                }
                _ => {}
            }
            return Err(e);
        }
    };

    tracing::debug!(path = %path.display(), bytes = copied, "backup written");
    Ok(backup)
}

/// Delete the backup of `path` if present. Returns whether one was removed.
pub fn remove_backup(path: &Path) -> io::Result<bool> {
    match fs::remove_file(backup_path(path)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Copy the backup of `path` back over `path`. Returns whether a backup existed.
///
/// The backup itself is left in place.
pub fn restore_backup(path: &Path) -> io::Result<bool> {
    let backup = backup_path(path);
    if !backup.is_file() {
        return Ok(false);
    }
    restore_from(&backup, path)?;
    Ok(true)
}

/// Copy an explicit backup file over `path`.
pub fn restore_from(backup: &Path, path: &Path) -> io::Result<()> {
    copy_synced(backup, path)?;
    tracing::info!(path = %path.display(), "restored from backup");
    Ok(())
}
