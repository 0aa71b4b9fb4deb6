//! Asset tree discovery.
//!
//! The asset root is a flat set of named folders, one per locale or asset
//! group, each holding images directly:
//!
//! ```text
//! assets/images/                   # Asset root
//! ├── rural_kenya/                 # Processed
//! │   ├── house_1.jpg
//! │   ├── house_1.jpg.backup       # Left by an earlier crop, never processed
//! │   └── shop.JPG                 # Extension match is case-insensitive
//! ├── urban_tokyo/
//! │   └── tower.jpg
//! ├── mogul_avatars/               # In the exclusion list: never entered
//! │   └── face.jpg
//! └── notes.txt                    # Not a folder: ignored
//! ```
//!
//! Only the immediate children of the root are considered folders, and only
//! the immediate children of a folder are considered images. Listings are
//! sorted by file name so runs are reproducible.

use crate::backup::is_backup_file;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Asset root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Folder not found: {0}")]
    FolderNotFound(PathBuf),
}

/// Immediate entries of `dir`, symlinks followed, sorted by name.
///
/// Failing to read `dir` itself is an error. A child that cannot be
/// resolved (a dangling symlink, a permission error on one entry) is logged
/// and left out.
fn children(dir: &Path) -> Result<Vec<walkdir::DirEntry>, ScanError> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                tracing::warn!(%path, error = %e, "skipping unreadable entry");
            }
        }
    }
    Ok(entries)
}

/// Subfolders of `root` to process, skipping excluded and hidden names.
pub fn scan_folders(root: &Path, exclude: &[String]) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }

    let mut folders = Vec::new();
    for entry in children(root)? {
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || exclude.iter().any(|e| e.as_str() == name) {
            tracing::debug!(folder = %name, "excluded");
            continue;
        }
        folders.push(entry.into_path());
    }
    Ok(folders)
}

/// Resolve a single named folder under `root`, ignoring the exclusion list.
pub fn resolve_folder(root: &Path, name: &str) -> Result<PathBuf, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    let folder = root.join(name);
    if !folder.is_dir() {
        return Err(ScanError::FolderNotFound(folder));
    }
    Ok(folder)
}

/// Whether `path` has one of `extensions` (case-insensitive) and is not a backup.
pub fn is_image(path: &Path, extensions: &[String]) -> bool {
    if is_backup_file(path) {
        return false;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
}

/// Image files directly inside `folder`.
pub fn list_images(folder: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, ScanError> {
    let mut images = Vec::new();
    for entry in children(folder)? {
        if entry.file_type().is_file() && is_image(entry.path(), extensions) {
            images.push(entry.into_path());
        }
    }
    Ok(images)
}

/// `.backup` files directly inside `folder`.
pub fn list_backups(folder: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut backups = Vec::new();
    for entry in children(folder)? {
        if entry.file_type().is_file() && is_backup_file(entry.path()) {
            backups.push(entry.into_path());
        }
    }
    Ok(backups)
}

/// Display name of a folder (its last path component).
pub fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| folder.display().to_string())
}
