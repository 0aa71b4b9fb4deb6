//! Whole-tree runs: crop, clean up backups, restore backups.
//!
//! Each run walks the folders returned by [`scan_folders`] in name order and
//! handles one image at a time. Per-image failures become records in the
//! summary and an event for the caller; they never stop the run. Only
//! run-level problems (missing root, unreadable folder) surface as
//! [`ScanError`].
//!
//! Progress is reported through a caller-supplied `FnMut(event)` so the
//! binary can print as it goes and tests can collect events.

use crate::backup;
use crate::config::ToolConfig;
use crate::crop::{CropResult, crop};
use crate::imaging::ImageBackend;
use crate::scan::{ScanError, folder_name, list_backups, list_images, resolve_folder, scan_folders};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Which folders a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderSelection<'a> {
    /// Every folder under the root, minus the exclusion list.
    #[default]
    All,
    /// One named folder, exclusion list ignored.
    Only(&'a str),
}

fn select_folders(
    config: &ToolConfig,
    selection: FolderSelection<'_>,
) -> Result<Vec<PathBuf>, ScanError> {
    match selection {
        FolderSelection::All => scan_folders(&config.root, &config.exclude_folders),
        FolderSelection::Only(name) => Ok(vec![resolve_folder(&config.root, name)?]),
    }
}

// ============================================================================
// Crop
// ============================================================================

/// Per-image counts for a crop run or a single folder within it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CropSummary {
    pub folders: u32,
    pub cropped: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl CropSummary {
    pub fn record(&mut self, result: &CropResult) {
        match result {
            CropResult::Cropped { .. } => self.cropped += 1,
            CropResult::Skipped { .. } => self.skipped += 1,
            CropResult::Failed { .. } => self.failed += 1,
        }
    }

    pub fn images(&self) -> u32 {
        self.cropped + self.skipped + self.failed
    }

    fn absorb(&mut self, folder: &CropSummary) {
        self.folders += 1;
        self.cropped += folder.cropped;
        self.skipped += folder.skipped;
        self.failed += folder.failed;
    }
}

impl fmt::Display for CropSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cropped, {} skipped, {} errors",
            self.cropped, self.skipped, self.failed
        )
    }
}

/// Progress of a crop run.
#[derive(Debug)]
pub enum CropEvent<'a> {
    FolderStarted {
        folder: &'a str,
    },
    Image {
        path: &'a Path,
        result: &'a CropResult,
    },
    FolderFinished {
        folder: &'a str,
        counts: &'a CropSummary,
    },
}

/// Crop every matching image in the selected folders.
pub fn run_crop(
    backend: &impl ImageBackend,
    config: &ToolConfig,
    selection: FolderSelection<'_>,
    mut on_event: impl FnMut(CropEvent<'_>),
) -> Result<CropSummary, ScanError> {
    let spec = config.crop.to_spec();
    let mut total = CropSummary::default();

    for folder in select_folders(config, selection)? {
        let name = folder_name(&folder);
        on_event(CropEvent::FolderStarted { folder: &name });

        let mut counts = CropSummary::default();
        for path in list_images(&folder, &config.extensions)? {
            let result = crop(backend, &path, &spec);
            counts.record(&result);
            on_event(CropEvent::Image {
                path: &path,
                result: &result,
            });
        }

        on_event(CropEvent::FolderFinished {
            folder: &name,
            counts: &counts,
        });
        total.absorb(&counts);
    }

    Ok(total)
}

// ============================================================================
// Backup maintenance (cleanup / restore)
// ============================================================================

/// What a backup run does to each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupAction {
    Remove,
    Restore,
}

impl BackupAction {
    pub fn past_tense(self) -> &'static str {
        match self {
            BackupAction::Remove => "removed",
            BackupAction::Restore => "restored",
        }
    }
}

/// Counts for a cleanup or restore run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupSummary {
    pub action: BackupAction,
    pub folders: u32,
    pub done: u32,
    pub failed: u32,
}

impl BackupSummary {
    fn new(action: BackupAction) -> Self {
        Self {
            action,
            folders: 0,
            done: 0,
            failed: 0,
        }
    }
}

impl fmt::Display for BackupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.done, self.action.past_tense())?;
        if self.failed > 0 {
            write!(f, ", {} errors", self.failed)?;
        }
        Ok(())
    }
}

/// Progress of a cleanup or restore run.
#[derive(Debug)]
pub enum BackupEvent<'a> {
    FolderStarted {
        folder: &'a str,
    },
    Done {
        action: BackupAction,
        image: &'a Path,
        backup: &'a Path,
    },
    Failed {
        action: BackupAction,
        image: &'a Path,
        backup: &'a Path,
        error: &'a io::Error,
    },
    FolderFinished {
        folder: &'a str,
        action: BackupAction,
        done: u32,
    },
}

/// The image a backup file belongs to: the same path minus `.backup`.
///
/// Works on the raw file name so non-UTF-8 names round-trip. `None` for a
/// file named just `.backup`.
fn image_for_backup(backup: &Path) -> Option<PathBuf> {
    let stem = backup.file_stem()?;
    if Some(stem) == backup.file_name() {
        return None;
    }
    Some(backup.with_file_name(stem))
}

/// Delete every `.backup` file in the selected folders.
pub fn run_cleanup(
    config: &ToolConfig,
    selection: FolderSelection<'_>,
    on_event: impl FnMut(BackupEvent<'_>),
) -> Result<BackupSummary, ScanError> {
    run_backup_action(config, selection, BackupAction::Remove, on_event)
}

/// Copy every backup in the selected folders back over its image.
pub fn run_restore(
    config: &ToolConfig,
    selection: FolderSelection<'_>,
    on_event: impl FnMut(BackupEvent<'_>),
) -> Result<BackupSummary, ScanError> {
    run_backup_action(config, selection, BackupAction::Restore, on_event)
}

fn run_backup_action(
    config: &ToolConfig,
    selection: FolderSelection<'_>,
    action: BackupAction,
    mut on_event: impl FnMut(BackupEvent<'_>),
) -> Result<BackupSummary, ScanError> {
    let mut summary = BackupSummary::new(action);

    for folder in select_folders(config, selection)? {
        let name = folder_name(&folder);
        on_event(BackupEvent::FolderStarted { folder: &name });

        let mut done = 0;
        for backup_file in list_backups(&folder)? {
            let Some(image) = image_for_backup(&backup_file) else {
                tracing::warn!(path = %backup_file.display(), "backup has no image name, skipping");
                continue;
            };
            let outcome = match action {
                BackupAction::Remove => fs::remove_file(&backup_file),
                BackupAction::Restore => backup::restore_from(&backup_file, &image),
            };
            match outcome {
                Ok(()) => {
                    done += 1;
                    on_event(BackupEvent::Done {
                        action,
                        image: &image,
                        backup: &backup_file,
                    });
                }
                Err(error) => {
                    summary.failed += 1;
                    on_event(BackupEvent::Failed {
                        action,
                        image: &image,
                        backup: &backup_file,
                        error: &error,
                    });
                }
            }
        }

        on_event(BackupEvent::FolderFinished {
            folder: &name,
            action,
            done,
        });
        summary.folders += 1;
        summary.done += done;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::backup_path;
    use crate::imaging::{Dimensions, RustBackend};
    use crate::test_helpers::{file_names, setup_tree};

    fn config_for(root: &Path, match_height: u32) -> ToolConfig {
        let mut config = ToolConfig::default();
        config.root = root.to_path_buf();
        config.crop.match_height = match_height;
        config
    }

    #[test]
    fn crop_run_counts_and_continues_past_failures() {
        let tmp = setup_tree(&[
            ("rural_kenya", &[("a.jpg", 64, 80), ("b.jpg", 64, 47)]),
            ("urban_tokyo", &[("c.jpg", 32, 80)]),
        ]);
        fs::write(tmp.path().join("rural_kenya/broken.jpg"), b"junk").unwrap();
        let config = config_for(tmp.path(), 80);

        let summary = run_crop(&RustBackend::new(), &config, FolderSelection::All, |_| {}).unwrap();

        assert_eq!(
            summary,
            CropSummary {
                folders: 2,
                cropped: 2,
                skipped: 1,
                failed: 1
            }
        );
        assert_eq!(
            RustBackend::new()
                .identify(&tmp.path().join("urban_tokyo/c.jpg"))
                .unwrap(),
            Dimensions::from((32, 47))
        );
    }

    #[test]
    fn crop_run_never_enters_excluded_folders() {
        let tmp = setup_tree(&[
            ("rural_kenya", &[("a.jpg", 16, 40)]),
            ("mogul_avatars", &[("face.jpg", 16, 40)]),
        ]);
        let config = config_for(tmp.path(), 40);

        let mut folders = Vec::new();
        run_crop(&RustBackend::new(), &config, FolderSelection::All, |e| {
            if let CropEvent::FolderStarted { folder } = e {
                folders.push(folder.to_string());
            }
        })
        .unwrap();

        assert_eq!(folders, vec!["rural_kenya"]);
        assert_eq!(file_names(&tmp.path().join("mogul_avatars")), vec!["face.jpg"]);
    }

    #[test]
    fn crop_run_ignores_existing_backups() {
        let tmp = setup_tree(&[("f", &[("a.jpg", 16, 40)])]);
        fs::write(tmp.path().join("f/old.jpg.backup"), b"old").unwrap();
        let config = config_for(tmp.path(), 40);

        let mut seen = Vec::new();
        run_crop(&RustBackend::new(), &config, FolderSelection::All, |e| {
            if let CropEvent::Image { path, .. } = e {
                seen.push(folder_name(path));
            }
        })
        .unwrap();

        assert_eq!(seen, vec!["a.jpg"]);
    }

    #[test]
    fn crop_run_single_folder() {
        let tmp = setup_tree(&[
            ("rural_kenya", &[("a.jpg", 16, 40)]),
            ("urban_tokyo", &[("b.jpg", 16, 40)]),
        ]);
        let config = config_for(tmp.path(), 40);

        let summary = run_crop(
            &RustBackend::new(),
            &config,
            FolderSelection::Only("rural_kenya"),
            |_| {},
        )
        .unwrap();

        assert_eq!(summary.folders, 1);
        assert_eq!(summary.cropped, 1);
        assert!(!backup_path(&tmp.path().join("urban_tokyo/b.jpg")).exists());
    }

    #[test]
    fn crop_run_emits_folder_events_in_order() {
        let tmp = setup_tree(&[("f", &[("a.jpg", 16, 40)])]);
        let config = config_for(tmp.path(), 40);

        let mut kinds = Vec::new();
        run_crop(&RustBackend::new(), &config, FolderSelection::All, |e| {
            kinds.push(match e {
                CropEvent::FolderStarted { .. } => "start",
                CropEvent::Image { .. } => "image",
                CropEvent::FolderFinished { counts, .. } => {
                    assert_eq!(counts.cropped, 1);
                    "finish"
                }
            });
        })
        .unwrap();

        assert_eq!(kinds, vec!["start", "image", "finish"]);
    }

    #[test]
    fn cleanup_removes_only_backups() {
        let tmp = setup_tree(&[("f", &[("a.jpg", 16, 40)])]);
        let config = config_for(tmp.path(), 40);
        run_crop(&RustBackend::new(), &config, FolderSelection::All, |_| {}).unwrap();
        assert_eq!(file_names(&tmp.path().join("f")), vec!["a.jpg", "a.jpg.backup"]);

        let summary = run_cleanup(&config, FolderSelection::All, |_| {}).unwrap();

        assert_eq!(summary.done, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(file_names(&tmp.path().join("f")), vec!["a.jpg"]);

        let again = run_cleanup(&config, FolderSelection::All, |_| {}).unwrap();
        assert_eq!(again.done, 0);
    }

    #[test]
    fn restore_puts_original_back() {
        let tmp = setup_tree(&[("f", &[("a.jpg", 16, 40)])]);
        let path = tmp.path().join("f/a.jpg");
        let original = fs::read(&path).unwrap();
        let config = config_for(tmp.path(), 40);
        run_crop(&RustBackend::new(), &config, FolderSelection::All, |_| {}).unwrap();
        assert_ne!(fs::read(&path).unwrap(), original);

        let summary = run_restore(&config, FolderSelection::All, |_| {}).unwrap();

        assert_eq!(summary.done, 1);
        assert_eq!(fs::read(&path).unwrap(), original);
        assert!(backup_path(&path).exists());
    }

    #[test]
    fn image_for_backup_strips_suffix() {
        assert_eq!(
            image_for_backup(Path::new("/a/b/house.jpg.backup")),
            Some(PathBuf::from("/a/b/house.jpg"))
        );
        assert_eq!(
            image_for_backup(Path::new("/a/b/shop.JPG.BACKUP")),
            Some(PathBuf::from("/a/b/shop.JPG"))
        );
        assert_eq!(image_for_backup(Path::new("/a/b/.backup")), None);
    }

    #[cfg(unix)]
    #[test]
    fn restore_handles_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = setup_tree(&[("f", &[])]);
        let name = OsStr::from_bytes(b"caf\xFF.jpg");
        let path = tmp.path().join("f").join(name);
        crate::test_helpers::create_test_jpeg(&path, 16, 40);
        let original = fs::read(&path).unwrap();
        let config = config_for(tmp.path(), 40);
        run_crop(&RustBackend::new(), &config, FolderSelection::All, |_| {}).unwrap();
        assert_ne!(fs::read(&path).unwrap(), original);

        let summary = run_restore(&config, FolderSelection::All, |_| {}).unwrap();

        assert_eq!(summary.done, 1);
        assert_eq!(fs::read(&path).unwrap(), original);
        assert_eq!(fs::read_dir(tmp.path().join("f")).unwrap().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn crop_run_survives_dangling_symlink() {
        let tmp = setup_tree(&[("f", &[("a.jpg", 16, 40)])]);
        std::os::unix::fs::symlink("/nonexistent", tmp.path().join("f/dangling.jpg")).unwrap();
        let config = config_for(tmp.path(), 40);

        let summary = run_crop(&RustBackend::new(), &config, FolderSelection::All, |_| {}).unwrap();

        assert_eq!(summary.cropped, 1);
        assert!(backup_path(&tmp.path().join("f/a.jpg")).exists());
    }

    #[test]
    fn summary_display() {
        let summary = CropSummary {
            folders: 3,
            cropped: 5,
            skipped: 2,
            failed: 1,
        };
        assert_eq!(summary.to_string(), "5 cropped, 2 skipped, 1 errors");
        assert_eq!(summary.images(), 8);

        let cleanup = BackupSummary {
            action: BackupAction::Remove,
            folders: 1,
            done: 4,
            failed: 0,
        };
        assert_eq!(cleanup.to_string(), "4 removed");
    }
}
