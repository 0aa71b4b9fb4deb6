//! CLI output formatting for crop, cleanup, restore, and analysis runs.
//!
//! # Output Format
//!
//! ## Crop
//!
//! ```text
//! Processing folder: rural_kenya
//! Processing: assets/images/rural_kenya/house_1.jpg
//!     Created backup: assets/images/rural_kenya/house_1.jpg.backup
//!     Cropped from 1024x768 to 1024x735
//! Processing: assets/images/rural_kenya/house_2.jpg
//!     Skipping: dimensions 1024x735 (dimension mismatch)
//! Completed folder: rural_kenya - 1 cropped, 1 skipped, 0 errors
//! Processing folder: urban_tokyo
//! Processing: assets/images/urban_tokyo/tower.jpg
//!     Skipping: dimensions 800x600 (dimension mismatch)
//! Completed folder: urban_tokyo - No matching images found
//!
//! Done: 2 folders, 1 cropped, 2 skipped, 0 errors
//! ```
//!
//! ## Cleanup / Restore
//!
//! ```text
//! Cleaning folder: rural_kenya
//!     Removed backup: house_1.jpg.backup
//! Completed folder: rural_kenya - 1 removed
//!
//! Done: 1 folders, 1 removed
//! ```
//!
//! ## Analyze
//!
//! ```text
//! Analyzing folder: rural_kenya
//!
//! Folders: 2, images: 14, skipped: 1
//!     rural_kenya/house_2.jpg  1024x735  JPEG RGB  79.33 KB
//! Report: ./skipped_images_report_20250314_091502.json
//! ```
//!
//! # Architecture
//!
//! Each run has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::analyze::Report;
use crate::batch::{BackupAction, BackupEvent, BackupSummary, CropEvent, CropSummary};
use crate::crop::CropResult;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Final file name of a path, or the whole path if it has none.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `parent/name` for a report entry, matching how folders are listed.
fn folder_relative(path: &str) -> String {
    let path = Path::new(path);
    match path.parent().and_then(|p| p.file_name()) {
        Some(folder) => format!("{}/{}", folder.to_string_lossy(), file_label(path)),
        None => file_label(path),
    }
}

// ============================================================================
// Crop
// ============================================================================

/// Format one image outcome as display lines.
pub fn format_crop_result(path: &Path, result: &CropResult) -> Vec<String> {
    let mut lines = vec![format!("Processing: {}", path.display())];
    match result {
        CropResult::Cropped {
            old_dims,
            new_dims,
            backup_path,
        } => {
            lines.push(format!(
                "{}Created backup: {}",
                indent(1),
                backup_path.display()
            ));
            lines.push(format!(
                "{}Cropped from {} to {}",
                indent(1),
                old_dims,
                new_dims
            ));
        }
        CropResult::Skipped {
            reason,
            actual_dims,
        } => {
            lines.push(format!(
                "{}Skipping: dimensions {} ({})",
                indent(1),
                actual_dims,
                reason
            ));
        }
        CropResult::Failed { error } => {
            lines.push(format!("{}Error: {}", indent(1), error));
        }
    }
    lines
}

/// Format a single crop progress event as display lines.
pub fn format_crop_event(event: &CropEvent<'_>) -> Vec<String> {
    match event {
        CropEvent::FolderStarted { folder } => vec![format!("Processing folder: {}", folder)],
        CropEvent::Image { path, result } => format_crop_result(path, result),
        CropEvent::FolderFinished { folder, counts } if counts.cropped + counts.failed == 0 => {
            vec![format!("Completed folder: {} - No matching images found", folder)]
        }
        CropEvent::FolderFinished { folder, counts } => {
            vec![format!("Completed folder: {} - {}", folder, counts)]
        }
    }
}

pub fn format_crop_summary(summary: &CropSummary) -> Vec<String> {
    vec![
        String::new(),
        format!("Done: {} folders, {}", summary.folders, summary),
    ]
}

pub fn print_crop_event(event: &CropEvent<'_>) {
    for line in format_crop_event(event) {
        println!("{}", line);
    }
}

pub fn print_crop_summary(summary: &CropSummary) {
    for line in format_crop_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Cleanup / restore
// ============================================================================

fn folder_verb(action: BackupAction) -> &'static str {
    match action {
        BackupAction::Remove => "Cleaning",
        BackupAction::Restore => "Restoring",
    }
}

/// Format a single cleanup or restore event.
///
/// `action` is needed for the folder header, which carries no action itself.
pub fn format_backup_event(action: BackupAction, event: &BackupEvent<'_>) -> Vec<String> {
    match event {
        BackupEvent::FolderStarted { folder } => {
            vec![format!("{} folder: {}", folder_verb(action), folder)]
        }
        BackupEvent::Done {
            action: BackupAction::Remove,
            backup,
            ..
        } => vec![format!("{}Removed backup: {}", indent(1), file_label(backup))],
        BackupEvent::Done {
            action: BackupAction::Restore,
            image,
            ..
        } => vec![format!("{}Restored: {}", indent(1), file_label(image))],
        BackupEvent::Failed {
            backup, error, ..
        } => vec![format!(
            "{}Error: {}: {}",
            indent(1),
            file_label(backup),
            error
        )],
        BackupEvent::FolderFinished {
            folder,
            action,
            done,
        } => vec![format!(
            "Completed folder: {} - {} {}",
            folder,
            done,
            action.past_tense()
        )],
    }
}

pub fn format_backup_summary(summary: &BackupSummary) -> Vec<String> {
    vec![
        String::new(),
        format!("Done: {} folders, {}", summary.folders, summary),
    ]
}

pub fn print_backup_event(action: BackupAction, event: &BackupEvent<'_>) {
    for line in format_backup_event(action, event) {
        println!("{}", line);
    }
}

pub fn print_backup_summary(summary: &BackupSummary) {
    for line in format_backup_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Analyze
// ============================================================================

pub fn format_analyze_folder(folder: &str) -> String {
    format!("Analyzing folder: {}", folder)
}

/// Format the analysis totals, one line per skipped image, and the report path.
pub fn format_analysis(report: &Report, report_path: &Path) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Folders: {}, images: {}, skipped: {}",
            report.total_folders, report.total_images, report.skipped_images_count
        ),
    ];
    for info in &report.skipped_images {
        lines.push(format!(
            "{}{}  {}  {} {}  {:.2} KB",
            indent(1),
            folder_relative(&info.path),
            info.dimensions,
            info.format,
            info.mode,
            info.size_kb
        ));
    }
    lines.push(format!("Report: {}", report_path.display()));
    lines
}

pub fn print_analysis(report: &Report, report_path: &Path) {
    for line in format_analysis(report, report_path) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
