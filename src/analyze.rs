//! Skipped-image analysis.
//!
//! After a crop run, some images are still at sizes the crop predicate did
//! not match. This module probes every image in the tree and writes a JSON
//! report listing those, so they can be reviewed by hand.
//!
//! ## Report format
//!
//! ```json
//! {
//!   "timestamp": "20250314_091502",
//!   "total_folders": 12,
//!   "total_images": 240,
//!   "skipped_images_count": 1,
//!   "skipped_images": [
//!     {
//!       "path": "assets/images/rural_kenya/house_1.jpg",
//!       "dimensions": "1024x700",
//!       "width": 1024,
//!       "height": 700,
//!       "format": "JPEG",
//!       "mode": "RGB",
//!       "size_bytes": 81234,
//!       "size_kb": 79.33,
//!       "was_skipped": true
//!     }
//!   ]
//! }
//! ```
//!
//! `was_skipped` is the negation of the crop predicate for the configured
//! spec. Images that fail to probe count towards `total_images` but never
//! appear in `skipped_images`.

use crate::config::ToolConfig;
use crate::crop::CropSpec;
use crate::imaging::ImageBackend;
use crate::scan::{ScanError, folder_name, list_images, scan_folders};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Properties of one successfully probed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub path: String,
    pub dimensions: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub mode: String,
    pub size_bytes: u64,
    pub size_kb: f64,
    pub was_skipped: bool,
}

/// Per-image analysis outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImageReport {
    Analyzed(ImageInfo),
    Error { path: String, error: String },
}

impl ImageReport {
    pub fn was_skipped(&self) -> bool {
        matches!(self, ImageReport::Analyzed(info) if info.was_skipped)
    }
}

/// The whole-tree report written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub timestamp: String,
    pub total_folders: usize,
    pub total_images: usize,
    pub skipped_images_count: usize,
    pub skipped_images: Vec<ImageInfo>,
}

/// Kilobytes rounded to two decimals.
fn kilobytes(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

/// Local time as `YYYYMMDD_HHMMSS`.
pub fn report_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Probe one image and decide whether the crop predicate would skip it.
pub fn analyze_image(backend: &impl ImageBackend, path: &Path, spec: &CropSpec) -> ImageReport {
    let path_str = path.display().to_string();
    let probe = backend.probe(path).map_err(|e| e.to_string());
    let size = std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| e.to_string());

    match (probe, size) {
        (Ok(probe), Ok(size_bytes)) => {
            let dims = probe.dimensions;
            ImageReport::Analyzed(ImageInfo {
                path: path_str,
                dimensions: dims.to_string(),
                width: dims.width,
                height: dims.height,
                format: probe.format,
                mode: probe.mode,
                size_bytes,
                size_kb: kilobytes(size_bytes),
                was_skipped: !spec.matches(dims),
            })
        }
        (Err(error), _) | (_, Err(error)) => ImageReport::Error {
            path: path_str,
            error,
        },
    }
}

/// Analyze every image under the configured root.
///
/// `on_folder` is called with each folder name before it is analyzed.
pub fn analyze_tree(
    backend: &impl ImageBackend,
    config: &ToolConfig,
    mut on_folder: impl FnMut(&str),
) -> Result<Report, AnalyzeError> {
    let spec = config.crop.to_spec();
    let folders = scan_folders(&config.root, &config.exclude_folders)?;

    let mut total_images = 0;
    let mut skipped_images = Vec::new();
    for folder in &folders {
        on_folder(&folder_name(folder));
        for path in list_images(folder, &config.extensions)? {
            total_images += 1;
            match analyze_image(backend, &path, &spec) {
                ImageReport::Analyzed(info) if info.was_skipped => skipped_images.push(info),
                ImageReport::Analyzed(_) => {}
                ImageReport::Error { path, error } => {
                    tracing::warn!(%path, %error, "could not analyze image");
                }
            }
        }
    }

    Ok(Report {
        timestamp: report_timestamp(),
        total_folders: folders.len(),
        total_images,
        skipped_images_count: skipped_images.len(),
        skipped_images,
    })
}

/// Write `report` as pretty JSON into `dir`, creating it if needed.
///
/// Returns the path of the written file.
pub fn write_report(report: &Report, dir: &Path) -> Result<PathBuf, AnalyzeError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("skipped_images_report_{}.json", report.timestamp));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
