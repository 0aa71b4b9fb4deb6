//! Conditional crop-and-backup.
//!
//! [`crop`] is the only operation in this crate that mutates an asset. For a
//! single image it:
//!
//! 1. reads the dimensions,
//! 2. checks them against the [`CropSpec`] match predicate (skip on mismatch),
//! 3. writes a verified `<name>.backup` copy,
//! 4. removes `remove_from_bottom` rows and overwrites the file in its
//!    original format.
//!
//! The backup step always completes before the original is opened for
//! writing. If it fails the original is untouched and the result is
//! [`CropResult::Failed`] with [`CropError::Backup`].
//!
//! ## Write failures
//!
//! The backend encodes into memory before writing, so most failures leave
//! the original intact. A failed final write can still leave a truncated
//! file behind. With [`CropSpec::restore_on_failure`] set (the default) the
//! original bytes are copied back from the backup; without it the file is
//! left as the write left it and the backup is the only recovery path.
//!
//! ## Idempotence
//!
//! A cropped image no longer satisfies the height predicate, so running the
//! same spec twice crops once and skips the second time.

use crate::backup;
use crate::imaging::{
    BackendError, CropParams, Dimensions, ImageBackend, Quality, bottom_crop_rect,
};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which images to crop and by how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropSpec {
    /// Required width. `None` matches any width.
    pub match_width: Option<u32>,
    /// Required height.
    pub match_height: u32,
    /// Rows removed from the bottom edge of a matching image.
    pub remove_from_bottom: u32,
    /// Re-encode quality for lossy formats.
    pub quality: Quality,
    /// Copy the backup back over the original when the write fails.
    pub restore_on_failure: bool,
}

impl CropSpec {
    /// Height-only spec with default quality and auto-restore enabled.
    pub fn new(match_height: u32, remove_from_bottom: u32) -> Self {
        Self {
            match_width: None,
            match_height,
            remove_from_bottom,
            quality: Quality::default(),
            restore_on_failure: true,
        }
    }

    /// Also require an exact width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.match_width = Some(width);
        self
    }

    /// The dimension match predicate.
    pub fn matches(&self, dims: Dimensions) -> bool {
        self.match_width.is_none_or(|w| w == dims.width) && dims.height == self.match_height
    }

    /// Human-readable form of the predicate: `768x576` or `*x768`.
    pub fn target_label(&self) -> String {
        match self.match_width {
            Some(w) => format!("{}x{}", w, self.match_height),
            None => format!("*x{}", self.match_height),
        }
    }
}

/// Why an image was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DimensionMismatch,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DimensionMismatch => write!(f, "dimension mismatch"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CropError {
    #[error("cannot read image: {0}")]
    Decode(#[source] BackendError),
    #[error("cannot remove {remove} rows from an image {height}px high")]
    InvalidGeometry { remove: u32, height: u32 },
    #[error("backup failed, original untouched: {0}")]
    Backup(#[source] io::Error),
    #[error("cannot write cropped image: {0}")]
    Encode(#[source] BackendError),
    #[error("cannot write cropped image ({encode}); restore from backup also failed: {restore}")]
    RestoreFailed {
        encode: BackendError,
        restore: io::Error,
    },
}

/// Outcome of one [`crop`] call.
#[derive(Debug)]
pub enum CropResult {
    Cropped {
        old_dims: Dimensions,
        new_dims: Dimensions,
        backup_path: PathBuf,
    },
    Skipped {
        reason: SkipReason,
        actual_dims: Dimensions,
    },
    Failed {
        error: CropError,
    },
}

impl CropResult {
    fn failed(error: CropError) -> Self {
        CropResult::Failed { error }
    }

    pub fn is_cropped(&self) -> bool {
        matches!(self, CropResult::Cropped { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CropResult::Skipped { .. })
    }
}

/// Crop the bottom of `path` in place if its dimensions match `spec`.
///
/// See the [module docs](self) for the ordering guarantees.
pub fn crop(backend: &impl ImageBackend, path: &Path, spec: &CropSpec) -> CropResult {
    let dims = match backend.identify(path) {
        Ok(dims) => dims,
        Err(e) => return CropResult::failed(CropError::Decode(e)),
    };

    if !spec.matches(dims) {
        tracing::debug!(path = %path.display(), %dims, "dimension mismatch, skipping");
        return CropResult::Skipped {
            reason: SkipReason::DimensionMismatch,
            actual_dims: dims,
        };
    }

    let Some(region) = bottom_crop_rect(dims, spec.remove_from_bottom) else {
        return CropResult::failed(CropError::InvalidGeometry {
            remove: spec.remove_from_bottom,
            height: dims.height,
        });
    };

    let backup_path = match backup::create_backup(path) {
        Ok(p) => p,
        Err(e) => return CropResult::failed(CropError::Backup(e)),
    };

    let params = CropParams {
        path: path.to_path_buf(),
        region,
        quality: spec.quality,
    };
    match backend.crop(&params) {
        Ok(new_dims) => {
            tracing::info!(path = %path.display(), from = %dims, to = %new_dims, "cropped");
            CropResult::Cropped {
                old_dims: dims,
                new_dims,
                backup_path,
            }
        }
        // Checked before any byte is written; the original is intact.
        Err(BackendError::OutOfBounds { bounds, .. }) => {
            CropResult::failed(CropError::InvalidGeometry {
                remove: spec.remove_from_bottom,
                height: bounds.height,
            })
        }
        Err(encode) => CropResult::failed(recover(path, encode, spec.restore_on_failure)),
    }
}

/// Decide the error for a failed write, restoring the original if asked.
fn recover(path: &Path, encode: BackendError, restore: bool) -> CropError {
    if !restore {
        tracing::warn!(
            path = %path.display(),
            error = %encode,
            "write failed; original may be damaged, backup kept"
        );
        return CropError::Encode(encode);
    }
    match backup::restore_backup(path) {
        Ok(_) => CropError::Encode(encode),
        Err(restore) => {
            tracing::error!(path = %path.display(), error = %restore, "restore from backup failed");
            CropError::RestoreFailed { encode, restore }
        }
    }
}
