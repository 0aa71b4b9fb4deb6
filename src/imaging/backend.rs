//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the tool needs:
//! identify (dimensions only), probe (dimensions, format, color mode) and an
//! in-place crop.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below, which can also be told
//! to fail a crop after scribbling over the target file.

use super::calculations::CropRect;
use super::params::CropParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Crop region {region} outside {bounds} image")]
    OutOfBounds { region: CropRect, bounds: Dimensions },
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Result of a probe: what the file is, without decoding pixels.
///
/// `format` and `mode` use the conventional short names found in asset
/// reports: `"JPEG"`, `"PNG"`; `"RGB"`, `"L"`, `"CMYK"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageProbe {
    pub dimensions: Dimensions,
    pub format: String,
    pub mode: String,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Read dimensions, container format and color mode from the header.
    fn probe(&self, path: &Path) -> Result<ImageProbe, BackendError>;

    /// Crop the file at `params.path` to `params.region` and overwrite it,
    /// keeping the original encoding format. Returns the new dimensions.
    fn crop(&self, params: &CropParams) -> Result<Dimensions, BackendError>;
}
