//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! the [`crop`](crate::crop) module (which decides whether an image gets
//! touched) and the [`backend`](super::backend) (which does the pixel work),
//! so the cropper can be exercised against a mock backend.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1-100, default 95). Clamped on construction.
//! - [`CropParams`]: in-place crop: target file, kept region, re-encode quality.

use super::calculations::CropRect;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Parameters for an in-place crop.
///
/// The file at `path` is decoded, reduced to `region`, re-encoded in the
/// format it was read as, and written back to the same path.
#[derive(Debug, Clone, PartialEq)]
pub struct CropParams {
    pub path: PathBuf,
    pub region: CropRect,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_95() {
        assert_eq!(Quality::default().value(), 95);
    }
}
