//! Pure calculation functions for crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;

/// A pixel region, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for CropRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

impl CropRect {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

/// Region that keeps everything except the bottom `remove` rows.
///
/// Returns `None` when nothing would be left (`remove >= height`).
///
/// # Examples
/// ```
/// # use asset_crop::imaging::{Dimensions, bottom_crop_rect};
/// let rect = bottom_crop_rect(Dimensions { width: 768, height: 576 }, 33).unwrap();
/// assert_eq!((rect.x, rect.y, rect.width, rect.height), (0, 0, 768, 543));
///
/// assert!(bottom_crop_rect(Dimensions { width: 10, height: 10 }, 10).is_none());
/// ```
pub fn bottom_crop_rect(source: Dimensions, remove: u32) -> Option<CropRect> {
    if remove >= source.height {
        return None;
    }
    Some(CropRect {
        x: 0,
        y: 0,
        width: source.width,
        height: source.height - remove,
    })
}

/// Whether `region` lies entirely inside an image of size `bounds`.
pub fn rect_fits(region: CropRect, bounds: Dimensions) -> bool {
    region.width > 0
        && region.height > 0
        && region
            .x
            .checked_add(region.width)
            .is_some_and(|right| right <= bounds.width)
        && region
            .y
            .checked_add(region.height)
            .is_some_and(|bottom| bottom <= bounds.height)
}
