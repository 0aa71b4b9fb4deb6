//! Image processing in pure Rust, on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Probe** | header-only decoder: format + color mode |
//! | **Crop** | `crop_imm` + re-encode in the source format (JPEG at quality 95) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, ImageProbe};
pub use calculations::{CropRect, bottom_crop_rect, rect_fits};
pub use params::{CropParams, Quality};
pub use rust_backend::RustBackend;
