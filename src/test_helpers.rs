//! Shared test utilities for the asset-crop test suite.
//!
//! Provides synthetic image writers and an asset-tree builder so tests can
//! work against real files in a temp directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_tree(&[
//!     ("rural_kenya", &[("house.jpg", 1024, 768)]),
//!     ("mogul_avatars", &[("face.jpg", 256, 256)]),
//! ]);
//! let path = tmp.path().join("rural_kenya/house.jpg");
//! ```

use image::{ImageEncoder, RgbImage};
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = gradient(width, height);
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Create a small valid PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

// =========================================================================
// Asset tree setup
// =========================================================================

/// A folder name and the `(filename, width, height)` JPEGs it holds.
pub type FolderSpec<'a> = (&'a str, &'a [(&'a str, u32, u32)]);

/// Build an asset root in a temp directory: one subfolder per entry,
/// each holding synthetic JPEGs of the given sizes.
pub fn setup_tree(folders: &[FolderSpec<'_>]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (folder, images) in folders {
        let dir = tmp.path().join(folder);
        std::fs::create_dir_all(&dir).unwrap();
        for (name, width, height) in images.iter() {
            create_test_jpeg(&dir.join(name), *width, *height);
        }
    }
    tmp
}

/// File names in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
