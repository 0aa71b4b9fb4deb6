//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format detection | `ImageReader::with_guessed_format` (magic bytes, then extension) |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Probe | `ImageDecoder::dimensions` + `original_color_type` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//! | Encode → other | `DynamicImage::write_to` in the source format |
//!
//! The cropped image is encoded into memory first and only then written over
//! the source, so a decode or encode failure never touches the file on disk.

use super::backend::{BackendError, Dimensions, ImageBackend, ImageProbe};
use super::calculations::rect_fits;
use super::params::{CropParams, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, Cursor, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a reader with the format sniffed from the file contents.
fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    Ok(reader)
}

/// Load and decode an image from disk, returning it with its source format.
fn load_image(path: &Path) -> Result<(DynamicImage, ImageFormat), BackendError> {
    let reader = open_reader(path)?;
    let format = reader.format().ok_or_else(|| {
        BackendError::Decode(format!("Unrecognized image format: {}", path.display()))
    })?;
    let img = reader
        .decode()
        .map_err(|e| BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e)))?;
    Ok((img, format))
}

/// Encode `img` in `format`. JPEG honors `quality`; the other encoders the
/// `image` crate ships are lossless or fixed-quality.
fn encode_image(
    img: &DynamicImage,
    format: ImageFormat,
    quality: Quality,
) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let img = if img.color().has_alpha() {
                DynamicImage::ImageRgb8(img.to_rgb8())
            } else {
                img.clone()
            };
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            img.write_with_encoder(encoder)
                .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))?;
        }
        other => {
            img.write_to(&mut Cursor::new(&mut buf), other)
                .map_err(|e| BackendError::Encode(format!("{:?} encode failed: {}", other, e)))?;
        }
    }
    Ok(buf)
}

/// Replace the contents of `path` with `bytes` and flush them to disk.
fn overwrite(path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

/// Short uppercase container name, as asset reports print it.
pub fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        other => format!("{:?}", other).to_uppercase(),
    }
}

/// Conventional color-mode name for a decoder's native color type.
pub fn mode_name(color: ExtendedColorType) -> String {
    match color {
        ExtendedColorType::L1 => "1".to_string(),
        ExtendedColorType::L8 => "L".to_string(),
        ExtendedColorType::La8 => "LA".to_string(),
        ExtendedColorType::L16 => "I;16".to_string(),
        ExtendedColorType::Rgb8 | ExtendedColorType::Rgb16 => "RGB".to_string(),
        ExtendedColorType::Rgba8 | ExtendedColorType::Rgba16 => "RGBA".to_string(),
        ExtendedColorType::Cmyk8 => "CMYK".to_string(),
        other => format!("{:?}", other),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("Failed to read dimensions: {}", e)))?;
        Ok(Dimensions { width, height })
    }

    fn probe(&self, path: &Path) -> Result<ImageProbe, BackendError> {
        let reader = open_reader(path)?;
        let format = reader.format().ok_or_else(|| {
            BackendError::Decode(format!("Unrecognized image format: {}", path.display()))
        })?;
        let decoder = reader
            .into_decoder()
            .map_err(|e| BackendError::Decode(format!("Failed to read header: {}", e)))?;
        Ok(ImageProbe {
            dimensions: decoder.dimensions().into(),
            format: format_name(format),
            mode: mode_name(decoder.original_color_type()),
        })
    }

    fn crop(&self, params: &CropParams) -> Result<Dimensions, BackendError> {
        let (img, format) = load_image(&params.path)?;
        let bounds = Dimensions {
            width: img.width(),
            height: img.height(),
        };
        if !rect_fits(params.region, bounds) {
            return Err(BackendError::OutOfBounds {
                region: params.region,
                bounds,
            });
        }

        let region = params.region;
        let cropped = img.crop_imm(region.x, region.y, region.width, region.height);
        let bytes = encode_image(&cropped, format, params.quality)?;
        overwrite(&params.path, &bytes)?;

        Ok(Dimensions {
            width: cropped.width(),
            height: cropped.height(),
        })
    }
}
