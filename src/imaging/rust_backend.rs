//! Pure Rust image backend, built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` (format sniffed from bytes) |
//! | Render | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! JPEG has no alpha channel. Surfaces with alpha are composited onto black
//! before encoding, the way a canvas JPEG export draws them, so a fully
//! transparent pixel comes out black whatever color it stores.

use super::backend::{CompressError, Dimensions, ImageBackend};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::path::Path;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// Returns the image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> Vec<&'static str> {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
}

/// Whether `path` has an extension we can decode.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            PHOTO_CANDIDATES
                .iter()
                .any(|(candidate, fmt)| ext.eq_ignore_ascii_case(candidate) && fmt.reading_enabled())
        })
}

/// Media type for a file extension, used when wrapping files as data URIs.
pub fn mime_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(|ext| {
            PHOTO_CANDIDATES
                .iter()
                .find(|(candidate, _)| ext.eq_ignore_ascii_case(candidate))
        })
        .map(|(_, fmt)| fmt.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Pure Rust backend using the `image` crate ecosystem.
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

impl ImageBackend for RustBackend {
    type Surface = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CompressError> {
        image::load_from_memory(bytes).map_err(|e| CompressError::Decode(e.to_string()))
    }

    fn dimensions(&self, surface: &DynamicImage) -> Dimensions {
        Dimensions {
            width: surface.width(),
            height: surface.height(),
        }
    }

    fn render(&self, surface: &DynamicImage, size: Dimensions) -> Result<DynamicImage, CompressError> {
        if size.width == 0 || size.height == 0 {
            return Err(CompressError::Encode(format!(
                "cannot render to {}x{}",
                size.width, size.height
            )));
        }
        if self.dimensions(surface) == size {
            return Ok(surface.clone());
        }
        Ok(surface.resize_exact(size.width, size.height, FilterType::Lanczos3))
    }

    fn encode_jpeg(&self, surface: &DynamicImage, quality: Quality) -> Result<Vec<u8>, CompressError> {
        let rgb = flatten_onto_black(surface);
        let mut buf = Vec::new();
        let quality = quality.value().clamp(1, 100) as u8;
        JpegEncoder::new_with_quality(&mut buf, quality)
            .encode_image(&rgb)
            .map_err(|e| CompressError::Encode(format!("JPEG encode failed: {e}")))?;
        Ok(buf)
    }
}

/// Drop alpha by compositing onto black.
fn flatten_onto_black(surface: &DynamicImage) -> RgbImage {
    if !surface.color().has_alpha() {
        return surface.to_rgb8();
    }
    let rgba = surface.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let over_black = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
        Rgb([over_black(r), over_black(g), over_black(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient_image;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(gradient_image(width, height))
    }

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "tif", "tiff", "webp"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn supported_image_by_extension() {
        assert!(is_supported_image(Path::new("cat.JPG")));
        assert!(is_supported_image(Path::new("dog.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no-extension")));
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for_path(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("a.bin")), "application/octet-stream");
    }

    #[test]
    fn encode_then_decode_jpeg() {
        let backend = RustBackend::new();
        let bytes = backend
            .encode_jpeg(&gradient(200, 150), Quality::new(85))
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG SOI marker");

        let decoded = backend.decode(&bytes).unwrap();
        assert_eq!(backend.dimensions(&decoded), Dimensions::from((200, 150)));
    }

    #[test]
    fn lower_quality_is_smaller() {
        let backend = RustBackend::new();
        let img = gradient(256, 256);
        let high = backend.encode_jpeg(&img, Quality::new(95)).unwrap();
        let low = backend.encode_jpeg(&img, Quality::new(30)).unwrap();
        assert!(low.len() < high.len(), "{} !< {}", low.len(), high.len());
    }

    #[test]
    fn transparent_pixels_encode_as_black() {
        let backend = RustBackend::new();
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            16,
            16,
            image::Rgba([220, 180, 140, 0]),
        ));
        let bytes = backend.encode_jpeg(&rgba, Quality::new(95)).unwrap();

        let decoded = backend.decode(&bytes).unwrap().to_rgb8();
        let [r, g, b] = decoded.get_pixel(8, 8).0;
        assert!(r < 8 && g < 8 && b < 8, "expected black, got {r},{g},{b}");
    }

    #[test]
    fn half_transparent_pixels_are_darkened() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            2,
            2,
            image::Rgba([200, 100, 0, 128]),
        ));
        assert_eq!(flatten_onto_black(&rgba).get_pixel(0, 0).0, [100, 50, 0]);
    }

    #[test]
    fn opaque_surfaces_are_unchanged() {
        let img = gradient(8, 8);
        assert_eq!(flatten_onto_black(&img), img.to_rgb8());
    }

    #[test]
    fn render_resizes_exactly() {
        let backend = RustBackend::new();
        let resized = backend
            .render(&gradient(400, 300), Dimensions::from((200, 150)))
            .unwrap();
        assert_eq!(backend.dimensions(&resized), Dimensions::from((200, 150)));
    }

    #[test]
    fn render_to_zero_is_an_error() {
        let backend = RustBackend::new();
        let err = backend
            .render(&gradient(10, 10), Dimensions::from((0, 10)))
            .unwrap_err();
        assert!(matches!(err, CompressError::Encode(_)));
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let backend = RustBackend::new();
        let err = backend.decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CompressError::Decode(_)));
    }
}
