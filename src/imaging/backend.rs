//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four primitives compression is
//! built from: decode, measure, render (resample into a new surface) and
//! encode to JPEG. The quality loop in [`operations`](super::operations)
//! only talks to this trait.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a mock that records operations and returns scripted
//! encode sizes.

use super::params::Quality;
use thiserror::Error;

/// Why a compression failed. Neither kind is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressError {
    /// The input is not a loadable image (bad data URI, bad base64, or
    /// bytes no decoder accepts).
    #[error("Failed to decode image: {0}")]
    Decode(String),
    /// Resampling or JPEG encoding failed.
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Decoded, in-memory image.
    type Surface;

    /// Decode encoded image bytes. Format is sniffed from the content.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Surface, CompressError>;

    fn dimensions(&self, surface: &Self::Surface) -> Dimensions;

    /// Resample `surface` to exactly `size` with high-quality filtering.
    fn render(&self, surface: &Self::Surface, size: Dimensions)
    -> Result<Self::Surface, CompressError>;

    /// Encode as baseline JPEG at `quality`.
    fn encode_jpeg(&self, surface: &Self::Surface, quality: Quality)
    -> Result<Vec<u8>, CompressError>;
}
