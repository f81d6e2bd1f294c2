//! Upload image compression, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Data URI** | `base64` (standard alphabet) |
//! | **Decode** | `image::load_from_memory` |
//! | **Resize** | Lanczos3 via `image::imageops` |
//! | **Encode** | `image::codecs::jpeg::JpegEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for box fitting and the quality ladder (unit testable)
//! - **Parameters**: [`Quality`] and [`CompressConfig`]
//! - **Data URI**: parsing, JPEG wrapping and size estimation
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`compress_image`], the quality loop over a backend

pub mod backend;
mod calculations;
pub mod data_uri;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{CompressError, Dimensions, ImageBackend};
pub use calculations::{fit_within, quality_schedule};
pub use data_uri::{DataUri, encode_jpeg_data_uri, estimated_decoded_size};
pub use operations::{CompressOutcome, compress, compress_image};
pub use params::{CompressConfig, DEFAULT_BUDGET_BYTES, Quality};
pub use rust_backend::{RustBackend, is_supported_image, mime_for_path, supported_input_extensions};
