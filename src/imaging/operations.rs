//! High-level compression.
//!
//! [`compress_image`] combines the calculations with backend execution:
//!
//! ```text
//! data URI ─► bytes ─► decode ─► fit_within ─► render ─┬─► encode @ q0 ─► fits? ─► done
//!                                                     ├─► encode @ q1 ─► fits? ─► done
//!                                                     └─► …  last rung: return as-is
//! ```
//!
//! The source is decoded and resampled once. Every quality attempt
//! re-encodes that same surface, so retries never stack resampling or
//! JPEG artifacts on top of each other.

use super::backend::{CompressError, Dimensions, ImageBackend};
use super::calculations::{fit_within, quality_schedule};
use super::data_uri::{DataUri, encode_jpeg_data_uri, estimated_decoded_size};
use super::params::{CompressConfig, Quality};
use super::rust_backend::RustBackend;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, CompressError>;

/// What a compression produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressOutcome {
    /// `data:image/jpeg;base64,…`
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
    /// Quality of the returned attempt.
    pub quality: Quality,
    /// Approximate decoded size of `data_uri`.
    pub estimated_bytes: usize,
    /// Number of encodes performed.
    pub attempts: u32,
    /// False when even the last rung of the quality ladder was too big.
    pub within_budget: bool,
}

/// Compress a base64 image into a JPEG data URI that fits `config`.
///
/// Fails only when the input can't be decoded or an encode step fails.
/// Running out of quality ladder while still over budget is *not* a
/// failure: the last attempt is returned with `within_budget == false`.
pub fn compress_image<B: ImageBackend>(
    backend: &B,
    input: &str,
    config: &CompressConfig,
) -> Result<CompressOutcome> {
    let bytes = DataUri::parse(input)?.decode()?;
    let source = backend.decode(&bytes)?;

    let original = backend.dimensions(&source);
    let target = Dimensions::from(fit_within(
        (original.width, original.height),
        (config.max_width, config.max_height),
    ));
    let surface = backend.render(&source, target)?;
    drop(source);

    let ladder = quality_schedule(config.quality, config.quality_floor, config.quality_step);
    let mut attempts = 0;
    let mut last = None;

    for quality in ladder {
        let jpeg = backend.encode_jpeg(&surface, quality)?;
        attempts += 1;
        let data_uri = encode_jpeg_data_uri(&jpeg);
        let estimated_bytes = estimated_decoded_size(&data_uri);
        tracing::debug!(
            quality = quality.value(),
            estimated_bytes,
            budget = config.budget_bytes,
            "jpeg attempt"
        );

        let within_budget = estimated_bytes <= config.budget_bytes;
        let outcome = CompressOutcome {
            data_uri,
            width: target.width,
            height: target.height,
            quality,
            estimated_bytes,
            attempts,
            within_budget,
        };
        if within_budget {
            return Ok(outcome);
        }
        last = Some(outcome);
    }

    // The ladder always has at least one rung.
    let outcome = last.ok_or_else(|| CompressError::Encode("no quality attempts made".into()))?;
    tracing::warn!(
        quality = outcome.quality.value(),
        estimated_bytes = outcome.estimated_bytes,
        budget = config.budget_bytes,
        "image still over budget at lowest quality; returning best effort"
    );
    Ok(outcome)
}

/// Compress with the default backend and the app's call shape.
///
/// `quality` is a fraction in `(0, 1]`. Returns the JPEG data URI.
pub fn compress(input: &str, max_width: u32, max_height: u32, quality: f32) -> Result<String> {
    let config = CompressConfig {
        max_width,
        max_height,
        quality: Quality::from_fraction(quality),
        ..CompressConfig::default()
    };
    compress_image(&RustBackend::new(), input, &config).map(|outcome| outcome.data_uri)
}
