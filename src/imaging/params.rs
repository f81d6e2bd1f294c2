//! Parameter types for image compression.
//!
//! These structs describe *what* to produce, not *how*. The
//! [`operations`](super::operations) module reads them to drive the quality
//! loop; the [`backend`](super::backend) does the pixel work.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG quality percent (1–100, default 80). Clamped on construction.
//! - [`CompressConfig`]: bounding box, starting quality, byte budget and the quality ladder.

/// JPEG encoding quality as a percentage (1-100).
///
/// The app's API speaks fractions (`0.8`); the encoder speaks percent. Steps
/// are taken in whole percent so repeated subtraction never drifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// From a `0.0..=1.0` fraction, rounded to the nearest percent.
    pub fn from_fraction(fraction: f32) -> Self {
        let percent = if fraction.is_finite() {
            (fraction * 100.0).round().max(0.0) as u32
        } else {
            Self::default().0
        };
        Self::new(percent)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn as_fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }

    /// One rung down the ladder, never below 1.
    pub fn step_down(self, step: u32) -> Self {
        Self::new(self.0.saturating_sub(step))
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// 800 KB: the working budget for an image stored inline in a document.
pub const DEFAULT_BUDGET_BYTES: usize = 800 * 1024;

/// Everything one compression call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// Quality of the first attempt.
    pub quality: Quality,
    /// Target size of the decoded JPEG payload.
    pub budget_bytes: usize,
    /// Once an attempt at or below this quality is made, no further attempts.
    pub quality_floor: Quality,
    /// Percent removed per retry.
    pub quality_step: u32,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            max_width: 1200,
            max_height: 1200,
            quality: Quality::default(),
            budget_bytes: DEFAULT_BUDGET_BYTES,
            quality_floor: Quality(30),
            quality_step: 10,
        }
    }
}
