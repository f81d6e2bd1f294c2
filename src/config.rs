//! Configuration module.
//!
//! Handles loading and validating `pawfeed.toml`. Every value has a default
//! that reproduces the app's production behavior, so the file is optional
//! and may be sparse.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [ranking]
//! decay_days = 60.0         # Time weight drops by 1.0 over this many days
//! time_floor = 0.5          # Old posts never weigh less than this
//! comment_weight = 2.0      # One comment counts as this many likes
//! engagement_step = 0.05    # Weight added per engagement point
//! engagement_cap = 1.5      # Popular posts never weigh more than this
//! random_spread = 2.0       # Random multiplier is drawn from [0, spread)
//!
//! [compression]
//! max_width = 1200          # Bounding box for uploads
//! max_height = 1200
//! quality = 0.8             # Starting JPEG quality (0.0-1.0]
//! budget_kb = 800           # Target size of the encoded image
//! quality_floor = 0.3       # Stop stepping down at this quality
//! quality_step = 0.1        # Quality removed per retry
//!
//! [processing]
//! max_threads = 4           # Max parallel workers (omit for auto = CPU cores)
//!
//! [logging]
//! level = "warn"            # error | warn | info | debug | trace | off
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::feed::RankingWeights;
use crate::imaging::{CompressConfig, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `pawfeed.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PawfeedConfig {
    /// Feed ordering weights.
    pub ranking: RankingConfig,
    /// Upload compression settings.
    pub compression: CompressionConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Log verbosity.
    pub logging: LoggingConfig,
}

impl PawfeedConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.ranking;
        if !(r.decay_days > 0.0) {
            return Err(ConfigError::Validation(
                "ranking.decay_days must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&r.time_floor) {
            return Err(ConfigError::Validation(
                "ranking.time_floor must be 0.0-1.0".into(),
            ));
        }
        if r.comment_weight < 0.0 || r.engagement_step < 0.0 {
            return Err(ConfigError::Validation(
                "ranking.comment_weight and ranking.engagement_step must not be negative".into(),
            ));
        }
        if !(r.engagement_cap >= 1.0) {
            return Err(ConfigError::Validation(
                "ranking.engagement_cap must be at least 1.0".into(),
            ));
        }
        if !(r.random_spread > 0.0) {
            return Err(ConfigError::Validation(
                "ranking.random_spread must be positive".into(),
            ));
        }

        let c = &self.compression;
        if c.max_width == 0 || c.max_height == 0 {
            return Err(ConfigError::Validation(
                "compression.max_width and compression.max_height must be non-zero".into(),
            ));
        }
        if !(c.quality > 0.0 && c.quality <= 1.0) {
            return Err(ConfigError::Validation(
                "compression.quality must be in (0.0, 1.0]".into(),
            ));
        }
        if !(c.quality_floor > 0.0 && c.quality_floor <= 1.0) {
            return Err(ConfigError::Validation(
                "compression.quality_floor must be in (0.0, 1.0]".into(),
            ));
        }
        if !(c.quality_step >= 0.01 && c.quality_step <= 1.0) {
            return Err(ConfigError::Validation(
                "compression.quality_step must be 0.01-1.0".into(),
            ));
        }
        if c.budget_kb == 0 {
            return Err(ConfigError::Validation(
                "compression.budget_kb must be non-zero".into(),
            ));
        }

        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be at least 1".into(),
            ));
        }

        self.logging.level_filter()?;
        Ok(())
    }
}

/// Feed ordering weights. See [`RankingWeights`] for meanings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    pub decay_days: f64,
    pub time_floor: f64,
    pub comment_weight: f64,
    pub engagement_step: f64,
    pub engagement_cap: f64,
    pub random_spread: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        let w = RankingWeights::default();
        Self {
            decay_days: w.decay_days,
            time_floor: w.time_floor,
            comment_weight: w.comment_weight,
            engagement_step: w.engagement_step,
            engagement_cap: w.engagement_cap,
            random_spread: w.random_spread,
        }
    }
}

impl RankingConfig {
    pub fn weights(&self) -> RankingWeights {
        RankingWeights {
            decay_days: self.decay_days,
            time_floor: self.time_floor,
            comment_weight: self.comment_weight,
            engagement_step: self.engagement_step,
            engagement_cap: self.engagement_cap,
            random_spread: self.random_spread,
        }
    }
}

/// Upload compression settings. Qualities are fractions, as in the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: f32,
    pub budget_kb: usize,
    pub quality_floor: f32,
    pub quality_step: f32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_width: 1200,
            max_height: 1200,
            quality: 0.8,
            budget_kb: 800,
            quality_floor: 0.3,
            quality_step: 0.1,
        }
    }
}

impl CompressionConfig {
    pub fn to_compress_config(&self) -> CompressConfig {
        CompressConfig {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: Quality::from_fraction(self.quality),
            budget_bytes: self.budget_kb * 1024,
            quality_floor: Quality::from_fraction(self.quality_floor),
            quality_step: Quality::from_fraction(self.quality_step).value(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel compression workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default log level; `RUST_LOG` overrides it.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.level.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "logging.level must be one of off, error, warn, info, debug, trace (got {:?})",
                self.level
            ))
        })
    }
}

/// Load config from `path`.
///
/// A missing file yields the defaults. Unknown keys are rejected and the
/// result is validated.
pub fn load_config(path: &Path) -> Result<PawfeedConfig, ConfigError> {
    if !path.exists() {
        return Ok(PawfeedConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: PawfeedConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `pawfeed.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pawfeed Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Feed ranking
# ---------------------------------------------------------------------------
# Each post gets a weight:
#   time       = max(time_floor, 1 - age_days / decay_days)
#   engagement = min(engagement_cap, 1 + engagement_step * (likes + comment_weight * comments))
#   weight     = time * engagement * random[0, random_spread)
# and the feed is sorted by weight, highest first. The order then stays put
# until a post is added or removed.
[ranking]
decay_days = 60.0
time_floor = 0.5
comment_weight = 2.0
engagement_step = 0.05
engagement_cap = 1.5
random_spread = 2.0

# ---------------------------------------------------------------------------
# Upload compression
# ---------------------------------------------------------------------------
# Images are fitted into max_width x max_height and encoded as JPEG. While
# the result is larger than budget_kb, quality drops by quality_step until
# it reaches quality_floor. The last attempt is kept even if still too big.
[compression]
max_width = 1200
max_height = 1200
quality = 0.8
budget_kb = 800
quality_floor = 0.3
quality_step = 0.1

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel compression workers. Omit to use all CPU cores.
# Values above the core count are clamped down.
# max_threads = 4

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
# One of: off, error, warn, info, debug, trace. RUST_LOG takes precedence.
[logging]
level = "warn"
"##
}
