//! Pure weight calculations for feed ordering.
//!
//! All functions here are pure and testable without posts, clocks or RNGs.
//!
//! ```text
//! time_weight       = max(floor, 1 - age_days / decay_days)     0.5 ..= 1.0
//! engagement_score  = likes + comment_weight * comments
//! engagement_weight = min(cap, 1 + step * engagement_score)     1.0 ..= 1.5
//! combined_weight   = time_weight * engagement_weight
//! sort_weight       = combined_weight * U[0, random_spread)
//! ```

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Tuning constants for the weighted shuffle. Defaults reproduce the app's
/// production behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingWeights {
    /// Slope of the time decay: the weight drops by 1.0 over this many days.
    /// With the default floor of 0.5 the floor is hit at half this age.
    pub decay_days: f64,
    /// Lowest time weight an old post can get.
    pub time_floor: f64,
    /// A comment counts this many times a like.
    pub comment_weight: f64,
    /// Weight added per engagement point.
    pub engagement_step: f64,
    /// Highest engagement weight a popular post can get.
    pub engagement_cap: f64,
    /// Upper bound (exclusive) of the random multiplier.
    pub random_spread: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            decay_days: 60.0,
            time_floor: 0.5,
            comment_weight: 2.0,
            engagement_step: 0.05,
            engagement_cap: 1.5,
            random_spread: 2.0,
        }
    }
}

/// Age in fractional days. Timestamps in the future count as age 0.
pub fn age_in_days(created_ms: f64, now_ms: f64) -> f64 {
    ((now_ms - created_ms) / MILLIS_PER_DAY).max(0.0)
}

impl RankingWeights {
    pub fn time_weight(&self, age_days: f64) -> f64 {
        (1.0 - age_days / self.decay_days).max(self.time_floor)
    }

    pub fn engagement_score(&self, likes: u64, comments: usize) -> f64 {
        likes as f64 + self.comment_weight * comments as f64
    }

    pub fn engagement_weight(&self, engagement_score: f64) -> f64 {
        (1.0 + self.engagement_step * engagement_score).min(self.engagement_cap)
    }

    /// Deterministic part of a post's weight, before the random factor.
    pub fn combined_weight(&self, age_days: f64, likes: u64, comments: usize) -> f64 {
        self.time_weight(age_days)
            * self.engagement_weight(self.engagement_score(likes, comments))
    }

    /// Final sort key. `unit_random` is a uniform sample in `[0, 1)`.
    pub fn sort_weight(&self, combined_weight: f64, unit_random: f64) -> f64 {
        combined_weight * unit_random * self.random_spread
    }
}
