//! Weighted, session-stable feed ordering.
//!
//! Each ranking pass takes one of three paths, checked in this order:
//!
//! | Path | When | Result |
//! |------|------|--------|
//! | [`RankOutcome::Refreshed`] | the order has a pending refresh | newest first, flag cleared |
//! | [`RankOutcome::Reused`] | incoming ID set equals the cached set | cached order, fresh post data |
//! | [`RankOutcome::Recomputed`] | anything else | weighted random shuffle |
//!
//! The reuse path is the common one: someone liked a post, the post list was
//! re-fetched, and the feed must not reshuffle under the user's thumb.

use super::order::{FeedOrder, OrderEntry};
use super::weights::{RankingWeights, age_in_days};
use crate::types::Post;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::ThreadRng;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Which path a ranking pass took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOutcome {
    Refreshed,
    Reused,
    Recomputed,
}

/// Posts in display order.
#[derive(Debug, Clone)]
pub struct Ranking {
    pub posts: Vec<Post>,
    pub outcome: RankOutcome,
}

pub struct FeedRanker<R = ThreadRng> {
    weights: RankingWeights,
    rng: R,
}

impl FeedRanker<ThreadRng> {
    pub fn new(weights: RankingWeights) -> Self {
        Self::with_rng(weights, rand::thread_rng())
    }
}

impl Default for FeedRanker<ThreadRng> {
    fn default() -> Self {
        Self::new(RankingWeights::default())
    }
}

impl<R: Rng> FeedRanker<R> {
    /// Rank with an explicit randomness source (seeded in tests).
    pub fn with_rng(weights: RankingWeights, rng: R) -> Self {
        Self { weights, rng }
    }

    pub fn weights(&self) -> &RankingWeights {
        &self.weights
    }

    /// Rank `posts` against the wall clock.
    pub fn rank(&mut self, posts: &[Post], order: &mut FeedOrder) -> Ranking {
        self.rank_at(posts, order, Utc::now())
    }

    /// Rank `posts`, updating `order` in place.
    ///
    /// Posts sharing an ID are collapsed to the first occurrence. Missing or
    /// unreadable `createdAt` values count as `now`.
    pub fn rank_at(&mut self, posts: &[Post], order: &mut FeedOrder, now: DateTime<Utc>) -> Ranking {
        let posts = dedup_by_id(posts);
        let now_ms = now.timestamp_millis() as f64;

        if order.take_refresh() {
            let ranked = newest_first(&posts, now_ms);
            order.replace(
                ranked
                    .iter()
                    .map(|p| OrderEntry {
                        id: p.id.clone(),
                        sort_weight: None,
                    })
                    .collect(),
            );
            tracing::debug!(count = ranked.len(), "feed refreshed newest-first");
            return Ranking {
                posts: ranked.into_iter().cloned().collect(),
                outcome: RankOutcome::Refreshed,
            };
        }

        if order.matches(posts.iter().map(|p| p.id.as_str())) {
            let by_id: HashMap<&str, &Post> = posts.iter().map(|p| (p.id.as_str(), *p)).collect();
            let ranked: Vec<Post> = order
                .ids()
                .filter_map(|id| by_id.get(id).map(|p| (*p).clone()))
                .collect();
            tracing::debug!(count = ranked.len(), "feed order reused");
            return Ranking {
                posts: ranked,
                outcome: RankOutcome::Reused,
            };
        }

        let mut weighted: Vec<(&Post, f64)> = posts
            .iter()
            .map(|post| {
                let created_ms = post.created_millis().unwrap_or(now_ms);
                let combined = self.weights.combined_weight(
                    age_in_days(created_ms, now_ms),
                    post.likes,
                    post.comment_count(),
                );
                let unit: f64 = self.rng.r#gen();
                (*post, self.weights.sort_weight(combined, unit))
            })
            .collect();
        weighted.sort_by(|a, b| b.1.total_cmp(&a.1));

        order.replace(
            weighted
                .iter()
                .map(|(p, w)| OrderEntry {
                    id: p.id.clone(),
                    sort_weight: Some(*w),
                })
                .collect(),
        );
        tracing::debug!(
            count = weighted.len(),
            key = %order.id_set_key(),
            "feed order recomputed"
        );
        Ranking {
            posts: weighted.into_iter().map(|(p, _)| p.clone()).collect(),
            outcome: RankOutcome::Recomputed,
        }
    }
}

fn dedup_by_id(posts: &[Post]) -> Vec<&Post> {
    let mut seen = HashSet::new();
    let unique: Vec<&Post> = posts
        .iter()
        .filter(|p| seen.insert(p.id.as_str()))
        .collect();
    if unique.len() != posts.len() {
        tracing::debug!(
            dropped = posts.len() - unique.len(),
            "collapsed posts with duplicate ids"
        );
    }
    unique
}

/// Stable sort, newest first. Equal timestamps keep input order.
fn newest_first<'a>(posts: &[&'a Post], now_ms: f64) -> Vec<&'a Post> {
    let mut sorted = posts.to_vec();
    sorted.sort_by(|a, b| {
        let a_ms = a.created_millis().unwrap_or(now_ms);
        let b_ms = b.created_millis().unwrap_or(now_ms);
        b_ms.partial_cmp(&a_ms).unwrap_or(Ordering::Equal)
    });
    sorted
}
