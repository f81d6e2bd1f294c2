//! Feed ordering: recency and engagement blended with randomness, stable
//! within a session.
//!
//! - **Weights**: pure functions turning age and engagement into a sort key
//! - **Order**: [`FeedOrder`], the caller-owned cache of the last order
//! - **Ranker**: [`FeedRanker`], which decides whether to reuse, refresh or
//!   recompute

mod order;
mod ranker;
mod weights;

pub use order::{FeedError, FeedOrder, OrderEntry, id_set_key};
pub use ranker::{FeedRanker, RankOutcome, Ranking};
pub use weights::{RankingWeights, age_in_days};
