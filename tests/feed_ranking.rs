//! End-to-end feed ordering through the public API.
//!
//! Covers the session behaviors a user can observe: the feed doesn't move
//! while engagement changes, it reshuffles when the post set changes, and a
//! refresh after publishing shows the newest post first.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pawfeed::feed::{FeedOrder, FeedRanker, RankOutcome, RankingWeights};
use pawfeed::types::{CreatedAt, Post};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn post(id: &str, days_ago: i64) -> Post {
    let mut post = Post::new(id);
    post.created_at = Some(CreatedAt::from_datetime(now() - Duration::days(days_ago)));
    post
}

fn ids(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.id.as_str()).collect()
}

fn ranker(seed: u64) -> FeedRanker<StdRng> {
    FeedRanker::with_rng(RankingWeights::default(), StdRng::seed_from_u64(seed))
}

fn sample_feed() -> Vec<Post> {
    (0..12).map(|i| post(&format!("p{i}"), i)).collect()
}

#[test]
fn engagement_changes_keep_the_order() {
    let mut posts = sample_feed();
    let mut order = FeedOrder::empty();

    let first = ranker(1).rank_at(&posts, &mut order, now());
    assert_eq!(first.outcome, RankOutcome::Recomputed);

    posts[3].likes = 500;
    posts[7].comments = serde_json::from_str(r#"[{"text":"good dog"},{}]"#).unwrap();

    // A different seed proves nothing was re-drawn.
    let second = ranker(99).rank_at(&posts, &mut order, now());
    assert_eq!(second.outcome, RankOutcome::Reused);
    assert_eq!(ids(&second.posts), ids(&first.posts));

    let liked = second.posts.iter().find(|p| p.id == "p3").unwrap();
    assert_eq!(liked.likes, 500);
    let commented = second.posts.iter().find(|p| p.id == "p7").unwrap();
    assert_eq!(commented.comment_count(), 2);
}

#[test]
fn input_order_does_not_matter_for_reuse() {
    let posts = sample_feed();
    let mut order = FeedOrder::empty();
    let first = ranker(2).rank_at(&posts, &mut order, now());

    let mut shuffled = posts.clone();
    shuffled.reverse();
    let second = ranker(3).rank_at(&shuffled, &mut order, now());

    assert_eq!(second.outcome, RankOutcome::Reused);
    assert_eq!(ids(&second.posts), ids(&first.posts));
}

#[test]
fn new_post_triggers_recompute() {
    let mut posts = sample_feed();
    let mut order = FeedOrder::empty();
    ranker(4).rank_at(&posts, &mut order, now());

    posts.push(post("fresh", 0));
    let ranking = ranker(5).rank_at(&posts, &mut order, now());

    assert_eq!(ranking.outcome, RankOutcome::Recomputed);
    assert_eq!(ranking.posts.len(), 13);
    assert!(order.matches(posts.iter().map(|p| p.id.as_str())));
}

#[test]
fn deleted_post_triggers_recompute() {
    let mut posts = sample_feed();
    let mut order = FeedOrder::empty();
    ranker(6).rank_at(&posts, &mut order, now());

    posts.remove(0);
    let ranking = ranker(7).rank_at(&posts, &mut order, now());

    assert_eq!(ranking.outcome, RankOutcome::Recomputed);
    assert!(!ids(&ranking.posts).contains(&"p0"));
}

#[test]
fn refresh_after_publishing_is_newest_first_once() {
    let posts = vec![post("three", 3), post("one", 1), post("two", 2)];
    let mut order = FeedOrder::empty();
    order.request_refresh();

    let refreshed = ranker(8).rank_at(&posts, &mut order, now());
    assert_eq!(refreshed.outcome, RankOutcome::Refreshed);
    assert_eq!(ids(&refreshed.posts), vec!["one", "two", "three"]);

    // The flag is consumed, and the refreshed order is cached for the session.
    let next = ranker(9).rank_at(&posts, &mut order, now());
    assert_eq!(next.outcome, RankOutcome::Reused);
    assert_eq!(ids(&next.posts), vec!["one", "two", "three"]);
}

#[test]
fn every_post_appears_exactly_once() {
    let mut posts = sample_feed();
    posts.push(post("p5", 40));
    let mut order = FeedOrder::empty();

    let ranking = ranker(10).rank_at(&posts, &mut order, now());

    let mut seen = ids(&ranking.posts);
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 12);
    assert_eq!(ranking.posts.len(), 12);
}

#[test]
fn sort_weights_stay_within_bounds() {
    let weights = RankingWeights::default();
    let mut posts: Vec<Post> = (0..200).map(|i| post(&format!("p{i}"), i % 120)).collect();
    for (i, p) in posts.iter_mut().enumerate() {
        p.likes = (i % 37) as u64;
    }
    let mut order = FeedOrder::empty();
    ranker(11).rank_at(&posts, &mut order, now());

    let max = weights.engagement_cap * weights.random_spread;
    let mut previous = f64::INFINITY;
    for id in order.ids() {
        let w = order.weight_of(id).unwrap();
        assert!((0.0..max).contains(&w), "{id}: {w}");
        assert!(w <= previous, "weights must be descending");
        previous = w;
    }
}

#[test]
fn session_order_survives_a_round_trip_through_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    let posts = sample_feed();

    let mut order = FeedOrder::empty();
    let first = ranker(12).rank_at(&posts, &mut order, now());
    order.save(&path).unwrap();

    let mut restored = FeedOrder::load(&path);
    let second = ranker(13).rank_at(&posts, &mut restored, now());

    assert_eq!(second.outcome, RankOutcome::Reused);
    assert_eq!(ids(&second.posts), ids(&first.posts));
}

#[test]
fn posts_read_from_json_rank_with_mixed_timestamps() {
    let json = r#"[
        {"id": "server", "createdAt": {"seconds": 1717156800, "nanoseconds": 0}, "likes": 3},
        {"id": "millis", "createdAt": 1717070400000},
        {"id": "text", "createdAt": "2024-05-29T12:00:00Z", "comments": [{"text": "woof"}]},
        {"id": "undated", "ownerName": "Biscuit"}
    ]"#;
    let posts: Vec<Post> = serde_json::from_str(json).unwrap();
    let mut order = FeedOrder::empty();
    order.request_refresh();

    let ranking = ranker(14).rank_at(&posts, &mut order, now());

    // Undated posts count as "now", so they lead a newest-first feed.
    assert_eq!(ids(&ranking.posts), vec!["undated", "server", "millis", "text"]);
    let undated = &ranking.posts[0];
    assert_eq!(undated.extra["ownerName"], "Biscuit");
}
