//! The cached display order of one feed session.
//!
//! A [`FeedOrder`] remembers the order computed for a given *set* of post
//! IDs. While the set stays the same, the ranker hands back this order so
//! that a like or a new comment never makes the visible list jump. The
//! caller owns it: create one when the feed opens, drop it when it closes.
//!
//! ## Refresh
//!
//! [`FeedOrder::request_refresh`] arms a one-shot flag. The next ranking
//! pass sorts newest-first and disarms it, which is what the app wants
//! right after the user publishes a post.
//!
//! ## Storage
//!
//! The CLI keeps the order between runs as a small JSON file. Loading is
//! forgiving: a missing, unreadable, or wrong-version file yields an empty
//! order, which simply means the next pass recomputes.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

/// Version of the persisted order format. Bump to discard old session files.
const ORDER_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One position in a cached order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntry {
    pub id: String,
    /// Weight the post was sorted by. `None` for newest-first orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedOrder {
    pub version: u32,
    pub entries: Vec<OrderEntry>,
    #[serde(default)]
    pub refresh_pending: bool,
}

impl Default for FeedOrder {
    fn default() -> Self {
        Self::empty()
    }
}

impl FeedOrder {
    pub fn empty() -> Self {
        Self {
            version: ORDER_VERSION,
            entries: Vec::new(),
            refresh_pending: false,
        }
    }

    /// Ask for a newest-first ordering on the next ranking pass.
    pub fn request_refresh(&mut self) {
        self.refresh_pending = true;
    }

    /// Consume the refresh flag. Returns whether it was set.
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh_pending)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn weight_of(&self, id: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.sort_weight)
    }

    /// Order-independent key of the cached ID set: sorted IDs joined with `,`.
    pub fn id_set_key(&self) -> String {
        id_set_key(self.ids())
    }

    /// True when `ids` is exactly the cached ID set, in any order.
    ///
    /// An empty cache never matches, so the first pass always computes.
    pub fn matches<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        sorted(ids) == sorted(self.ids())
    }

    pub(crate) fn replace(&mut self, entries: Vec<OrderEntry>) {
        self.entries = entries;
    }

    /// Load from `path`. Returns an empty order if the file doesn't exist
    /// or can't be parsed.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let order: Self = match serde_json::from_str(&content) {
            Ok(o) => o,
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "discarding unreadable feed order");
                return Self::empty();
            }
        };
        if order.version != ORDER_VERSION {
            return Self::empty();
        }
        order
    }

    pub fn save(&self, path: &Path) -> Result<(), FeedError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Sorted IDs joined with `,`.
pub fn id_set_key<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    sorted(ids).join(",")
}

fn sorted<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut ids: Vec<&str> = ids.into_iter().collect();
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_of(ids: &[&str]) -> FeedOrder {
        let mut order = FeedOrder::empty();
        order.replace(
            ids.iter()
                .map(|id| OrderEntry {
                    id: id.to_string(),
                    sort_weight: Some(1.0),
                })
                .collect(),
        );
        order
    }

    #[test]
    fn empty_order_never_matches() {
        assert!(!FeedOrder::empty().matches(Vec::<&str>::new()));
        assert!(!FeedOrder::empty().matches(["a"]));
    }

    #[test]
    fn matches_ignores_order() {
        let order = order_of(&["b", "a", "c"]);
        assert!(order.matches(["a", "b", "c"]));
        assert!(order.matches(["c", "b", "a"]));
    }

    #[test]
    fn added_or_removed_id_does_not_match() {
        let order = order_of(&["a", "b"]);
        assert!(!order.matches(["a", "b", "c"]));
        assert!(!order.matches(["a"]));
        assert!(!order.matches(["a", "z"]));
    }

    #[test]
    fn id_set_key_is_sorted() {
        assert_eq!(order_of(&["b", "c", "a"]).id_set_key(), "a,b,c");
    }

    #[test]
    fn refresh_is_one_shot() {
        let mut order = FeedOrder::empty();
        order.request_refresh();
        assert!(order.take_refresh());
        assert!(!order.take_refresh());
    }

    #[test]
    fn weight_lookup() {
        let order = order_of(&["a"]);
        assert_eq!(order.weight_of("a"), Some(1.0));
        assert_eq!(order.weight_of("missing"), None);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let order = FeedOrder::load(&tmp.path().join("session.json"));
        assert!(order.is_empty());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested/session.json");
        let mut order = order_of(&["x", "y"]);
        order.request_refresh();
        order.save(&path).unwrap();

        assert_eq!(FeedOrder::load(&path), order);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(FeedOrder::load(&path).is_empty());
    }

    #[test]
    fn version_mismatch_loads_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("session.json");
        std::fs::write(&path, r#"{"version":999,"entries":[{"id":"a"}]}"#).unwrap();
        assert!(FeedOrder::load(&path).is_empty());
    }
}
