//! # pawfeed
//!
//! The algorithmic core of a pet-photo social app: how the feed is ordered,
//! and how photos are shrunk before upload. Storage, auth, notifications and
//! UI live elsewhere; this crate takes posts and images in and hands orders
//! and JPEGs back.
//!
//! # Two Independent Components
//!
//! ```text
//! posts + FeedOrder  ──►  feed::FeedRanker        ──►  posts in display order
//! data URI image     ──►  imaging::compress_image ──►  JPEG data URI ≤ 800 KB
//! ```
//!
//! They share nothing and never call each other.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`feed`] | Weighted, session-stable feed ordering |
//! | [`imaging`] | Fit-to-box JPEG compression with a quality ladder |
//! | [`types`] | `Post` / `Comment` / `CreatedAt` as read from the document store |
//! | [`config`] | `pawfeed.toml` loading and validation |
//! | [`process`] | Batch compression of files on a rayon pool (CLI) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Order Cache Belongs to the Caller
//!
//! A feed must not reshuffle while the user looks at it, yet each new
//! session should feel fresh. The ranker therefore never keeps state of its
//! own: the caller passes a [`feed::FeedOrder`] in, and its lifetime *is*
//! the session. Liking a post re-ranks against the same order and gets the
//! same positions back with fresh counts; adding or removing a post changes
//! the ID set and triggers a new weighted shuffle.
//!
//! ## Decode Once, Encode Many
//!
//! Compression decodes and resamples the source a single time, then walks
//! down a fixed quality ladder (0.8 → 0.3 in 0.1 steps by default) encoding
//! that one surface until the result fits. The ladder is finite, so the
//! loop always ends; if the last rung is still too large the result is
//! returned anyway and a warning is logged.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and JPEG encoding all come from the `image`
//! crate. No system libraries, nothing to install.

pub mod config;
pub mod feed;
pub mod imaging;
pub mod output;
pub mod process;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
