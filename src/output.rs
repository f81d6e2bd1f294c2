//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Rank
//!
//! ```text
//! Feed (3 posts, recomputed)
//! 001 p-42
//!     likes 12 · comments 3 · weight 1.8312
//! 002 p-7
//!     likes 0 · comments 0 · weight 0.9120
//! ```
//!
//! ## Compress
//!
//! ```text
//! rex.png → out/rex.jpg
//!     1200x900 · q70 · 612.4 KB (from 3.1 MB) · 2 attempts
//! huge.tiff → out/huge.jpg
//!     1200x1200 · q30 · 911.0 KB (from 48.0 MB) · 6 attempts · over budget
//! broken.jpg
//!     failed: Failed to decode image: …
//!
//! Compressed 2 images, 1 over budget, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.

use crate::feed::{FeedOrder, RankOutcome, Ranking};
use crate::process::{BatchResult, CompressEvent};
use std::path::Path;

/// Human-readable byte count: `512 B`, `612.4 KB`, `3.1 MB`.
pub fn human_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Rank
// ============================================================================

fn outcome_label(outcome: RankOutcome) -> &'static str {
    match outcome {
        RankOutcome::Refreshed => "newest first",
        RankOutcome::Reused => "kept",
        RankOutcome::Recomputed => "recomputed",
    }
}

/// Format a ranking: a header, then one entry per post in display order.
pub fn format_rank_output(ranking: &Ranking, order: &FeedOrder) -> Vec<String> {
    let mut lines = vec![format!(
        "Feed ({} posts, {})",
        ranking.posts.len(),
        outcome_label(ranking.outcome)
    )];
    for (i, post) in ranking.posts.iter().enumerate() {
        lines.push(format!("{:03} {}", i + 1, post.id));
        let weight = order
            .weight_of(&post.id)
            .map(|w| format!(" · weight {w:.4}"))
            .unwrap_or_default();
        lines.push(format!(
            "    likes {} · comments {}{}",
            post.likes,
            post.comment_count(),
            weight
        ));
    }
    lines
}

pub fn print_rank_output(ranking: &Ranking, order: &FeedOrder) {
    for line in format_rank_output(ranking, order) {
        println!("{}", line);
    }
}

// ============================================================================
// Compress
// ============================================================================

/// Format a single compression progress event as display lines.
pub fn format_compress_event(event: &CompressEvent) -> Vec<String> {
    match event {
        CompressEvent::Compressed(file) => {
            let mut detail = format!(
                "    {}x{} · q{} · {} (from {}) · {} attempt{}",
                file.width,
                file.height,
                file.quality,
                human_bytes(file.output_bytes as u64),
                human_bytes(file.source_bytes),
                file.attempts,
                if file.attempts == 1 { "" } else { "s" }
            );
            if !file.within_budget {
                detail.push_str(" · over budget");
            }
            vec![
                format!("{} → {}", file_name(&file.source), file.output.display()),
                detail,
            ]
        }
        CompressEvent::Failed(file) => vec![
            file_name(&file.source),
            format!("    failed: {}", file.error),
        ],
    }
}

/// One-line summary of a finished batch.
pub fn format_compress_summary(result: &BatchResult) -> String {
    let count = result.compressed.len();
    format!(
        "Compressed {} image{}, {} over budget, {} failed",
        count,
        if count == 1 { "" } else { "s" },
        result.over_budget(),
        result.failed.len()
    )
}
