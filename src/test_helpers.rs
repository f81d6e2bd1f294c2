//! Shared test utilities for the pawfeed test suite.
//!
//! Post builders pinned to a fixed clock, and synthetic images wrapped as
//! data URIs the way a photo picker hands them over.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let now = fixed_now();
//! let posts = vec![post("a", now, 1.0), with_engagement(post("b", now, 0.0), 3, 1)];
//! assert_eq!(post_ids(&posts), vec!["a", "b"]);
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeZone, Utc};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

use crate::types::{Comment, CreatedAt, Post};

// =========================================================================
// Posts
// =========================================================================

/// 2024-06-01T12:00:00Z. Every ranking test measures age from here.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// A post created `days_ago` days before `now`, with no engagement.
pub fn post(id: &str, now: DateTime<Utc>, days_ago: f64) -> Post {
    let mut post = Post::new(id);
    let created_ms = now.timestamp_millis() as f64 - days_ago * 86_400_000.0;
    post.created_at = Some(CreatedAt::Millis(created_ms));
    post
}

/// Replace a post's like count and give it `comments` empty comments.
pub fn with_engagement(mut post: Post, likes: u64, comments: usize) -> Post {
    post.likes = likes;
    post.comments = vec![Comment::default(); comments];
    post
}

pub fn post_ids(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.id.as_str()).collect()
}

// =========================================================================
// Images
// =========================================================================

/// Encode an RGB image in `format` and wrap it as a data URI.
pub fn image_data_uri(img: RgbImage, format: ImageFormat, mime: &str) -> String {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut buf, format).unwrap();
    format!("data:{mime};base64,{}", STANDARD.encode(buf.into_inner()))
}

/// Solid-color PNG as a data URI.
pub fn solid_png_data_uri(width: u32, height: u32) -> String {
    let img = RgbImage::from_pixel(width, height, image::Rgb([200, 120, 60]));
    image_data_uri(img, ImageFormat::Png, "image/png")
}

/// Horizontal and vertical ramps, enough detail for quality to matter.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Gradient JPEG as a data URI.
pub fn gradient_jpeg_data_uri(width: u32, height: u32) -> String {
    image_data_uri(gradient_image(width, height), ImageFormat::Jpeg, "image/jpeg")
}
