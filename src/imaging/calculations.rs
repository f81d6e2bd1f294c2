//! Pure calculation functions for compression.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::Quality;

/// Fit an image into a `max_w × max_h` box, preserving aspect ratio.
///
/// Images already inside the box are returned unchanged. Otherwise the
/// *longer* side is pinned to its bound and the other side follows the
/// aspect ratio. Fractional pixels are truncated, never below 1.
///
/// Which side gets pinned depends on the image's shape, not on which bound
/// is exceeded. With a non-square box this can leave the other side over
/// its bound (a 1000×800 image in a 1200×600 box comes out 1200×960).
/// Uploads use a square box, where this never happens.
///
/// # Examples
/// ```
/// # use pawfeed::imaging::fit_within;
/// assert_eq!(fit_within((2000, 1500), (1200, 1200)), (1200, 900));
/// assert_eq!(fit_within((800, 600), (1200, 1200)), (800, 600));
/// ```
pub fn fit_within(source: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = max;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }
    if src_w == 0 || src_h == 0 {
        return source;
    }

    let aspect = src_w as f64 / src_h as f64;
    if src_w > src_h {
        let h = (max_w as f64 / aspect) as u32;
        (max_w.max(1), h.max(1))
    } else {
        let w = (max_h as f64 * aspect) as u32;
        (w.max(1), max_h.max(1))
    }
}

/// The qualities the compressor may try, in order.
///
/// Starts at `initial` and steps down by `step` percent. The first value at
/// or below `floor` is the last one, so the ladder always ends and may dip
/// under the floor by less than one step when `initial` isn't on the grid.
///
/// ```text
/// initial 80, floor 30, step 10  →  80 70 60 50 40 30
/// initial 85, floor 30, step 10  →  85 75 65 55 45 35 25
/// initial 20, floor 30, step 10  →  20
/// ```
pub fn quality_schedule(initial: Quality, floor: Quality, step: u32) -> Vec<Quality> {
    let mut ladder = vec![initial];
    let mut current = initial;
    while current > floor && step > 0 {
        let next = current.step_down(step);
        if next == current {
            break;
        }
        ladder.push(next);
        current = next;
    }
    ladder
}
