//! Content-aware crop anchors.
//!
//! A cover crop window has the target's aspect ratio, so the source overflows
//! it along exactly one axis. These strategies slide the window along that
//! axis and keep the most interesting part:
//!
//! - **Attention**: highest saliency, scored per pixel from luminance edge
//!   strength, colour saturation and skin-tone presence.
//! - **Entropy**: highest Shannon entropy of the window's luminance histogram.
//!
//! Analysis runs on a downscaled copy (long edge at most [`ANALYSIS_EDGE`]
//! pixels). Scores are integers so equal windows compare equal; ties resolve
//! to the window nearest the center, which makes a featureless image crop
//! exactly like the `center` anchor.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbImage};

/// Long edge of the downscaled analysis image.
const ANALYSIS_EDGE: u32 = 256;

const SATURATION_WEIGHT: u32 = 48;
const SKIN_WEIGHT: u32 = 48;

/// Content-aware strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Attention,
    Entropy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Top-left offset of a `crop_w`x`crop_h` window inside `img`.
///
/// The crop must fit inside the image; an image that already matches the
/// crop yields `(0, 0)`.
pub fn focus_offset(img: &DynamicImage, crop_w: u32, crop_h: u32, focus: Focus) -> (u32, u32) {
    let (w, h) = img.dimensions();
    let excess_x = w.saturating_sub(crop_w);
    let excess_y = h.saturating_sub(crop_h);
    if excess_x == 0 && excess_y == 0 {
        return (0, 0);
    }

    let (axis, full_len, crop_len, excess) = if excess_x >= excess_y {
        (Axis::Horizontal, w, crop_w, excess_x)
    } else {
        (Axis::Vertical, h, crop_h, excess_y)
    };

    let small = analysis_image(img);
    let small_len = match axis {
        Axis::Horizontal => small.width(),
        Axis::Vertical => small.height(),
    };
    let window = ((crop_len as f64 * small_len as f64 / full_len as f64).round() as usize)
        .clamp(1, small_len as usize);

    let best = match focus {
        Focus::Attention => best_window_by_score(&line_saliency(&small, axis), window),
        Focus::Entropy => best_window_by_entropy(&line_histograms(&small, axis), window),
    };

    // Map the analysis offset range [0, small_len - window] onto [0, excess]
    let span = small_len as usize - window;
    let offset = if span == 0 {
        excess / 2
    } else {
        ((best as f64 * excess as f64 / span as f64).round() as u32).min(excess)
    };

    match axis {
        Axis::Horizontal => (offset, excess_y / 2),
        Axis::Vertical => (excess_x / 2, offset),
    }
}

fn analysis_image(img: &DynamicImage) -> RgbImage {
    let (w, h) = img.dimensions();
    let long_edge = w.max(h);
    if long_edge <= ANALYSIS_EDGE {
        return img.to_rgb8();
    }
    let scale = ANALYSIS_EDGE as f64 / long_edge as f64;
    let sw = ((w as f64 * scale).round() as u32).max(1);
    let sh = ((h as f64 * scale).round() as u32).max(1);
    img.resize_exact(sw, sh, FilterType::Triangle).to_rgb8()
}

/// Integer BT.601 luma.
fn luma(p: &image::Rgb<u8>) -> u32 {
    let [r, g, b] = p.0;
    (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000
}

fn saturation(p: &image::Rgb<u8>) -> u32 {
    let max = *p.0.iter().max().unwrap_or(&0) as u32;
    let min = *p.0.iter().min().unwrap_or(&0) as u32;
    if max == 0 {
        0
    } else {
        (max - min) * SATURATION_WEIGHT / max
    }
}

fn is_skin(p: &image::Rgb<u8>) -> bool {
    let [r, g, b] = p.0;
    r > 95 && g > 40 && b > 20 && r > g && r > b && r - g.min(b) > 15 && r.abs_diff(g) > 15
}

/// Saliency summed per column (horizontal axis) or per row (vertical axis).
fn line_saliency(img: &RgbImage, axis: Axis) -> Vec<u64> {
    let (w, h) = img.dimensions();
    let len = match axis {
        Axis::Horizontal => w,
        Axis::Vertical => h,
    };
    let mut lines = vec![0u64; len as usize];

    for y in 0..h {
        for x in 0..w {
            let p = img.get_pixel(x, y);
            let l = luma(p);
            let mut edge = 0;
            if x + 1 < w {
                edge += l.abs_diff(luma(img.get_pixel(x + 1, y)));
            }
            if y + 1 < h {
                edge += l.abs_diff(luma(img.get_pixel(x, y + 1)));
            }
            let skin = if is_skin(p) { SKIN_WEIGHT } else { 0 };
            let score = edge + saturation(p) + skin;

            let line = match axis {
                Axis::Horizontal => x,
                Axis::Vertical => y,
            };
            lines[line as usize] += score as u64;
        }
    }
    lines
}

/// Luminance histogram per column (horizontal axis) or per row (vertical axis).
fn line_histograms(img: &RgbImage, axis: Axis) -> Vec<[u32; 256]> {
    let (w, h) = img.dimensions();
    let len = match axis {
        Axis::Horizontal => w,
        Axis::Vertical => h,
    };
    let mut lines = vec![[0u32; 256]; len as usize];
    for (x, y, p) in img.enumerate_pixels() {
        let line = match axis {
            Axis::Horizontal => x,
            Axis::Vertical => y,
        };
        lines[line as usize][luma(p).min(255) as usize] += 1;
    }
    lines
}

/// Of two candidate offsets with equal scores, is `candidate` closer to center?
fn nearer_center(candidate: usize, current: usize, span: usize) -> bool {
    // Compare doubled distances to stay in integers for odd spans
    let center2 = span;
    (candidate * 2).abs_diff(center2) < (current * 2).abs_diff(center2)
}

/// Window start with the highest total score.
fn best_window_by_score(lines: &[u64], window: usize) -> usize {
    let span = lines.len().saturating_sub(window);
    let mut sum: u64 = lines[..window.min(lines.len())].iter().sum();
    let mut best = (0usize, sum);

    for start in 1..=span {
        sum = sum + lines[start + window - 1] - lines[start - 1];
        if sum > best.1 || (sum == best.1 && nearer_center(start, best.0, span)) {
            best = (start, sum);
        }
    }
    best.0
}

fn shannon_entropy(histogram: &[u32; 256], total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// Window start with the highest luminance entropy.
fn best_window_by_entropy(lines: &[[u32; 256]], window: usize) -> usize {
    const EPSILON: f64 = 1e-9;

    let span = lines.len().saturating_sub(window);
    let mut histogram = [0u32; 256];
    for line in &lines[..window.min(lines.len())] {
        for (bin, count) in histogram.iter_mut().zip(line) {
            *bin += count;
        }
    }
    let total = |h: &[u32; 256]| h.iter().map(|&c| c as u64).sum::<u64>();
    let mut best = (0usize, shannon_entropy(&histogram, total(&histogram)));

    for start in 1..=span {
        for bin in 0..256 {
            histogram[bin] = histogram[bin] + lines[start + window - 1][bin] - lines[start - 1][bin];
        }
        let entropy = shannon_entropy(&histogram, total(&histogram));
        let better = entropy > best.1 + EPSILON;
        let tied = (entropy - best.1).abs() <= EPSILON;
        if better || (tied && nearer_center(start, best.0, span)) {
            best = (start, entropy);
        }
    }
    best.0
}
