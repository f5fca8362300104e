//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::CropAnchor;

/// Calculate the source region that covers a target area once scaled.
///
/// Returns the largest window with the target's aspect ratio that fits
/// inside the source. Cropping this window first and then scaling it to the
/// target keeps memory bounded by the source and target sizes, whatever the
/// source aspect ratio.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Crop window in source pixels (one side matches the
///   source, neither is zero)
pub fn calculate_cover_crop(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (source.0 as u64, source.1 as u64);
    let (tgt_w, tgt_h) = (target.0 as u64, target.1 as u64);

    if src_w * tgt_h > src_h * tgt_w {
        // Source is wider: full height, trimmed width
        let w = (src_h * tgt_w + tgt_h / 2) / tgt_h;
        (w.clamp(1, src_w) as u32, src_h as u32)
    } else {
        // Source is taller (or same aspect): full width, trimmed height
        let h = (src_w * tgt_h + tgt_w / 2) / tgt_w;
        (src_w as u32, h.clamp(1, src_h) as u32)
    }
}

/// Calculate dimensions that fit entirely inside a target area.
///
/// The counterpart of [`calculate_cover_crop`]: one dimension matches the
/// target, the other is smaller or equal. Never returns a zero dimension.
pub fn calculate_contain_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: width matches, height shrinks
        let h = ((tgt_w as f64 / src_aspect).round() as u32).clamp(1, tgt_h);
        (tgt_w, h)
    } else {
        let w = ((tgt_h as f64 * src_aspect).round() as u32).clamp(1, tgt_w);
        (w, tgt_h)
    }
}

/// Offset of the crop window for gravity anchors.
///
/// `excess` is how far the source overflows the crop window on each axis.
/// Returns `None` for content-aware anchors (`attention`, `entropy`), which
/// need the pixels.
///
/// ```text
/// west/north → 0    center → excess / 2    east/south → excess
/// ```
pub fn anchor_offset(anchor: CropAnchor, excess: (u32, u32)) -> Option<(u32, u32)> {
    let (ex, ey) = excess;
    let start = 0;
    let (mid_x, mid_y) = (ex / 2, ey / 2);

    let offset = match anchor {
        CropAnchor::Attention | CropAnchor::Entropy => return None,
        CropAnchor::Center => (mid_x, mid_y),
        CropAnchor::North => (mid_x, start),
        CropAnchor::South => (mid_x, ey),
        CropAnchor::East => (ex, mid_y),
        CropAnchor::West => (start, mid_y),
        CropAnchor::NorthEast => (ex, start),
        CropAnchor::NorthWest => (start, start),
        CropAnchor::SouthEast => (ex, ey),
        CropAnchor::SouthWest => (start, ey),
    };
    Some(offset)
}

/// Top-left position that centers `inner` inside `outer` (letterboxing).
pub fn letterbox_offset(inner: (u32, u32), outer: (u32, u32)) -> (u32, u32) {
    (
        outer.0.saturating_sub(inner.0) / 2,
        outer.1.saturating_sub(inner.1) / 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // calculate_cover_crop tests
    // =========================================================================

    #[test]
    fn cover_crop_wider_source_to_portrait_target() {
        // 800x600 (4:3) → 400x500 target: full height, width 600 * 4/5 = 480
        assert_eq!(calculate_cover_crop((800, 600), (400, 500)), (480, 600));
    }

    #[test]
    fn cover_crop_taller_source_to_landscape_target() {
        // 600x800 (3:4) → 500x400 target: full width, height 600 * 4/5 = 480
        assert_eq!(calculate_cover_crop((600, 800), (500, 400)), (600, 480));
    }

    #[test]
    fn cover_crop_same_aspect_ratio_keeps_everything() {
        assert_eq!(calculate_cover_crop((800, 600), (400, 300)), (800, 600));
        // Upscaling a small source crops nothing either
        assert_eq!(calculate_cover_crop((280, 160), (2240, 1280)), (280, 160));
    }

    #[test]
    fn cover_crop_extreme_banner_stays_within_source() {
        // A 2x20000 strip covering 1120x640 only needs a 2x1 window
        assert_eq!(calculate_cover_crop((2, 20000), (1120, 640)), (2, 1));
        assert_eq!(calculate_cover_crop((20000, 2), (360, 260)), (3, 2));
    }

    #[test]
    fn cover_crop_never_exceeds_source_or_hits_zero() {
        for source in [(1000, 999), (999, 1000), (3, 7), (4000, 3001), (1, 1), (1, 50000)] {
            let (w, h) = calculate_cover_crop(source, (1120, 640));
            assert!(w >= 1 && h >= 1, "{source:?} cropped to {w}x{h}");
            assert!(w <= source.0 && h <= source.1, "{source:?} cropped to {w}x{h}");
            assert!(w == source.0 || h == source.1);
        }
    }

    // =========================================================================
    // calculate_contain_dimensions tests
    // =========================================================================

    #[test]
    fn contain_wide_source_in_landscape_box() {
        // 2000x500 (4:1) into 1120x640 → width matches, height 280
        assert_eq!(
            calculate_contain_dimensions((2000, 500), (1120, 640)),
            (1120, 280)
        );
    }

    #[test]
    fn contain_portrait_source_in_landscape_box() {
        // 600x800 (3:4) into 420x300 → height matches, width 225
        assert_eq!(
            calculate_contain_dimensions((600, 800), (420, 300)),
            (225, 300)
        );
    }

    #[test]
    fn contain_extreme_aspect_keeps_one_pixel() {
        assert_eq!(calculate_contain_dimensions((10000, 1), (360, 260)), (360, 1));
    }

    // =========================================================================
    // anchor_offset tests
    // =========================================================================

    #[test]
    fn anchor_offsets_on_horizontal_overflow() {
        let excess = (100, 0);
        assert_eq!(anchor_offset(CropAnchor::West, excess), Some((0, 0)));
        assert_eq!(anchor_offset(CropAnchor::Center, excess), Some((50, 0)));
        assert_eq!(anchor_offset(CropAnchor::East, excess), Some((100, 0)));
        // North/south only move the vertical axis
        assert_eq!(anchor_offset(CropAnchor::North, excess), Some((50, 0)));
    }

    #[test]
    fn anchor_offsets_on_vertical_overflow() {
        let excess = (0, 81);
        assert_eq!(anchor_offset(CropAnchor::North, excess), Some((0, 0)));
        assert_eq!(anchor_offset(CropAnchor::Center, excess), Some((0, 40)));
        assert_eq!(anchor_offset(CropAnchor::South, excess), Some((0, 81)));
        assert_eq!(anchor_offset(CropAnchor::SouthWest, excess), Some((0, 81)));
        assert_eq!(anchor_offset(CropAnchor::NorthEast, excess), Some((0, 0)));
    }

    #[test]
    fn content_aware_anchors_need_pixels() {
        assert_eq!(anchor_offset(CropAnchor::Attention, (10, 0)), None);
        assert_eq!(anchor_offset(CropAnchor::Entropy, (0, 10)), None);
    }

    // =========================================================================
    // letterbox_offset tests
    // =========================================================================

    #[test]
    fn letterbox_centers_inner_box() {
        assert_eq!(letterbox_offset((1120, 280), (1120, 640)), (0, 180));
        assert_eq!(letterbox_offset((225, 300), (420, 300)), (97, 0));
    }
}
