//! Shared test utilities.
//!
//! Synthetic source images (so no binary fixtures are checked in), a small
//! size table that keeps real encodes fast, and a directory lister for
//! asserting on generated artifacts.

use crate::config::GeneratorConfig;
use crate::imaging::SizeSpec;
use image::{ImageBuffer, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic sources
// =========================================================================

/// Gradient RGB image: red grows left to right, green top to bottom.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

/// Write a gradient JPEG to `path`.
pub fn write_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient_rgb(width, height).save(path).unwrap();
}

/// Write a half-transparent PNG to `path`.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img: RgbaImage = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            200,
            if x < width / 2 { 255 } else { 0 },
        ])
    });
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

// =========================================================================
// Configuration
// =========================================================================

/// Stock configuration with two small sizes.
pub fn small_config() -> GeneratorConfig {
    GeneratorConfig {
        sizes: vec![
            SizeSpec::new("thumb", 48, 32),
            SizeSpec::new("thumb@2x", 96, 64),
        ],
        ..GeneratorConfig::default()
    }
}

// =========================================================================
// Output inspection
// =========================================================================

/// File names directly under `dir`, sorted. Empty if `dir` doesn't exist.
pub fn list_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
