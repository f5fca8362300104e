//! Pure Rust image processing backend (plus libwebp for lossy WebP).
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate, format sniffed from content |
//! | Cover resize | `crop_imm` of the source window at the anchor, then `resize_exact` with `Lanczos3` |
//! | Contain resize | `resize_exact` to the fitted size, `imageops::overlay` onto a filled canvas |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → WebP | `webp::Encoder` (lossy, libwebp) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//!
//! Every artifact is encoded into memory first and written in one go, so an
//! encoder failure never leaves a truncated file at the output path.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{
    anchor_offset, calculate_contain_dimensions, calculate_cover_crop, letterbox_offset,
};
use super::params::{Color, CropAnchor, OutputFormat, ResizeMode, VariantParams};
use super::smartcrop::{Focus, focus_offset};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, Rgba, RgbaImage};
use std::path::Path;

/// AVIF encoder speed (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Crop the window that covers `width`x`height` at `anchor`, then scale it.
///
/// The window is chosen in source pixels, so the only full-size buffer is
/// the decoded source itself.
fn cover(img: &DynamicImage, width: u32, height: u32, anchor: CropAnchor) -> DynamicImage {
    let (src_w, src_h) = img.dimensions();
    let (crop_w, crop_h) = calculate_cover_crop((src_w, src_h), (width, height));
    let excess = (src_w - crop_w, src_h - crop_h);

    let (x, y) = anchor_offset(anchor, excess).unwrap_or_else(|| {
        let focus = match anchor {
            CropAnchor::Entropy => Focus::Entropy,
            _ => Focus::Attention,
        };
        focus_offset(img, crop_w, crop_h, focus)
    });
    img.crop_imm(x, y, crop_w, crop_h)
        .resize_exact(width, height, FilterType::Lanczos3)
}

/// Scale to fit inside `width`x`height` and center on a `background` canvas.
fn contain(img: &DynamicImage, width: u32, height: u32, background: Color) -> DynamicImage {
    let (fit_w, fit_h) = calculate_contain_dimensions(img.dimensions(), (width, height));
    let fitted = img.resize_exact(fit_w, fit_h, FilterType::Lanczos3).to_rgba8();
    let (x, y) = letterbox_offset((fit_w, fit_h), (width, height));

    let mut canvas =
        RgbaImage::from_pixel(width, height, Rgba([background.r, background.g, background.b, 255]));
    image::imageops::overlay(&mut canvas, &fitted, x as i64, y as i64);
    DynamicImage::ImageRgba8(canvas)
}

/// Apply the resize mode, producing an image of exactly `width`x`height`.
fn resize(img: &DynamicImage, params: &VariantParams) -> Result<DynamicImage, BackendError> {
    let (src_w, src_h) = img.dimensions();
    if src_w == 0 || src_h == 0 || params.width == 0 || params.height == 0 {
        return Err(BackendError::ProcessingFailed(format!(
            "Cannot resize {src_w}x{src_h} to {}x{}",
            params.width, params.height
        )));
    }
    Ok(match params.mode {
        ResizeMode::Cover { anchor } => cover(img, params.width, params.height, anchor),
        ResizeMode::Contain { background } => {
            contain(img, params.width, params.height, background)
        }
    })
}

/// 8-bit RGB, or RGBA when the image carries alpha.
fn to_8bit(img: &DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

/// Encode to the requested format entirely in memory.
fn encode(img: &DynamicImage, format: OutputFormat, quality: u32) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality as u8);
            rgb.write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
        }
        OutputFormat::WebP => {
            let prepared = to_8bit(img);
            let encoder = webp::Encoder::from_image(&prepared).map_err(|e| {
                BackendError::ProcessingFailed(format!("WebP encode failed: {e}"))
            })?;
            let encoded = encoder.encode_simple(false, quality as f32).map_err(|e| {
                BackendError::ProcessingFailed(format!("WebP encode failed: {e:?}"))
            })?;
            buf.extend_from_slice(&encoded);
        }
        OutputFormat::Avif => {
            let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
                &mut buf,
                AVIF_SPEED,
                quality as u8,
            );
            to_8bit(img)
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("AVIF encode failed: {e}")))?;
        }
    }
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::open(path)
            .map_err(BackendError::Io)?
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
            })?;
        Ok(Dimensions { width, height })
    }

    fn render(&self, params: &VariantParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = resize(&img, params)?;
        let bytes = encode(&resized, params.format, params.quality.value())?;
        std::fs::write(&params.output, bytes)?;
        Ok(())
    }
}
