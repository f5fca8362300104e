//! # Generate Images
//!
//! Batch generator of responsive image variants for a storefront. Every
//! source image becomes a JPEG, a WebP and an AVIF at each size of a fixed
//! table of target boxes, fitted either by cropping (cover) or by
//! letterboxing (contain).
//!
//! ```text
//! generate-images <input-file|input-folder> <output-folder> [prefix]
//!
//! in/imagen01-perroygato.jpg  →  out/imagen01-perroygato-1120x640.jpg
//!                                out/imagen01-perroygato-1120x640.webp
//!                                out/imagen01-perroygato-1120x640.avif
//!                                ... × 6 sizes
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `GeneratorConfig`: size table, qualities, position policy; TOML loading and merging |
//! | [`naming`] | Source filtering, output base names, variant file names |
//! | [`imaging`] | Pure-Rust decode, resize, crop and encode behind the `ImageBackend` trait |
//! | [`process`] | Input resolution and the batch loop with per-artifact failure isolation |
//! | [`output`] | Console formatting of progress events and the final summary |
//!
//! # Design Decisions
//!
//! ## Best-Effort AVIF
//!
//! JPEG and WebP are the formats every browser can show, so a failure there
//! is an error. AVIF is an optional extra: when it fails the variant is
//! still complete, and the outcome is recorded as degraded rather than
//! failed.
//!
//! ## Position Policy Over Guesswork
//!
//! Crops are decided per image by name. Listed images get a fixed gravity
//! anchor or are letterboxed whole; everything else falls back to a
//! content-aware crop. See [`config::PositionPolicy`].
//!
//! ## Self-Contained Imaging
//!
//! The [`imaging`] module uses the `image` crate (Lanczos3 resampling, JPEG
//! and AVIF encoding through rav1e) and `webp`, which builds a bundled
//! libwebp, for lossy WebP. Nothing has to be installed on the host.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
