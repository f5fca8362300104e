//! Image processing: decode, resize, crop and encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` (format sniffed from content) |
//! | **Cover** | Gravity or content-aware crop of the source, then Lanczos3 scale |
//! | **Contain** | Lanczos3 fit + letterbox overlay |
//! | **Encode** | JPEG (`image`), lossy WebP (`webp`), AVIF (`image` + rav1e) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Smartcrop**: Content-aware crop offsets (`attention`, `entropy`)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining naming, parameters + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;
mod smartcrop;

pub use backend::{BackendError, ImageBackend};
pub use rust_backend::RustBackend;
// Re-exported for tests (process.rs, operations.rs tests use this)
#[cfg(test)]
pub use backend::Dimensions;
pub use operations::{
    ArtifactOutcome, ArtifactStatus, SizeOutcome, create_size_variants, get_dimensions,
};
pub use params::{
    Color, CropAnchor, OutputFormat, Qualities, Quality, ResizeMode, SizeSpec, VariantParams,
};
