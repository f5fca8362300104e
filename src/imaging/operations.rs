//! High-level image operations.
//!
//! These functions combine naming and parameters with backend execution:
//! given one source and one [`SizeSpec`], plan the JPEG/WebP/AVIF variants
//! and render each of them independently.

use super::backend::{BackendError, ImageBackend};
use super::params::{OutputFormat, Qualities, ResizeMode, SizeSpec, VariantParams};
use crate::naming::variant_filename;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// What happened to one attempted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactStatus {
    Written,
    /// A required format failed.
    Failed { error: String },
    /// An optional (best-effort) format failed; the variant is still usable.
    Degraded { error: String },
}

/// One attempted output artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactOutcome {
    pub path: PathBuf,
    pub size: String,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    #[serde(flatten)]
    pub status: ArtifactStatus,
}

impl ArtifactOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, ArtifactStatus::Written)
    }
}

/// All artifacts attempted for one size of one source.
#[derive(Debug, Clone)]
pub struct SizeOutcome {
    pub size: SizeSpec,
    /// Output name without extension, e.g. `dog-1120x640`.
    pub filename_base: String,
    pub artifacts: Vec<ArtifactOutcome>,
}

/// Plan the variants for one size without executing them.
///
/// One entry per [`OutputFormat`], in generation order.
pub fn plan_size_variants(
    source: &Path,
    output_dir: &Path,
    base: &str,
    size: &SizeSpec,
    mode: ResizeMode,
    qualities: &Qualities,
) -> Vec<VariantParams> {
    OutputFormat::ALL
        .iter()
        .map(|&format| VariantParams {
            source: source.to_path_buf(),
            output: output_dir.join(variant_filename(
                base,
                size.width,
                size.height,
                format.extension(),
            )),
            width: size.width,
            height: size.height,
            format,
            quality: qualities.for_format(format),
            mode,
        })
        .collect()
}

/// Render every format for one size.
///
/// Each format is attempted exactly once and independently: a failure is
/// recorded in its [`ArtifactOutcome`] and the remaining formats still run.
pub fn create_size_variants(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    base: &str,
    size: &SizeSpec,
    mode: ResizeMode,
    qualities: &Qualities,
) -> SizeOutcome {
    let artifacts = plan_size_variants(source, output_dir, base, size, mode, qualities)
        .into_iter()
        .map(|params| {
            let status = match backend.render(&params) {
                Ok(()) => ArtifactStatus::Written,
                Err(e) if params.format.is_optional() => ArtifactStatus::Degraded {
                    error: e.to_string(),
                },
                Err(e) => ArtifactStatus::Failed {
                    error: e.to_string(),
                },
            };
            ArtifactOutcome {
                path: params.output,
                size: size.name.clone(),
                width: params.width,
                height: params.height,
                format: params.format,
                status,
            }
        })
        .collect();

    SizeOutcome {
        size: size.clone(),
        filename_base: format!("{}-{}x{}", base, size.width, size.height),
        artifacts,
    }
}
