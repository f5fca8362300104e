//! Batch variant generation.
//!
//! Resolves the input (one file or a folder of images), then for every
//! source, every configured size and every output format renders exactly one
//! artifact. Failures are contained at the smallest unit:
//!
//! ```text
//! batch ─┬─ image ─┬─ size ─┬─ jpg    failure → Failed   (logged as error)
//!        │         │        ├─ webp   failure → Failed   (logged as error)
//!        │         │        └─ avif   failure → Degraded (logged as warning)
//!        │         └─ ...
//!        └─ ...    unreadable source → image skipped, batch continues
//! ```
//!
//! Only a bad input path or an output directory that cannot be created stop
//! the batch. The output directory is created once there is at least one
//! source to render.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── imagen01-perroygato-1120x640.jpg
//! ├── imagen01-perroygato-1120x640.webp
//! ├── imagen01-perroygato-1120x640.avif
//! ├── imagen01-perroygato-2240x1280.jpg
//! └── ...                              # 3 files × 6 sizes per image
//! ```
//!
//! ## Parallel Processing
//!
//! Images are processed one at a time unless `processing.max_processes`
//! allows more, in which case a [rayon](https://docs.rs/rayon) pool works on
//! several images at once. The report keeps source order either way.

use crate::config::{GeneratorConfig, effective_threads};
use crate::imaging::{
    ArtifactOutcome, ArtifactStatus, ImageBackend, Qualities, ResizeMode, RustBackend,
    SizeOutcome, create_size_variants, get_dimensions,
};
use crate::naming;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("Input is neither a file nor a directory: {}", .0.display())]
    InvalidInput(PathBuf),
    #[error("Cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// What the input path turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Directory(PathBuf),
}

/// A source image queued for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub path: PathBuf,
    /// File name without extension; the key for the position policy.
    pub stem: String,
    /// Output base name (stem or prefix-derived).
    pub base: String,
}

/// Progress events, sent while the batch runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// A source was identified and is about to be rendered.
    ImageStarted {
        source: PathBuf,
        base: String,
        dimensions: (u32, u32),
        mode: ResizeMode,
    },
    /// All formats for one size were attempted.
    SizeCompleted(SizeOutcome),
    /// The source could not be read; none of its variants were attempted.
    ImageFailed { source: PathBuf, error: String },
}

/// Everything that happened to one source.
#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub source: PathBuf,
    pub base: String,
    pub mode: ResizeMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<(u32, u32)>,
    /// Set when the whole image was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub artifacts: Vec<ArtifactOutcome>,
}

/// Result of a batch run, in source order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub images: Vec<ImageReport>,
}

impl BatchReport {
    pub fn artifacts(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.images.iter().flat_map(|i| i.artifacts.iter())
    }

    pub fn written_count(&self) -> usize {
        self.artifacts().filter(|a| a.is_written()).count()
    }

    /// Required-format artifacts that failed.
    pub fn hard_failures(&self) -> Vec<&ArtifactOutcome> {
        self.artifacts()
            .filter(|a| matches!(a.status, ArtifactStatus::Failed { .. }))
            .collect()
    }

    /// Optional-format artifacts that failed.
    pub fn soft_failures(&self) -> Vec<&ArtifactOutcome> {
        self.artifacts()
            .filter(|a| matches!(a.status, ArtifactStatus::Degraded { .. }))
            .collect()
    }

    /// Sources that were skipped entirely.
    pub fn failed_images(&self) -> Vec<&ImageReport> {
        self.images.iter().filter(|i| i.error.is_some()).collect()
    }
}

/// Classify the input path.
pub fn resolve_input(path: &Path) -> Result<Input, ProcessError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProcessError::InputNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(ProcessError::Io(e)),
    };
    if metadata.is_dir() {
        Ok(Input::Directory(path.to_path_buf()))
    } else if metadata.is_file() {
        Ok(Input::File(path.to_path_buf()))
    } else {
        Err(ProcessError::InvalidInput(path.to_path_buf()))
    }
}

/// List the sources for an input.
///
/// A folder contributes its regular files with an accepted image extension
/// (not recursive), sorted by file name. A file input is taken as-is.
pub fn collect_sources(input: &Input, prefix: Option<&str>) -> Result<Vec<SourceImage>, ProcessError> {
    match input {
        Input::File(path) => {
            let stem = naming::source_stem(path);
            Ok(vec![SourceImage {
                path: path.clone(),
                base: naming::file_output_base(&stem, prefix),
                stem,
            }])
        }
        Input::Directory(dir) => {
            let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
                .filter_map(|entry| readable_entry(dir, entry))
                .map(|e| e.path())
                .filter(|p| p.is_file() && naming::is_accepted_source(p))
                .collect();
            paths.sort();

            Ok(paths
                .into_iter()
                .map(|path| {
                    let stem = naming::source_stem(&path);
                    SourceImage {
                        base: naming::folder_output_base(&stem, prefix),
                        stem,
                        path,
                    }
                })
                .collect())
        }
    }
}

/// Keep a directory entry, or log and drop one that could not be read.
fn readable_entry<T>(dir: &Path, entry: std::io::Result<T>) -> Option<T> {
    match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("skipping unreadable entry in {}: {e}", dir.display());
            None
        }
    }
}

/// Generate all variants for `input` into `output_dir` with the production backend.
pub fn process(
    input: &Path,
    output_dir: &Path,
    prefix: Option<&str>,
    config: &GeneratorConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, input, output_dir, prefix, config, progress)
}

/// Generate variants using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    input: &Path,
    output_dir: &Path,
    prefix: Option<&str>,
    config: &GeneratorConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    let input = resolve_input(input)?;
    let sources = collect_sources(&input, prefix)?;
    if sources.is_empty() {
        info!("no images found in {}", input_path(&input).display());
        return Ok(BatchReport::default());
    }

    std::fs::create_dir_all(output_dir).map_err(|source| ProcessError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let qualities = config.quality.qualities();
    let threads = effective_threads(&config.processing);
    info!(
        images = sources.len(),
        sizes = config.sizes.len(),
        threads,
        "generating variants into {}",
        output_dir.display()
    );

    let run = |source: &SourceImage| {
        process_image(
            backend,
            source,
            output_dir,
            config,
            &qualities,
            progress.as_ref(),
        )
    };

    let images = if threads <= 1 {
        sources.iter().map(run).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        pool.install(|| sources.par_iter().map(run).collect())
    };

    Ok(BatchReport { images })
}

fn input_path(input: &Input) -> &Path {
    match input {
        Input::File(path) | Input::Directory(path) => path,
    }
}

/// Render every size and format for one source. Never fails: problems are
/// recorded in the returned report.
fn process_image(
    backend: &impl ImageBackend,
    source: &SourceImage,
    output_dir: &Path,
    config: &GeneratorConfig,
    qualities: &Qualities,
    progress: Option<&Sender<ProcessEvent>>,
) -> ImageReport {
    let mode = config.positions.resolve(&source.stem);
    let mut report = ImageReport {
        source: source.path.clone(),
        base: source.base.clone(),
        mode,
        dimensions: None,
        error: None,
        artifacts: Vec::new(),
    };

    let dimensions = match get_dimensions(backend, &source.path) {
        Ok(dims) => dims,
        Err(e) => {
            error!("skipping {}: {e}", source.path.display());
            emit(
                progress,
                ProcessEvent::ImageFailed {
                    source: source.path.clone(),
                    error: e.to_string(),
                },
            );
            report.error = Some(e.to_string());
            return report;
        }
    };
    report.dimensions = Some(dimensions);
    debug!(
        source = %source.path.display(),
        width = dimensions.0,
        height = dimensions.1,
        %mode,
        "resolved resize mode"
    );
    emit(
        progress,
        ProcessEvent::ImageStarted {
            source: source.path.clone(),
            base: source.base.clone(),
            dimensions,
            mode,
        },
    );

    for size in &config.sizes {
        let outcome = create_size_variants(
            backend,
            &source.path,
            output_dir,
            &source.base,
            size,
            mode,
            qualities,
        );
        for artifact in &outcome.artifacts {
            match &artifact.status {
                ArtifactStatus::Written => {}
                ArtifactStatus::Degraded { error } => {
                    warn!("{} not generated for {}: {error}", artifact.format, outcome.filename_base)
                }
                ArtifactStatus::Failed { error } => {
                    error!("{} failed for {}: {error}", artifact.format, outcome.filename_base)
                }
            }
        }
        report.artifacts.extend(outcome.artifacts.iter().cloned());
        emit(progress, ProcessEvent::SizeCompleted(outcome));
    }

    report
}

fn emit(progress: Option<&Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = progress {
        // The receiver going away only silences progress output
        tx.send(event).ok();
    }
}
