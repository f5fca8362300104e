//! CLI output formatting.
//!
//! # Output Format
//!
//! One block per source, one line per size, then a summary:
//!
//! ```text
//! imagen01-perroygato.jpg (4000x3000, cover, anchor south)
//!     Generated: imagen01-perroygato-1120x640 (jpg, webp, avif)
//!     Generated: imagen01-perroygato-2240x1280 (jpg, webp)
//!         avif not generated: Processing failed: ...
//! broken.jpg
//!     Skipped: Processing failed: ...
//!
//! All images processed: 2 images, 5 files written, 0 failed, 1 degraded, 1 skipped
//! ```
//!
//! # Architecture
//!
//! `format_*` functions return `Vec<String>` for testability and the
//! `print_*` wrapper writes to stdout. Format functions are pure: no I/O, no
//! side effects.

use crate::imaging::{ArtifactStatus, SizeOutcome};
use crate::process::{BatchReport, ProcessEvent};
use std::path::Path;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn format_size_outcome(outcome: &SizeOutcome) -> Vec<String> {
    let written: Vec<&str> = outcome
        .artifacts
        .iter()
        .filter(|a| a.is_written())
        .map(|a| a.format.extension())
        .collect();

    let mut lines = Vec::new();
    if written.is_empty() {
        lines.push(format!("    Failed: {}", outcome.filename_base));
    } else {
        lines.push(format!(
            "    Generated: {} ({})",
            outcome.filename_base,
            written.join(", ")
        ));
    }

    for artifact in &outcome.artifacts {
        match &artifact.status {
            ArtifactStatus::Written => {}
            ArtifactStatus::Degraded { error } => {
                lines.push(format!("        {} not generated: {}", artifact.format, error))
            }
            ArtifactStatus::Failed { error } => {
                lines.push(format!("        {} failed: {}", artifact.format, error))
            }
        }
    }
    lines
}

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::ImageStarted {
            source,
            base,
            dimensions: (width, height),
            mode,
        } => {
            let name = file_name(source);
            let mut lines = vec![format!("{name} ({width}x{height}, {mode})")];
            if Path::new(&name).file_stem().is_some_and(|s| s != base.as_str()) {
                lines.push(format!("    Output: {base}"));
            }
            lines
        }
        ProcessEvent::SizeCompleted(outcome) => format_size_outcome(outcome),
        ProcessEvent::ImageFailed { source, error } => {
            vec![file_name(source), format!("    Skipped: {error}")]
        }
    }
}

/// Format the closing summary line.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let mut line = format!(
        "All images processed: {} images, {} files written, {} failed, {} degraded",
        report.images.len(),
        report.written_count(),
        report.hard_failures().len(),
        report.soft_failures().len(),
    );
    let skipped = report.failed_images().len();
    if skipped > 0 {
        line.push_str(&format!(", {skipped} skipped"));
    }

    if report.images.is_empty() {
        vec!["No images found".to_string(), line]
    } else {
        vec![String::new(), line]
    }
}

pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{line}");
    }
}
