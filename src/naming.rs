//! Centralized naming rules for sources and generated variants.
//!
//! ## Sources
//!
//! Folder inputs only pick up files whose extension is one of
//! [`ACCEPTED_EXTENSIONS`], compared case-insensitively. A single-file input
//! is processed whatever its extension.
//!
//! ## Output base names
//!
//! | Input | Prefix | Base |
//! |---|---|---|
//! | file `dog.jpg` | none | `dog` |
//! | file `dog.jpg` | `gallery-dog` | `gallery-dog` |
//! | folder entry `dog.jpg` | none | `dog` |
//! | folder entry `dog.jpg` | `gallery` | `gallery-dog` |
//!
//! ## Variant file names
//!
//! `<base>-<width>x<height>.<ext>`, e.g. `dog-1120x640.webp`.

use std::path::Path;

/// Source extensions accepted when scanning a folder.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Whether a folder entry should be processed, judged by extension alone.
pub fn is_accepted_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// File name without its last extension: `imagen01-perroygato.jpg` → `imagen01-perroygato`.
pub fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Base name for a single-file input: the prefix replaces the stem.
pub fn file_output_base(stem: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => stem.to_string(),
    }
}

/// Base name for an entry of a folder input: the prefix is prepended.
pub fn folder_output_base(stem: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}-{stem}"),
        _ => stem.to_string(),
    }
}

/// Deterministic variant file name: `<base>-<width>x<height>.<ext>`.
pub fn variant_filename(base: &str, width: u32, height: u32, extension: &str) -> String {
    format!("{base}-{width}x{height}.{extension}")
}
