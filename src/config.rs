//! Generator configuration.
//!
//! Everything the generator needs to know besides its paths lives in one
//! immutable [`GeneratorConfig`] value that is passed explicitly into
//! [`process`](crate::process). Stock defaults reproduce the storefront's
//! card layout; a TOML file given with `--config` overrides any part of it.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [[sizes]]                        # Generation order = table order
//! name = "desktop"
//! width = 1120
//! height = 640
//! # ... desktop@2x 2240x1280, tablet 420x300, tablet@2x 840x600,
//! #     mobile 360x260, mobile@2x 720x520
//!
//! [quality]
//! jpeg = 85
//! webp = 80
//! avif = 45
//!
//! [positions]
//! default = "attention"            # Anchor for images not listed below
//! no_crop = []                     # Images fitted whole, letterboxed
//! background = "#FFD400"           # Letterbox color for no_crop images
//!
//! [positions.anchors]              # Per-image anchor, keyed by file stem
//! imagen01-perroygato = "south"
//! imagen02-max = "attention"
//! imagen03-perro-negro = "attention"
//!
//! [processing]
//! max_processes = 1                # Images processed at once (omit for 1)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Tables merge key by key over the stock defaults,
//! so adding one anchor keeps the stock ones; arrays (`sizes`, `no_crop`)
//! replace the stock value entirely. Unknown keys are rejected to catch
//! typos early.

use crate::imaging::{Color, CropAnchor, Qualities, Quality, ResizeMode, SizeSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Complete generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Target boxes, generated in this order.
    pub sizes: Vec<SizeSpec>,
    /// Encoding quality per format.
    pub quality: QualityConfig,
    /// Crop anchors and no-crop images.
    pub positions: PositionPolicy,
    /// Worker pool settings.
    pub processing: ProcessingConfig,
}

/// The stock size table: desktop, tablet and mobile cards at 1x and 2x.
pub fn stock_sizes() -> Vec<SizeSpec> {
    vec![
        SizeSpec::new("desktop", 1120, 640),
        SizeSpec::new("desktop@2x", 2240, 1280),
        SizeSpec::new("tablet", 420, 300),
        SizeSpec::new("tablet@2x", 840, 600),
        SizeSpec::new("mobile", 360, 260),
        SizeSpec::new("mobile@2x", 720, 520),
    ]
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sizes: stock_sizes(),
            quality: QualityConfig::default(),
            positions: PositionPolicy::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sizes.is_empty() {
            return Err(ConfigError::Validation("sizes must not be empty".into()));
        }
        for size in &self.sizes {
            if size.width == 0 || size.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "size '{}' must have non-zero width and height",
                    size.name
                )));
            }
        }
        for (format, value) in [
            ("jpeg", self.quality.jpeg),
            ("webp", self.quality.webp),
            ("avif", self.quality.avif),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "quality.{format} must be 1-100"
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Encoding quality per output format (1 = worst, 100 = best).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    pub jpeg: u32,
    pub webp: u32,
    pub avif: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            jpeg: 85,
            webp: 80,
            avif: 45,
        }
    }
}

impl QualityConfig {
    pub fn qualities(&self) -> Qualities {
        Qualities {
            jpeg: Quality::new(self.jpeg),
            webp: Quality::new(self.webp),
            avif: Quality::new(self.avif),
        }
    }
}

/// Per-image crop policy, keyed by source file stem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PositionPolicy {
    /// Anchor for images without an entry in `anchors`.
    pub default: CropAnchor,
    /// Explicit anchors.
    pub anchors: BTreeMap<String, CropAnchor>,
    /// Images that are never cropped; they are fitted and letterboxed.
    pub no_crop: BTreeSet<String>,
    /// Letterbox color for `no_crop` images.
    pub background: Color,
}

impl Default for PositionPolicy {
    fn default() -> Self {
        let anchors = [
            ("imagen01-perroygato", CropAnchor::South),
            ("imagen02-max", CropAnchor::Attention),
            ("imagen03-perro-negro", CropAnchor::Attention),
        ]
        .into_iter()
        .map(|(name, anchor)| (name.to_string(), anchor))
        .collect();

        Self {
            default: CropAnchor::Attention,
            anchors,
            no_crop: BTreeSet::new(),
            background: Color::rgb(0xFF, 0xD4, 0x00),
        }
    }
}

impl PositionPolicy {
    /// Resize mode for a source with the given file stem.
    ///
    /// The key is always the source's own stem; an output prefix never
    /// affects the lookup. `no_crop` wins over an explicit anchor.
    pub fn resolve(&self, stem: &str) -> ResizeMode {
        if self.no_crop.contains(stem) {
            return ResizeMode::Contain {
                background: self.background,
            };
        }
        let anchor = self.anchors.get(stem).copied().unwrap_or(self.default);
        ResizeMode::Cover { anchor }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of source images processed at once.
    /// When absent, images are processed one at a time.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → 1 (sequential)
/// - `Some(n)` → `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.clamp(1, cores)).unwrap_or(1)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GeneratorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GeneratorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GeneratorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config: stock defaults, overridden by `path` if given.
///
/// An explicitly named file that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `--gen-config` flag.
pub fn stock_config_toml() -> &'static str {
    r##"# generate-images configuration
# ============================
#
# Pass with: generate-images --config images.toml <input> <output> [prefix]
# Every key is optional. Tables merge over these defaults; arrays replace them.

# Target boxes, generated in this order. Each produces
# <base>-<width>x<height>.jpg, .webp and .avif.
[[sizes]]
name = "desktop"
width = 1120
height = 640

[[sizes]]
name = "desktop@2x"
width = 2240
height = 1280

[[sizes]]
name = "tablet"
width = 420
height = 300

[[sizes]]
name = "tablet@2x"
width = 840
height = 600

[[sizes]]
name = "mobile"
width = 360
height = 260

[[sizes]]
name = "mobile@2x"
width = 720
height = 520

# Encoding quality, 1 (worst) to 100 (best). AVIF is best-effort: if it
# fails, the JPEG and WebP variants are kept and a warning is logged.
[quality]
jpeg = 85
webp = 80
avif = 45

# Crop policy. Images are looked up by file name without extension.
#
# Anchors: attention (salient detail), entropy (busiest region), center,
# north, south, east, west, northeast, northwest, southeast, southwest.
[positions]
default = "attention"
# Images listed here are never cropped: the whole picture is fitted into
# the box and the remaining space is filled with `background`.
no_crop = []
background = "#FFD400"

[positions.anchors]
imagen01-perroygato = "south"
imagen02-max = "attention"
imagen03-perro-negro = "attention"

[processing]
# Number of source images processed at once (capped at CPU cores).
# Omit to process images one at a time.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_stock_sizes() {
        let config = GeneratorConfig::default();
        let dims: Vec<_> = config
            .sizes
            .iter()
            .map(|s| (s.name.as_str(), s.width, s.height))
            .collect();
        assert_eq!(
            dims,
            vec![
                ("desktop", 1120, 640),
                ("desktop@2x", 2240, 1280),
                ("tablet", 420, 300),
                ("tablet@2x", 840, 600),
                ("mobile", 360, 260),
                ("mobile@2x", 720, 520),
            ]
        );
    }

    #[test]
    fn default_qualities() {
        let q = GeneratorConfig::default().quality.qualities();
        assert_eq!((q.jpeg.value(), q.webp.value(), q.avif.value()), (85, 80, 45));
    }

    #[test]
    fn stock_policy_anchors_perroygato_south() {
        let policy = PositionPolicy::default();
        assert_eq!(
            policy.resolve("imagen01-perroygato"),
            ResizeMode::Cover {
                anchor: CropAnchor::South
            }
        );
    }

    #[test]
    fn unmapped_image_uses_attention_not_center() {
        let policy = PositionPolicy::default();
        assert_eq!(
            policy.resolve("some-new-dog"),
            ResizeMode::Cover {
                anchor: CropAnchor::Attention
            }
        );
    }

    #[test]
    fn no_crop_wins_over_anchor() {
        let mut policy = PositionPolicy::default();
        policy.no_crop.insert("imagen01-perroygato".into());
        assert_eq!(
            policy.resolve("imagen01-perroygato"),
            ResizeMode::Contain {
                background: Color::rgb(255, 212, 0)
            }
        );
    }

    #[test]
    fn stock_config_toml_matches_defaults() {
        let config: GeneratorConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn parse_partial_config_keeps_defaults() {
        let toml = r##"
[quality]
avif = 60
"##;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()))
            .unwrap();
        assert_eq!(config.quality.avif, 60);
        assert_eq!(config.quality.jpeg, 85);
        assert_eq!(config.sizes.len(), 6);
    }

    #[test]
    fn added_anchor_merges_with_stock_anchors() {
        let toml = r##"
[positions.anchors]
bowl-closeup = "north"
"##;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()))
            .unwrap();
        assert_eq!(config.positions.anchors.len(), 4);
        assert_eq!(
            config.positions.anchors.get("bowl-closeup"),
            Some(&CropAnchor::North)
        );
        assert_eq!(
            config.positions.anchors.get("imagen01-perroygato"),
            Some(&CropAnchor::South)
        );
    }

    #[test]
    fn sizes_array_replaces_stock_table() {
        let toml = r##"
[[sizes]]
name = "thumb"
width = 64
height = 48
"##;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()))
            .unwrap();
        assert_eq!(config.sizes, vec![SizeSpec::new("thumb", 64, 48)]);
    }

    #[test]
    fn parse_no_crop_and_background() {
        let toml = r##"
[positions]
default = "center"
no_crop = ["imagen02-max"]
background = "#fff"
"##;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()))
            .unwrap();
        assert_eq!(config.positions.default, CropAnchor::Center);
        assert_eq!(
            config.positions.resolve("imagen02-max"),
            ResizeMode::Contain {
                background: Color::rgb(255, 255, 255)
            }
        );
    }

    #[test]
    fn unknown_key_rejected() {
        let toml = r##"
[quality]
gif = 50
"##;
        let result = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()));
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_anchor_rejected() {
        let toml = r##"
[positions.anchors]
dog = "upside-down"
"##;
        let result = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_background_rejected() {
        let toml = r##"
[positions]
background = "yellow"
"##;
        let result = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap()));
        assert!(result.is_err());
    }

    #[test]
    fn validation_rejects_empty_sizes() {
        let config = GeneratorConfig {
            sizes: vec![],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validation_rejects_zero_dimension() {
        let config = GeneratorConfig {
            sizes: vec![SizeSpec::new("broken", 0, 100)],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validation_rejects_out_of_range_quality() {
        let mut config = GeneratorConfig::default();
        config.quality.webp = 101;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        config.quality.webp = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_without_file_is_stock() {
        assert_eq!(load_config(None).unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.toml");
        fs::write(&path, "[processing]\nmax_processes = 2\n").unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.processing.max_processes, Some(2));
    }

    #[test]
    fn load_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.toml");
        let result = load_config(Some(missing.as_path()));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(Some(path.as_path()));
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_defaults_to_sequential() {
        assert_eq!(effective_threads(&ProcessingConfig::default()), 1);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"quality = 90"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"quality = 70"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r#"
[positions.anchors]
a = "south"
b = "north"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[positions.anchors]
b = "east"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let anchors = &merged["positions"]["anchors"];
        assert_eq!(anchors["a"].as_str(), Some("south"));
        assert_eq!(anchors["b"].as_str(), Some("east"));
    }
}
