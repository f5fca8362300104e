//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides which variants to create) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100). Clamped on construction.
//! - [`Qualities`]: One quality per [`OutputFormat`].
//! - [`OutputFormat`]: JPEG, WebP, AVIF, in generation order. AVIF is optional.
//! - [`CropAnchor`]: Which part of the image survives a cover crop.
//! - [`ResizeMode`]: Cover-and-crop at an anchor, or contain with a letterbox color.
//! - [`SizeSpec`]: A named target width/height.
//! - [`VariantParams`]: Full specification for one output artifact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Encoding quality per output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Qualities {
    pub jpeg: Quality,
    pub webp: Quality,
    pub avif: Quality,
}

impl Qualities {
    pub fn for_format(&self, format: OutputFormat) -> Quality {
        match format {
            OutputFormat::Jpeg => self.jpeg,
            OutputFormat::WebP => self.webp,
            OutputFormat::Avif => self.avif,
        }
    }
}

impl Default for Qualities {
    fn default() -> Self {
        Self {
            jpeg: Quality::new(85),
            webp: Quality::new(80),
            avif: Quality::new(45),
        }
    }
}

/// Encoded output format of a generated variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    WebP,
    Avif,
}

impl OutputFormat {
    /// Every format, in the order variants are generated.
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Jpeg, OutputFormat::WebP, OutputFormat::Avif];

    /// File extension used in output names.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
            OutputFormat::Avif => "avif",
        }
    }

    /// Optional formats are best-effort: a failure degrades the variant
    /// instead of failing it.
    pub fn is_optional(self) -> bool {
        matches!(self, OutputFormat::Avif)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Crop anchor for cover resizes.
///
/// Gravity anchors pin the crop window to an edge, a corner or the middle.
/// `Attention` and `Entropy` look at the pixels to decide (see
/// [`smartcrop`](super::smartcrop)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropAnchor {
    Attention,
    Entropy,
    Center,
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl CropAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            CropAnchor::Attention => "attention",
            CropAnchor::Entropy => "entropy",
            CropAnchor::Center => "center",
            CropAnchor::North => "north",
            CropAnchor::South => "south",
            CropAnchor::East => "east",
            CropAnchor::West => "west",
            CropAnchor::NorthEast => "northeast",
            CropAnchor::NorthWest => "northwest",
            CropAnchor::SouthEast => "southeast",
            CropAnchor::SouthWest => "southwest",
        }
    }
}

impl fmt::Display for CropAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque RGB color, written as `#RRGGBB` (or shorthand `#RGB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("color must start with '#': {s:?}"))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid hex color: {s:?}"));
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|e| e.to_string());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(format!("hex color must have 3 or 6 digits: {s:?}")),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// How a source is fitted into a target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResizeMode {
    /// Scale to cover the box, then crop the overflow at `anchor`.
    Cover { anchor: CropAnchor },
    /// Scale to fit inside the box and pad the rest with `background`.
    Contain { background: Color },
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeMode::Cover { anchor } => write!(f, "cover, anchor {anchor}"),
            ResizeMode::Contain { background } => write!(f, "contain on {background}"),
        }
    }
}

/// A named target box, e.g. `desktop@2x` at 2240x1280.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeSpec {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl SizeSpec {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
        }
    }
}

/// Parameters for producing one output artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
    pub mode: ResizeMode,
}
