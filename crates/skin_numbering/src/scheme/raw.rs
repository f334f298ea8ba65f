//! On-disk schema of a numbering scheme file
//!
//! These records mirror the file one-to-one. Integer lists and colors are kept
//! as the comma-separated strings skin authors write; [`super::NumberingScheme`]
//! validates them on conversion and packs them back when saving.

use serde::{Deserialize, Serialize};

use super::font::{Color, ExtraCharacter, Orientation};
use super::{BlendMode, SchemeError};
use crate::config::Config;

/// Scheme file root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScheme {
    /// Texture the numbers are painted onto
    pub target_texture: Option<String>,
    /// Compositing mode
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// White level for [`BlendMode::Colorize`]
    #[serde(default = "default_colorize_level")]
    pub colorize_level: f32,
    /// Smallest generated number
    #[serde(default = "default_min_number")]
    pub min_number: i32,
    /// Largest generated number
    #[serde(default = "default_max_number")]
    pub max_number: i32,
    /// Added to identifier-derived numbers
    #[serde(default)]
    pub offset: i32,
    /// Always draw from the random sequence
    #[serde(default)]
    pub force_random: bool,
    /// Atlas width written by the atlas tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atlas_width: Option<u32>,
    /// Atlas height written by the atlas tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atlas_height: Option<u32>,
    /// Fonts in index order
    #[serde(default)]
    pub fonts: Vec<RawFont>,
    /// Anchors in paint order
    #[serde(default)]
    pub attach_points: Vec<RawAttachPoint>,
}

impl Config for RawScheme {}

pub(crate) const fn default_colorize_level() -> f32 {
    0.5
}

pub(crate) const fn default_min_number() -> i32 {
    1
}

pub(crate) const fn default_max_number() -> i32 {
    9999
}

fn default_format() -> String {
    super::format::NumberFormat::DEFAULT_TEMPLATE.to_string()
}

/// Font record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFont {
    /// Row height in pixels
    pub height: i32,
    /// Layout axis
    #[serde(default)]
    pub orientation: Orientation,
    /// Gap between glyphs
    #[serde(default)]
    pub kerning: i32,
    /// Reverse digit order
    #[serde(default)]
    pub reverse_digits: bool,
    /// Display template
    #[serde(default = "default_format")]
    pub format: String,
    /// Comma-separated digit widths
    pub char_width: Option<String>,
    /// Comma-separated digit X origins
    pub char_x: Option<String>,
    /// Comma-separated digit Y origins
    pub char_y: Option<String>,
    /// `r, g, b[, a]` glow color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission: Option<String>,
    /// `r, g, b[, a]` metallic/smoothness color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specular: Option<String>,
    /// Non-digit glyphs
    #[serde(default)]
    pub extra_chars: Vec<ExtraCharacter>,
}

/// Attach point record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttachPoint {
    /// Index into `fonts`
    pub font: i32,
    /// Destination X in pixels
    pub x: i32,
    /// Destination Y in pixels, measured from the top
    pub y: i32,
}

/// Parse a comma-separated integer list
pub fn parse_int_list(value: Option<&str>, field: &str) -> Result<Vec<i32>, SchemeError> {
    let value = value.ok_or_else(|| SchemeError::MissingField(field.to_string()))?;
    value
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SchemeError::InvalidIntList {
            field: field.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Parse an optional `r, g, b` or `r, g, b, a` color
pub fn parse_color(value: Option<&str>, field: &str) -> Result<Option<Color>, SchemeError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let invalid = |reason: String| SchemeError::InvalidColor {
        field: field.to_string(),
        value: value.to_string(),
        reason,
    };

    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| invalid(e.to_string()))?;

    match parts.as_slice() {
        [r, g, b] => Ok(Some([*r, *g, *b, 1.0])),
        [r, g, b, a] => Ok(Some([*r, *g, *b, *a])),
        _ => Err(invalid(format!("expected 3 or 4 components, found {}", parts.len()))),
    }
}

/// Pack integers back into the comma-separated form
pub fn pack_int_list(values: impl IntoIterator<Item = i32>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Pack a color with three decimals per component
pub fn pack_color(color: Option<Color>) -> Option<String> {
    color.map(|[r, g, b, a]| format!("{r:.3}, {g:.3}, {b:.3}, {a:.3}"))
}
