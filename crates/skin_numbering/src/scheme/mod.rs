//! Numbering schemes
//!
//! A scheme binds a set of fonts in a shared atlas to attach points on one
//! destination texture, together with the policy for generating numbers.
//! Schemes are read from a TOML/RON file ([`raw::RawScheme`]), validated once,
//! and treated as read-only afterwards.

pub mod font;
pub mod format;
pub mod raw;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::foundation::math::PixelSize;
use crate::sequencer::{NumberRange, MAX_SEQUENCE_LEN};

pub use font::{Color, ExtraCharacter, FontDefinition, GlyphMetrics, Orientation, DIGIT_GLYPHS};
pub use format::{FormatError, NumberFormat};
use raw::{RawAttachPoint, RawFont, RawScheme};

/// File name of the atlas image that sits beside a scheme file
pub const ATLAS_FILE_NAME: &str = "num.png";

/// File name of a scheme inside a skin folder
pub const SCHEME_FILE_NAME: &str = "numbering.toml";

/// How glyph color is composited onto the destination texture
///
/// The discriminant is the selector passed to the shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Alpha blend
    #[default]
    Normal = 0,
    /// Additive
    Add = 1,
    /// Subtractive
    Subtract = 2,
    /// Multiply
    Multiply = 3,
    /// Divide
    Divide = 4,
    /// Tint towards the glyph color, see `colorize_level`
    Colorize = 5,
}

impl BlendMode {
    /// Shader selector value
    pub const fn shader_index(self) -> i32 {
        self as i32
    }
}

/// Anchor of one number run on the destination texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachPoint {
    /// Index into the scheme's fonts; may be out of range, see [`NumberingScheme::font`]
    pub font_index: i32,
    /// Pixel X of the run center
    pub x: i32,
    /// Pixel Y of the run center, measured from the top
    pub y: i32,
}

impl From<RawAttachPoint> for AttachPoint {
    fn from(raw: RawAttachPoint) -> Self {
        Self {
            font_index: raw.font,
            x: raw.x,
            y: raw.y,
        }
    }
}

/// Scheme validation errors
///
/// Every variant names the offending field so skin authors can find it.
#[derive(Debug, thiserror::Error)]
pub enum SchemeError {
    /// A required field is absent
    #[error("{0} attribute cannot be null")]
    MissingField(String),

    /// Integer list did not parse
    #[error("{field} attribute is invalid integer list '{value}': {reason}")]
    InvalidIntList {
        /// Field path
        field: String,
        /// Raw text
        value: String,
        /// Parser message
        reason: String,
    },

    /// Color did not parse
    #[error("{field} attribute is invalid color '{value}': {reason}")]
    InvalidColor {
        /// Field path
        field: String,
        /// Raw text
        value: String,
        /// Parser message
        reason: String,
    },

    /// Digit list has the wrong number of entries
    #[error("{field} must list exactly {expected} digit entries, found {found}")]
    GlyphCount {
        /// Field path
        field: String,
        /// Required entry count
        expected: usize,
        /// Actual entry count
        found: usize,
    },

    /// Negative size
    #[error("{field} must not be negative, found {value}")]
    NegativeMetric {
        /// Field path
        field: String,
        /// Offending value
        value: i32,
    },

    /// Unusable format template
    #[error("{field} attribute is invalid format '{template}': {source}")]
    InvalidFormat {
        /// Field path
        field: String,
        /// Raw template
        template: String,
        /// Parser error
        source: FormatError,
    },

    /// `min_number > max_number`
    #[error("number range is empty: min_number {min} > max_number {max}")]
    InvalidRange {
        /// Lower bound
        min: i32,
        /// Upper bound
        max: i32,
    },

    /// Range too large to shuffle
    #[error("number range min_number {min}..max_number {max} holds more than {} numbers", MAX_SEQUENCE_LEN)]
    RangeTooLarge {
        /// Lower bound
        min: i32,
        /// Upper bound
        max: i32,
    },

    /// `colorize_level` outside `[0, 1]`
    #[error("colorize_level must be within [0, 1], found {0}")]
    InvalidColorizeLevel(f32),

    /// Atlas size neither in the file nor available from an image
    #[error("atlas size unknown for scheme {0}")]
    MissingAtlasSize(PathBuf),

    /// Zero-sized atlas
    #[error("atlas size must be non-zero, found {0}x{1}")]
    EmptyAtlas(u32, u32),

    /// Reading the file failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Validated numbering scheme
#[derive(Debug, Clone, PartialEq)]
pub struct NumberingScheme {
    /// Destination texture name
    pub target_surface_name: String,
    /// Compositing mode
    pub blend_mode: BlendMode,
    /// White level for [`BlendMode::Colorize`]
    pub colorize_level: f32,
    /// Smallest generated number
    pub min_number: i32,
    /// Largest generated number
    pub max_number: i32,
    /// Added to identifier-derived numbers
    pub offset: i32,
    /// Ignore identifiers and always draw random numbers
    pub force_random: bool,
    /// Fonts in index order
    pub fonts: Vec<FontDefinition>,
    /// Anchors in paint order
    pub attach_points: Vec<AttachPoint>,
    /// Atlas size in pixels
    pub atlas_size: PixelSize,
    /// Livery this scheme was loaded for
    pub livery_id: Option<String>,
    /// Skin this scheme was loaded for
    pub skin_name: Option<String>,
    /// Scheme ships with the mod rather than a skin
    pub is_default: bool,
}

impl NumberingScheme {
    /// Load and validate a scheme file
    ///
    /// When the file carries no atlas size, the dimensions of the
    /// [`ATLAS_FILE_NAME`] image next to it are used.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemeError> {
        let path = path.as_ref();
        let raw = RawScheme::load_from_file(path)?;

        let atlas_size = match (raw.atlas_width, raw.atlas_height) {
            (Some(w), Some(h)) => PixelSize::new(w, h),
            _ => {
                let image_path = path.with_file_name(ATLAS_FILE_NAME);
                let (w, h) = image::image_dimensions(&image_path)
                    .map_err(|_| SchemeError::MissingAtlasSize(path.to_path_buf()))?;
                log::debug!("Atlas size {}x{} read from {:?}", w, h, image_path);
                PixelSize::new(w, h)
            }
        };

        let scheme = Self::from_raw(raw, atlas_size)?;
        log::info!(
            "Loaded numbering scheme for '{}' from {:?}: {} fonts, {} attach points",
            scheme.target_surface_name,
            path,
            scheme.fonts.len(),
            scheme.attach_points.len()
        );
        Ok(scheme)
    }

    /// Validate a raw record against an atlas size
    pub fn from_raw(raw: RawScheme, atlas_size: PixelSize) -> Result<Self, SchemeError> {
        let target_surface_name = raw
            .target_texture
            .ok_or_else(|| SchemeError::MissingField("target_texture".to_string()))?;

        let fonts = raw
            .fonts
            .iter()
            .enumerate()
            .map(|(i, font)| font_from_raw(font, i))
            .collect::<Result<Vec<_>, _>>()?;

        let scheme = Self {
            target_surface_name,
            blend_mode: raw.blend_mode,
            colorize_level: raw.colorize_level,
            min_number: raw.min_number,
            max_number: raw.max_number,
            offset: raw.offset,
            force_random: raw.force_random,
            fonts,
            attach_points: raw.attach_points.into_iter().map(AttachPoint::from).collect(),
            atlas_size,
            livery_id: None,
            skin_name: None,
            is_default: false,
        };
        scheme.validate()?;
        Ok(scheme)
    }

    /// Check the number policy and atlas size
    pub fn validate(&self) -> Result<(), SchemeError> {
        if self.min_number > self.max_number {
            return Err(SchemeError::InvalidRange {
                min: self.min_number,
                max: self.max_number,
            });
        }
        let range = NumberRange {
            min: self.min_number,
            max: self.max_number,
        };
        if range.len() > MAX_SEQUENCE_LEN {
            return Err(SchemeError::RangeTooLarge {
                min: self.min_number,
                max: self.max_number,
            });
        }
        if !(0.0..=1.0).contains(&self.colorize_level) {
            return Err(SchemeError::InvalidColorizeLevel(self.colorize_level));
        }
        if self.atlas_size.x == 0 || self.atlas_size.y == 0 {
            return Err(SchemeError::EmptyAtlas(self.atlas_size.x, self.atlas_size.y));
        }
        Ok(())
    }

    /// Pack back into the on-disk record
    pub fn to_raw(&self) -> RawScheme {
        RawScheme {
            target_texture: Some(self.target_surface_name.clone()),
            blend_mode: self.blend_mode,
            colorize_level: self.colorize_level,
            min_number: self.min_number,
            max_number: self.max_number,
            offset: self.offset,
            force_random: self.force_random,
            atlas_width: Some(self.atlas_size.x),
            atlas_height: Some(self.atlas_size.y),
            fonts: self.fonts.iter().map(font_to_raw).collect(),
            attach_points: self
                .attach_points
                .iter()
                .map(|p| RawAttachPoint { font: p.font_index, x: p.x, y: p.y })
                .collect(),
        }
    }

    /// Write the scheme as TOML or RON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SchemeError> {
        self.to_raw().save_to_file(path)?;
        Ok(())
    }

    /// Font referenced by an attach point, `None` when the index is out of range
    pub fn font(&self, index: i32) -> Option<&FontDefinition> {
        usize::try_from(index).ok().and_then(|i| self.fonts.get(i))
    }

    /// Record which livery and skin the scheme belongs to
    #[must_use]
    pub fn with_owner(mut self, livery_id: impl Into<String>, skin_name: impl Into<String>) -> Self {
        self.livery_id = Some(livery_id.into());
        self.skin_name = Some(skin_name.into());
        self
    }
}

fn font_from_raw(raw: &RawFont, index: usize) -> Result<FontDefinition, SchemeError> {
    let field = |name: &str| format!("fonts[{index}].{name}");

    let widths = digit_list(raw.char_width.as_deref(), &field("char_width"))?;
    let xs = digit_list(raw.char_x.as_deref(), &field("char_x"))?;
    let ys = digit_list(raw.char_y.as_deref(), &field("char_y"))?;

    if raw.height < 0 {
        return Err(SchemeError::NegativeMetric { field: field("height"), value: raw.height });
    }
    if let Some(&width) = widths.iter().find(|w| **w < 0) {
        return Err(SchemeError::NegativeMetric { field: field("char_width"), value: width });
    }
    if let Some(extra) = raw.extra_chars.iter().find(|e| e.width < 0) {
        return Err(SchemeError::NegativeMetric { field: field("extra_chars.width"), value: extra.width });
    }

    let format = NumberFormat::parse(&raw.format).map_err(|source| SchemeError::InvalidFormat {
        field: field("format"),
        template: raw.format.clone(),
        source,
    })?;

    let mut digits = [GlyphMetrics::default(); DIGIT_GLYPHS];
    for (i, digit) in digits.iter_mut().enumerate() {
        *digit = GlyphMetrics { x: xs[i], y: ys[i], width: widths[i] };
    }

    let font = FontDefinition::new(
        raw.height,
        raw.orientation,
        raw.kerning,
        raw.reverse_digits,
        format,
        digits,
        raw.extra_chars.clone(),
    )
    .with_emission(raw::parse_color(raw.emission.as_deref(), &field("emission"))?)
    .with_specular(raw::parse_color(raw.specular.as_deref(), &field("specular"))?);

    Ok(font)
}

fn digit_list(value: Option<&str>, field: &str) -> Result<Vec<i32>, SchemeError> {
    let values = raw::parse_int_list(value, field)?;
    if values.len() != DIGIT_GLYPHS {
        return Err(SchemeError::GlyphCount {
            field: field.to_string(),
            expected: DIGIT_GLYPHS,
            found: values.len(),
        });
    }
    Ok(values)
}

fn font_to_raw(font: &FontDefinition) -> RawFont {
    let digits = &font.glyphs()[..DIGIT_GLYPHS];
    RawFont {
        height: font.height,
        orientation: font.orientation,
        kerning: font.kerning,
        reverse_digits: font.reverse_digits,
        format: font.format.template().to_string(),
        char_width: Some(raw::pack_int_list(digits.iter().map(|g| g.width))),
        char_x: Some(raw::pack_int_list(digits.iter().map(|g| g.x))),
        char_y: Some(raw::pack_int_list(digits.iter().map(|g| g.y))),
        emission: raw::pack_color(font.emission_color),
        specular: raw::pack_color(font.specular_color),
        extra_chars: font.extra_characters().to_vec(),
    }
}
