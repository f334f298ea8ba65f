//! Per-character geometry of one number font

use serde::{Deserialize, Serialize};

use super::format::NumberFormat;

/// Number of decimal digit glyphs at the start of every font
pub const DIGIT_GLYPHS: usize = 10;

/// RGBA color as used by the shader
pub type Color = [f32; 4];

/// Axis along which digits are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Digits advance along X
    #[default]
    Horizontal,
    /// Digits advance along Y
    Vertical,
}

/// Non-digit glyph appended after the ten digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraCharacter {
    /// Character this glyph renders
    #[serde(rename = "char")]
    pub symbol: char,
    /// Atlas X of the glyph's top-left corner
    pub x: i32,
    /// Atlas Y of the glyph's top-left corner (top-left origin)
    pub y: i32,
    /// Glyph width along the main axis
    pub width: i32,
}

/// Atlas placement of a single glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    /// Atlas X of the top-left corner
    pub x: i32,
    /// Atlas Y of the top-left corner (top-left origin)
    pub y: i32,
    /// Extent along the main axis
    pub width: i32,
}

/// Immutable geometry for one font variant in the atlas
///
/// Glyph `0..10` are the digits, glyph `10 + i` is `extra_characters[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDefinition {
    /// Pixel height of the character row (transverse extent)
    pub height: i32,
    /// Layout axis
    pub orientation: Orientation,
    /// Extra pixels between consecutive glyphs
    pub kerning: i32,
    /// Emit digits last-to-first (mirrored atlases)
    pub reverse_digits: bool,
    /// Display template
    pub format: NumberFormat,
    /// Optional glow color
    pub emission_color: Option<Color>,
    /// Optional metallic/smoothness override
    pub specular_color: Option<Color>,
    glyphs: Vec<GlyphMetrics>,
    extra_characters: Vec<ExtraCharacter>,
}

impl FontDefinition {
    /// Assemble a font from its digit metrics and extra characters
    ///
    /// Extra characters are appended after the digits, so the glyph table
    /// always holds `10 + extra_characters.len()` entries.
    pub fn new(
        height: i32,
        orientation: Orientation,
        kerning: i32,
        reverse_digits: bool,
        format: NumberFormat,
        digits: [GlyphMetrics; DIGIT_GLYPHS],
        extra_characters: Vec<ExtraCharacter>,
    ) -> Self {
        let glyphs = digits
            .into_iter()
            .chain(extra_characters.iter().map(|extra| GlyphMetrics {
                x: extra.x,
                y: extra.y,
                width: extra.width,
            }))
            .collect();

        Self {
            height,
            orientation,
            kerning,
            reverse_digits,
            format,
            emission_color: None,
            specular_color: None,
            glyphs,
            extra_characters,
        }
    }

    /// Font with every glyph at the origin and zero size
    ///
    /// Stands in for a font the atlas builder could not render.
    pub fn placeholder(extra_symbols: &str) -> Self {
        let extras = extra_symbols
            .chars()
            .map(|symbol| ExtraCharacter { symbol, x: 0, y: 0, width: 0 })
            .collect();
        Self::new(
            0,
            Orientation::Horizontal,
            0,
            false,
            NumberFormat::default(),
            [GlyphMetrics::default(); DIGIT_GLYPHS],
            extras,
        )
    }

    /// Set the emission color
    #[must_use]
    pub const fn with_emission(mut self, color: Option<Color>) -> Self {
        self.emission_color = color;
        self
    }

    /// Set the specular color
    #[must_use]
    pub const fn with_specular(mut self, color: Option<Color>) -> Self {
        self.specular_color = color;
        self
    }

    /// All glyphs, digits first
    pub fn glyphs(&self) -> &[GlyphMetrics] {
        &self.glyphs
    }

    /// Glyph by index; indices past the table fall back to digit zero
    pub fn glyph(&self, index: usize) -> GlyphMetrics {
        self.glyphs.get(index).copied().unwrap_or(self.glyphs[0])
    }

    /// Extra (non-digit) characters in glyph order
    pub fn extra_characters(&self) -> &[ExtraCharacter] {
        &self.extra_characters
    }

    /// Glyph index for one formatted character
    ///
    /// Digits map to 0-9, extra characters to `10 + position`, anything
    /// else to glyph 0.
    pub fn glyph_index(&self, c: char) -> usize {
        if let Some(digit) = c.to_digit(10) {
            return digit as usize;
        }
        self.extra_characters
            .iter()
            .position(|extra| extra.symbol == c)
            .map_or(0, |i| DIGIT_GLYPHS + i)
    }

    /// Format a number and decode it into glyph indices, in layout order
    pub fn glyph_indices(&self, number: i64) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .format
            .apply(number)
            .chars()
            .map(|c| self.glyph_index(c))
            .collect();
        if self.reverse_digits {
            indices.reverse();
        }
        indices
    }

    /// Length of a run along the main axis: widths plus kerning between glyphs
    pub fn run_extent(&self, indices: &[usize]) -> i32 {
        let widths: i32 = indices.iter().map(|&i| self.glyph(i).width).sum();
        let gaps = indices.len().saturating_sub(1) as i32;
        widths + self.kerning * gaps
    }
}
