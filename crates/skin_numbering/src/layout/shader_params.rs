//! Shader parameter block for the numbering surface shader
//!
//! The layout is fixed-size so it can be uploaded as a single uniform block.
//! Property names match the numbering shader's uniforms.

use super::{NumberLayout, MAX_DIGITS};
use crate::scheme::NumberingScheme;

/// Shader property names
pub mod property {
    /// Destination texture
    pub const MAIN_TEXTURE: &str = "_MainTex";
    /// Font atlas texture
    pub const FONT_TEXTURE: &str = "_FontTex";
    /// Number of valid digit slots
    pub const NUM_DIGITS: &str = "_NDigits";
    /// Destination rectangles
    pub const DIGIT_BOUNDS: &str = "_DigitBounds";
    /// Atlas rectangles
    pub const DIGIT_UV: &str = "_DigitUV";
    /// Destination-to-atlas UV scale
    pub const FONT_TRANSFORM: &str = "_FontTransform";
    /// Blend mode selector
    pub const BLEND_MODE: &str = "_BlendMode";
    /// Per-digit emission colors
    pub const FONT_EMISSION: &str = "_FontEmission";
    /// Per-digit emission flags
    pub const USE_EMISSION: &str = "_UseFEmit";
    /// Per-digit specular colors
    pub const FONT_SPECULAR: &str = "_FontSpecular";
    /// Per-digit specular flags
    pub const USE_SPECULAR: &str = "_UseFSpec";
    /// Colorize white level
    pub const COLORIZE_WHITE_LEVEL: &str = "_ColorizeWhiteLvl";
}

/// Uniform data handed to the renderer
///
/// Slots past `digit_count` are zeroed.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderParams {
    /// Destination rectangles (left, bottom, right, top)
    pub digit_bounds: [[f32; 4]; MAX_DIGITS],
    /// Atlas rectangles (left, bottom, right, top)
    pub digit_uv: [[f32; 4]; MAX_DIGITS],
    /// Emission colors
    pub emission: [[f32; 4]; MAX_DIGITS],
    /// Specular colors
    pub specular: [[f32; 4]; MAX_DIGITS],
    /// 1.0 where the digit uses its emission color
    pub use_emission: [f32; MAX_DIGITS],
    /// 1.0 where the digit uses its specular color
    pub use_specular: [f32; MAX_DIGITS],
    /// Destination size / atlas size
    pub font_transform: [f32; 2],
    /// Valid digit slots
    pub digit_count: i32,
    /// [`crate::scheme::BlendMode`] selector
    pub blend_mode: i32,
    /// White level used by the colorize blend mode
    pub colorize_level: f32,
    /// Padding to a 16-byte multiple
    pub _padding: [f32; 3],
}

impl ShaderParams {
    /// Pack a layout together with the scheme's blend settings
    pub fn from_layout(scheme: &NumberingScheme, layout: &NumberLayout) -> Self {
        let mut params: Self = bytemuck::Zeroable::zeroed();

        for (slot, digit) in layout.digits.iter().take(MAX_DIGITS).enumerate() {
            params.digit_bounds[slot] = digit.bounds.to_array();
            params.digit_uv[slot] = digit.source.to_array();

            if let Some(color) = digit.emission {
                params.emission[slot] = color;
                params.use_emission[slot] = 1.0;
            }
            if let Some(color) = digit.specular {
                params.specular[slot] = color;
                params.use_specular[slot] = 1.0;
            }
        }

        params.digit_count = layout.digit_count().min(MAX_DIGITS) as i32;
        params.font_transform = [layout.font_transform.x, layout.font_transform.y];
        params.blend_mode = scheme.blend_mode.shader_index();
        params.colorize_level = scheme.colorize_level;
        params
    }

    /// Raw bytes for a uniform buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for ShaderParams {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}
