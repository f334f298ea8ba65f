//! Number layout
//!
//! Converts a number and a [`NumberingScheme`] into per-digit rectangles on the
//! destination texture and in the font atlas. This runs every time a number is
//! applied, so it only reads the scheme and allocates one small vector.
//!
//! ## Coordinate System
//!
//! - Schemes store pixel positions with the origin at the top-left
//! - Output rectangles are normalized UVs with the origin at the bottom-left
//! - Rectangles are `(left, bottom, right, top)`

pub mod shader_params;

use crate::foundation::math::{PixelSize, UvRect, Vec2};
use crate::scheme::{AttachPoint, Color, FontDefinition, GlyphMetrics, NumberingScheme, Orientation};

pub use shader_params::ShaderParams;

/// Digit slots available in the shader
pub const MAX_DIGITS: usize = 32;

/// Placement of one glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DigitQuad {
    /// Where the glyph paints on the destination texture
    pub bounds: UvRect,
    /// Where the glyph's pixels live in the atlas
    pub source: UvRect,
    /// Glow color when the font defines one
    pub emission: Option<Color>,
    /// Metallic/smoothness override when the font defines one
    pub specular: Option<Color>,
}

/// Result of laying out one number
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLayout {
    /// Glyphs in attach point order, never more than [`MAX_DIGITS`]
    pub digits: Vec<DigitQuad>,
    /// Destination size divided by atlas size, maps destination UVs to atlas UVs
    pub font_transform: Vec2,
}

impl NumberLayout {
    /// Total digits across all attach points
    pub fn digit_count(&self) -> usize {
        self.digits.len()
    }
}

/// Stateless layout engine
pub struct GlyphLayoutEngine;

impl GlyphLayoutEngine {
    /// Lay out `number` on a destination surface of the given pixel size
    ///
    /// Attach points with an invalid font index are skipped. When an attach
    /// point would push the total past [`MAX_DIGITS`], it and every later
    /// attach point are dropped; digits already placed are kept.
    pub fn layout(scheme: &NumberingScheme, number: i32, surface_width: u32, surface_height: u32) -> NumberLayout {
        let surface = PixelSize::new(surface_width, surface_height);
        let mut digits = Vec::with_capacity(MAX_DIGITS);

        for point in &scheme.attach_points {
            let Some(font) = scheme.font(point.font_index) else {
                log::warn!("Invalid numbering font index {}", point.font_index);
                continue;
            };

            let glyphs = font.glyph_indices(i64::from(number));
            if digits.len() + glyphs.len() > MAX_DIGITS {
                log::warn!(
                    "Maximum number of digits exceeded in numbering scheme for '{}'",
                    scheme.target_surface_name
                );
                break;
            }

            Self::layout_run(font, point, &glyphs, surface, scheme.atlas_size, &mut digits);
        }

        let font_transform = Vec2::new(
            surface.x as f32 / scheme.atlas_size.x as f32,
            surface.y as f32 / scheme.atlas_size.y as f32,
        );

        log::debug!(
            "Laid out number {} on '{}': {} digits",
            number,
            scheme.target_surface_name,
            digits.len()
        );

        NumberLayout { digits, font_transform }
    }

    /// Place one run of glyphs centered on an attach point
    fn layout_run(
        font: &FontDefinition,
        point: &AttachPoint,
        glyphs: &[usize],
        surface: PixelSize,
        atlas: PixelSize,
        out: &mut Vec<DigitQuad>,
    ) {
        let extent = font.run_extent(glyphs);
        // Configuration Y is measured from the top, UV space from the bottom
        let flipped_y = surface.y as i32 - point.y;

        let (mut main_start, trans_start) = match font.orientation {
            Orientation::Horizontal => (point.x - extent / 2, flipped_y - font.height / 2),
            Orientation::Vertical => (flipped_y - extent / 2, point.x - font.height / 2),
        };
        let trans_end = trans_start + font.height;

        for &index in glyphs {
            let glyph = font.glyph(index);
            let main_end = main_start + glyph.width;

            let bounds = match font.orientation {
                Orientation::Horizontal => UvRect::from_pixels(main_start, trans_start, main_end, trans_end, surface),
                Orientation::Vertical => UvRect::from_pixels(trans_start, main_start, trans_end, main_end, surface),
            };

            out.push(DigitQuad {
                bounds,
                source: Self::source_rect(font, glyph, atlas),
                emission: font.emission_color,
                specular: font.specular_color,
            });

            main_start = main_end + font.kerning;
        }
    }

    /// Atlas rectangle of a glyph
    ///
    /// Vertical fonts are stored rotated, so their atlas footprint is
    /// `height` wide and `width` tall.
    fn source_rect(font: &FontDefinition, glyph: GlyphMetrics, atlas: PixelSize) -> UvRect {
        let (footprint_w, footprint_h) = match font.orientation {
            Orientation::Horizontal => (glyph.width, font.height),
            Orientation::Vertical => (font.height, glyph.width),
        };
        let top = atlas.y as i32 - glyph.y;
        UvRect::from_pixels(glyph.x, top - footprint_h, glyph.x + footprint_w, top, atlas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::{BlendMode, ExtraCharacter, NumberFormat, DIGIT_GLYPHS};
    use approx::assert_relative_eq;

    fn font(orientation: Orientation, format: &str) -> FontDefinition {
        let mut digits = [GlyphMetrics::default(); DIGIT_GLYPHS];
        for (i, digit) in digits.iter_mut().enumerate() {
            *digit = GlyphMetrics { x: i as i32 * 12, y: 20, width: 10 };
        }
        FontDefinition::new(
            20,
            orientation,
            2,
            false,
            NumberFormat::parse(format).unwrap(),
            digits,
            vec![ExtraCharacter { symbol: '-', x: 120, y: 20, width: 4 }],
        )
    }

    fn scheme(fonts: Vec<FontDefinition>, points: Vec<AttachPoint>) -> NumberingScheme {
        NumberingScheme {
            target_surface_name: "body".to_string(),
            blend_mode: BlendMode::Normal,
            colorize_level: 0.5,
            min_number: 1,
            max_number: 9999,
            offset: 0,
            force_random: false,
            fonts,
            attach_points: points,
            atlas_size: PixelSize::new(256, 64),
            livery_id: None,
            skin_name: None,
            is_default: false,
        }
    }

    fn point(font_index: i32, x: i32, y: i32) -> AttachPoint {
        AttachPoint { font_index, x, y }
    }

    #[test]
    fn test_horizontal_run_is_centered() {
        let scheme = scheme(vec![font(Orientation::Horizontal, "{0}")], vec![point(0, 100, 50)]);
        let layout = GlyphLayoutEngine::layout(&scheme, 42, 200, 100);

        assert_eq!(layout.digit_count(), 2);
        let first = layout.digits[0].bounds;
        let second = layout.digits[1].bounds;

        // Extent 10 + 2 + 10 = 22, so the run starts at 100 - 11
        assert_relative_eq!(first.left * 200.0, 89.0, epsilon = 1e-4);
        assert_relative_eq!(first.right * 200.0, 99.0, epsilon = 1e-4);
        assert_relative_eq!(second.left * 200.0, 101.0, epsilon = 1e-4);
        assert_relative_eq!(second.right * 200.0, 111.0, epsilon = 1e-4);

        // Transverse span centered on the flipped Y: (100 - 50) -/+ 10
        assert_relative_eq!(first.bottom * 100.0, 40.0, epsilon = 1e-4);
        assert_relative_eq!(first.top * 100.0, 60.0, epsilon = 1e-4);
    }

    #[test]
    fn test_source_rect_flips_y() {
        let scheme = scheme(vec![font(Orientation::Horizontal, "{0}")], vec![point(0, 100, 50)]);
        let layout = GlyphLayoutEngine::layout(&scheme, 4, 200, 100);
        let source = layout.digits[0].source;

        // Digit 4 lives at (48, 20) top-left in a 256x64 atlas, 10x20 pixels
        assert_relative_eq!(source.left * 256.0, 48.0, epsilon = 1e-4);
        assert_relative_eq!(source.right * 256.0, 58.0, epsilon = 1e-4);
        assert_relative_eq!(source.top * 64.0, 44.0, epsilon = 1e-4);
        assert_relative_eq!(source.bottom * 64.0, 24.0, epsilon = 1e-4);
    }

    #[test]
    fn test_vertical_run_uses_y_as_main_axis() {
        let scheme = scheme(vec![font(Orientation::Vertical, "{0}")], vec![point(0, 100, 50)]);
        let layout = GlyphLayoutEngine::layout(&scheme, 42, 200, 100);
        let first = layout.digits[0].bounds;
        let second = layout.digits[1].bounds;

        // Main axis starts at (100 - 50) - 11 and runs upwards
        assert_relative_eq!(first.bottom * 100.0, 39.0, epsilon = 1e-4);
        assert_relative_eq!(first.top * 100.0, 49.0, epsilon = 1e-4);
        assert_relative_eq!(second.bottom * 100.0, 51.0, epsilon = 1e-4);
        // Transverse axis is X: 100 -/+ 10
        assert_relative_eq!(first.left * 200.0, 90.0, epsilon = 1e-4);
        assert_relative_eq!(first.right * 200.0, 110.0, epsilon = 1e-4);

        // Rotated glyphs are `height` wide and `width` tall in the atlas
        let source = layout.digits[0].source;
        assert_relative_eq!(source.width() * 256.0, 20.0, epsilon = 1e-4);
        assert_relative_eq!(source.height() * 64.0, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_reversed_font_starts_with_last_character() {
        let mut reversed = font(Orientation::Horizontal, "{0}-");
        reversed.reverse_digits = true;
        let scheme = scheme(vec![reversed], vec![point(0, 100, 50)]);
        let layout = GlyphLayoutEngine::layout(&scheme, 42, 200, 100);
        assert_eq!(layout.digit_count(), 3);

        // "42-" drawn as "-", "2", "4"; extent 4 + 2 + 10 + 2 + 10 = 28
        let lefts: Vec<f32> = layout.digits.iter().map(|d| d.bounds.left * 200.0).collect();
        let sources: Vec<f32> = layout.digits.iter().map(|d| d.source.left * 256.0).collect();
        for (actual, expected) in lefts.iter().zip([86.0, 92.0, 104.0]) {
            assert_relative_eq!(*actual, expected, epsilon = 1e-4);
        }
        for (actual, expected) in sources.iter().zip([120.0, 24.0, 48.0]) {
            assert_relative_eq!(*actual, expected, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_extra_characters_and_kerning() {
        let scheme = scheme(vec![font(Orientation::Horizontal, "{0}-")], vec![point(0, 100, 50)]);
        let layout = GlyphLayoutEngine::layout(&scheme, 7, 200, 100);
        assert_eq!(layout.digit_count(), 2);
        // Extent 10 + 2 + 4 = 16
        assert_relative_eq!(layout.digits[0].bounds.left * 200.0, 92.0, epsilon = 1e-4);
        assert_relative_eq!(layout.digits[1].bounds.left * 200.0, 104.0, epsilon = 1e-4);
        assert_relative_eq!(layout.digits[1].source.left * 256.0, 120.0, epsilon = 1e-4);
    }

    #[test]
    fn test_invalid_font_index_is_isolated() {
        let scheme = scheme(
            vec![font(Orientation::Horizontal, "{0}")],
            vec![point(3, 10, 10), point(-1, 10, 10), point(0, 100, 50)],
        );
        let layout = GlyphLayoutEngine::layout(&scheme, 123, 200, 100);
        assert_eq!(layout.digit_count(), 3);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let points = (0..20).map(|i| point(0, 10 * i, 50)).collect();
        let scheme = scheme(vec![font(Orientation::Horizontal, "{0:D3}")], points);
        let layout = GlyphLayoutEngine::layout(&scheme, 5, 200, 100);
        // Ten runs of three fit, the eleventh would overflow
        assert_eq!(layout.digit_count(), 30);
        assert!(layout.digit_count() <= MAX_DIGITS);
    }

    #[test]
    fn test_overflow_stops_later_points() {
        let points = vec![point(0, 10, 50), point(1, 10, 50), point(0, 10, 50)];
        let scheme = scheme(
            vec![font(Orientation::Horizontal, "{0:D30}"), font(Orientation::Horizontal, "{0:D5}")],
            points,
        );
        let layout = GlyphLayoutEngine::layout(&scheme, 1, 200, 100);
        // 30 fit, 5 more would overflow; processing stops instead of trying the third point
        assert_eq!(layout.digit_count(), 30);
    }

    #[test]
    fn test_colors_and_transform() {
        let colored = font(Orientation::Horizontal, "{0}").with_emission(Some([1.0, 0.0, 0.0, 1.0]));
        let scheme = scheme(vec![colored], vec![point(0, 100, 50)]);
        let layout = GlyphLayoutEngine::layout(&scheme, 9, 512, 128);
        assert_eq!(layout.digits[0].emission, Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(layout.digits[0].specular, None);
        assert_relative_eq!(layout.font_transform.x, 2.0);
        assert_relative_eq!(layout.font_transform.y, 2.0);
    }
}
