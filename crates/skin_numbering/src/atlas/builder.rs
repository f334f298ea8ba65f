//! Offline font atlas construction
//!
//! Every font is first rendered into its own sub-atlas: digits and extra
//! characters are rasterized with `fontdue` at [`SUPER_SCALE`] times the point
//! size, laid out in a single row of equal-height cells and downscaled. The
//! sub-atlas is then rotated/mirrored for its [`AtlasRotation`], and all
//! sub-atlases are packed into one image.
//!
//! Glyph metrics written to the [`FontDefinition`]s include a
//! [`GLYPH_PADDING`] border around every glyph cell.

use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use image::{imageops, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::packer::{PackedRect, ShelfPacker};
use super::rotation::AtlasRotation;
use crate::foundation::math::PixelSize;
use crate::scheme::raw::RawAttachPoint;
use crate::scheme::{
    AttachPoint, BlendMode, Color, ExtraCharacter, FontDefinition, FormatError, GlyphMetrics, NumberFormat,
    NumberingScheme, SchemeError, DIGIT_GLYPHS,
};

/// Rasterization scale relative to the final atlas
pub const SUPER_SCALE: u32 = 4;

/// Border added around every glyph cell in the written metrics
pub const GLYPH_PADDING: i32 = 1;

/// Default soft width limit of the packed atlas
pub const DEFAULT_MAX_WIDTH: u32 = 2048;

/// Cells must be far enough apart that padded glyph rects never overlap
const MIN_CELL_SPACING: u32 = 2;

const DIGITS: &str = "0123456789";

/// Atlas building errors
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    /// Font file could not be read
    #[error("failed to read font {path:?}: {source}")]
    FontRead {
        /// Font file
        path: PathBuf,
        /// IO error
        source: std::io::Error,
    },

    /// Font data could not be parsed
    #[error("failed to parse font {path:?}: {reason}")]
    FontParse {
        /// Font file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Point size of zero
    #[error("point size must be non-zero")]
    ZeroPointSize,

    /// Face lacks a required character
    #[error("font has no glyph for '{0}'")]
    MissingGlyph(char),

    /// Unusable format template
    #[error("invalid format '{template}': {source}")]
    InvalidFormat {
        /// Raw template
        template: String,
        /// Parser error
        source: FormatError,
    },

    /// Writing output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding failed
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Generated scheme did not validate
    #[error(transparent)]
    Scheme(#[from] SchemeError),
}

/// Metallic/smoothness override
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Specular {
    /// Metallic factor, 0..1
    pub metallic: f32,
    /// Smoothness factor, 0..1
    pub smoothness: f32,
}

impl Specular {
    /// Shader color: metallic in red, smoothness in alpha
    pub const fn color(self) -> Color {
        [self.metallic, 0.0, 0.0, self.smoothness]
    }
}

/// Description of one font to render into the atlas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// TrueType/OpenType file
    pub source: PathBuf,
    /// Final glyph size in pixels
    pub point_size: u32,
    /// Orientation on the destination texture
    #[serde(default)]
    pub rotation: AtlasRotation,
    /// Extra pixels between glyphs
    #[serde(default)]
    pub kerning: i32,
    /// Non-digit characters to include, in glyph order
    #[serde(default)]
    pub extra_characters: String,
    /// Display template
    #[serde(default = "default_format")]
    pub format: String,
    /// Face color
    #[serde(default = "default_color")]
    pub color: Color,
    /// Optional glow color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission: Option<Color>,
    /// Optional metallic/smoothness override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specular: Option<Specular>,
}

fn default_format() -> String {
    NumberFormat::DEFAULT_TEMPLATE.to_string()
}

const fn default_color() -> Color {
    [1.0, 1.0, 1.0, 1.0]
}

impl FontSpec {
    /// Upright white font with default settings
    pub fn new(source: impl Into<PathBuf>, point_size: u32) -> Self {
        Self {
            source: source.into(),
            point_size,
            rotation: AtlasRotation::default(),
            kerning: 0,
            extra_characters: String::new(),
            format: default_format(),
            color: default_color(),
            emission: None,
            specular: None,
        }
    }

    /// Digits followed by the extra characters
    fn characters(&self) -> impl Iterator<Item = char> + '_ {
        DIGITS.chars().chain(self.extra_characters.chars())
    }
}

/// Coverage bitmap of one glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterGlyph {
    /// Bitmap width
    pub width: usize,
    /// Bitmap height
    pub height: usize,
    /// Offset of the bitmap's bottom edge above the baseline
    pub ymin: i32,
    /// Row-major coverage, top row first
    pub coverage: Vec<u8>,
}

/// Source of glyph bitmaps
pub trait GlyphRasterizer {
    /// Whether the face has a glyph for `c`
    fn contains_glyph(&self, c: char) -> bool;

    /// Rasterize `c` at `px` pixels per em
    fn rasterize_glyph(&self, c: char, px: f32) -> RasterGlyph;
}

impl GlyphRasterizer for Font {
    fn contains_glyph(&self, c: char) -> bool {
        self.lookup_glyph_index(c) != 0
    }

    fn rasterize_glyph(&self, c: char, px: f32) -> RasterGlyph {
        let (metrics, coverage) = self.rasterize(c, px);
        RasterGlyph {
            width: metrics.width,
            height: metrics.height,
            ymin: metrics.ymin,
            coverage,
        }
    }
}

/// Read and parse a font file
pub fn load_font(path: &Path) -> Result<Font, AtlasError> {
    let bytes = std::fs::read(path).map_err(|source| AtlasError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    Font::from_bytes(bytes, FontSettings::default()).map_err(|reason| AtlasError::FontParse {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    })
}

/// A font that could not be rendered
#[derive(Debug)]
pub struct AtlasFailure {
    /// Position in the input list
    pub font_index: usize,
    /// Font file
    pub source: PathBuf,
    /// What went wrong
    pub error: AtlasError,
}

/// Output of [`FontAtlasBuilder::build`]
#[derive(Debug)]
pub struct AtlasBuild {
    /// Packed atlas
    pub image: RgbaImage,
    /// One definition per input font, placeholders for failures
    pub fonts: Vec<FontDefinition>,
    /// Fonts replaced by placeholders
    pub failures: Vec<AtlasFailure>,
}

/// Scheme-level settings combined with a built atlas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeParams {
    /// Texture the numbers are painted onto
    pub target_texture: String,
    /// Compositing mode
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// White level for [`BlendMode::Colorize`]
    #[serde(default = "crate::scheme::raw::default_colorize_level")]
    pub colorize_level: f32,
    /// Smallest generated number
    #[serde(default = "crate::scheme::raw::default_min_number")]
    pub min_number: i32,
    /// Largest generated number
    #[serde(default = "crate::scheme::raw::default_max_number")]
    pub max_number: i32,
    /// Added to identifier-derived numbers
    #[serde(default)]
    pub offset: i32,
    /// Always draw from the random sequence
    #[serde(default)]
    pub force_random: bool,
    /// Anchors in paint order
    #[serde(default)]
    pub attach_points: Vec<RawAttachPoint>,
}

impl AtlasBuild {
    /// Atlas size in pixels
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.image.width(), self.image.height())
    }

    /// Whether every font rendered
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Write the atlas image, format chosen by extension
    pub fn save_image(&self, path: impl AsRef<Path>) -> Result<(), AtlasError> {
        self.image.save(path.as_ref())?;
        log::info!("Saved {}x{} atlas to {:?}", self.image.width(), self.image.height(), path.as_ref());
        Ok(())
    }

    /// Combine the built fonts with scheme settings
    pub fn into_scheme(&self, params: &SchemeParams) -> Result<NumberingScheme, SchemeError> {
        let scheme = NumberingScheme {
            target_surface_name: params.target_texture.clone(),
            blend_mode: params.blend_mode,
            colorize_level: params.colorize_level,
            min_number: params.min_number,
            max_number: params.max_number,
            offset: params.offset,
            force_random: params.force_random,
            fonts: self.fonts.clone(),
            attach_points: params.attach_points.iter().copied().map(AttachPoint::from).collect(),
            atlas_size: self.size(),
            livery_id: None,
            skin_name: None,
            is_default: false,
        };
        scheme.validate()?;
        Ok(scheme)
    }
}

/// Glyph cell in an unrotated sub-atlas, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GlyphCell {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// One font rendered and transformed, metrics relative to its own image
#[derive(Debug)]
struct RenderedFont {
    image: RgbaImage,
    glyphs: Vec<GlyphMetrics>,
    height: i32,
    format: NumberFormat,
}

impl RenderedFont {
    fn into_definition(self, spec: &FontSpec, placed: &PackedRect) -> FontDefinition {
        let mut glyphs = self.glyphs.into_iter().map(|glyph| GlyphMetrics {
            x: glyph.x + placed.x as i32,
            y: glyph.y + placed.y as i32,
            width: glyph.width,
        });

        let mut digits = [GlyphMetrics::default(); DIGIT_GLYPHS];
        for (digit, glyph) in digits.iter_mut().zip(glyphs.by_ref()) {
            *digit = glyph;
        }
        let extras = spec
            .extra_characters
            .chars()
            .zip(glyphs)
            .map(|(symbol, glyph)| ExtraCharacter {
                symbol,
                x: glyph.x,
                y: glyph.y,
                width: glyph.width,
            })
            .collect();

        FontDefinition::new(
            self.height,
            spec.rotation.orientation(),
            spec.kerning,
            spec.rotation.reverse_digits(),
            self.format,
            digits,
            extras,
        )
        .with_emission(spec.emission)
        .with_specular(spec.specular.map(Specular::color))
    }
}

/// Renders fonts and packs them into one atlas
#[derive(Debug, Clone, Copy)]
pub struct FontAtlasBuilder {
    max_width: u32,
}

impl Default for FontAtlasBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FontAtlasBuilder {
    /// Builder with [`DEFAULT_MAX_WIDTH`]
    pub const fn new() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
        }
    }

    /// Set the soft atlas width limit
    #[must_use]
    pub const fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    /// Build an atlas from font files
    pub fn build(&self, specs: &[FontSpec]) -> AtlasBuild {
        self.build_with(specs, |spec| load_font(&spec.source))
    }

    /// Build an atlas, obtaining each font's rasterizer from `load`
    ///
    /// Fonts that fail to load or render are replaced by a 1x1 transparent
    /// image and a zeroed [`FontDefinition`], so font indices stay stable.
    pub fn build_with<R, F>(&self, specs: &[FontSpec], mut load: F) -> AtlasBuild
    where
        R: GlyphRasterizer,
        F: FnMut(&FontSpec) -> Result<R, AtlasError>,
    {
        log::info!("Building font atlas for {} fonts", specs.len());

        let mut rendered = Vec::with_capacity(specs.len());
        let mut failures = Vec::new();

        for (font_index, spec) in specs.iter().enumerate() {
            let result = if spec.point_size == 0 {
                Err(AtlasError::ZeroPointSize)
            } else {
                load(spec).and_then(|rasterizer| render_font(spec, &rasterizer))
            };

            match result {
                Ok(font) => rendered.push(Some(font)),
                Err(error) => {
                    log::warn!("Failed to render font {} ({:?}): {}", font_index, spec.source, error);
                    failures.push(AtlasFailure {
                        font_index,
                        source: spec.source.clone(),
                        error,
                    });
                    rendered.push(None);
                }
            }
        }

        let placeholder = RgbaImage::new(1, 1);
        let sizes: Vec<PixelSize> = rendered
            .iter()
            .map(|font| {
                let image = font.as_ref().map_or(&placeholder, |f| &f.image);
                PixelSize::new(image.width(), image.height())
            })
            .collect();
        let packed = ShelfPacker::new(self.max_width, 1).pack(&sizes);

        let mut image = RgbaImage::new(packed.size.x.max(1), packed.size.y.max(1));
        let mut fonts = Vec::with_capacity(specs.len());

        for ((spec, font), placed) in specs.iter().zip(rendered).zip(&packed.rects) {
            match font {
                Some(font) => {
                    imageops::replace(&mut image, &font.image, i64::from(placed.x), i64::from(placed.y));
                    fonts.push(font.into_definition(spec, placed));
                }
                None => {
                    imageops::replace(&mut image, &placeholder, i64::from(placed.x), i64::from(placed.y));
                    fonts.push(FontDefinition::placeholder(&spec.extra_characters));
                }
            }
        }

        log::info!(
            "Font atlas is {}x{} with {} fonts ({} failed)",
            image.width(),
            image.height(),
            fonts.len(),
            failures.len()
        );

        AtlasBuild { image, fonts, failures }
    }
}

fn render_font<R: GlyphRasterizer + ?Sized>(spec: &FontSpec, rasterizer: &R) -> Result<RenderedFont, AtlasError> {
    let format = NumberFormat::parse(&spec.format).map_err(|source| AtlasError::InvalidFormat {
        template: spec.format.clone(),
        source,
    })?;

    let (sub_atlas, cells) = render_sub_atlas(spec, rasterizer)?;
    let rotation = spec.rotation;
    let image = rotation.transform_image(&sub_atlas);
    let rotated = PixelSize::new(image.width(), image.height());

    let pad = GLYPH_PADDING;
    let glyphs = cells
        .iter()
        .map(|cell| {
            let width = cell.width as i32 + 2 * pad;
            let height = cell.height as i32 + 2 * pad;
            let pos = rotation.map_glyph_rect(cell.x as i32 - pad, cell.y as i32 - pad, width, height, rotated);
            GlyphMetrics {
                x: pos.x,
                // Back to a top edge in top-left-origin coordinates
                y: rotated.y as i32 - pos.y,
                width,
            }
        })
        .collect();

    let height = cells.first().map_or(0, |cell| cell.height as i32) + 2 * pad;
    log::debug!(
        "Rendered {:?} at {}pt ({:?}): {}x{}",
        spec.source,
        spec.point_size,
        rotation,
        rotated.x,
        rotated.y
    );

    Ok(RenderedFont { image, glyphs, height, format })
}

/// Rasterize all characters into one row of cells and downscale
fn render_sub_atlas<R: GlyphRasterizer + ?Sized>(
    spec: &FontSpec,
    rasterizer: &R,
) -> Result<(RgbaImage, Vec<GlyphCell>), AtlasError> {
    if let Some(missing) = spec.characters().find(|&c| !rasterizer.contains_glyph(c)) {
        return Err(AtlasError::MissingGlyph(missing));
    }

    let px = (spec.point_size * SUPER_SCALE) as f32;
    let glyphs: Vec<RasterGlyph> = spec.characters().map(|c| rasterizer.rasterize_glyph(c, px)).collect();

    // Shared baseline: the row spans from the lowest descender to the highest ascender
    let ascent = glyphs.iter().map(|g| g.ymin + g.height as i32).max().unwrap_or(0);
    let descent = glyphs.iter().map(|g| g.ymin).min().unwrap_or(0);
    let cell_height = ((ascent - descent).max(0) as u32).div_ceil(SUPER_SCALE);
    let spacing = spec.point_size.div_ceil(15).max(MIN_CELL_SPACING);

    let mut cells = Vec::with_capacity(glyphs.len());
    let mut cursor = spacing;
    for glyph in &glyphs {
        let width = (glyph.width as u32).div_ceil(SUPER_SCALE);
        cells.push(GlyphCell {
            x: cursor,
            y: spacing,
            width,
            height: cell_height,
        });
        cursor += width + spacing;
    }
    let size = PixelSize::new(cursor, cell_height + 2 * spacing);

    let [r, g, b, a] = spec.color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    let mut canvas = RgbaImage::new(size.x * SUPER_SCALE, size.y * SUPER_SCALE);

    for (glyph, cell) in glyphs.iter().zip(&cells) {
        let left = cell.x * SUPER_SCALE;
        let top = cell.y * SUPER_SCALE + (ascent - glyph.ymin - glyph.height as i32) as u32;

        for (i, &coverage) in glyph.coverage.iter().enumerate() {
            if coverage == 0 {
                continue;
            }
            let x = left + (i % glyph.width) as u32;
            let y = top + (i / glyph.width) as u32;
            let alpha = (u32::from(a) * u32::from(coverage) / 255) as u8;
            canvas.put_pixel(x, y, Rgba([r, g, b, alpha]));
        }
    }

    let image = imageops::resize(&canvas, size.x, size.y, imageops::FilterType::Triangle);
    Ok((image, cells))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{Config, ConfigFormat};
    use crate::layout::GlyphLayoutEngine;
    use crate::scheme::raw::RawScheme;
    use crate::scheme::Orientation;

    /// Solid boxes: digits half an em wide, three quarters tall; '-' is a short bar
    pub(crate) struct BoxRasterizer;

    impl GlyphRasterizer for BoxRasterizer {
        fn contains_glyph(&self, c: char) -> bool {
            c.is_ascii_digit() || c == '-'
        }

        fn rasterize_glyph(&self, c: char, px: f32) -> RasterGlyph {
            let (width, height, ymin) = if c == '-' {
                ((px * 0.25) as usize, (px * 0.125) as usize, (px * 0.25) as i32)
            } else {
                ((px * 0.5) as usize, (px * 0.75) as usize, 0)
            };
            RasterGlyph {
                width,
                height,
                ymin,
                coverage: vec![255; width * height],
            }
        }
    }

    fn build(specs: &[FontSpec]) -> AtlasBuild {
        FontAtlasBuilder::new().build_with(specs, |_| Ok(BoxRasterizer))
    }

    fn alpha(image: &RgbaImage, x: i32, y: i32) -> u8 {
        image.get_pixel(x as u32, y as u32)[3]
    }

    #[test]
    fn test_upright_metrics() {
        let mut spec = FontSpec::new("box.ttf", 8);
        spec.extra_characters = "-".to_string();
        let build = build(&[spec]);
        assert!(build.is_complete());

        // 8pt: digit cells 4x6 px, spacing 2, padded metrics 6x8
        let font = &build.fonts[0];
        assert_eq!(font.height, 8);
        assert_eq!(font.orientation, Orientation::Horizontal);
        assert!(!font.reverse_digits);
        for i in 0..DIGIT_GLYPHS {
            assert_eq!(font.glyph(i), GlyphMetrics { x: 2 + 6 * i as i32, y: 2, width: 6 });
        }
        assert_eq!(font.extra_characters()[0], ExtraCharacter { symbol: '-', x: 62, y: 2, width: 4 });
        assert_eq!(build.size(), PixelSize::new(68, 12));

        // Glyph interiors are opaque, the border is clear
        assert!(alpha(&build.image, 5, 6) > 200);
        assert_eq!(alpha(&build.image, 0, 0), 0);
    }

    #[test]
    fn test_metrics_point_at_glyph_pixels() {
        let specs: Vec<FontSpec> = AtlasRotation::ALL
            .iter()
            .map(|&rotation| FontSpec {
                rotation,
                ..FontSpec::new("box.ttf", 8)
            })
            .collect();
        let build = build(&specs);
        assert!(build.is_complete());

        for (font, spec) in build.fonts.iter().zip(&specs) {
            assert_eq!(font.orientation, spec.rotation.orientation());
            assert_eq!(font.reverse_digits, spec.rotation.reverse_digits());

            for glyph in &font.glyphs()[..DIGIT_GLYPHS] {
                let (fw, fh) = match font.orientation {
                    Orientation::Horizontal => (glyph.width, font.height),
                    Orientation::Vertical => (font.height, glyph.width),
                };
                let (cx, cy) = (glyph.x + fw / 2, glyph.y + fh / 2);
                assert!(alpha(&build.image, cx, cy) > 200, "{:?} glyph {glyph:?}", spec.rotation);
                // Padding corner is outside the glyph
                assert!(alpha(&build.image, glyph.x, glyph.y) < 128, "{:?} glyph {glyph:?}", spec.rotation);
            }
        }
    }

    #[test]
    fn test_font_settings_carried_over() {
        let spec = FontSpec {
            kerning: 3,
            format: "{0:D4}".to_string(),
            emission: Some([0.0, 1.0, 0.0, 1.0]),
            specular: Some(Specular { metallic: 0.25, smoothness: 0.75 }),
            ..FontSpec::new("box.ttf", 8)
        };
        let build = build(&[spec]);
        let font = &build.fonts[0];
        assert_eq!(font.kerning, 3);
        assert_eq!(font.format.min_digits(), 4);
        assert_eq!(font.emission_color, Some([0.0, 1.0, 0.0, 1.0]));
        assert_eq!(font.specular_color, Some([0.25, 0.0, 0.0, 0.75]));
    }

    #[test]
    fn test_failed_fonts_become_placeholders() {
        let specs = vec![
            FontSpec::new("good.ttf", 8),
            FontSpec {
                extra_characters: "-".to_string(),
                ..FontSpec::new("bad.ttf", 8)
            },
            FontSpec::new("zero.ttf", 0),
            FontSpec {
                format: "{1}".to_string(),
                ..FontSpec::new("format.ttf", 8)
            },
            FontSpec {
                extra_characters: "#".to_string(),
                ..FontSpec::new("missing.ttf", 8)
            },
        ];
        let build = FontAtlasBuilder::new().build_with(&specs, |spec| {
            if spec.source == Path::new("bad.ttf") {
                Err(AtlasError::FontParse {
                    path: spec.source.clone(),
                    reason: "not a font".to_string(),
                })
            } else {
                Ok(BoxRasterizer)
            }
        });

        assert_eq!(build.fonts.len(), 5);
        let failed: Vec<usize> = build.failures.iter().map(|f| f.font_index).collect();
        assert_eq!(failed, vec![1, 2, 3, 4]);
        assert!(matches!(build.failures[1].error, AtlasError::ZeroPointSize));
        assert!(matches!(build.failures[2].error, AtlasError::InvalidFormat { .. }));
        assert!(matches!(build.failures[3].error, AtlasError::MissingGlyph('#')));

        let placeholder = &build.fonts[1];
        assert_eq!(placeholder.glyphs().len(), DIGIT_GLYPHS + 1);
        assert!(placeholder.glyphs().iter().all(|g| *g == GlyphMetrics::default()));
        assert_eq!(build.fonts[0].glyph(0), GlyphMetrics { x: 2, y: 2, width: 6 });
    }

    #[test]
    fn test_missing_font_file() {
        let build = FontAtlasBuilder::new().build(&[FontSpec::new("/nonexistent/font.ttf", 12)]);
        assert_eq!(build.fonts.len(), 1);
        assert!(matches!(build.failures[0].error, AtlasError::FontRead { .. }));
        assert_eq!(build.size(), PixelSize::new(3, 3));
    }

    #[test]
    fn test_unparsable_font_file() {
        let dir = std::env::temp_dir().join(format!("skin_numbering_font_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("garbage.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();

        let build = FontAtlasBuilder::new().build(&[FontSpec::new(&path, 12)]);
        assert!(matches!(build.failures[0].error, AtlasError::FontParse { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_scheme_from_build_round_trips() {
        let specs = vec![
            FontSpec {
                emission: Some([1.0, 0.5, 0.25, 1.0]),
                extra_characters: "-".to_string(),
                ..FontSpec::new("box.ttf", 8)
            },
            FontSpec {
                rotation: AtlasRotation::TopDown,
                ..FontSpec::new("box.ttf", 12)
            },
        ];
        let build = build(&specs);
        let params = SchemeParams {
            target_texture: "body_d".to_string(),
            blend_mode: BlendMode::Normal,
            colorize_level: 0.5,
            min_number: 1,
            max_number: 999,
            offset: 0,
            force_random: false,
            attach_points: vec![RawAttachPoint { font: 0, x: 100, y: 40 }, RawAttachPoint { font: 1, x: 20, y: 60 }],
        };
        let scheme = build.into_scheme(&params).unwrap();
        assert_eq!(scheme.atlas_size, build.size());

        let text = scheme.to_raw().to_string_as(ConfigFormat::Toml).unwrap();
        let reparsed = RawScheme::from_str_as(&text, ConfigFormat::Toml).unwrap();
        let back = NumberingScheme::from_raw(reparsed, build.size()).unwrap();

        for (a, b) in back.fonts.iter().zip(&scheme.fonts) {
            assert_eq!(a.glyphs(), b.glyphs());
            assert_eq!(a.height, b.height);
            assert_eq!(a.orientation, b.orientation);
            assert_eq!(a.reverse_digits, b.reverse_digits);
        }
        assert_eq!(back.fonts[0].emission_color, Some([1.0, 0.5, 0.25, 1.0]));

        // The built scheme lays out directly
        let layout = GlyphLayoutEngine::layout(&back, 123, 256, 256);
        assert_eq!(layout.digit_count(), 6);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let build = build(&[FontSpec::new("box.ttf", 8)]);
        let params = SchemeParams {
            target_texture: "body_d".to_string(),
            blend_mode: BlendMode::Normal,
            colorize_level: 0.5,
            min_number: 10,
            max_number: 1,
            offset: 0,
            force_random: false,
            attach_points: Vec::new(),
        };
        assert!(matches!(build.into_scheme(&params), Err(SchemeError::InvalidRange { .. })));
    }
}
