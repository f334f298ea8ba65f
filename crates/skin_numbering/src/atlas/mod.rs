//! Font atlas authoring
//!
//! Runs once per skin at authoring time: fonts are rasterized, transformed for
//! their reading direction, packed into `num.png` and described by a
//! [`crate::scheme::NumberingScheme`] file.

pub mod builder;
pub mod packer;
pub mod project;
pub mod rotation;

pub use builder::{
    AtlasBuild, AtlasError, AtlasFailure, FontAtlasBuilder, FontSpec, GlyphRasterizer, RasterGlyph, SchemeParams,
    Specular,
};
pub use project::{AtlasExport, AtlasProject};
pub use rotation::AtlasRotation;
