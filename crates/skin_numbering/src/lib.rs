//! # Skin Numbering
//!
//! Procedurally placed number decals for vehicle skins.
//!
//! ## Features
//!
//! - **Atlas Building**: Rasterize digit glyphs from a font face, transform them
//!   into one of four orientations and pack them into a shared atlas
//! - **Number Layout**: Turn a number and a declarative scheme into per-digit
//!   destination and source rectangles ready for a shader
//! - **Unique Numbers**: Hand out non-repeating numbers per range
//! - **Scheme Registry**: Load numbering schemes per livery and skin
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skin_numbering::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scheme = NumberingScheme::load("skins/loco/red/numbering.toml")?;
//!     let layout = GlyphLayoutEngine::layout(&scheme, 1234, 2048, 2048);
//!     let params = ShaderParams::from_layout(&scheme, &layout);
//!     assert!(params.digit_count <= 32);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scheme;
pub mod sequencer;
pub mod layout;
pub mod atlas;
pub mod registry;

/// Common imports for numbering users
pub mod prelude {
    pub use crate::{
        atlas::{AtlasBuild, AtlasProject, AtlasRotation, FontAtlasBuilder, FontSpec, SchemeParams},
        config::{settings::NumberingSettings, Config, ConfigError},
        layout::{DigitQuad, GlyphLayoutEngine, NumberLayout, ShaderParams, MAX_DIGITS},
        registry::{NumberAssigner, SchemeRegistry, Vehicle, VehicleKind},
        scheme::{
            AttachPoint, BlendMode, ExtraCharacter, FontDefinition, NumberFormat,
            NumberingScheme, Orientation, SchemeError,
        },
        sequencer::{SequenceCache, SequenceError},
    };
}
