//! Atlas project files
//!
//! A project lists the fonts to render together with the scheme settings, and
//! is turned into the `num.png` + `numbering.toml` pair a skin ships with.
//!
//! ```toml
//! max_atlas_width = 1024
//!
//! [scheme]
//! target_texture = "loco_body_d"
//! min_number = 100
//! max_number = 999
//!
//! [[scheme.attach_points]]
//! font = 0
//! x = 512
//! y = 300
//!
//! [[fonts]]
//! source = "fonts/Stencil.ttf"
//! point_size = 60
//! rotation = "TopDown"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::builder::{AtlasBuild, AtlasError, AtlasFailure, FontAtlasBuilder, FontSpec, SchemeParams, DEFAULT_MAX_WIDTH};
use crate::config::Config;
use crate::scheme::{NumberingScheme, ATLAS_FILE_NAME, SCHEME_FILE_NAME};

/// Authoring description of one skin's numbering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasProject {
    /// Soft width limit of the packed atlas
    #[serde(default = "default_max_width")]
    pub max_atlas_width: u32,
    /// Scheme settings written alongside the fonts
    pub scheme: SchemeParams,
    /// Fonts in index order
    #[serde(default)]
    pub fonts: Vec<FontSpec>,
}

impl Config for AtlasProject {}

const fn default_max_width() -> u32 {
    DEFAULT_MAX_WIDTH
}

/// Files written by [`AtlasProject::export`]
#[derive(Debug)]
pub struct AtlasExport {
    /// The generated scheme
    pub scheme: NumberingScheme,
    /// Written atlas image
    pub image_path: PathBuf,
    /// Written scheme file
    pub scheme_path: PathBuf,
    /// Fonts replaced by placeholders
    pub failures: Vec<AtlasFailure>,
}

impl AtlasProject {
    /// Font specs with relative sources resolved against `base_dir`
    pub fn resolve_sources(&self, base_dir: &Path) -> Vec<FontSpec> {
        self.fonts
            .iter()
            .map(|spec| FontSpec {
                source: base_dir.join(&spec.source),
                ..spec.clone()
            })
            .collect()
    }

    /// Render all fonts
    pub fn build(&self, base_dir: &Path) -> AtlasBuild {
        FontAtlasBuilder::new()
            .with_max_width(self.max_atlas_width)
            .build(&self.resolve_sources(base_dir))
    }

    /// Render all fonts and write the atlas and scheme into `out_dir`
    pub fn export(&self, base_dir: &Path, out_dir: &Path) -> Result<AtlasExport, AtlasError> {
        let build = self.build(base_dir);
        let scheme = build.into_scheme(&self.scheme)?;

        std::fs::create_dir_all(out_dir)?;
        let image_path = out_dir.join(ATLAS_FILE_NAME);
        let scheme_path = out_dir.join(SCHEME_FILE_NAME);
        build.save_image(&image_path)?;
        scheme.save(&scheme_path)?;

        log::info!("Exported numbering for '{}' to {:?}", scheme.target_surface_name, out_dir);

        Ok(AtlasExport {
            scheme,
            image_path,
            scheme_path,
            failures: build.failures,
        })
    }
}
