//! Font atlas tool
//!
//! Reads an atlas project file, renders its fonts into `num.png` and writes
//! the matching `numbering.toml`. Optionally previews the layout of a number
//! on the generated scheme.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};

use skin_numbering::atlas::AtlasProject;
use skin_numbering::config::Config;
use skin_numbering::foundation::logging;
use skin_numbering::layout::GlyphLayoutEngine;
use skin_numbering::scheme::NumberingScheme;

fn main() -> Result<()> {
    let matches = Command::new("font_atlas_tool")
        .about("Builds a numbering font atlas and scheme for a vehicle skin")
        .arg(
            Arg::new("project")
                .value_name("PROJECT")
                .help("Atlas project file (.toml or .ron)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory (defaults to the project's directory)"),
        )
        .arg(
            Arg::new("max-width")
                .short('w')
                .long("max-width")
                .value_name("PIXELS")
                .help("Soft width limit of the packed atlas")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("preview")
                .short('p')
                .long("preview")
                .value_name("NUMBER")
                .help("Print the layout of this number on the generated scheme")
                .value_parser(clap::value_parser!(i32)),
        )
        .arg(
            Arg::new("surface")
                .short('s')
                .long("surface")
                .value_name("WIDTHxHEIGHT")
                .help("Destination texture size used by --preview")
                .default_value("2048x2048"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail when any font could not be rendered")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    logging::init();

    let project_path = PathBuf::from(
        matches
            .get_one::<String>("project")
            .context("missing project argument")?,
    );
    let base_dir = project_path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let output_dir = matches
        .get_one::<String>("output")
        .map_or_else(|| base_dir.clone(), PathBuf::from);

    let mut project = AtlasProject::load_from_file(&project_path)
        .with_context(|| format!("Failed to load atlas project {project_path:?}"))?;
    if let Some(&max_width) = matches.get_one::<u32>("max-width") {
        project.max_atlas_width = max_width;
    }

    let export = project
        .export(&base_dir, &output_dir)
        .with_context(|| format!("Failed to export atlas to {output_dir:?}"))?;

    println!(
        "Wrote {:?} ({}x{}) and {:?}",
        export.image_path, export.scheme.atlas_size.x, export.scheme.atlas_size.y, export.scheme_path
    );
    for failure in &export.failures {
        log::warn!(
            "Font {} ({:?}) replaced by placeholder: {}",
            failure.font_index,
            failure.source,
            failure.error
        );
    }

    if let Some(&number) = matches.get_one::<i32>("preview") {
        let surface = matches
            .get_one::<String>("surface")
            .context("missing surface size")?;
        let (width, height) = parse_surface(surface)?;
        print_preview(&export.scheme, number, width, height);
    }

    if matches.get_flag("strict") && !export.failures.is_empty() {
        anyhow::bail!("{} font(s) failed to render", export.failures.len());
    }

    Ok(())
}

fn parse_surface(value: &str) -> Result<(u32, u32)> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .with_context(|| format!("Surface size '{value}' is not WIDTHxHEIGHT"))?;
    let width = w.trim().parse().with_context(|| format!("Invalid surface width '{w}'"))?;
    let height = h.trim().parse().with_context(|| format!("Invalid surface height '{h}'"))?;
    Ok((width, height))
}

fn print_preview(scheme: &NumberingScheme, number: i32, width: u32, height: u32) {
    let layout = GlyphLayoutEngine::layout(scheme, number, width, height);
    log::debug!("Previewing {number} on {width}x{height}");
    println!("Layout of {number} on {width}x{height}: {} digits", layout.digit_count());
    for (i, digit) in layout.digits.iter().enumerate() {
        let b = digit.bounds;
        let s = digit.source;
        println!(
            "  [{i:2}] bounds ({:.4}, {:.4})-({:.4}, {:.4})  uv ({:.4}, {:.4})-({:.4}, {:.4})",
            b.left, b.bottom, b.right, b.top, s.left, s.bottom, s.right, s.top
        );
    }
}
