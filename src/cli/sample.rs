//! Sample command implementation.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::SamplerSettings;
use crate::discovery::discover;
use crate::error::{Result, TexError};
use crate::output::{display_path, plural};
use crate::render::{write_atlas, write_curve_csv, write_swatch_strip};
use crate::resolver;
use crate::sampler::{sample_curves, CurveReport};
use crate::types::TextureImage;
use crate::validation::{print_diagnostics, Diagnostic, ValidationResult};

use super::{ensure_dir, Context};

/// Sample colour curves from textures
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Texture files or folders to sample
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output directory (default: next to each source, inside generators.dest_folder_name)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Also write a swatch preview strip per curve
    #[arg(long)]
    pub preview: bool,
}

pub fn run(args: SampleArgs, ctx: &Context) -> Result<()> {
    ctx.announce();
    let settings = ctx.config.sampler_settings()?;
    let roles = ctx.config.roles()?;
    let prefixes = ctx.config.prefixes();

    let skip = ctx.skip_dirs();
    let found = discover(&args.files, &skip);
    for (path, e) in &found.loaded.failures {
        ctx.printer
            .warning("Skipping", &format!("{}: {}", display_path(path), e));
    }

    let mut diagnostics = ValidationResult::new();
    let mut consumed = Vec::new();
    let mut curve_count = 0;

    for (identifier, image) in found.into_entries() {
        let path = PathBuf::from(&identifier);
        let name = resolver::derive_name(&identifier, &roles, &prefixes);
        match sample_one(&name, &path, &image, &settings, &args, ctx) {
            Ok(report) => {
                curve_count += report.curves.len();
                diagnostics.merge(report.diagnostics);
                consumed.push(identifier);
            }
            Err(e) => {
                ctx.printer
                    .error("Failed", &format!("{}: {}", display_path(&path), e));
                diagnostics.push(Diagnostic::from_error(&e).with_subject(identifier));
            }
        }
    }

    let routed = ctx.route_sources(&consumed, &mut diagnostics)?;
    if routed > 0 {
        ctx.printer
            .info("Backed up", &plural(routed, "source", "sources"));
    }

    print_diagnostics(&diagnostics, &ctx.printer, ctx.verbose);
    ctx.printer.success(
        "Finished",
        &format!(
            "{} from {}",
            plural(curve_count, "curve", "curves"),
            plural(consumed.len(), "texture", "textures")
        ),
    );

    if diagnostics.has_errors() {
        return Err(TexError::Build {
            message: "some textures could not be sampled".to_string(),
            help: Some("See the diagnostics above".to_string()),
        });
    }
    Ok(())
}

/// Sample one texture and write its curves next to `path`.
fn sample_one(
    name: &str,
    path: &Path,
    image: &TextureImage,
    settings: &SamplerSettings,
    args: &SampleArgs,
    ctx: &Context,
) -> Result<CurveReport> {
    let report = sample_curves(name, image, settings)?;

    let dir = ctx.output_dir(args.output.as_deref(), path);
    ensure_dir(&dir)?;

    for curve in &report.curves {
        let written = write_curve_csv(curve, &dir)?;
        ctx.printer.status(
            "Sampled",
            &format!("{} ({} keys)", display_path(&written), curve.keys.len()),
        );
    }

    if let Some(atlas) = &report.atlas {
        let (json, _) = write_atlas(atlas, &report.curves, &dir)?;
        ctx.printer.status("Atlas", &display_path(&json));
    }

    if args.preview {
        for ((_, swatches), curve) in report.swatches.iter().zip(&report.curves) {
            write_swatch_strip(&curve.name, swatches, &dir)?;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::output::Printer;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_sample_writes_curves_atlas_and_preview() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("rock.png");
        RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 90]))
            .save(&source)
            .unwrap();

        let mut config = Config::default();
        config.curve_sampler.swatch_count = 4;
        let ctx = Context {
            config,
            config_path: None,
            verbose: false,
            printer: Printer::plain(),
        };
        let out = dir.path().join("curves");
        let args = SampleArgs {
            files: vec![source.clone()],
            output: Some(out.clone()),
            preview: true,
        };
        run(args, &ctx).unwrap();

        for preset in ["dominant", "diverse", "values"] {
            let csv = std::fs::read_to_string(out.join(format!("CC_rock_{}.csv", preset))).unwrap();
            assert_eq!(csv.lines().count(), 5);
            assert!(out.join(format!("CC_rock_{}_swatches.png", preset)).exists());
        }
        assert!(out.join("CA_rock.json").exists());
        let atlas = image::open(out.join("CA_rock.png")).unwrap();
        assert_eq!((atlas.width(), atlas.height()), (256, 3));
        // no backup folder configured
        assert!(source.exists());
    }

    #[test]
    fn test_sample_names_curves_after_texture_base() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("T_rock_albedo_2k.png");
        RgbImage::from_fn(8, 8, |x, _| Rgb([(x * 30) as u8, 60, 90]))
            .save(&source)
            .unwrap();

        let mut config = Config::default();
        config.curve_sampler.export_preset = "Values".to_string();
        let ctx = Context {
            config,
            config_path: None,
            verbose: false,
            printer: Printer::plain(),
        };
        let out = dir.path().join("curves");
        let args = SampleArgs {
            files: vec![source],
            output: Some(out.clone()),
            preview: false,
        };
        run(args, &ctx).unwrap();

        assert!(out.join("CC_rock.csv").exists());
        assert!(out.join("CA_rock.json").exists());
        assert!(!out.join("CC_T_rock_albedo_2k.csv").exists());
    }
}
