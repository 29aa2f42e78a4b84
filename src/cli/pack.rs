//! Pack command implementation.
//!
//! Scans the given paths, packs every texture set with every packing mode,
//! writes PNG/EXR outputs plus `pack-manifest.json`, then routes the consumed
//! sources (backup or delete) once their outputs are on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::PackerSettings;
use crate::discovery::discover;
use crate::error::{Result, TexError};
use crate::output::{display_path, plural};
use crate::pack::{pack_batch, PackReport};
use crate::render::{file_name, write_manifest, write_packed, PackManifest};
use crate::validation::print_diagnostics;

use super::{ensure_dir, Context};

/// Pack texture sets into multi-channel textures
#[derive(Args, Debug)]
pub struct PackArgs {
    /// Texture files or folders to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output directory (default: next to the sources, inside generators.dest_folder_name)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Only run the named packing modes (repeatable)
    #[arg(long = "mode", short)]
    pub modes: Vec<String>,
}

pub fn run(args: PackArgs, ctx: &Context) -> Result<()> {
    ctx.announce();

    let (settings, config_diagnostics) = ctx.config.packer_settings()?;
    print_diagnostics(&config_diagnostics, &ctx.printer, ctx.verbose);
    let settings = select_modes(settings, &args.modes)?;

    let names: Vec<&str> = settings.modes.iter().map(|m| m.name.as_str()).collect();
    ctx.printer.info("Modes", &names.join(", "));

    let skip = ctx.skip_dirs();
    let found = discover(&args.paths, &skip);
    for path in &found.scan.skipped {
        ctx.printer
            .warning("Skipping", &format!("{} (not a texture)", display_path(path)));
    }
    for (path, e) in &found.loaded.failures {
        ctx.printer
            .warning("Skipping", &format!("{}: {}", display_path(path), e));
    }

    let entries = found.into_entries();
    if entries.is_empty() {
        ctx.printer.warning("Finished", "no textures found");
        return Ok(());
    }
    ctx.printer
        .status("Scanned", &plural(entries.len(), "texture", "textures"));

    let mut report = pack_batch(entries, &settings);
    let written = write_outputs(&report, args.output.as_deref(), ctx)?;

    let routable = written.routable(&report.used_sources);
    let routed = ctx.route_sources(&routable, &mut report.diagnostics)?;
    if routed > 0 {
        let verb = if ctx.config.generators.delete_used {
            "Deleted"
        } else {
            "Backed up"
        };
        ctx.printer.info(verb, &plural(routed, "source", "sources"));
    }

    print_diagnostics(&report.diagnostics, &ctx.printer, ctx.verbose);

    ctx.printer.success(
        "Finished",
        &format!(
            "{} ({}, {})",
            plural(written.count, "texture", "textures"),
            plural(report.diagnostics.warning_count(), "warning", "warnings"),
            plural(report.diagnostics.error_count(), "error", "errors"),
        ),
    );

    if report.diagnostics.has_errors() || !written.failed.is_empty() {
        return Err(TexError::Build {
            message: "some texture sets could not be packed".to_string(),
            help: Some("See the diagnostics above; the other sets were written".to_string()),
        });
    }
    Ok(())
}

/// Keep only the modes named on the command line (case-insensitive).
fn select_modes(mut settings: PackerSettings, wanted: &[String]) -> Result<PackerSettings> {
    if !wanted.is_empty() {
        let unknown: Vec<&str> = wanted
            .iter()
            .filter(|w| !settings.modes.iter().any(|m| m.name.eq_ignore_ascii_case(w)))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            let available: Vec<&str> = settings.modes.iter().map(|m| m.name.as_str()).collect();
            return Err(TexError::Config {
                message: format!("unknown packing mode: {}", unknown.join(", ")),
                help: Some(format!("Available modes: {}", available.join(", "))),
            });
        }
        settings
            .modes
            .retain(|m| wanted.iter().any(|w| m.name.eq_ignore_ascii_case(w)));
    }

    if settings.modes.is_empty() {
        return Err(TexError::Config {
            message: "no usable packing modes".to_string(),
            help: Some("Check channel_packer.packing_modes in texkit.yaml".to_string()),
        });
    }
    Ok(settings)
}

#[derive(Debug, Default)]
struct Written {
    count: usize,
    /// Sources of textures that reached disk.
    succeeded: Vec<String>,
    /// Sources of textures that failed to write.
    failed: Vec<String>,
}

impl Written {
    /// Used sources whose every output was written.
    fn routable(&self, used: &[String]) -> Vec<String> {
        used.iter()
            .filter(|s| self.succeeded.contains(s) && !self.failed.contains(s))
            .cloned()
            .collect()
    }
}

fn write_outputs(report: &PackReport, output: Option<&Path>, ctx: &Context) -> Result<Written> {
    let mut written = Written::default();
    let mut manifests: BTreeMap<PathBuf, PackManifest> = BTreeMap::new();

    for texture in &report.textures {
        let anchor = texture.sources.first().map(PathBuf::from).unwrap_or_default();
        let dir = ctx.output_dir(output, &anchor);

        let result = ensure_dir(&dir).and_then(|_| write_packed(texture, &dir));
        match result {
            Ok(path) => {
                ctx.printer.status(
                    "Packed",
                    &format!(
                        "{} ({}x{}, {})",
                        display_path(&path),
                        texture.width(),
                        texture.height(),
                        texture.bit_depth()
                    ),
                );
                manifests
                    .entry(dir)
                    .or_default()
                    .push(texture.manifest_entry(&file_name(texture)));
                written.count += 1;
                written.succeeded.extend(texture.sources.iter().cloned());
            }
            Err(e) => {
                ctx.printer
                    .error("Failed", &format!("{}: {}", texture.stem(), e));
                written.failed.extend(texture.sources.iter().cloned());
            }
        }
    }

    for (dir, manifest) in &manifests {
        write_manifest(manifest, dir)?;
    }

    Ok(written)
}
