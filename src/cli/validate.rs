//! Validate command implementation.
//!
//! Resolves texture sets and checks them against every packing mode
//! without resampling or writing anything.

use std::path::PathBuf;

use clap::Args;

use crate::discovery::discover;
use crate::error::{Result, TexError};
use crate::output::{display_path, plural};
use crate::resolver;
use crate::validation::{print_diagnostics, validate_set, Diagnostic, ValidationResult};

use super::Context;

/// Resolve and validate texture sets without writing anything
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Texture files or folders to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs, ctx: &Context) -> Result<()> {
    ctx.announce();

    let (settings, mut diagnostics) = ctx.config.packer_settings()?;
    // sampler settings are checked here too so a bad section shows up early
    if let Err(e) = ctx.config.sampler_settings() {
        diagnostics.push(Diagnostic::from_error(&e).with_subject("curve_sampler"));
    }

    let skip = ctx.skip_dirs();
    let found = discover(&args.paths, &skip);
    for (path, e) in &found.loaded.failures {
        diagnostics.push(Diagnostic::from_error(e).with_subject(path.display().to_string()));
    }

    let (sets, grouping) = resolver::group(found.into_entries(), &settings.roles, &settings.prefixes);
    diagnostics.merge(grouping);

    let mut checked = ValidationResult::new();
    for set in &sets {
        let roles: Vec<&str> = set.iter().map(|(role, _)| role).collect();
        ctx.printer
            .status("Checking", &format!("{} [{}]", set.name(), roles.join(", ")));

        for mode in &settings.modes {
            match validate_set(set, mode, &settings) {
                Ok((plan, warnings)) => {
                    let mut notes = Vec::new();
                    if plan.needs_resize {
                        notes.push(format!("resize {}", mode.resize));
                    }
                    if !plan.defaults.is_empty() {
                        let filled: Vec<&str> = plan.defaults.iter().map(|(r, _)| r.as_str()).collect();
                        notes.push(format!("default {}", filled.join(", ")));
                    }
                    let detail = if notes.is_empty() {
                        String::new()
                    } else {
                        format!(" ({})", notes.join("; "))
                    };
                    ctx.printer.info(
                        "Ok",
                        &format!("{}_{}{}", set.name(), mode.suffix, detail),
                    );
                    checked.merge(warnings);
                }
                Err(e) => {
                    tracing::debug!("{} fails {}: {}", set.name(), mode.name, e);
                    checked.push(Diagnostic::from_error(&e).with_subject(format!("{} / {}", set.name(), mode.name)));
                }
            }
        }
    }
    diagnostics.merge(checked);

    print_diagnostics(&diagnostics, &ctx.printer, ctx.verbose);

    let summary = format!(
        "{} against {} ({}, {})",
        plural(sets.len(), "set", "sets"),
        plural(settings.modes.len(), "mode", "modes"),
        plural(diagnostics.warning_count(), "warning", "warnings"),
        plural(diagnostics.error_count(), "error", "errors"),
    );

    if diagnostics.has_errors() {
        ctx.printer.error("Failed", &summary);
        return Err(TexError::Validation {
            subject: args
                .paths
                .first()
                .map(|p| display_path(p))
                .unwrap_or_default(),
            message: format!("{} error(s)", diagnostics.error_count()),
            help: Some("See the diagnostics above".to_string()),
        });
    }

    ctx.printer.success("Validated", &summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::output::Printer;
    use image::{GrayImage, Luma};
    use tempfile::tempdir;

    fn context() -> Context {
        let mut config = Config::default();
        config.channel_packer.packing_modes.truncate(1);
        Context {
            config,
            config_path: None,
            verbose: false,
            printer: Printer::plain(),
        }
    }

    #[test]
    fn test_validate_passes_and_writes_nothing() {
        let dir = tempdir().unwrap();
        GrayImage::from_pixel(8, 8, Luma([1])).save(dir.path().join("rock_ao.png")).unwrap();
        GrayImage::from_pixel(4, 4, Luma([1])).save(dir.path().join("rock_rough.png")).unwrap();

        let args = ValidateArgs {
            paths: vec![dir.path().to_path_buf()],
        };
        run(args, &context()).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_validate_fails_on_unpackable_set() {
        let dir = tempdir().unwrap();
        GrayImage::from_pixel(8, 8, Luma([1])).save(dir.path().join("stone_normal.png")).unwrap();

        let args = ValidateArgs {
            paths: vec![dir.path().to_path_buf()],
        };
        assert!(matches!(run(args, &context()), Err(TexError::Validation { .. })));
    }
}
