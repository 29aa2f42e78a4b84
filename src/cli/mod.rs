pub mod completions;
pub mod init;
pub mod pack;
pub mod sample;
pub mod validate;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Result, TexError};
use crate::output::{display_path, Printer};
use crate::validation::{Diagnostic, ValidationResult};

/// texkit - channel packing and colour-curve sampling for game textures
#[derive(Parser, Debug)]
#[command(name = "texkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ./texkit.yaml if present)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug details
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Pack texture sets into multi-channel textures
    Pack(pack::PackArgs),

    /// Sample colour curves from textures
    Sample(sample::SampleArgs),

    /// Resolve and validate texture sets without writing anything
    Validate(validate::ValidateArgs),

    /// Write a default texkit.yaml
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Loaded configuration shared by the commands that read it.
pub struct Context {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    /// `--verbose` or `global.show_details`.
    pub verbose: bool,
    pub printer: Printer,
}

impl Context {
    /// Load the config named by `--config`, or `texkit.yaml` in the working directory.
    pub fn load(config: Option<&Path>, verbose: bool) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(TexError::IoError)?;
        let (config, config_path) = Config::discover(config, &cwd)?;
        let verbose = verbose || config.global.show_details;
        Ok(Self {
            config,
            config_path,
            verbose,
            printer: Printer::new(),
        })
    }

    /// Report which config is in use.
    pub fn announce(&self) {
        match &self.config_path {
            Some(path) => self.printer.info("Config", &display_path(path)),
            None => self.printer.info("Config", "defaults"),
        }
        if self.config.global.auto_save {
            tracing::debug!("global.auto_save has no effect outside an editor");
        }
    }

    /// Folder names the scanner must not descend into.
    pub fn skip_dirs(&self) -> Vec<&str> {
        [
            self.config.generators.dest_folder_name.as_str(),
            self.config.generators.backup_folder_name.as_str(),
        ]
        .into_iter()
        .filter(|name| !name.trim().is_empty())
        .collect()
    }

    /// Where outputs for a source at `source` go: `--output` when given,
    /// otherwise the source's folder plus `dest_folder_name`.
    pub fn output_dir(&self, explicit: Option<&Path>, source: &Path) -> PathBuf {
        if let Some(dir) = explicit {
            return dir.to_path_buf();
        }
        let parent = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        match self.config.generators.dest_folder_name.trim() {
            "" => parent,
            dest => parent.join(dest),
        }
    }

    /// Move consumed sources to the backup folder, or delete them when
    /// `delete_used` is set. Does nothing when neither is configured.
    ///
    /// A source whose backup already exists stays where it is and is
    /// reported as a warning.
    pub fn route_sources(&self, sources: &[String], diagnostics: &mut ValidationResult) -> Result<usize> {
        let generators = &self.config.generators;
        let backup = generators.backup_folder_name.trim();
        if !generators.delete_used && backup.is_empty() {
            return Ok(0);
        }

        let mut routed = 0;
        for source in sources {
            let path = Path::new(source);
            if !path.is_file() {
                continue;
            }
            if generators.delete_used {
                fs::remove_file(path).map_err(|e| TexError::Io {
                    path: path.to_path_buf(),
                    message: format!("Failed to delete source: {}", e),
                })?;
                tracing::info!("Deleted {}", path.display());
            } else {
                let target = backup_path(path, backup);
                if target.exists() {
                    tracing::warn!("Not backing up {}: {} exists", path.display(), target.display());
                    diagnostics.push(
                        Diagnostic::warning(
                            "texkit::cli::backup-exists",
                            format!("backup {} already exists", display_path(&target)),
                        )
                        .with_subject(source.clone())
                        .with_help("The source was left in place"),
                    );
                    continue;
                }
                move_file(path, &target)?;
                tracing::info!("Backed up {} to {}", path.display(), target.display());
            }
            routed += 1;
        }
        Ok(routed)
    }
}

/// `{dir}/{backup}/{file}` for a source at `{dir}/{file}`.
pub fn backup_path(source: &Path, backup: &str) -> PathBuf {
    let parent = source.parent().unwrap_or_else(|| Path::new("."));
    let name = source.file_name().map(PathBuf::from).unwrap_or_default();
    parent.join(backup).join(name)
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    let io_err = |path: &Path, e: std::io::Error| TexError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to back up source: {}", e),
    };

    if let Some(dir) = to.parent() {
        ensure_dir(dir)?;
    }
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // rename fails across filesystems
    fs::copy(from, to).map_err(|e| io_err(to, e))?;
    fs::remove_file(from).map_err(|e| io_err(from, e))
}

/// Create `dir` if it does not exist.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| TexError::Io {
            path: dir.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }
    Ok(())
}
