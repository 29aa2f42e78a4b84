//! Validation of texture sets against packing modes.
//!
//! Runs the per-set checks and turns them into a [`SetPlan`] the resize
//! engine and packer execute. Used by `texkit pack` and `texkit validate`.

mod checks;
mod warning;

pub use checks::ChannelRead;
pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::config::{DefaultFill, PackerSettings, PackingMode};
use crate::error::Result;
use crate::output::Printer;
use crate::types::TextureSet;

/// What packing one set with one mode requires.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPlan {
    pub set_name: String,
    pub mode_name: String,
    /// Roles the mode reads that the set provides.
    pub present: Vec<String>,
    /// Missing roles to synthesise, with their fills.
    pub defaults: Vec<(String, DefaultFill)>,
    /// Present maps disagree on resolution.
    pub needs_resize: bool,
    /// Per output channel: how to read its source. `None` for unassigned.
    pub reads: [Option<ChannelRead>; 4],
}

/// Validate one set against one mode.
///
/// Fatal problems (missing role without default, impossible component,
/// float source with float support off, no usable source) are returned as
/// errors naming the set. Everything else comes back as warnings.
pub fn validate_set(
    set: &TextureSet,
    mode: &PackingMode,
    settings: &PackerSettings,
) -> Result<(SetPlan, ValidationResult)> {
    let mut result = ValidationResult::new();

    let defaults = checks::check_required_roles(set, mode, &settings.roles)?;
    checks::check_float_support(set, mode, settings.float_support)?;

    let (needs_resize, resolution) = checks::check_resolutions(set, mode);
    result.merge(resolution);

    let (reads, components) = checks::check_components(set, mode, &defaults)?;
    result.merge(components);

    let present = mode
        .roles()
        .into_iter()
        .filter(|role| set.contains(role))
        .map(str::to_string)
        .collect();

    Ok((
        SetPlan {
            set_name: set.name().to_string(),
            mode_name: mode.name.clone(),
            present,
            defaults,
            needs_resize,
            reads,
        },
        result,
    ))
}

/// Print diagnostics to stderr. Info diagnostics (repairs) only when `show_info`.
pub fn print_diagnostics(result: &ValidationResult, printer: &Printer, show_info: bool) {
    for d in result.iter() {
        if d.severity == Severity::Info && !show_info {
            continue;
        }
        let label = printer.severity(d.severity);
        match &d.subject {
            Some(subject) => eprintln!("  {}[{}] {}: {}", label, d.code, printer.subject(subject), d.message),
            None => eprintln!("  {}[{}]: {}", label, d.code, d.message),
        }
        if let Some(help) = &d.help {
            eprintln!("    {}", printer.dim(&format!("help: {}", help)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{BitDepth, ChannelLayout, TextureImage};

    fn gray(size: u32) -> TextureImage {
        TextureImage::uniform(size, size, ChannelLayout::Gray, BitDepth::Eight, [0; 3])
    }

    #[test]
    fn test_validate_complete_set() {
        let (settings, _) = Config::default().packer_settings().unwrap();
        let arm = &settings.modes[0];
        let set = TextureSet::new("rock")
            .with_map("AO", "ao.png", gray(8))
            .with_map("Roughness", "r.png", gray(8))
            .with_map("Metalness", "m.png", gray(8));

        let (plan, result) = validate_set(&set, arm, &settings).unwrap();
        assert!(result.is_ok());
        assert!(!plan.needs_resize);
        assert!(plan.defaults.is_empty());
        assert_eq!(plan.present, vec!["AO", "Roughness", "Metalness"]);
        assert_eq!(plan.reads[3], None);
    }

    #[test]
    fn test_validate_flags_resize_and_defaults() {
        let (settings, _) = Config::default().packer_settings().unwrap();
        let arm = &settings.modes[0];
        let set = TextureSet::new("rock")
            .with_map("AO", "ao.png", gray(8))
            .with_map("Roughness", "r.png", gray(4));

        let (plan, result) = validate_set(&set, arm, &settings).unwrap();
        assert!(plan.needs_resize);
        assert_eq!(plan.defaults.len(), 1);
        assert_eq!(plan.defaults[0].0, "Metalness");
        assert_eq!(result.warning_count(), 1);
    }
}
