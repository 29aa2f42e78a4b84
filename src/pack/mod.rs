//! Channel packing pipeline.
//!
//! resolve -> validate -> repair/resize -> pack, once per (mode, set).
//! Failures are isolated: a broken set only loses its own outputs.

mod packer;
mod resize;

pub use packer::pack;
pub use resize::{repair, target_size, Repaired};

use crate::config::PackerSettings;
use crate::resolver;
use crate::types::{PackedTexture, TextureImage, TextureSet};
use crate::validation::{validate_set, Diagnostic, ValidationResult};

/// Result of a packing run.
#[derive(Debug, Clone, Default)]
pub struct PackReport {
    pub textures: Vec<PackedTexture>,
    pub diagnostics: ValidationResult,
    /// Identifiers of sources consumed by at least one successful pack,
    /// in first-use order.
    pub used_sources: Vec<String>,
}

impl PackReport {
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Group `entries` into sets and pack every set with every mode.
pub fn pack_batch(entries: Vec<(String, TextureImage)>, settings: &PackerSettings) -> PackReport {
    let (sets, diagnostics) = resolver::group(entries, &settings.roles, &settings.prefixes);
    let mut report = pack_sets(&sets, settings);

    let mut all = diagnostics;
    all.merge(report.diagnostics);
    report.diagnostics = all;
    report
}

/// Pack already grouped sets.
pub fn pack_sets(sets: &[TextureSet], settings: &PackerSettings) -> PackReport {
    let mut report = PackReport::default();

    for mode in &settings.modes {
        for set in sets {
            let (plan, warnings) = match validate_set(set, mode, settings) {
                Ok(ok) => ok,
                Err(e) => {
                    tracing::warn!("Skipping {} for mode {}: {}", set.name(), mode.name, e);
                    report.diagnostics.push(Diagnostic::from_error(&e));
                    continue;
                }
            };
            report.diagnostics.merge(warnings);

            let packed = repair(set, &plan, mode.resize, &mut report.diagnostics)
                .and_then(|repaired| pack(set, mode, &plan, &repaired, settings.exr_srgb_curve));

            match packed {
                Ok(texture) => {
                    tracing::debug!(
                        "Packed {} ({}x{}, {})",
                        texture.stem(),
                        texture.width(),
                        texture.height(),
                        texture.bit_depth()
                    );
                    for source in &texture.sources {
                        if !report.used_sources.contains(source) {
                            report.used_sources.push(source.clone());
                        }
                    }
                    report.textures.push(texture);
                }
                Err(e) => {
                    tracing::warn!("Packing {} with {} failed: {}", set.name(), mode.name, e);
                    report
                        .diagnostics
                        .push(Diagnostic::from_error(&e).with_subject(set.name()));
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{BitDepth, ChannelLayout};

    fn gray(size: u32, level: u8) -> TextureImage {
        TextureImage::uniform(size, size, ChannelLayout::Gray, BitDepth::Eight, [level; 3])
    }

    fn arm_settings() -> PackerSettings {
        let (mut settings, _) = Config::default().packer_settings().unwrap();
        settings.modes.truncate(1);
        settings
    }

    #[test]
    fn test_failed_set_does_not_block_others() {
        let mut settings = arm_settings();
        settings.float_support = false;

        let float_ao = TextureImage::uniform(4, 4, ChannelLayout::Gray, BitDepth::Float, [0; 3]);
        let entries = vec![
            ("rock_ao.png".to_string(), gray(4, 200)),
            ("moss_ao.exr".to_string(), float_ao),
        ];
        let report = pack_batch(entries, &settings);

        assert_eq!(report.textures.len(), 1);
        assert_eq!(report.textures[0].stem(), "rock_ARM");
        assert_eq!(report.diagnostics.error_count(), 1);
        assert_eq!(report.used_sources, vec!["rock_ao.png"]);
    }

    #[test]
    fn test_used_sources_only_from_successful_packs() {
        let settings = arm_settings();
        let entries = vec![
            ("rock_ao.png".to_string(), gray(4, 1)),
            ("rock_normal.png".to_string(), gray(4, 1)),
            ("stone_normal.png".to_string(), gray(4, 1)),
        ];
        let report = pack_batch(entries, &settings);

        assert_eq!(report.textures.len(), 1);
        assert_eq!(report.used_sources, vec!["rock_ao.png"]);
        // stone has none of the ARM maps
        assert_eq!(report.diagnostics.error_count(), 1);
    }
}
