//! Tool configuration (texkit.yaml).
//!
//! The file is read leniently: every section has defaults and booleans accept
//! the usual string spellings. Raw sections are then validated into the typed
//! settings the core consumes. A broken packing mode only disables that mode.

mod packing;
mod roles;
mod sampler;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, TexError};
use crate::validation::{Diagnostic, ValidationResult};

pub use packing::{
    Channel, ChannelSource, CompressionPreset, PackingMode, PerChannel, RawPackingMode,
    ResizeStrategy, SrgbSetting, TextureMetadata,
};
pub use roles::{default_texture_types, DefaultFill, FillValue, MapRole, RoleSpec, RoleTable};
pub use sampler::{DivisionMethod, ExportPreset, Falloff, Preset, RawSamplerConfig, SamplerSettings};

/// Config file name looked up in the working directory.
pub const CONFIG_FILENAME: &str = "texkit.yaml";

/// Root of texkit.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub global: GlobalConfig,
    pub generators: GeneratorConfig,
    pub channel_packer: ChannelPackerConfig,
    pub curve_sampler: RawSamplerConfig,
    pub texture_types: Vec<RoleSpec>,
    /// Asset prefixes stripped from base names (`T_rock` -> `rock`).
    pub texture_prefixes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            generators: GeneratorConfig::default(),
            channel_packer: ChannelPackerConfig::default(),
            curve_sampler: RawSamplerConfig::default(),
            texture_types: default_texture_types(),
            texture_prefixes: vec!["T".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Only meaningful inside an editor; reported and otherwise ignored.
    #[serde(deserialize_with = "flag")]
    pub auto_save: bool,
    /// Raise log verbosity to debug.
    #[serde(deserialize_with = "flag")]
    pub show_details: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub unreal_temp_folder: String,
    /// Output subfolder for generated files.
    pub dest_folder_name: String,
    /// Consumed sources are moved here after a successful write.
    pub backup_folder_name: String,
    #[serde(deserialize_with = "flag")]
    pub delete_used: bool,
    /// sRGB-encode float sources when they are packed next to 8-bit ones.
    #[serde(deserialize_with = "flag")]
    pub exr_srgb_curve: bool,
    #[serde(deserialize_with = "flag")]
    pub float_support: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            unreal_temp_folder: String::new(),
            dest_folder_name: String::new(),
            backup_folder_name: String::new(),
            delete_used: false,
            exr_srgb_curve: true,
            float_support: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPackerConfig {
    pub resize_strategy: String,
    pub packing_modes: Vec<RawPackingMode>,
}

impl Default for ChannelPackerConfig {
    fn default() -> Self {
        Self {
            resize_strategy: "down".to_string(),
            packing_modes: default_packing_modes(),
        }
    }
}

fn mode(name: &str, channels: [Option<&str>; 4], compression: &str) -> RawPackingMode {
    let [r, g, b, a] = channels.map(|c| c.map(str::to_string));
    RawPackingMode {
        mode_name: name.to_string(),
        channels: PerChannel { r, g, b, a },
        texture_compression: Some(compression.to_string()),
        ..Default::default()
    }
}

/// Packing modes shipped in the default config.
pub fn default_packing_modes() -> Vec<RawPackingMode> {
    vec![
        mode("ARM", [Some("AO"), Some("Roughness"), Some("Metalness"), None], "Masks"),
        mode(
            "ARMH",
            [Some("AO"), Some("Roughness"), Some("Metalness"), Some("Height")],
            "Masks",
        ),
        RawPackingMode {
            custom_suffix: "CO".to_string(),
            ..mode(
                "ColorOpacity",
                [Some("Albedo.R"), Some("Albedo.G"), Some("Albedo.B"), Some("Mask")],
                "Default",
            )
        },
    ]
}

/// Everything the packer needs from the config.
#[derive(Debug, Clone)]
pub struct PackerSettings {
    pub roles: RoleTable,
    /// Valid modes only; broken ones are reported and dropped.
    pub modes: Vec<PackingMode>,
    pub prefixes: Vec<String>,
    pub exr_srgb_curve: bool,
    pub float_support: bool,
}

impl PackerSettings {
    /// Settings with the built-in role table and the given modes.
    pub fn new(modes: Vec<PackingMode>) -> Self {
        Self {
            roles: RoleTable::builtin(),
            modes,
            prefixes: vec!["T".to_string()],
            exr_srgb_curve: true,
            float_support: true,
        }
    }
}

impl Config {
    /// Load config from a texkit.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TexError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse config from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| TexError::Parse {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })?;
        serde_yaml::from_value(value).map_err(|e| TexError::Config {
            message: format!("Invalid config value: {}", e),
            help: None,
        })
    }

    /// Load `path` if given, otherwise `texkit.yaml` in `dir` if it exists,
    /// otherwise the defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        match path {
            Some(path) => Ok((Self::load(path)?, Some(path.to_path_buf()))),
            None => {
                let candidate = dir.join(CONFIG_FILENAME);
                if candidate.is_file() {
                    Ok((Self::load(&candidate)?, Some(candidate)))
                } else {
                    Ok((Self::default(), None))
                }
            }
        }
    }

    /// Serialise to YAML (used by `texkit init`).
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| TexError::Build {
            message: format!("Failed to serialise config: {}", e),
            help: None,
        })
    }

    pub fn roles(&self) -> Result<RoleTable> {
        RoleTable::from_specs(&self.texture_types)
    }

    /// Validate the packer sections. Broken modes become error diagnostics;
    /// only a broken role table or resize strategy fails outright.
    pub fn packer_settings(&self) -> Result<(PackerSettings, ValidationResult)> {
        let roles = self.roles()?;
        let default_resize = ResizeStrategy::parse(&self.channel_packer.resize_strategy)?;
        let mut diagnostics = ValidationResult::new();

        let mut modes: Vec<PackingMode> = Vec::new();
        for raw in &self.channel_packer.packing_modes {
            match PackingMode::from_raw(raw, &roles, default_resize) {
                Ok((mode, warnings)) => {
                    if modes.iter().any(|m| m.name == mode.name) {
                        diagnostics.push(
                            Diagnostic::warning(
                                "texkit::config::duplicate-mode",
                                format!("mode '{}' is defined twice, keeping the first", mode.name),
                            )
                            .with_subject(&mode.name),
                        );
                        continue;
                    }
                    for w in warnings {
                        diagnostics.push(w);
                    }
                    modes.push(mode);
                }
                Err(e) => {
                    let subject = match raw.mode_name.trim() {
                        "" => "<unnamed mode>".to_string(),
                        name => name.to_string(),
                    };
                    diagnostics.push(Diagnostic::from_error(&e).with_subject(subject));
                }
            }
        }

        Ok((
            PackerSettings {
                roles,
                modes,
                prefixes: self.prefixes(),
                exr_srgb_curve: self.generators.exr_srgb_curve,
                float_support: self.generators.float_support,
            },
            diagnostics,
        ))
    }

    pub fn sampler_settings(&self) -> Result<SamplerSettings> {
        self.curve_sampler.validate()
    }

    /// Trimmed, non-empty asset prefixes.
    pub fn prefixes(&self) -> Vec<String> {
        self.texture_prefixes
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Lenient boolean: a bool, `0`/`1`, or one of `true/false/yes/no/on/off`.
/// A blank or missing value is false.
pub(crate) fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
        Null(()),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(i) => Err(D::Error::custom(format!("expected a boolean, found {}", i))),
        Flag::Text(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(D::Error::custom(format!(
                "expected a boolean (true/false, yes/no, on/off, 1/0), found '{}'",
                other
            ))),
        },
        Flag::Null(()) => Ok(false),
    }
}
