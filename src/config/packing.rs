//! Packing modes: which map role feeds each RGBA output channel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TexError};
use crate::validation::Diagnostic;

use super::roles::RoleTable;

/// An output channel of a packed texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    R,
    G,
    B,
    A,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::A];

    pub const fn index(self) -> usize {
        match self {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
            Channel::A => 3,
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(Channel::R),
            'G' => Some(Channel::G),
            'B' => Some(Channel::B),
            'A' => Some(Channel::A),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Channel::R => "R",
            Channel::G => "G",
            Channel::B => "B",
            Channel::A => "A",
        };
        f.write_str(letter)
    }
}

/// Resize policy applied when a set's maps disagree on resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeStrategy {
    /// Shrink everything to the smallest width and height.
    #[default]
    Down,
    /// Grow everything to the largest width and height.
    Up,
}

impl ResizeStrategy {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "down" => Ok(ResizeStrategy::Down),
            "up" => Ok(ResizeStrategy::Up),
            other => Err(TexError::Config {
                message: format!("unknown resize_strategy '{}'", other),
                help: Some("Use 'down' or 'up'".to_string()),
            }),
        }
    }
}

impl fmt::Display for ResizeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeStrategy::Down => write!(f, "down"),
            ResizeStrategy::Up => write!(f, "up"),
        }
    }
}

/// Engine compression preset attached to packed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompressionPreset {
    Default,
    Normalmap,
    Masks,
    Grayscale,
    Displacementmap,
}

impl CompressionPreset {
    const ALL: [CompressionPreset; 5] = [
        CompressionPreset::Default,
        CompressionPreset::Normalmap,
        CompressionPreset::Masks,
        CompressionPreset::Grayscale,
        CompressionPreset::Displacementmap,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CompressionPreset::Default => "Default",
            CompressionPreset::Normalmap => "Normalmap",
            CompressionPreset::Masks => "Masks",
            CompressionPreset::Grayscale => "Grayscale",
            CompressionPreset::Displacementmap => "Displacementmap",
        }
    }

    /// Engine enum name, e.g. `TC_NORMALMAP`.
    pub fn engine_name(self) -> String {
        format!("TC_{}", self.label().to_uppercase())
    }

    /// Whether textures with this preset are sampled as sRGB unless overridden.
    pub fn default_srgb(self) -> bool {
        matches!(self, CompressionPreset::Default)
    }

    /// Parse a label (`Masks`) or engine name (`TC_MASKS`), case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|preset| {
            preset.label().eq_ignore_ascii_case(name) || preset.engine_name().eq_ignore_ascii_case(name)
        })
    }
}

/// Metadata passed through to whoever writes the packed texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextureMetadata {
    pub compression: CompressionPreset,
    #[serde(rename = "sRGB")]
    pub srgb: bool,
}

/// Values per RGBA channel, keyed `R`/`G`/`B`/`A` in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerChannel<T> {
    #[serde(rename = "R", alias = "r", default, skip_serializing_if = "Option::is_none")]
    pub r: Option<T>,
    #[serde(rename = "G", alias = "g", default, skip_serializing_if = "Option::is_none")]
    pub g: Option<T>,
    #[serde(rename = "B", alias = "b", default, skip_serializing_if = "Option::is_none")]
    pub b: Option<T>,
    #[serde(rename = "A", alias = "a", default, skip_serializing_if = "Option::is_none")]
    pub a: Option<T>,
}

impl<T> Default for PerChannel<T> {
    fn default() -> Self {
        Self {
            r: None,
            g: None,
            b: None,
            a: None,
        }
    }
}

impl<T: Clone> PerChannel<T> {
    fn to_array(&self) -> [Option<T>; 4] {
        [self.r.clone(), self.g.clone(), self.b.clone(), self.a.clone()]
    }
}

/// `sRGB` accepts a bool or the strings `"sRGB"` / `"RGB"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SrgbSetting {
    Flag(bool),
    Text(String),
}

/// A packing mode as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPackingMode {
    #[serde(default)]
    pub mode_name: String,
    #[serde(default)]
    pub custom_suffix: String,
    #[serde(default)]
    pub channels: PerChannel<String>,
    /// Fill for unassigned channels, overriding 0 (colour) / 255 (alpha).
    #[serde(default, skip_serializing_if = "is_empty_channels")]
    pub neutral: PerChannel<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_compression: Option<String>,
    #[serde(rename = "sRGB", alias = "srgb", default, skip_serializing_if = "Option::is_none")]
    pub srgb: Option<SrgbSetting>,
}

fn is_empty_channels(channels: &PerChannel<u8>) -> bool {
    channels.to_array().iter().all(Option::is_none)
}

/// Where an output channel reads from: a role, optionally one component of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSource {
    /// Canonical role name from the role table.
    pub role: String,
    /// Component of a multi-channel source (`Normal.R`).
    pub component: Option<Channel>,
}

impl ChannelSource {
    /// Parse `Role`, `Role.R` or `Role_R` against the role table.
    pub fn parse(value: &str, roles: &RoleTable) -> Result<Self> {
        let value = value.trim();
        if let Some(role) = roles.get(value) {
            return Ok(Self {
                role: role.name().to_string(),
                component: None,
            });
        }

        if let Some((prefix, rest)) = value.rsplit_once(|c: char| c == '.' || c == '_') {
            let mut chars = rest.chars();
            if let (Some(letter), None, Some(role)) = (chars.next(), chars.next(), roles.get(prefix)) {
                let component = Channel::from_letter(letter).ok_or_else(|| TexError::Config {
                    message: format!("'{}' selects unknown component '{}'", value, letter),
                    help: Some("Components are R, G, B or A".to_string()),
                })?;
                return Ok(Self {
                    role: role.name().to_string(),
                    component: Some(component),
                });
            }
        }

        Err(TexError::Config {
            message: format!("unknown map role '{}'", value),
            help: Some(format!("Known roles: {}", roles.names())),
        })
    }
}

impl fmt::Display for ChannelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component {
            Some(c) => write!(f, "{}.{}", self.role, c),
            None => f.write_str(&self.role),
        }
    }
}

/// A validated packing recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct PackingMode {
    pub name: String,
    /// Output suffix (custom, or generated from role initials).
    pub suffix: String,
    pub resize: ResizeStrategy,
    /// Source per output channel, `None` when unassigned.
    pub channels: [Option<ChannelSource>; 4],
    /// Neutral override per output channel.
    pub neutral: [Option<u8>; 4],
    pub metadata: TextureMetadata,
}

impl PackingMode {
    /// Validate a raw mode. Metadata fallbacks are reported as warnings.
    pub fn from_raw(
        raw: &RawPackingMode,
        roles: &RoleTable,
        default_resize: ResizeStrategy,
    ) -> Result<(Self, Vec<Diagnostic>)> {
        let name = raw.mode_name.trim();
        if name.is_empty() {
            return Err(TexError::Config {
                message: "packing mode has an empty mode_name".to_string(),
                help: Some("Give every entry in packing_modes a mode_name".to_string()),
            });
        }

        let mut channels: [Option<ChannelSource>; 4] = Default::default();
        for (slot, value) in channels.iter_mut().zip(raw.channels.to_array()) {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                let source = ChannelSource::parse(&value, roles).map_err(|e| match e {
                    TexError::Config { message, help } => TexError::Config {
                        message: format!("mode '{}': {}", name, message),
                        help,
                    },
                    other => other,
                })?;
                *slot = Some(source);
            }
        }
        if channels.iter().all(Option::is_none) {
            return Err(TexError::Config {
                message: format!("mode '{}' assigns no channels", name),
                help: Some("Map at least one of R, G, B, A to a texture type".to_string()),
            });
        }

        let resize = match &raw.resize_strategy {
            Some(s) => ResizeStrategy::parse(s).map_err(|e| match e {
                TexError::Config { message, help } => TexError::Config {
                    message: format!("mode '{}': {}", name, message),
                    help,
                },
                other => other,
            })?,
            None => default_resize,
        };

        let suffix = match raw.custom_suffix.trim() {
            "" => generated_suffix(&channels),
            custom => custom.to_string(),
        };

        let mut warnings = Vec::new();
        let metadata = resolve_metadata(name, raw, &channels, roles, &mut warnings);

        Ok((
            Self {
                name: name.to_string(),
                suffix,
                resize,
                channels,
                neutral: raw.neutral.to_array(),
                metadata,
            },
            warnings,
        ))
    }

    /// Assigned channels with their sources.
    pub fn assigned(&self) -> impl Iterator<Item = (Channel, &ChannelSource)> {
        Channel::ALL
            .into_iter()
            .zip(self.channels.iter())
            .filter_map(|(channel, source)| source.as_ref().map(|s| (channel, s)))
    }

    /// Distinct roles referenced by this mode, in channel order.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = Vec::new();
        for (_, source) in self.assigned() {
            if !roles.contains(&source.role.as_str()) {
                roles.push(&source.role);
            }
        }
        roles
    }
}

/// Initials of the assigned roles in RGBA order, e.g. AO/Roughness/Metalness -> `ARM`.
fn generated_suffix(channels: &[Option<ChannelSource>; 4]) -> String {
    channels
        .iter()
        .flatten()
        .filter_map(|source| source.role.chars().next())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn resolve_metadata(
    mode: &str,
    raw: &RawPackingMode,
    channels: &[Option<ChannelSource>; 4],
    roles: &RoleTable,
    warnings: &mut Vec<Diagnostic>,
) -> TextureMetadata {
    let requested = raw
        .texture_compression
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let compression = match requested {
        Some(name) => CompressionPreset::parse(name).unwrap_or_else(|| {
            warnings.push(
                Diagnostic::warning(
                    "texkit::config::compression",
                    format!("unknown texture_compression '{}', using Default", name),
                )
                .with_subject(mode),
            );
            CompressionPreset::Default
        }),
        None => match single_role_hint(channels, roles) {
            Some(preset) => preset,
            None => {
                warnings.push(
                    Diagnostic::warning(
                        "texkit::config::compression",
                        "empty texture_compression, using Default",
                    )
                    .with_subject(mode),
                );
                CompressionPreset::Default
            }
        },
    };

    let srgb = match &raw.srgb {
        Some(SrgbSetting::Flag(flag)) => *flag,
        Some(SrgbSetting::Text(text)) => match text.trim().to_lowercase().as_str() {
            "srgb" | "true" => true,
            "rgb" | "linear" | "false" => false,
            "" => compression.default_srgb(),
            other => {
                warnings.push(
                    Diagnostic::warning(
                        "texkit::config::srgb",
                        format!("unknown sRGB value '{}', using the preset default", other),
                    )
                    .with_subject(mode),
                );
                compression.default_srgb()
            }
        },
        None => compression.default_srgb(),
    };

    TextureMetadata { compression, srgb }
}

/// The role's compression hint when every channel reads from the same role.
fn single_role_hint(channels: &[Option<ChannelSource>; 4], roles: &RoleTable) -> Option<CompressionPreset> {
    let mut assigned = channels.iter().flatten();
    let first = assigned.next()?;
    if assigned.any(|s| s.role != first.role) {
        return None;
    }
    roles
        .get(&first.role)
        .and_then(|r| r.compression_hint())
        .and_then(CompressionPreset::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(yaml: &str) -> RawPackingMode {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_channel_sources() {
        let roles = RoleTable::builtin();
        assert_eq!(
            ChannelSource::parse("roughness", &roles).unwrap(),
            ChannelSource {
                role: "Roughness".to_string(),
                component: None
            }
        );
        assert_eq!(
            ChannelSource::parse("Normal.R", &roles).unwrap().component,
            Some(Channel::R)
        );
        assert_eq!(
            ChannelSource::parse("Normal_g", &roles).unwrap().component,
            Some(Channel::G)
        );
        assert!(ChannelSource::parse("Normal.X", &roles).is_err());
        assert!(ChannelSource::parse("Curvature", &roles).is_err());
    }

    #[test]
    fn test_parse_channel_source_multibyte_component() {
        let roles = RoleTable::builtin();
        assert!(matches!(
            ChannelSource::parse("Normal.€", &roles),
            Err(TexError::Config { .. })
        ));
        assert!(ChannelSource::parse("Normal_RG", &roles).is_err());
        assert!(ChannelSource::parse("€", &roles).is_err());
    }

    #[test]
    fn test_mode_with_generated_suffix() {
        let roles = RoleTable::builtin();
        let (mode, warnings) = PackingMode::from_raw(
            &raw("mode_name: ARM\nchannels: { R: AO, G: Roughness, B: Metalness }\ntexture_compression: Masks"),
            &roles,
            ResizeStrategy::Down,
        )
        .unwrap();

        assert_eq!(mode.suffix, "ARM");
        assert!(mode.channels[3].is_none());
        assert_eq!(mode.roles(), vec!["AO", "Roughness", "Metalness"]);
        assert_eq!(
            mode.metadata,
            TextureMetadata {
                compression: CompressionPreset::Masks,
                srgb: false
            }
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_custom_suffix_and_srgb_text() {
        let roles = RoleTable::builtin();
        let (mode, _) = PackingMode::from_raw(
            &raw("mode_name: Col\ncustom_suffix: CA\nchannels: { R: Albedo.R, G: Albedo.G, B: Albedo.B, A: Mask }\ntexture_compression: TC_DEFAULT\nsRGB: RGB"),
            &roles,
            ResizeStrategy::Up,
        )
        .unwrap();

        assert_eq!(mode.suffix, "CA");
        assert_eq!(mode.resize, ResizeStrategy::Up);
        assert_eq!(mode.metadata.compression, CompressionPreset::Default);
        assert!(!mode.metadata.srgb);
    }

    #[test]
    fn test_unknown_compression_falls_back_with_warning() {
        let roles = RoleTable::builtin();
        let (mode, warnings) = PackingMode::from_raw(
            &raw("mode_name: X\nchannels: { R: AO }\ntexture_compression: BC7"),
            &roles,
            ResizeStrategy::Down,
        )
        .unwrap();
        assert_eq!(mode.metadata.compression, CompressionPreset::Default);
        assert!(mode.metadata.srgb);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_role_compression_hint_used_when_empty() {
        let roles = RoleTable::builtin();
        let (mode, warnings) = PackingMode::from_raw(
            &raw("mode_name: NRM\nchannels: { R: Normal.R, G: Normal.G }"),
            &roles,
            ResizeStrategy::Down,
        )
        .unwrap();
        assert_eq!(mode.metadata.compression, CompressionPreset::Normalmap);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_mode_config_errors() {
        let roles = RoleTable::builtin();
        let cases = [
            "mode_name: ''\nchannels: { R: AO }",
            "mode_name: Empty\nchannels: {}",
            "mode_name: Bad\nchannels: { R: Dirt }",
            "mode_name: Bad\nchannels: { R: AO }\nresize_strategy: sideways",
        ];
        for yaml in cases {
            let err = PackingMode::from_raw(&raw(yaml), &roles, ResizeStrategy::Down).unwrap_err();
            assert!(matches!(err, TexError::Config { .. }), "{}", yaml);
        }
    }

    #[test]
    fn test_compression_parse() {
        assert_eq!(CompressionPreset::parse("normalmap"), Some(CompressionPreset::Normalmap));
        assert_eq!(CompressionPreset::parse("TC_Grayscale"), Some(CompressionPreset::Grayscale));
        assert_eq!(CompressionPreset::parse("nope"), None);
    }
}
