//! Map role table: texture semantics, their filename suffixes and default fills.
//!
//! The table is plain configuration data. Adding a map type means adding an
//! entry to `texture_types`, nothing in the resolver or packer branches on a
//! specific role.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TexError};
use crate::types::{ChannelLayout, Colour};

/// One `texture_types` entry as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSpec {
    pub name: String,
    #[serde(default)]
    pub suffixes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<RoleDefaultSpec>,
    /// Compression preset suggested for modes built only from this role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
}

/// Default fill for a missing role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDefaultSpec {
    #[serde(default)]
    pub layout: DefaultLayout,
    pub value: FillValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultLayout {
    #[default]
    Gray,
    Rgb,
}

/// A fill value: one 8-bit level, an `[r, g, b]` triple, or a hex colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Level(u8),
    Triple([u8; 3]),
    Hex(String),
}

impl FillValue {
    fn levels(&self) -> Result<[u8; 3]> {
        match self {
            FillValue::Level(v) => Ok([*v; 3]),
            FillValue::Triple(rgb) => Ok(*rgb),
            FillValue::Hex(hex) => {
                let c = Colour::from_hex(hex)?;
                Ok([c.r, c.g, c.b])
            }
        }
    }
}

/// Resolved default fill of a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultFill {
    pub layout: ChannelLayout,
    pub levels: [u8; 3],
}

/// A texture semantic with its recognised suffixes.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRole {
    name: String,
    suffixes: Vec<String>,
    default: Option<DefaultFill>,
    compression: Option<String>,
}

impl MapRole {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased suffixes.
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn default_fill(&self) -> Option<DefaultFill> {
        self.default
    }

    pub fn compression_hint(&self) -> Option<&str> {
        self.compression.as_deref()
    }
}

/// Ordered collection of map roles. Order breaks ties between equally long suffixes.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleTable {
    roles: Vec<MapRole>,
}

impl RoleTable {
    /// Build the table from config entries.
    pub fn from_specs(specs: &[RoleSpec]) -> Result<Self> {
        let mut roles: Vec<MapRole> = Vec::with_capacity(specs.len());

        for spec in specs {
            let name = spec.name.trim();
            if name.is_empty() {
                return Err(TexError::config("texture_types entry has an empty name"));
            }
            if roles.iter().any(|r| r.name.eq_ignore_ascii_case(name)) {
                return Err(TexError::Config {
                    message: format!("texture type '{}' is defined twice", name),
                    help: Some("Merge the suffix lists into one entry".to_string()),
                });
            }

            let default = match &spec.default {
                Some(d) => {
                    let levels = d.value.levels().map_err(|e| TexError::Config {
                        message: format!("texture type '{}' has an invalid default: {}", name, e),
                        help: Some("Use a level (0-255), [r, g, b], or \"#RRGGBB\"".to_string()),
                    })?;
                    let layout = match d.layout {
                        DefaultLayout::Gray => ChannelLayout::Gray,
                        DefaultLayout::Rgb => ChannelLayout::Rgb,
                    };
                    Some(DefaultFill { layout, levels })
                }
                None => None,
            };

            roles.push(MapRole {
                name: name.to_string(),
                suffixes: spec
                    .suffixes
                    .iter()
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect(),
                default,
                compression: spec.compression.clone(),
            });
        }

        Ok(Self { roles })
    }

    /// The built-in table.
    pub fn builtin() -> Self {
        // Built-in specs are static and known-valid.
        Self::from_specs(&default_texture_types()).unwrap_or(Self { roles: vec![] })
    }

    /// Look up a role by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&MapRole> {
        let name = name.trim();
        self.roles.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapRole> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Comma-separated role names, for help text.
    pub fn names(&self) -> String {
        self.roles
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn role(name: &str, suffixes: &[&str], layout: DefaultLayout, value: FillValue) -> RoleSpec {
    RoleSpec {
        name: name.to_string(),
        suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
        default: Some(RoleDefaultSpec { layout, value }),
        compression: None,
    }
}

fn with_compression(mut spec: RoleSpec, compression: &str) -> RoleSpec {
    spec.compression = Some(compression.to_string());
    spec
}

/// The default `texture_types` table.
pub fn default_texture_types() -> Vec<RoleSpec> {
    use DefaultLayout::{Gray, Rgb};
    use FillValue::{Hex, Level};

    vec![
        role("AO", &["ambientocclusion", "occlusion", "ambient", "ao"], Gray, Level(255)),
        role("Roughness", &["roughness", "roughnes", "rough", "r"], Gray, Level(128)),
        role("Metalness", &["metalness", "metalnes", "metallic", "metal", "m"], Gray, Level(0)),
        with_compression(
            role("Height", &["displacement", "height", "disp", "d", "h"], Gray, Level(0)),
            "Displacementmap",
        ),
        role("Mask", &["opacity", "alpha", "mask"], Gray, Level(255)),
        role("Translucency", &["translucency", "translucent", "trans", "t"], Gray, Level(0)),
        role("Specular", &["specular", "spec", "s"], Gray, Level(128)),
        with_compression(
            role(
                "Normal",
                &[
                    "normal_dx", "normal_gl", "normaldx", "normalgl", "normal", "nor_dx",
                    "nor_gl", "norm", "nrm", "n",
                ],
                Rgb,
                Hex("#8080FF".to_string()),
            ),
            "Normalmap",
        ),
        with_compression(
            role("BendNormal", &["bend_normal", "bendnormal", "bn"], Rgb, Hex("#8080FF".to_string())),
            "Normalmap",
        ),
        role("Bump", &["bump", "bp"], Gray, Level(128)),
        with_compression(
            role(
                "Albedo",
                &["basecolor", "diffuse", "albedo", "color", "diff", "base", "a", "b"],
                Rgb,
                Level(128),
            ),
            "Default",
        ),
        role("SSS", &["subsurface", "sss"], Gray, Level(0)),
        role("Emissive", &["emissive", "emission", "emit", "glow"], Rgb, Level(0)),
        role("Glossiness", &["glossiness", "gloss", "gl"], Gray, Level(128)),
    ]
}
