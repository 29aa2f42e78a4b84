//! Curve sampler settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TexError};

use super::flag;

/// How the lightness range is split into bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionMethod {
    /// Equal-width bands.
    Uniform,
    /// Equal-population bands.
    Perceptual,
}

/// A hue selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Dominant,
    Diverse,
    Values,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Dominant, Preset::Diverse, Preset::Values];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Dominant => "dominant",
            Preset::Diverse => "diverse",
            Preset::Values => "values",
        }
    }

    /// Falloff used when `lightness_falloff` is `auto`.
    pub fn default_falloff(self) -> Falloff {
        match self {
            Preset::Dominant | Preset::Diverse => Falloff::Gaussian,
            Preset::Values => Falloff::Triangular,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight falloff around a band centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Falloff {
    Triangular,
    Gaussian,
}

/// Which presets to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPreset {
    One(Preset),
    All,
}

impl ExportPreset {
    pub fn presets(self) -> Vec<Preset> {
        match self {
            ExportPreset::One(p) => vec![p],
            ExportPreset::All => Preset::ALL.to_vec(),
        }
    }

    pub fn is_all(self) -> bool {
        self == ExportPreset::All
    }
}

/// `curve_sampler` section as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSamplerConfig {
    pub swatch_count: i64,
    pub division_method: String,
    pub export_preset: String,
    pub light_band_size: f32,
    pub lightness_falloff: String,
    #[serde(deserialize_with = "flag")]
    pub step_transition: bool,
    #[serde(deserialize_with = "flag")]
    pub use_full_resolution: bool,
    #[serde(deserialize_with = "flag")]
    pub create_curve_atlas: bool,
    pub custom_prefix: String,
    pub custom_curve_atlas_prefix: String,
}

impl Default for RawSamplerConfig {
    fn default() -> Self {
        Self {
            swatch_count: 8,
            division_method: "perceptual".to_string(),
            export_preset: "all".to_string(),
            light_band_size: 0.5,
            lightness_falloff: "auto".to_string(),
            step_transition: false,
            use_full_resolution: false,
            create_curve_atlas: true,
            custom_prefix: String::new(),
            custom_curve_atlas_prefix: String::new(),
        }
    }
}

/// Validated sampler settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerSettings {
    pub swatch_count: usize,
    pub division: DivisionMethod,
    pub export: ExportPreset,
    /// Pool widening factor, clamped to 0..1.
    pub band_size: f32,
    /// Falloff override; `None` means each preset's own default.
    pub falloff: Option<Falloff>,
    pub step_transition: bool,
    pub use_full_resolution: bool,
    pub create_curve_atlas: bool,
    pub curve_prefix: String,
    pub atlas_prefix: String,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        // The default raw section always validates.
        RawSamplerConfig::default()
            .validate()
            .unwrap_or(SamplerSettings {
                swatch_count: 8,
                division: DivisionMethod::Perceptual,
                export: ExportPreset::All,
                band_size: 0.5,
                falloff: None,
                step_transition: false,
                use_full_resolution: false,
                create_curve_atlas: true,
                curve_prefix: "CC".to_string(),
                atlas_prefix: "CA".to_string(),
            })
    }
}

impl SamplerSettings {
    /// Falloff for a preset, honouring the override.
    pub fn falloff_for(&self, preset: Preset) -> Falloff {
        self.falloff.unwrap_or_else(|| preset.default_falloff())
    }
}

impl RawSamplerConfig {
    pub fn validate(&self) -> Result<SamplerSettings> {
        if self.swatch_count < 2 {
            return Err(TexError::Config {
                message: format!("swatch_count must be at least 2, got {}", self.swatch_count),
                help: None,
            });
        }

        let division = match self.division_method.trim().to_lowercase().as_str() {
            "uniform" => DivisionMethod::Uniform,
            "perceptual" => DivisionMethod::Perceptual,
            other => return Err(unknown("division_method", other, "uniform, perceptual")),
        };

        let export = match self.export_preset.trim().to_lowercase().as_str() {
            "dominant" => ExportPreset::One(Preset::Dominant),
            "diverse" => ExportPreset::One(Preset::Diverse),
            "values" => ExportPreset::One(Preset::Values),
            "all" => ExportPreset::All,
            other => return Err(unknown("export_preset", other, "dominant, diverse, values, all")),
        };

        let falloff = match self.lightness_falloff.trim().to_lowercase().as_str() {
            "" | "auto" => None,
            "triangle" | "triangular" => Some(Falloff::Triangular),
            "gauss" | "gaussian" => Some(Falloff::Gaussian),
            other => return Err(unknown("lightness_falloff", other, "auto, triangle, gauss")),
        };

        let band_size = if self.light_band_size.is_finite() {
            self.light_band_size.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Ok(SamplerSettings {
            swatch_count: self.swatch_count as usize,
            division,
            export,
            band_size,
            falloff,
            step_transition: self.step_transition,
            use_full_resolution: self.use_full_resolution,
            create_curve_atlas: self.create_curve_atlas,
            curve_prefix: prefix_or(&self.custom_prefix, "CC"),
            atlas_prefix: prefix_or(&self.custom_curve_atlas_prefix, "CA"),
        })
    }
}

fn prefix_or(custom: &str, fallback: &str) -> String {
    match custom.trim() {
        "" => fallback.to_string(),
        custom => custom.to_string(),
    }
}

fn unknown(key: &str, value: &str, expected: &str) -> TexError {
    TexError::Config {
        message: format!("unknown {} '{}'", key, value),
        help: Some(format!("Expected one of: {}", expected)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = SamplerSettings::default();
        assert_eq!(s.swatch_count, 8);
        assert_eq!(s.division, DivisionMethod::Perceptual);
        assert!(s.export.is_all());
        assert_eq!(s.curve_prefix, "CC");
        assert_eq!(s.atlas_prefix, "CA");
        assert_eq!(s.falloff_for(Preset::Values), Falloff::Triangular);
        assert_eq!(s.falloff_for(Preset::Dominant), Falloff::Gaussian);
    }

    #[test]
    fn test_parse_section() {
        let raw: RawSamplerConfig = serde_yaml::from_str(
            "swatch_count: 5\ndivision_method: Uniform\nexport_preset: values\nlight_band_size: 3\nlightness_falloff: gauss\nstep_transition: 'yes'\ncustom_prefix: LUT",
        )
        .unwrap();
        let s = raw.validate().unwrap();
        assert_eq!(s.swatch_count, 5);
        assert_eq!(s.division, DivisionMethod::Uniform);
        assert_eq!(s.export.presets(), vec![Preset::Values]);
        assert_eq!(s.band_size, 1.0);
        assert_eq!(s.falloff_for(Preset::Values), Falloff::Gaussian);
        assert!(s.step_transition);
        assert_eq!(s.curve_prefix, "LUT");
    }

    #[test]
    fn test_invalid_settings() {
        for yaml in [
            "swatch_count: 1",
            "division_method: logarithmic",
            "export_preset: vivid",
            "lightness_falloff: cosine",
        ] {
            let raw: RawSamplerConfig = serde_yaml::from_str(yaml).unwrap();
            assert!(matches!(raw.validate(), Err(TexError::Config { .. })), "{}", yaml);
        }
    }
}
