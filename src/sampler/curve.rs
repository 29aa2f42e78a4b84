//! Curve builder: swatches to curve keys, names and atlases.

use crate::config::{Preset, SamplerSettings};
use crate::types::{AtlasRow, CurveAtlas, CurveDefinition, CurveKey, Interpolation, Swatch};

const STEP_EPSILON_MIN: f32 = 0.001;
const STEP_EPSILON_MAX: f32 = 0.01;

/// `{prefix}_{source}`, or `{prefix}_{source}_{preset}` when exporting every preset.
pub fn curve_name(settings: &SamplerSettings, source: &str, preset: Preset) -> String {
    if settings.export.is_all() {
        format!("{}_{}_{}", settings.curve_prefix, source, preset)
    } else {
        format!("{}_{}", settings.curve_prefix, source)
    }
}

pub fn atlas_name(settings: &SamplerSettings, source: &str) -> String {
    format!("{}_{}", settings.atlas_prefix, source)
}

/// Turn swatches into curve keys.
///
/// Continuous curves get one key per swatch. Step curves get a hold key with
/// the previous colour just before every swatch after the first, so `2N - 1`
/// keys in total.
pub fn build_curve(name: String, preset: Preset, swatches: &[Swatch], step: bool) -> CurveDefinition {
    let key = |time: f32, colour: [f32; 3]| CurveKey {
        time,
        colour: [colour[0], colour[1], colour[2], 1.0],
    };

    let mut keys = Vec::with_capacity(if step { swatches.len() * 2 } else { swatches.len() });
    for (i, swatch) in swatches.iter().enumerate() {
        if step && i > 0 {
            let previous = &swatches[i - 1];
            let gap = swatch.position - previous.position;
            let epsilon = (0.25 * gap).clamp(STEP_EPSILON_MIN, STEP_EPSILON_MAX);
            let mut hold = swatch.position - epsilon;
            if hold <= previous.position {
                hold = (previous.position + swatch.position) * 0.5;
            }
            keys.push(key(hold, previous.colour));
        }
        keys.push(key(swatch.position, swatch.colour));
    }

    CurveDefinition {
        name,
        preset,
        interpolation: if step {
            Interpolation::Step
        } else {
            Interpolation::Continuous
        },
        keys,
    }
}

/// Group the curves of one source into an atlas, one row each in the given order.
pub fn build_atlas(name: String, source: &str, curves: &[CurveDefinition]) -> CurveAtlas {
    CurveAtlas {
        name,
        source: source.to_string(),
        rows: curves
            .iter()
            .enumerate()
            .map(|(row, curve)| AtlasRow {
                row,
                curve: curve.name.clone(),
            })
            .collect(),
    }
}
