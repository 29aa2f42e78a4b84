//! Colour-curve sampling.
//!
//! pixels -> lightness bands -> per-band pools -> one swatch per band and
//! preset -> curves (and optionally an atlas).

mod curve;
mod hue;
mod lightness;
mod pixels;

pub use curve::{atlas_name, build_atlas, build_curve, curve_name};
pub use hue::{
    build_pool, diverse_candidates, hue_distance, pick_diverse, select_diverse, select_dominant, select_values,
    HueCandidate, HueRepulsion, Pool,
};
pub use lightness::{partition, LightnessBand};
pub use pixels::{chroma_hue, collect_pixels, SamplePixel, ALPHA_THRESHOLD, DOWNSCALE_SIZE, GRAY_CHROMA};

use crate::config::{Falloff, Preset, SamplerSettings};
use crate::error::{Result, TexError};
use crate::types::{CurveAtlas, CurveDefinition, Swatch, TextureImage};
use crate::validation::{Diagnostic, ValidationResult};

/// Everything sampled from one source image.
#[derive(Debug, Clone)]
pub struct CurveReport {
    pub source: String,
    pub bands: Vec<LightnessBand>,
    pub curves: Vec<CurveDefinition>,
    pub atlas: Option<CurveAtlas>,
    pub swatches: Vec<(Preset, Vec<Swatch>)>,
    pub diagnostics: ValidationResult,
}

impl CurveReport {
    pub fn swatches_for(&self, preset: Preset) -> Option<&[Swatch]> {
        self.swatches
            .iter()
            .find(|(p, _)| *p == preset)
            .map(|(_, s)| s.as_slice())
    }
}

/// Sample colour curves from `image`.
///
/// `name` is the source name used in curve names (usually the file stem).
pub fn sample_curves(name: &str, image: &TextureImage, settings: &SamplerSettings) -> Result<CurveReport> {
    if settings.swatch_count < 2 {
        return Err(TexError::config(format!(
            "swatch_count must be at least 2, got {}",
            settings.swatch_count
        )));
    }

    let pixels = collect_pixels(name, image, settings.use_full_resolution)?;
    let lightness: Vec<f32> = pixels.iter().map(|p| p.lightness).collect();
    let bands = partition(&lightness, settings.swatch_count, settings.division);
    for band in &bands {
        tracing::debug!("{}: band {} [{:.3}, {:.3})", name, band.index, band.lower, band.upper);
    }

    let mut diagnostics = ValidationResult::new();
    let presets = settings.export.presets();

    // Pools only depend on the falloff, so presets sharing one share pools.
    let mut pools: Vec<(Falloff, Vec<Pool>)> = Vec::new();
    for preset in &presets {
        let falloff = settings.falloff_for(*preset);
        if pools.iter().any(|(f, _)| *f == falloff) {
            continue;
        }
        let built: Vec<Pool> = bands
            .iter()
            .map(|band| build_pool(&pixels, band, settings.band_size, falloff))
            .collect();
        for pool in built.iter().filter(|p| p.fallback) {
            diagnostics.push(
                Diagnostic::info(
                    "texkit::sample::empty-band",
                    format!("band {} admitted no pixels; using the nearest ones", pool.band),
                )
                .with_subject(name),
            );
        }
        pools.push((falloff, built));
    }

    let mut curves = Vec::with_capacity(presets.len());
    let mut swatches = Vec::with_capacity(presets.len());
    for preset in presets {
        let falloff = settings.falloff_for(preset);
        let band_pools = match pools.iter().find(|(f, _)| *f == falloff) {
            Some((_, p)) => p,
            None => continue,
        };

        let colours = select_preset(preset, &pixels, band_pools);
        let preset_swatches: Vec<Swatch> = bands
            .iter()
            .zip(colours)
            .map(|(band, colour)| Swatch {
                colour,
                band: band.index,
                position: band.center(),
            })
            .collect();

        let curve = build_curve(
            curve_name(settings, name, preset),
            preset,
            &preset_swatches,
            settings.step_transition,
        );
        curves.push(curve);
        swatches.push((preset, preset_swatches));
    }

    let atlas = settings
        .create_curve_atlas
        .then(|| build_atlas(atlas_name(settings, name), name, &curves));

    tracing::info!("Sampled {} curve(s) from {}", curves.len(), name);

    Ok(CurveReport {
        source: name.to_string(),
        bands,
        curves,
        atlas,
        swatches,
        diagnostics,
    })
}

fn select_preset(preset: Preset, pixels: &[SamplePixel], pools: &[Pool]) -> Vec<[f32; 3]> {
    match preset {
        Preset::Dominant => pools.iter().map(|pool| select_dominant(pixels, pool)).collect(),
        Preset::Diverse => {
            let mut repulsion = HueRepulsion::new();
            pools
                .iter()
                .map(|pool| select_diverse(pixels, pool, &mut repulsion))
                .collect()
        }
        Preset::Values => pools.iter().map(|pool| select_values(pixels, pool)).collect(),
    }
}
