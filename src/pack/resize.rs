//! Repair/resize engine: brings every map of a set to one resolution and
//! synthesises missing roles from their defaults.

use std::collections::BTreeMap;

use image::imageops::FilterType;

use crate::config::ResizeStrategy;
use crate::error::{Result, TexError};
use crate::types::{BitDepth, TextureImage, TextureSet};
use crate::validation::{Diagnostic, SetPlan, ValidationResult};

/// Maps of one set at a common resolution, keyed by role.
#[derive(Debug, Clone)]
pub struct Repaired {
    pub width: u32,
    pub height: u32,
    pub images: BTreeMap<String, TextureImage>,
    /// Roles that were synthesised from defaults.
    pub synthesised: Vec<String>,
}

/// Common resolution for a list of sizes: per-axis minimum for `down`,
/// maximum for `up`.
pub fn target_size<I>(sizes: I, strategy: ResizeStrategy) -> Option<(u32, u32)>
where
    I: IntoIterator<Item = (u32, u32)>,
{
    sizes.into_iter().reduce(|(aw, ah), (bw, bh)| match strategy {
        ResizeStrategy::Down => (aw.min(bw), ah.min(bh)),
        ResizeStrategy::Up => (aw.max(bw), ah.max(bh)),
    })
}

/// Resize present maps and synthesise defaults for `plan`.
pub fn repair(
    set: &TextureSet,
    plan: &SetPlan,
    strategy: ResizeStrategy,
    diagnostics: &mut ValidationResult,
) -> Result<Repaired> {
    let sources: Vec<(&str, &TextureImage)> = plan
        .present
        .iter()
        .filter_map(|role| set.get(role).map(|s| (role.as_str(), &s.image)))
        .collect();

    let (width, height) = target_size(sources.iter().map(|(_, img)| img.dimensions()), strategy)
        .ok_or_else(|| TexError::validation(set.name(), "set has no sources to pack"))?;

    let mut images = BTreeMap::new();
    for (role, image) in sources {
        if image.dimensions() == (width, height) {
            images.insert(role.to_string(), image.clone());
            continue;
        }

        let (w, h) = image.dimensions();
        tracing::info!(
            "Resizing {} {} from {}x{} to {}x{}",
            set.name(),
            role,
            w,
            h,
            width,
            height
        );
        diagnostics.push(
            Diagnostic::info(
                "texkit::repair::resize",
                format!("resized {} from {}x{} to {}x{}", role, w, h, width, height),
            )
            .with_subject(set.name()),
        );
        images.insert(role.to_string(), image.resized(width, height, FilterType::Lanczos3)?);
    }

    let mut synthesised = Vec::new();
    for (role, fill) in &plan.defaults {
        tracing::info!("Filling missing {} of {} with default", role, set.name());
        diagnostics.push(
            Diagnostic::info(
                "texkit::repair::default",
                format!("no {} map, filled with default {:?}", role, fill.levels),
            )
            .with_subject(set.name()),
        );
        images.insert(
            role.clone(),
            TextureImage::uniform(width, height, fill.layout, BitDepth::Eight, fill.levels),
        );
        synthesised.push(role.clone());
    }

    Ok(Repaired {
        width,
        height,
        images,
        synthesised,
    })
}
