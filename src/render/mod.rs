//! File output for packed textures and sampled curves.

mod curve;
mod manifest;
mod texture;

pub use curve::{
    curve_csv, render_atlas, render_swatch_strip, write_atlas, write_curve_csv, write_swatch_strip, ATLAS_WIDTH,
    SWATCH_BLOCK,
};
pub use manifest::{write_manifest, PackManifest, MANIFEST_FILENAME};
pub use texture::{extension_for, file_name, to_dynamic, write_packed};
