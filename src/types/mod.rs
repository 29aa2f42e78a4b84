//! Core value types for texkit.
//!
//! - `TextureImage` - decoded pixel data in 8-bit or float
//! - `TextureSet` - source maps grouped by base name and role
//! - `PackedTexture` - packed RGBA output
//! - `CurveDefinition` / `CurveAtlas` - sampled colour curves

mod colour;
mod curve;
mod texture;
mod packed;
mod texture_set;

pub use colour::{srgb_decode, srgb_encode, Colour};
pub use curve::{AtlasRow, CurveAtlas, CurveDefinition, CurveKey, Interpolation, Swatch};
pub use texture::{BitDepth, ChannelLayout, PixelBuffer, TextureImage};
pub use packed::{PackedEntry, PackedTexture};
pub use texture_set::{SizeToken, SourceMap, TextureSet};
