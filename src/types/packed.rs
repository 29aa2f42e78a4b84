//! Packed output textures.

use serde::Serialize;

use crate::config::TextureMetadata;
use crate::types::{BitDepth, ChannelLayout, TextureImage};

/// One packed RGBA texture for a (mode, set) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedTexture {
    pub set_name: String,
    pub mode_name: String,
    pub suffix: String,
    /// Always [`ChannelLayout::Rgba`].
    pub image: TextureImage,
    pub metadata: TextureMetadata,
    /// Identifiers of the source maps that went into this texture.
    pub sources: Vec<String>,
}

impl PackedTexture {
    /// Output stem, `{base}_{suffix}`.
    pub fn stem(&self) -> String {
        format!("{}_{}", self.set_name, self.suffix)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.image.bit_depth()
    }

    pub fn channels(&self) -> usize {
        debug_assert_eq!(self.image.layout(), ChannelLayout::Rgba);
        self.image.layout().channels()
    }

    /// Manifest entry describing this texture.
    pub fn manifest_entry(&self, file: &str) -> PackedEntry {
        PackedEntry {
            file: file.to_string(),
            set: self.set_name.clone(),
            mode: self.mode_name.clone(),
            width: self.width(),
            height: self.height(),
            bit_depth: self.bit_depth(),
            compression: self.metadata.compression.engine_name(),
            srgb: self.metadata.srgb,
            sources: self.sources.clone(),
        }
    }
}

/// Serialisable metadata for one written texture (`pack-manifest.json`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackedEntry {
    pub file: String,
    pub set: String,
    pub mode: String,
    pub width: u32,
    pub height: u32,
    pub bit_depth: BitDepth,
    pub compression: String,
    #[serde(rename = "sRGB")]
    pub srgb: bool,
    pub sources: Vec<String>,
}
