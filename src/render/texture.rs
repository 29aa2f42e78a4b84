//! Packed texture output.
//!
//! 8-bit textures are written as PNG, float textures as OpenEXR.

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgba32FImage, RgbaImage};

use crate::error::{Result, TexError};
use crate::types::{BitDepth, PackedTexture, PixelBuffer};

/// File extension for a texture of the given depth.
pub fn extension_for(depth: BitDepth) -> &'static str {
    match depth {
        BitDepth::Eight => "png",
        BitDepth::Float => "exr",
    }
}

/// Output file name, `{base}_{suffix}.{png|exr}`.
pub fn file_name(texture: &PackedTexture) -> String {
    format!("{}.{}", texture.stem(), extension_for(texture.bit_depth()))
}

/// Convert a packed texture into an `image` buffer.
pub fn to_dynamic(texture: &PackedTexture) -> Result<DynamicImage> {
    let (width, height) = (texture.width(), texture.height());
    let mismatch = || TexError::Build {
        message: format!("packed buffer for {} does not fit {}x{} RGBA", texture.stem(), width, height),
        help: None,
    };

    match texture.image.pixels() {
        PixelBuffer::U8(data) => RgbaImage::from_raw(width, height, data.clone())
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(mismatch),
        PixelBuffer::F32(data) => Rgba32FImage::from_raw(width, height, data.clone())
            .map(DynamicImage::ImageRgba32F)
            .ok_or_else(mismatch),
    }
}

/// Write a packed texture into `dir`. Returns the written path.
pub fn write_packed(texture: &PackedTexture, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(file_name(texture));
    let image = to_dynamic(texture)?;

    image.save(&path).map_err(|e| TexError::Io {
        path: path.clone(),
        message: format!("Failed to write texture: {}", e),
    })?;

    Ok(path)
}
