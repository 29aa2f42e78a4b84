//! Texture loader: decodes scanned files into [`TextureImage`]s.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{Result, TexError};
use crate::types::{ChannelLayout, TextureImage};

use super::scanner::ScanResult;

/// Decoded textures plus the files that failed to load.
#[derive(Debug, Default)]
pub struct LoadResult {
    /// `(identifier, image)` pairs; the identifier is the file path.
    pub entries: Vec<(String, TextureImage)>,
    pub failures: Vec<(PathBuf, TexError)>,
}

/// Load every scanned texture. A file that fails to decode does not stop the rest.
pub fn load_textures(scan: &ScanResult) -> LoadResult {
    let mut result = LoadResult::default();

    for path in &scan.textures {
        match load_texture(path) {
            Ok(image) => {
                tracing::debug!(
                    "Loaded {} ({}x{} {} {})",
                    path.display(),
                    image.width(),
                    image.height(),
                    image.layout(),
                    image.bit_depth()
                );
                result.entries.push((path.display().to_string(), image));
            }
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                result.failures.push((path.clone(), e));
            }
        }
    }

    result
}

/// Load a single texture from disk.
pub fn load_texture(path: &Path) -> Result<TextureImage> {
    let decoded = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => TexError::Io {
            path: path.to_path_buf(),
            message: io.to_string(),
        },
        other => TexError::UnsupportedFormat {
            subject: path.display().to_string(),
            message: other.to_string(),
            help: None,
        },
    })?;
    from_dynamic(&path.display().to_string(), decoded)
}

/// Convert a decoded image.
///
/// Gray+alpha becomes RGBA, 16-bit integer channels keep their high byte,
/// and 32-bit float stays float.
pub fn from_dynamic(identifier: &str, image: DynamicImage) -> Result<TextureImage> {
    let (width, height) = (image.width(), image.height());

    match image {
        DynamicImage::ImageLuma8(buf) => TextureImage::from_u8(width, height, ChannelLayout::Gray, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => {
            let data = buf
                .into_raw()
                .chunks_exact(2)
                .flat_map(|px| [px[0], px[0], px[0], px[1]])
                .collect();
            TextureImage::from_u8(width, height, ChannelLayout::Rgba, data)
        }
        DynamicImage::ImageRgb8(buf) => TextureImage::from_u8(width, height, ChannelLayout::Rgb, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => TextureImage::from_u8(width, height, ChannelLayout::Rgba, buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => {
            TextureImage::from_u8(width, height, ChannelLayout::Gray, high_bytes(buf.as_raw()))
        }
        DynamicImage::ImageLumaA16(buf) => {
            let data = high_bytes(buf.as_raw())
                .chunks_exact(2)
                .flat_map(|px| [px[0], px[0], px[0], px[1]])
                .collect();
            TextureImage::from_u8(width, height, ChannelLayout::Rgba, data)
        }
        DynamicImage::ImageRgb16(buf) => {
            TextureImage::from_u8(width, height, ChannelLayout::Rgb, high_bytes(buf.as_raw()))
        }
        DynamicImage::ImageRgba16(buf) => {
            TextureImage::from_u8(width, height, ChannelLayout::Rgba, high_bytes(buf.as_raw()))
        }
        DynamicImage::ImageRgb32F(buf) => TextureImage::from_f32(width, height, ChannelLayout::Rgb, buf.into_raw()),
        DynamicImage::ImageRgba32F(buf) => {
            TextureImage::from_f32(width, height, ChannelLayout::Rgba, buf.into_raw())
        }
        other => Err(TexError::UnsupportedFormat {
            subject: identifier.to_string(),
            message: format!("pixel format {:?} is not supported", other.color()),
            help: Some("Save the texture as 8-bit, 16-bit or 32-bit float gray/RGB/RGBA".to_string()),
        }),
    }
}

fn high_bytes(data: &[u16]) -> Vec<u8> {
    data.iter().map(|&v| (v >> 8) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BitDepth, PixelBuffer};
    use image::{ImageBuffer, LumaA, Rgb, Rgb32FImage, RgbImage};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_gray_alpha_becomes_rgba() {
        let buf: ImageBuffer<LumaA<u8>, Vec<u8>> = ImageBuffer::from_raw(1, 1, vec![40, 200]).unwrap();
        let tex = from_dynamic("t", DynamicImage::ImageLumaA8(buf)).unwrap();
        assert_eq!(tex.layout(), ChannelLayout::Rgba);
        assert_eq!(tex.pixels(), &PixelBuffer::U8(vec![40, 40, 40, 200]));
    }

    #[test]
    fn test_sixteen_bit_keeps_high_byte() {
        let buf: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_raw(1, 1, vec![0xFFFF, 0x8001, 0x00FF]).unwrap();
        let tex = from_dynamic("t", DynamicImage::ImageRgb16(buf)).unwrap();
        assert_eq!(tex.bit_depth(), BitDepth::Eight);
        assert_eq!(tex.pixels(), &PixelBuffer::U8(vec![0xFF, 0x80, 0x00]));
    }

    #[test]
    fn test_float_stays_float() {
        let buf = Rgb32FImage::from_raw(1, 1, vec![0.25, 1.5, 0.0]).unwrap();
        let tex = from_dynamic("t", DynamicImage::ImageRgb32F(buf)).unwrap();
        assert!(tex.is_float());
        assert_eq!(tex.pixels().as_f32(), Some(&[0.25, 1.5, 0.0][..]));
    }

    #[test]
    fn test_load_png_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rock_ao.png");
        RgbImage::from_pixel(3, 2, Rgb([10, 20, 30])).save(&path).unwrap();

        let tex = load_texture(&path).unwrap();
        assert_eq!(tex.dimensions(), (3, 2));
        assert_eq!(tex.layout(), ChannelLayout::Rgb);
    }

    #[test]
    fn test_undecodable_file_is_reported() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("broken_ao.png");
        fs::write(&bad, b"not a png").unwrap();

        let scan = ScanResult {
            textures: vec![bad.clone()],
            skipped: Vec::new(),
        };
        let result = load_textures(&scan);
        assert!(result.entries.is_empty());
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, bad);
    }
}
