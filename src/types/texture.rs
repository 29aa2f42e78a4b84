//! Decoded texture images.
//!
//! A [`TextureImage`] is an immutable interleaved pixel buffer in one of
//! three layouts and two bit depths. Every transformation (resampling,
//! channel extraction) produces a new value.

use std::fmt;

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, Pixel, Rgb, Rgba};
use serde::Serialize;

use crate::error::{Result, TexError};

/// Storage precision of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BitDepth {
    /// 8-bit unsigned integer per channel.
    Eight,
    /// 32-bit float per channel.
    Float,
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitDepth::Eight => write!(f, "8-bit"),
            BitDepth::Float => write!(f, "float"),
        }
    }
}

/// Channel layout of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    Gray,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    /// Number of interleaved channels.
    pub const fn channels(self) -> usize {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }

    /// Whether the layout can supply component `index` (0 = R .. 3 = A) on request.
    ///
    /// Gray sources never supply an explicit component.
    pub fn supports_component(self, index: usize) -> bool {
        match self {
            ChannelLayout::Gray => false,
            ChannelLayout::Rgb => index < 3,
            ChannelLayout::Rgba => index < 4,
        }
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelLayout::Gray => write!(f, "grayscale"),
            ChannelLayout::Rgb => write!(f, "RGB"),
            ChannelLayout::Rgba => write!(f, "RGBA"),
        }
    }
}

/// Interleaved pixel storage.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelBuffer {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

impl PixelBuffer {
    pub fn len(&self) -> usize {
        match self {
            PixelBuffer::U8(data) => data.len(),
            PixelBuffer::F32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bit_depth(&self) -> BitDepth {
        match self {
            PixelBuffer::U8(_) => BitDepth::Eight,
            PixelBuffer::F32(_) => BitDepth::Float,
        }
    }

    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            PixelBuffer::U8(data) => Some(data),
            PixelBuffer::F32(_) => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            PixelBuffer::U8(_) => None,
            PixelBuffer::F32(data) => Some(data),
        }
    }
}

/// A decoded, immutable texture.
#[derive(Clone, PartialEq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    pixels: PixelBuffer,
}

impl TextureImage {
    /// Build an image from an interleaved buffer, checking its length.
    pub fn new(width: u32, height: u32, layout: ChannelLayout, pixels: PixelBuffer) -> Result<Self> {
        let expected = width as usize * height as usize * layout.channels();
        if pixels.len() != expected {
            return Err(TexError::Build {
                message: format!(
                    "pixel buffer holds {} values, {}x{} {} needs {}",
                    pixels.len(),
                    width,
                    height,
                    layout,
                    expected
                ),
                help: None,
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            pixels,
        })
    }

    /// Build an 8-bit image.
    pub fn from_u8(width: u32, height: u32, layout: ChannelLayout, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, layout, PixelBuffer::U8(data))
    }

    /// Build a float image.
    pub fn from_f32(width: u32, height: u32, layout: ChannelLayout, data: Vec<f32>) -> Result<Self> {
        Self::new(width, height, layout, PixelBuffer::F32(data))
    }

    /// A uniform image. `levels` are 8-bit levels per colour channel; gray uses
    /// the first, alpha (if any) is opaque. Float images store `level / 255`.
    pub fn uniform(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        depth: BitDepth,
        levels: [u8; 3],
    ) -> Self {
        let texel: Vec<u8> = match layout {
            ChannelLayout::Gray => vec![levels[0]],
            ChannelLayout::Rgb => levels.to_vec(),
            ChannelLayout::Rgba => vec![levels[0], levels[1], levels[2], u8::MAX],
        };
        let count = width as usize * height as usize;
        let pixels = match depth {
            BitDepth::Eight => PixelBuffer::U8(texel.repeat(count)),
            BitDepth::Float => {
                let texel: Vec<f32> = texel.iter().map(|&v| v as f32 / 255.0).collect();
                PixelBuffer::F32(texel.repeat(count))
            }
        };
        Self {
            width,
            height,
            layout,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.pixels.bit_depth()
    }

    pub fn is_float(&self) -> bool {
        self.bit_depth() == BitDepth::Float
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Normalised value (0..1 for 8-bit) of channel `c` at pixel index `i`.
    pub fn value(&self, i: usize, c: usize) -> f32 {
        let idx = i * self.layout.channels() + c;
        match &self.pixels {
            PixelBuffer::U8(data) => data[idx] as f32 / 255.0,
            PixelBuffer::F32(data) => data[idx],
        }
    }

    /// Copy out one channel as 8-bit values. `None` for float images.
    pub fn channel_u8(&self, c: usize) -> Option<Vec<u8>> {
        match &self.pixels {
            PixelBuffer::U8(data) => Some(
                data.iter()
                    .skip(c)
                    .step_by(self.layout.channels())
                    .copied()
                    .collect(),
            ),
            PixelBuffer::F32(_) => None,
        }
    }

    /// Copy out one channel as float values (8-bit values become `v / 255`).
    pub fn channel_f32(&self, c: usize) -> Vec<f32> {
        let step = self.layout.channels();
        match &self.pixels {
            PixelBuffer::U8(data) => data
                .iter()
                .skip(c)
                .step_by(step)
                .map(|&v| v as f32 / 255.0)
                .collect(),
            PixelBuffer::F32(data) => data.iter().skip(c).step_by(step).copied().collect(),
        }
    }

    /// True when R, G and B hold identical values everywhere, i.e. a grayscale
    /// map saved as RGB. Always true for gray images.
    pub fn is_gray_content(&self) -> bool {
        let step = self.layout.channels();
        if step == 1 {
            return true;
        }
        match &self.pixels {
            PixelBuffer::U8(data) => data
                .chunks_exact(step)
                .all(|px| px[0] == px[1] && px[1] == px[2]),
            PixelBuffer::F32(data) => data
                .chunks_exact(step)
                .all(|px| px[0] == px[1] && px[1] == px[2]),
        }
    }

    /// Rec.709 luma of the stored RGB values, in the image's own encoding.
    pub fn luma_f32(&self) -> Vec<f32> {
        let step = self.layout.channels();
        (0..self.pixel_count())
            .map(|i| {
                if step == 1 {
                    self.value(i, 0)
                } else {
                    0.2126 * self.value(i, 0) + 0.7152 * self.value(i, 1) + 0.0722 * self.value(i, 2)
                }
            })
            .collect()
    }

    /// Resample to `width` x `height`, preserving layout and bit depth.
    ///
    /// Float samples are clamped to 0..1 by the filter.
    pub fn resized(&self, width: u32, height: u32, filter: FilterType) -> Result<Self> {
        if (width, height) == self.dimensions() {
            return Ok(self.clone());
        }
        let (w, h) = self.dimensions();
        let pixels = match (&self.pixels, self.layout) {
            (PixelBuffer::U8(d), ChannelLayout::Gray) => {
                PixelBuffer::U8(resample::<Luma<u8>>(w, h, d, width, height, filter)?)
            }
            (PixelBuffer::U8(d), ChannelLayout::Rgb) => {
                PixelBuffer::U8(resample::<Rgb<u8>>(w, h, d, width, height, filter)?)
            }
            (PixelBuffer::U8(d), ChannelLayout::Rgba) => {
                PixelBuffer::U8(resample::<Rgba<u8>>(w, h, d, width, height, filter)?)
            }
            (PixelBuffer::F32(d), ChannelLayout::Gray) => {
                PixelBuffer::F32(resample::<Luma<f32>>(w, h, d, width, height, filter)?)
            }
            (PixelBuffer::F32(d), ChannelLayout::Rgb) => {
                PixelBuffer::F32(resample::<Rgb<f32>>(w, h, d, width, height, filter)?)
            }
            (PixelBuffer::F32(d), ChannelLayout::Rgba) => {
                PixelBuffer::F32(resample::<Rgba<f32>>(w, h, d, width, height, filter)?)
            }
        };
        Self::new(width, height, self.layout, pixels)
    }

    /// Nearest-neighbour downscale so the long side is at most `max_side`.
    /// Smaller images are returned unchanged.
    pub fn downscaled_to(&self, max_side: u32) -> Result<Self> {
        let long_side = self.width.max(self.height);
        if long_side <= max_side {
            return Ok(self.clone());
        }
        let scale = max_side as f64 / long_side as f64;
        let width = ((self.width as f64 * scale).round() as u32).max(1);
        let height = ((self.height as f64 * scale).round() as u32).max(1);
        self.resized(width, height, FilterType::Nearest)
    }
}

impl fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .field("bit_depth", &self.bit_depth())
            .finish()
    }
}

fn resample<P>(
    width: u32,
    height: u32,
    data: &[P::Subpixel],
    new_width: u32,
    new_height: u32,
    filter: FilterType,
) -> Result<Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let buffer: ImageBuffer<P, &[P::Subpixel]> =
        ImageBuffer::from_raw(width, height, data).ok_or_else(|| TexError::Build {
            message: format!("pixel buffer does not fit {}x{}", width, height),
            help: None,
        })?;
    Ok(imageops::resize(&buffer, new_width, new_height, filter).into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_gray(width: u32, height: u32) -> TextureImage {
        let data = (0..width * height).map(|i| (i % 256) as u8).collect();
        TextureImage::from_u8(width, height, ChannelLayout::Gray, data).unwrap()
    }

    #[test]
    fn test_rejects_short_buffer() {
        let err = TextureImage::from_u8(2, 2, ChannelLayout::Rgb, vec![0; 11]).unwrap_err();
        assert!(matches!(err, TexError::Build { .. }));
    }

    #[test]
    fn test_uniform_float_uses_level_over_255() {
        let img = TextureImage::uniform(2, 1, ChannelLayout::Gray, BitDepth::Float, [51, 0, 0]);
        assert_eq!(img.channel_f32(0), vec![0.2, 0.2]);
    }

    #[test]
    fn test_uniform_rgba_alpha_opaque() {
        let img = TextureImage::uniform(1, 1, ChannelLayout::Rgba, BitDepth::Eight, [128, 128, 255]);
        assert_eq!(img.pixels(), &PixelBuffer::U8(vec![128, 128, 255, 255]));
    }

    #[test]
    fn test_channel_extraction() {
        let img =
            TextureImage::from_u8(2, 1, ChannelLayout::Rgb, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(img.channel_u8(0), Some(vec![1, 4]));
        assert_eq!(img.channel_u8(2), Some(vec![3, 6]));
    }

    #[test]
    fn test_gray_content_detection() {
        let gray_rgb =
            TextureImage::from_u8(2, 1, ChannelLayout::Rgb, vec![9, 9, 9, 7, 7, 7]).unwrap();
        assert!(gray_rgb.is_gray_content());

        let coloured =
            TextureImage::from_u8(1, 1, ChannelLayout::Rgb, vec![9, 9, 10]).unwrap();
        assert!(!coloured.is_gray_content());
    }

    #[test]
    fn test_resize_preserves_depth_and_layout() {
        let img = gradient_gray(8, 8);
        let small = img.resized(4, 2, FilterType::Lanczos3).unwrap();
        assert_eq!(small.dimensions(), (4, 2));
        assert_eq!(small.bit_depth(), BitDepth::Eight);
        assert_eq!(small.layout(), ChannelLayout::Gray);

        let float = TextureImage::uniform(8, 8, ChannelLayout::Rgb, BitDepth::Float, [64, 64, 64]);
        let big = float.resized(16, 16, FilterType::Lanczos3).unwrap();
        assert_eq!(big.bit_depth(), BitDepth::Float);
        assert_eq!(big.pixel_count(), 256);
    }

    #[test]
    fn test_resize_same_size_is_identity() {
        let img = gradient_gray(4, 4);
        assert_eq!(img.resized(4, 4, FilterType::Lanczos3).unwrap(), img);
    }

    #[test]
    fn test_downscale_long_side() {
        let img = gradient_gray(512, 256);
        let small = img.downscaled_to(256).unwrap();
        assert_eq!(small.dimensions(), (256, 128));

        let tiny = gradient_gray(16, 16);
        assert_eq!(tiny.downscaled_to(256).unwrap().dimensions(), (16, 16));
    }
}
