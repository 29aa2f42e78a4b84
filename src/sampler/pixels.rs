//! Pixel preparation for curve sampling: alpha filter, lightness and OKLCh.

use palette::{IntoColor, Lab, LinSrgb, Oklch};

use crate::error::{Result, TexError};
use crate::types::{srgb_decode, ChannelLayout, TextureImage};

/// Pixels with alpha at or below this are ignored.
pub const ALPHA_THRESHOLD: f32 = 64.0 / 255.0;

/// Long side the image is reduced to before sampling.
pub const DOWNSCALE_SIZE: u32 = 256;

/// OKLCh chroma below which a pixel counts as gray.
pub const GRAY_CHROMA: f32 = 0.055;

/// A pixel that passed the alpha filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePixel {
    /// Linear RGB.
    pub linear: [f32; 3],
    pub alpha: f32,
    /// CIE L*/100, stretched over the image's own range.
    pub lightness: f32,
    /// OKLCh chroma.
    pub chroma: f32,
    /// OKLCh hue in degrees, 0..360.
    pub hue: f32,
}

impl SamplePixel {
    pub fn is_chromatic(&self) -> bool {
        self.chroma >= GRAY_CHROMA
    }
}

/// OKLCh chroma and hue (degrees) of a linear RGB colour.
pub fn chroma_hue(linear: [f32; 3]) -> (f32, f32) {
    let [r, g, b] = linear;
    let lch: Oklch = LinSrgb::new(r, g, b).into_color();
    (lch.chroma, lch.hue.into_positive_degrees())
}

/// Decode, filter and measure every usable pixel of `image`.
pub fn collect_pixels(name: &str, image: &TextureImage, full_resolution: bool) -> Result<Vec<SamplePixel>> {
    let image = if full_resolution {
        image.clone()
    } else {
        image.downscaled_to(DOWNSCALE_SIZE)?
    };

    let layout = image.layout();
    let decode = |v: f32| {
        if image.is_float() {
            v.max(0.0)
        } else {
            srgb_decode(v)
        }
    };

    let mut pixels = Vec::with_capacity(image.pixel_count());
    for i in 0..image.pixel_count() {
        let alpha = match layout {
            ChannelLayout::Rgba => image.value(i, 3).clamp(0.0, 1.0),
            _ => 1.0,
        };
        if alpha <= ALPHA_THRESHOLD {
            continue;
        }

        let linear = match layout {
            ChannelLayout::Gray => [decode(image.value(i, 0)); 3],
            _ => [
                decode(image.value(i, 0)),
                decode(image.value(i, 1)),
                decode(image.value(i, 2)),
            ],
        };
        let [r, g, b] = linear;
        let lab: Lab = LinSrgb::new(r, g, b).into_color();
        let (chroma, hue) = chroma_hue(linear);

        pixels.push(SamplePixel {
            linear,
            alpha,
            lightness: lab.l / 100.0,
            chroma,
            hue,
        });
    }

    if pixels.is_empty() {
        return Err(TexError::Validation {
            subject: name.to_string(),
            message: "no pixels passed the alpha filter".to_string(),
            help: Some("The image is fully transparent; sample an opaque texture".to_string()),
        });
    }

    normalise_lightness(&mut pixels);
    Ok(pixels)
}

/// Stretch lightness to 0..1 over the pixels' own range; a flat image maps to 0.5.
fn normalise_lightness(pixels: &mut [SamplePixel]) {
    let (min, max) = pixels
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.lightness), hi.max(p.lightness))
        });

    let range = max - min;
    for p in pixels.iter_mut() {
        p.lightness = if range > 1e-6 {
            ((p.lightness - min) / range).clamp(0.0, 1.0)
        } else {
            0.5
        };
    }
}
