//! Channel packer: composes repaired maps into one RGBA texture.

use crate::config::{Channel, PackingMode};
use crate::error::{Result, TexError};
use crate::types::{srgb_encode, BitDepth, ChannelLayout, PackedTexture, TextureImage, TextureSet};
use crate::validation::{ChannelRead, SetPlan};

use super::resize::Repaired;

/// Neutral value (8-bit level) of an unassigned channel.
fn neutral_level(mode: &PackingMode, channel: Channel) -> u8 {
    mode.neutral[channel.index()].unwrap_or(match channel {
        Channel::A => u8::MAX,
        _ => 0,
    })
}

/// Pack one validated, repaired set.
///
/// Output is 8-bit when every source is 8-bit (bytes copied exactly),
/// float otherwise. With `exr_srgb_curve`, float sources in a mixed set are
/// sRGB-encoded to match the 8-bit maps.
pub fn pack(
    set: &TextureSet,
    mode: &PackingMode,
    plan: &SetPlan,
    repaired: &Repaired,
    exr_srgb_curve: bool,
) -> Result<PackedTexture> {
    let present: Vec<&TextureImage> = plan
        .present
        .iter()
        .filter_map(|role| repaired.images.get(role))
        .collect();
    let depth = present
        .iter()
        .map(|img| img.bit_depth())
        .max()
        .unwrap_or(BitDepth::Eight);
    let mixed = depth == BitDepth::Float && present.iter().any(|img| !img.is_float());
    let encode_float = exr_srgb_curve && mixed;

    let count = repaired.width as usize * repaired.height as usize;
    let image = match depth {
        BitDepth::Eight => {
            let mut data = vec![0u8; count * 4];
            for channel in Channel::ALL {
                let values = channel_u8(mode, plan, repaired, channel, count)?;
                for (px, v) in data.chunks_exact_mut(4).zip(values) {
                    px[channel.index()] = v;
                }
            }
            TextureImage::from_u8(repaired.width, repaired.height, ChannelLayout::Rgba, data)?
        }
        BitDepth::Float => {
            let mut data = vec![0f32; count * 4];
            for channel in Channel::ALL {
                let values = channel_f32(mode, plan, repaired, channel, count, encode_float)?;
                for (px, v) in data.chunks_exact_mut(4).zip(values) {
                    px[channel.index()] = v;
                }
            }
            TextureImage::from_f32(repaired.width, repaired.height, ChannelLayout::Rgba, data)?
        }
    };

    let sources = plan
        .present
        .iter()
        .filter_map(|role| set.get(role).map(|s| s.identifier.clone()))
        .collect();

    Ok(PackedTexture {
        set_name: set.name().to_string(),
        mode_name: mode.name.clone(),
        suffix: mode.suffix.clone(),
        image,
        metadata: mode.metadata,
        sources,
    })
}

fn source_for<'a>(
    mode: &PackingMode,
    repaired: &'a Repaired,
    channel: Channel,
) -> Result<&'a TextureImage> {
    let role = mode.channels[channel.index()]
        .as_ref()
        .map(|s| s.role.as_str())
        .unwrap_or_default();
    repaired.images.get(role).ok_or_else(|| TexError::Build {
        message: format!("no repaired map for {} (channel {})", role, channel),
        help: None,
    })
}

fn channel_u8(
    mode: &PackingMode,
    plan: &SetPlan,
    repaired: &Repaired,
    channel: Channel,
    count: usize,
) -> Result<Vec<u8>> {
    let Some(read) = plan.reads[channel.index()] else {
        return Ok(vec![neutral_level(mode, channel); count]);
    };
    let image = source_for(mode, repaired, channel)?;
    match read {
        ChannelRead::Component(c) => image.channel_u8(c).ok_or_else(|| TexError::Build {
            message: format!("channel {} expected an 8-bit source", channel),
            help: None,
        }),
        ChannelRead::Luma => Ok(image
            .luma_f32()
            .into_iter()
            .map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect()),
    }
}

fn channel_f32(
    mode: &PackingMode,
    plan: &SetPlan,
    repaired: &Repaired,
    channel: Channel,
    count: usize,
    encode_float: bool,
) -> Result<Vec<f32>> {
    let Some(read) = plan.reads[channel.index()] else {
        return Ok(vec![neutral_level(mode, channel) as f32 / 255.0; count]);
    };
    let image = source_for(mode, repaired, channel)?;
    let values = match read {
        ChannelRead::Component(c) => image.channel_f32(c),
        ChannelRead::Luma => image.luma_f32(),
    };
    if encode_float && image.is_float() {
        Ok(values.into_iter().map(srgb_encode).collect())
    } else {
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PackerSettings, RawPackingMode, ResizeStrategy, RoleTable};
    use crate::pack::resize::repair;
    use crate::validation::{validate_set, ValidationResult};

    fn mode(yaml: &str) -> PackingMode {
        let raw: RawPackingMode = serde_yaml::from_str(yaml).unwrap();
        PackingMode::from_raw(&raw, &RoleTable::builtin(), ResizeStrategy::Down)
            .unwrap()
            .0
    }

    fn run(set: &TextureSet, mode: &PackingMode, exr_srgb_curve: bool) -> PackedTexture {
        let settings = PackerSettings::new(vec![mode.clone()]);
        let (plan, _) = validate_set(set, mode, &settings).unwrap();
        let mut diagnostics = ValidationResult::new();
        let repaired = repair(set, &plan, mode.resize, &mut diagnostics).unwrap();
        pack(set, mode, &plan, &repaired, exr_srgb_curve).unwrap()
    }

    #[test]
    fn test_unassigned_channels_use_neutral() {
        let m = mode("mode_name: X\nchannels: { G: AO }\nneutral: { B: 7 }");
        let ao = TextureImage::from_u8(2, 1, ChannelLayout::Gray, vec![10, 20]).unwrap();
        let set = TextureSet::new("rock").with_map("AO", "ao.png", ao);
        let packed = run(&set, &m, true);

        assert_eq!(packed.image.pixels().as_u8().unwrap(), &[0, 10, 7, 255, 0, 20, 7, 255]);
        assert_eq!(packed.stem(), "rock_A");
        assert_eq!(packed.sources, vec!["ao.png"]);
    }

    #[test]
    fn test_component_and_luma_reads() {
        let m = mode("mode_name: X\nchannels: { R: Normal.B, G: Albedo }");
        let normal = TextureImage::from_u8(1, 1, ChannelLayout::Rgb, vec![1, 2, 3]).unwrap();
        let albedo = TextureImage::from_u8(1, 1, ChannelLayout::Rgb, vec![255, 0, 0]).unwrap();
        let set = TextureSet::new("rock")
            .with_map("Normal", "n.png", normal)
            .with_map("Albedo", "a.png", albedo);
        let packed = run(&set, &m, true);

        // 0.2126 * 255 = 54.2
        assert_eq!(packed.image.pixels().as_u8().unwrap(), &[3, 54, 0, 255]);
    }

    #[test]
    fn test_float_promotion_and_srgb_curve() {
        let m = mode("mode_name: X\nchannels: { R: AO, G: Height }");
        let ao = TextureImage::from_u8(1, 1, ChannelLayout::Gray, vec![51]).unwrap();
        let height = TextureImage::from_f32(1, 1, ChannelLayout::Gray, vec![0.2158]).unwrap();
        let set = TextureSet::new("rock")
            .with_map("AO", "ao.png", ao)
            .with_map("Height", "h.exr", height);

        let encoded = run(&set, &m, true);
        assert_eq!(encoded.bit_depth(), BitDepth::Float);
        let px = encoded.image.pixels().as_f32().unwrap();
        assert!((px[0] - 0.2).abs() < 1e-6);
        assert!((px[1] - 0.502).abs() < 1e-3);
        assert_eq!(px[3], 1.0);

        let linear = run(&set, &m, false);
        let px = linear.image.pixels().as_f32().unwrap();
        assert_eq!(px[1], 0.2158);
    }

    #[test]
    fn test_pure_float_set_stays_linear() {
        let m = mode("mode_name: X\nchannels: { R: Height }");
        let height = TextureImage::from_f32(1, 1, ChannelLayout::Gray, vec![0.25]).unwrap();
        let set = TextureSet::new("rock").with_map("Height", "h.exr", height);
        let packed = run(&set, &m, true);
        assert_eq!(packed.image.pixels().as_f32().unwrap(), &[0.25, 0.0, 0.0, 1.0]);
    }
}
