//! Checks run for each (mode, set) pair before packing.
//!
//! Fatal problems come back as `Err`; repairable ones as warnings in a
//! `ValidationResult`.

use crate::config::{Channel, ChannelSource, DefaultFill, PackingMode, RoleTable};
use crate::error::{Result, TexError};
use crate::types::{ChannelLayout, TextureImage, TextureSet};

use super::warning::{Diagnostic, ValidationResult};

/// How an output channel reads its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRead {
    /// Copy one stored channel.
    Component(usize),
    /// Rec.709 luma of an RGB source with differing channels.
    Luma,
}

/// Roles the mode references that the set lacks, with their default fills.
pub fn check_required_roles(
    set: &TextureSet,
    mode: &PackingMode,
    roles: &RoleTable,
) -> Result<Vec<(String, DefaultFill)>> {
    let mut defaults = Vec::new();
    let mut present = 0;

    for role in mode.roles() {
        if set.contains(role) {
            present += 1;
            continue;
        }
        match roles.get(role).and_then(|r| r.default_fill()) {
            Some(fill) => defaults.push((role.to_string(), fill)),
            None => {
                return Err(TexError::Validation {
                    subject: set.name().to_string(),
                    message: format!("mode '{}' needs a {} map and it has no default", mode.name, role),
                    help: Some(format!(
                        "Add a {} map to the set or give the texture type a default",
                        role
                    )),
                })
            }
        }
    }

    if present == 0 {
        return Err(TexError::Validation {
            subject: set.name().to_string(),
            message: format!("none of the maps used by mode '{}' are present", mode.name),
            help: Some(format!("Mode '{}' reads {}", mode.name, mode.roles().join(", "))),
        });
    }

    Ok(defaults)
}

/// Reject float sources when float support is disabled.
pub fn check_float_support(set: &TextureSet, mode: &PackingMode, float_support: bool) -> Result<()> {
    if float_support {
        return Ok(());
    }
    for role in mode.roles() {
        if let Some(source) = set.get(role) {
            if source.image.is_float() {
                return Err(TexError::UnsupportedFormat {
                    subject: set.name().to_string(),
                    message: format!("'{}' is a float image and float support is off", source.identifier),
                    help: Some("Set generators.float_support: true or convert the map to 8-bit".to_string()),
                });
            }
        }
    }
    Ok(())
}

/// Whether the mode's present sources disagree on resolution.
pub fn check_resolutions(set: &TextureSet, mode: &PackingMode) -> (bool, ValidationResult) {
    let mut result = ValidationResult::new();

    let sizes: Vec<(&str, (u32, u32))> = mode
        .roles()
        .into_iter()
        .filter_map(|role| set.get(role).map(|s| (role, s.image.dimensions())))
        .collect();

    let mismatched = sizes.windows(2).any(|pair| pair[0].1 != pair[1].1);
    if mismatched {
        let listing = sizes
            .iter()
            .map(|(role, (w, h))| format!("{} {}x{}", role, w, h))
            .collect::<Vec<_>>()
            .join(", ");
        result.push(
            Diagnostic::warning(
                "texkit::validate::resolution-mismatch",
                format!("maps differ in resolution ({}), resizing {}", listing, mode.resize),
            )
            .with_subject(set.name()),
        );
    }

    (mismatched, result)
}

/// Decide how every assigned channel reads its source.
pub fn check_components(
    set: &TextureSet,
    mode: &PackingMode,
    defaults: &[(String, DefaultFill)],
) -> Result<([Option<ChannelRead>; 4], ValidationResult)> {
    let mut reads: [Option<ChannelRead>; 4] = [None; 4];
    let mut result = ValidationResult::new();

    for (channel, source) in mode.assigned() {
        let read = match set.get(&source.role) {
            Some(map) => read_for_image(set, channel, source, &map.identifier, &map.image, &mut result)?,
            None => {
                let fill = defaults
                    .iter()
                    .find(|(role, _)| role == &source.role)
                    .map(|(_, fill)| *fill)
                    .ok_or_else(|| {
                        TexError::validation(set.name(), format!("no source or default for {}", source.role))
                    })?;
                read_for_default(set, channel, source, fill, &mut result)?
            }
        };
        reads[channel.index()] = Some(read);
    }

    Ok((reads, result))
}

fn read_for_image(
    set: &TextureSet,
    channel: Channel,
    source: &ChannelSource,
    identifier: &str,
    image: &TextureImage,
    result: &mut ValidationResult,
) -> Result<ChannelRead> {
    let layout = image.layout();
    match source.component {
        Some(component) => component_read(set, channel, source, layout, component),
        None if layout == ChannelLayout::Gray || image.is_gray_content() => Ok(ChannelRead::Component(0)),
        None => {
            result.push(luma_warning(set, channel, source, identifier));
            Ok(ChannelRead::Luma)
        }
    }
}

fn read_for_default(
    set: &TextureSet,
    channel: Channel,
    source: &ChannelSource,
    fill: DefaultFill,
    result: &mut ValidationResult,
) -> Result<ChannelRead> {
    match source.component {
        Some(component) => component_read(set, channel, source, fill.layout, component),
        None => {
            let [r, g, b] = fill.levels;
            if fill.layout == ChannelLayout::Gray || (r == g && g == b) {
                Ok(ChannelRead::Component(0))
            } else {
                result.push(luma_warning(set, channel, source, "default fill"));
                Ok(ChannelRead::Luma)
            }
        }
    }
}

fn component_read(
    set: &TextureSet,
    channel: Channel,
    source: &ChannelSource,
    layout: ChannelLayout,
    component: Channel,
) -> Result<ChannelRead> {
    if layout.supports_component(component.index()) {
        return Ok(ChannelRead::Component(component.index()));
    }
    let help = match layout {
        ChannelLayout::Gray => format!("{} is grayscale; assign '{}' without a component", source.role, source.role),
        _ => format!("{} has no alpha channel", source.role),
    };
    Err(TexError::Validation {
        subject: set.name().to_string(),
        message: format!(
            "channel {} requests {} but the {} source is {}",
            channel, source, source.role, layout
        ),
        help: Some(help),
    })
}

fn luma_warning(set: &TextureSet, channel: Channel, source: &ChannelSource, identifier: &str) -> Diagnostic {
    Diagnostic::warning(
        "texkit::validate::implicit-luma",
        format!(
            "channel {} takes RGB {} ({}) without a component, using its luma",
            channel, source.role, identifier
        ),
    )
    .with_subject(set.name())
    .with_help(format!("Write {}.R (or .G/.B) to pick one channel", source.role))
}
