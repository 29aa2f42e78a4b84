//! texkit - channel packing and colour-curve sampling for game textures
//!
//! Two pipelines share one config file:
//!
//! - packing: filenames are resolved into texture sets, validated against
//!   packing modes, repaired (resized, defaults synthesised) and packed into
//!   RGBA textures ([`pack_batch`]);
//! - sampling: an image's lightness range is split into bands and a colour
//!   is picked per band, giving colour curves ([`sample_curves`]).
//!
//! The core works on decoded [`TextureImage`]s and never touches the file
//! system; [`discovery`], [`render`] and [`cli`] handle files.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod output;
pub mod pack;
pub mod render;
pub mod resolver;
pub mod sampler;
pub mod types;
pub mod validation;

pub use config::{Config, PackerSettings, PackingMode, RoleTable, SamplerSettings};
pub use error::{Result, TexError};
pub use pack::{pack_batch, pack_sets, PackReport};
pub use sampler::{sample_curves, CurveReport};
pub use types::{
    BitDepth, ChannelLayout, Colour, CurveAtlas, CurveDefinition, PackedTexture, Swatch, TextureImage, TextureSet,
};
pub use validation::{Diagnostic, Severity, ValidationResult};
