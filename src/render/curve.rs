//! Curve exports: CSV files, atlas gradients and swatch preview strips.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgba, RgbaImage};
use serde::Serialize;

use crate::error::{Result, TexError};
use crate::types::{Colour, CurveAtlas, CurveDefinition, Swatch};

/// Width of an atlas gradient row.
pub const ATLAS_WIDTH: u32 = 256;

/// Side of one block in a swatch preview strip.
pub const SWATCH_BLOCK: u32 = 100;

/// Render a curve as `Time,R,G,B,A` CSV, one line per key.
pub fn curve_csv(curve: &CurveDefinition) -> String {
    let rows = curve.keys.iter().map(|key| {
        let [r, g, b, a] = key.colour;
        format!("{:.6},{:.6},{:.6},{:.6},{:.6}\n", key.time, r, g, b, a)
    });
    std::iter::once("Time,R,G,B,A\n".to_string()).chain(rows).collect()
}

/// Write `{curve}.csv` into `dir`.
pub fn write_curve_csv(curve: &CurveDefinition, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.csv", curve.name));
    fs::write(&path, curve_csv(curve)).map_err(|e| TexError::Io {
        path: path.clone(),
        message: format!("Failed to write curve: {}", e),
    })?;
    Ok(path)
}

/// Gradient image of an atlas: one 1px row per curve, sampled across
/// [`ATLAS_WIDTH`] columns and encoded to sRGB.
pub fn render_atlas(curves: &[CurveDefinition]) -> RgbaImage {
    let height = curves.len().max(1) as u32;
    let mut img: RgbaImage = ImageBuffer::new(ATLAS_WIDTH, height);

    for (y, curve) in curves.iter().enumerate() {
        for x in 0..ATLAS_WIDTH {
            let t = x as f32 / (ATLAS_WIDTH - 1) as f32;
            let [r, g, b, _] = curve.evaluate(t);
            img.put_pixel(x, y as u32, Rgba(Colour::from_linear([r, g, b]).to_rgba()));
        }
    }

    img
}

#[derive(Serialize)]
struct AtlasJson<'a> {
    #[serde(flatten)]
    atlas: &'a CurveAtlas,
    image: String,
    width: u32,
    curves: Vec<&'a CurveDefinition>,
}

/// Write `{atlas}.json` and `{atlas}.png` into `dir`.
///
/// `curves` must be the atlas' curves in row order.
pub fn write_atlas(atlas: &CurveAtlas, curves: &[CurveDefinition], dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let png_path = dir.join(format!("{}.png", atlas.name));
    render_atlas(curves).save(&png_path).map_err(|e| TexError::Io {
        path: png_path.clone(),
        message: format!("Failed to write atlas image: {}", e),
    })?;

    let json = AtlasJson {
        atlas,
        image: format!("{}.png", atlas.name),
        width: ATLAS_WIDTH,
        curves: curves.iter().collect(),
    };
    let json = serde_json::to_string_pretty(&json).map_err(|e| TexError::Build {
        message: format!("Failed to serialize atlas: {}", e),
        help: None,
    })?;

    let json_path = dir.join(format!("{}.json", atlas.name));
    fs::write(&json_path, json).map_err(|e| TexError::Io {
        path: json_path.clone(),
        message: format!("Failed to write atlas: {}", e),
    })?;

    Ok((json_path, png_path))
}

/// A strip of [`SWATCH_BLOCK`]-sized squares, one per swatch.
pub fn render_swatch_strip(swatches: &[Swatch]) -> RgbaImage {
    let width = swatches.len().max(1) as u32 * SWATCH_BLOCK;
    let mut img: RgbaImage = ImageBuffer::new(width, SWATCH_BLOCK);

    for (i, swatch) in swatches.iter().enumerate() {
        let rgba = Rgba(Colour::from_linear(swatch.colour).to_rgba());
        let x0 = i as u32 * SWATCH_BLOCK;
        for y in 0..SWATCH_BLOCK {
            for x in x0..x0 + SWATCH_BLOCK {
                img.put_pixel(x, y, rgba);
            }
        }
    }

    img
}

/// Write `{name}_swatches.png` into `dir`.
pub fn write_swatch_strip(name: &str, swatches: &[Swatch], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}_swatches.png", name));
    render_swatch_strip(swatches).save(&path).map_err(|e| TexError::Io {
        path: path.clone(),
        message: format!("Failed to write swatch preview: {}", e),
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::types::{AtlasRow, CurveKey, Interpolation};
    use tempfile::tempdir;

    fn curve(name: &str, colour: [f32; 4]) -> CurveDefinition {
        CurveDefinition {
            name: name.into(),
            preset: Preset::Values,
            interpolation: Interpolation::Continuous,
            keys: vec![
                CurveKey {
                    time: 0.25,
                    colour: [0.0, 0.0, 0.0, 1.0],
                },
                CurveKey { time: 0.75, colour },
            ],
        }
    }

    #[test]
    fn test_csv_layout() {
        let csv = curve_csv(&curve("CC_a", [1.0, 0.5, 0.0, 1.0]));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Time,R,G,B,A");
        assert_eq!(lines[2], "0.750000,1.000000,0.500000,0.000000,1.000000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_atlas_rows_and_ends() {
        let curves = vec![
            curve("CC_a_dominant", [1.0, 0.0, 0.0, 1.0]),
            curve("CC_a_values", [0.0, 0.0, 1.0, 1.0]),
        ];
        let img = render_atlas(&curves);
        assert_eq!(img.dimensions(), (ATLAS_WIDTH, 2));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(ATLAS_WIDTH - 1, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(ATLAS_WIDTH - 1, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_write_atlas_files() {
        let curves = vec![curve("CC_a", [1.0, 1.0, 1.0, 1.0])];
        let atlas = CurveAtlas {
            name: "CA_a".into(),
            source: "a".into(),
            rows: vec![AtlasRow {
                row: 0,
                curve: "CC_a".into(),
            }],
        };

        let dir = tempdir().unwrap();
        let (json_path, png_path) = write_atlas(&atlas, &curves, dir.path()).unwrap();
        assert!(png_path.exists());

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(json["name"], "CA_a");
        assert_eq!(json["image"], "CA_a.png");
        assert_eq!(json["rows"][0]["curve"], "CC_a");
        assert_eq!(json["curves"][0]["keys"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_swatch_strip_blocks() {
        let swatches = vec![
            Swatch {
                colour: [1.0, 0.0, 0.0],
                band: 0,
                position: 0.25,
            },
            Swatch {
                colour: [0.0, 1.0, 0.0],
                band: 1,
                position: 0.75,
            },
        ];
        let img = render_swatch_strip(&swatches);
        assert_eq!(img.dimensions(), (200, 100));
        assert_eq!(img.get_pixel(99, 50).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(100, 50).0, [0, 255, 0, 255]);
    }
}
