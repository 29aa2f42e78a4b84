//! Swatches, colour curves and curve atlases.

use serde::Serialize;

use crate::config::Preset;

/// A sampled colour for one lightness band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Swatch {
    /// Linear RGB.
    pub colour: [f32; 3],
    pub band: usize,
    /// Curve position in (0, 1).
    pub position: f32,
}

/// A curve key: position and linear RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveKey {
    pub time: f32,
    pub colour: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Continuous,
    Step,
}

/// A named colour curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveDefinition {
    pub name: String,
    pub preset: Preset,
    pub interpolation: Interpolation,
    /// Sorted by time.
    pub keys: Vec<CurveKey>,
}

impl CurveDefinition {
    /// Colour at `t` (clamped to the key range).
    ///
    /// Continuous curves interpolate linearly between neighbouring keys; step
    /// curves hold the last key at or before `t`.
    pub fn evaluate(&self, t: f32) -> [f32; 4] {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return [0.0, 0.0, 0.0, 1.0],
        };
        if t <= first.time {
            return first.colour;
        }
        if t >= last.time {
            return last.colour;
        }

        // Index of the first key strictly after t; at least 1 here.
        let next = self.keys.partition_point(|k| k.time <= t);
        let a = &self.keys[next - 1];
        let b = &self.keys[next];

        match self.interpolation {
            Interpolation::Step => a.colour,
            Interpolation::Continuous => {
                let span = b.time - a.time;
                let f = if span > 0.0 { (t - a.time) / span } else { 0.0 };
                let mut out = [0.0; 4];
                for (i, v) in out.iter_mut().enumerate() {
                    *v = a.colour[i] + (b.colour[i] - a.colour[i]) * f;
                }
                out
            }
        }
    }
}

/// One atlas row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtlasRow {
    pub row: usize,
    pub curve: String,
}

/// Curves sampled from one source, one per row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveAtlas {
    pub name: String,
    pub source: String,
    pub rows: Vec<AtlasRow>,
}
