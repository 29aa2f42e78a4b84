//! Lightness partitioner.

use serde::Serialize;

use crate::config::DivisionMethod;

/// One contiguous slice of the normalised lightness range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LightnessBand {
    pub index: usize,
    pub lower: f32,
    pub upper: f32,
}

impl LightnessBand {
    pub fn center(&self) -> f32 {
        (self.lower + self.upper) * 0.5
    }

    pub fn half_width(&self) -> f32 {
        (self.upper - self.lower) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.upper - self.lower
    }

    /// `[lower, upper)` membership; the last band also holds 1.0.
    pub fn contains(&self, lightness: f32, is_last: bool) -> bool {
        lightness >= self.lower && (lightness < self.upper || (is_last && lightness <= self.upper))
    }
}

/// Split 0..1 into `count` bands.
///
/// `lightness` is only read by the perceptual method.
pub fn partition(lightness: &[f32], count: usize, method: DivisionMethod) -> Vec<LightnessBand> {
    let count = count.max(1);
    let bounds = match method {
        DivisionMethod::Uniform => (0..=count).map(|i| i as f32 / count as f32).collect(),
        DivisionMethod::Perceptual => perceptual_bounds(lightness, count),
    };

    bounds
        .windows(2)
        .enumerate()
        .map(|(index, pair)| LightnessBand {
            index,
            lower: pair[0],
            upper: pair[1],
        })
        .collect()
}

/// Equal-population boundaries: each inner boundary sits halfway between the
/// sorted samples around quantile i/N, then boundaries are pushed apart to a
/// minimum width of 1/(64N).
fn perceptual_bounds(lightness: &[f32], count: usize) -> Vec<f32> {
    let mut sorted: Vec<f32> = lightness.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f32::total_cmp);

    let mut bounds = vec![0.0f32; count + 1];
    bounds[count] = 1.0;

    let n = sorted.len();
    for (i, bound) in bounds.iter_mut().enumerate().take(count).skip(1) {
        *bound = if n >= 2 {
            let k = (i * n / count).clamp(1, n - 1);
            (sorted[k - 1] + sorted[k]) * 0.5
        } else if n == 1 {
            sorted[0]
        } else {
            i as f32 / count as f32
        };
    }

    let min_width = 1.0 / (64.0 * count as f32);
    for i in 1..count {
        bounds[i] = bounds[i].max(bounds[i - 1] + min_width);
    }
    for i in (1..count).rev() {
        bounds[i] = bounds[i].min(bounds[i + 1] - min_width);
    }
    bounds
}
