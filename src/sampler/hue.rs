//! Hue selection over weighted lightness pools.
//!
//! Each preset is an independent function of the same pools. Diverse
//! selection threads a [`HueRepulsion`] accumulator through the bands in
//! order.

use crate::config::Falloff;

use super::lightness::LightnessBand;
use super::pixels::{chroma_hue, SamplePixel, GRAY_CHROMA};

const HUE_BUCKETS: usize = 36;
const BUCKET_DEGREES: f32 = 360.0 / HUE_BUCKETS as f32;

/// Share of a band's chromatic weight a bucket needs to be a diverse candidate.
const CANDIDATE_SHARE: f64 = 0.02;

/// Hue distances closer than this count as ties.
const HUE_TIE_DEGREES: f32 = 1e-4;

/// Pixels admitted to one band, with their weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Pool {
    pub band: usize,
    /// `(pixel index, weight)`, weights > 0.
    pub members: Vec<(usize, f64)>,
    /// No pixel fell inside the window; members are the nearest pixels.
    pub fallback: bool,
}

/// Build the weighted pool for `band`.
///
/// The window is the band widened by `band_size` half-widths on each side;
/// weights fall off with distance from the band centre and scale with alpha.
pub fn build_pool(pixels: &[SamplePixel], band: &LightnessBand, band_size: f32, falloff: Falloff) -> Pool {
    let s = band_size.clamp(0.0, 1.0);
    let hw = band.half_width();
    let lo = band.lower - s * hw;
    let hi = band.upper + s * hw;
    let radius = hw * (1.0 + s);
    let center = band.center();

    let members: Vec<(usize, f64)> = pixels
        .iter()
        .enumerate()
        .filter(|(_, p)| p.lightness >= lo && p.lightness <= hi)
        .filter_map(|(i, p)| {
            let d = (p.lightness - center).abs();
            let w = falloff_weight(d, radius, falloff) as f64 * p.alpha as f64;
            (w > 0.0).then_some((i, w))
        })
        .collect();

    if !members.is_empty() {
        return Pool {
            band: band.index,
            members,
            fallback: false,
        };
    }

    let nearest = pixels
        .iter()
        .map(|p| (p.lightness - center).abs())
        .fold(f32::INFINITY, f32::min);
    let members = pixels
        .iter()
        .enumerate()
        .filter(|(_, p)| (p.lightness - center).abs() <= nearest + 1e-6)
        .map(|(i, _)| (i, 1.0))
        .collect();

    Pool {
        band: band.index,
        members,
        fallback: true,
    }
}

fn falloff_weight(distance: f32, radius: f32, falloff: Falloff) -> f32 {
    if radius <= 0.0 {
        return if distance <= 0.0 { 1.0 } else { 0.0 };
    }
    match falloff {
        Falloff::Triangular => (1.0 - distance / radius).max(0.0),
        Falloff::Gaussian => {
            let sigma = radius * 0.5;
            (-0.5 * (distance / sigma).powi(2)).exp()
        }
    }
}

/// Weighted mean colour; `weight` maps a member to its effective weight.
fn weighted_mean<F>(pixels: &[SamplePixel], members: &[(usize, f64)], weight: F) -> [f32; 3]
where
    F: Fn(&SamplePixel, f64) -> f64,
{
    let mut sum = [0.0f64; 3];
    let mut total = 0.0f64;
    for &(i, w) in members {
        let p = &pixels[i];
        let w = weight(p, w);
        total += w;
        for (s, v) in sum.iter_mut().zip(p.linear) {
            *s += w * v as f64;
        }
    }
    if total <= 0.0 {
        return [0.0; 3];
    }
    sum.map(|s| (s / total) as f32)
}

/// Per-bucket accumulated weight·chroma and members.
struct HueHistogram {
    weight: [f64; HUE_BUCKETS],
    members: Vec<Vec<(usize, f64)>>,
}

impl HueHistogram {
    fn build(pixels: &[SamplePixel], pool: &Pool) -> Self {
        let mut weight = [0.0; HUE_BUCKETS];
        let mut members = vec![Vec::new(); HUE_BUCKETS];
        for &(i, w) in &pool.members {
            let p = &pixels[i];
            if !p.is_chromatic() {
                continue;
            }
            let bucket = hue_bucket(p.hue);
            weight[bucket] += w * p.chroma as f64;
            members[bucket].push((i, w));
        }
        Self { weight, members }
    }

    fn total(&self) -> f64 {
        self.weight.iter().sum()
    }
}

fn hue_bucket(hue: f32) -> usize {
    ((hue.rem_euclid(360.0) / BUCKET_DEGREES) as usize).min(HUE_BUCKETS - 1)
}

/// Smallest angle between two hues, in degrees.
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Hues already chosen by diverse selection, in band order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HueRepulsion {
    chosen: Vec<f32>,
}

impl HueRepulsion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum distance from `hue` to every chosen hue; `None` before the first pick.
    pub fn distance(&self, hue: f32) -> Option<f32> {
        self.chosen
            .iter()
            .map(|&c| hue_distance(hue, c))
            .reduce(f32::min)
    }

    pub fn push(&mut self, hue: f32) {
        self.chosen.push(hue);
    }

    pub fn hues(&self) -> &[f32] {
        &self.chosen
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }
}

/// A diverse candidate: one qualifying hue bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueCandidate {
    pub colour: [f32; 3],
    pub hue: f32,
    pub weight: f64,
}

/// Dominant preset: the mean of the heaviest hue bucket, or of the whole pool
/// when nothing in it is chromatic.
pub fn select_dominant(pixels: &[SamplePixel], pool: &Pool) -> [f32; 3] {
    let histogram = HueHistogram::build(pixels, pool);
    if histogram.total() <= 0.0 {
        return weighted_mean(pixels, &pool.members, |_, w| w);
    }

    let mut best = 0;
    for (bucket, &w) in histogram.weight.iter().enumerate() {
        if w > histogram.weight[best] {
            best = bucket;
        }
    }
    weighted_mean(pixels, &histogram.members[best], |_, w| w)
}

/// Buckets holding at least 2% of the pool's chromatic weight.
pub fn diverse_candidates(pixels: &[SamplePixel], pool: &Pool) -> Vec<HueCandidate> {
    let histogram = HueHistogram::build(pixels, pool);
    let total = histogram.total();
    if total <= 0.0 {
        return Vec::new();
    }

    histogram
        .weight
        .iter()
        .zip(&histogram.members)
        .filter(|(&w, _)| w > 0.0 && w >= CANDIDATE_SHARE * total)
        .map(|(&weight, members)| {
            let colour = weighted_mean(pixels, members, |_, w| w);
            let (_, hue) = chroma_hue(colour);
            HueCandidate { colour, hue, weight }
        })
        .collect()
}

/// Pick the candidate farthest from every chosen hue (ties by weight); the
/// heaviest one when nothing has been chosen yet.
pub fn pick_diverse(candidates: &[HueCandidate], repulsion: &HueRepulsion) -> Option<HueCandidate> {
    let mut best: Option<(HueCandidate, f32)> = None;
    for &candidate in candidates {
        let score = repulsion.distance(candidate.hue).unwrap_or(0.0);
        let better = match best {
            None => true,
            Some((current, current_score)) => {
                if (score - current_score).abs() <= HUE_TIE_DEGREES {
                    candidate.weight > current.weight
                } else {
                    score > current_score
                }
            }
        };
        if better {
            best = Some((candidate, score));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Diverse preset for one band. Updates `repulsion` when a hue is chosen.
pub fn select_diverse(pixels: &[SamplePixel], pool: &Pool, repulsion: &mut HueRepulsion) -> [f32; 3] {
    let candidates = diverse_candidates(pixels, pool);
    match pick_diverse(&candidates, repulsion) {
        Some(pick) => {
            tracing::debug!("band {}: diverse hue {:.1}", pool.band, pick.hue);
            repulsion.push(pick.hue);
            pick.colour
        }
        None => weighted_mean(pixels, &pool.members, |_, w| w),
    }
}

/// Values preset: chroma-damped mean, the least hue-biased colour of the band.
pub fn select_values(pixels: &[SamplePixel], pool: &Pool) -> [f32; 3] {
    weighted_mean(pixels, &pool.members, |p, w| {
        let c = (p.chroma / GRAY_CHROMA) as f64;
        w / (1.0 + c * c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(linear: [f32; 3], lightness: f32) -> SamplePixel {
        let (chroma, hue) = chroma_hue(linear);
        SamplePixel {
            linear,
            alpha: 1.0,
            lightness,
            chroma,
            hue,
        }
    }

    fn band(lower: f32, upper: f32) -> LightnessBand {
        LightnessBand {
            index: 0,
            lower,
            upper,
        }
    }

    fn pool_of(pixels: &[SamplePixel]) -> Pool {
        Pool {
            band: 0,
            members: (0..pixels.len()).map(|i| (i, 1.0)).collect(),
            fallback: false,
        }
    }

    #[test]
    fn test_pool_window_and_falloff() {
        let pixels = vec![
            pixel([0.1; 3], 0.5),
            pixel([0.1; 3], 0.6),
            pixel([0.1; 3], 0.74),
            pixel([0.1; 3], 0.9),
        ];
        // Band 0.4..0.6, s = 1: window 0.3..0.7, radius 0.2.
        let pool = build_pool(&pixels, &band(0.4, 0.6), 1.0, Falloff::Triangular);
        assert!(!pool.fallback);
        assert_eq!(pool.members.len(), 2);
        assert_eq!(pool.members[0], (0, 1.0));
        assert!((pool.members[1].1 - 0.5).abs() < 1e-5);

        let gauss = build_pool(&pixels, &band(0.4, 0.6), 1.0, Falloff::Gaussian);
        assert_eq!(gauss.members.len(), 2);
        assert!((gauss.members[1].1 - (-0.5f64).exp()).abs() < 1e-5);
    }

    #[test]
    fn test_alpha_scales_weight() {
        let mut p = pixel([0.1; 3], 0.5);
        p.alpha = 0.5;
        let pool = build_pool(&[p], &band(0.4, 0.6), 0.0, Falloff::Triangular);
        assert_eq!(pool.members, vec![(0, 0.5)]);
    }

    #[test]
    fn test_empty_window_falls_back_to_nearest() {
        let pixels = vec![pixel([0.1; 3], 0.9), pixel([0.2; 3], 0.95)];
        let pool = build_pool(&pixels, &band(0.0, 0.2), 0.5, Falloff::Gaussian);
        assert!(pool.fallback);
        assert_eq!(pool.members, vec![(0, 1.0)]);
    }

    #[test]
    fn test_dominant_picks_heaviest_bucket() {
        let pixels = vec![
            pixel([0.8, 0.05, 0.05], 0.5),
            pixel([0.8, 0.05, 0.05], 0.5),
            pixel([0.05, 0.05, 0.8], 0.5),
            pixel([0.3, 0.3, 0.3], 0.5),
        ];
        let colour = select_dominant(&pixels, &pool_of(&pixels));
        assert_eq!(colour, [0.8, 0.05, 0.05]);
    }

    #[test]
    fn test_dominant_without_chroma_is_pool_mean() {
        let pixels = vec![pixel([0.2; 3], 0.5), pixel([0.4; 3], 0.5)];
        let colour = select_dominant(&pixels, &pool_of(&pixels));
        assert!((colour[0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_diverse_repels_previous_hues() {
        let red = pixel([0.8, 0.05, 0.05], 0.5);
        let blue = pixel([0.05, 0.05, 0.8], 0.5);
        let pixels = vec![red, red, red, blue];
        let pool = pool_of(&pixels);

        let mut repulsion = HueRepulsion::new();
        let first = select_diverse(&pixels, &pool, &mut repulsion);
        assert_eq!(first, red.linear);

        let second = select_diverse(&pixels, &pool, &mut repulsion);
        assert_eq!(second, blue.linear);
        assert_eq!(repulsion.hues().len(), 2);
    }

    #[test]
    fn test_diverse_gray_band_adds_nothing() {
        let pixels = vec![pixel([0.3; 3], 0.5)];
        let mut repulsion = HueRepulsion::new();
        let colour = select_diverse(&pixels, &pool_of(&pixels), &mut repulsion);
        assert!((colour[0] - 0.3).abs() < 1e-6);
        assert!(repulsion.is_empty());
    }

    #[test]
    fn test_pick_diverse_breaks_ties_by_weight() {
        let mut repulsion = HueRepulsion::new();
        repulsion.push(0.0);
        let a = HueCandidate {
            colour: [1.0, 0.0, 0.0],
            hue: 90.0,
            weight: 1.0,
        };
        let b = HueCandidate {
            colour: [0.0, 1.0, 0.0],
            hue: 270.0,
            weight: 2.0,
        };
        assert_eq!(pick_diverse(&[a, b], &repulsion), Some(b));
    }

    #[test]
    fn test_values_damps_chroma() {
        let pixels = vec![pixel([0.8, 0.05, 0.05], 0.5), pixel([0.3; 3], 0.5)];
        let colour = select_values(&pixels, &pool_of(&pixels));
        // Gray dominates the mean.
        assert!((colour[1] - 0.3).abs() < 0.05);
    }

    #[test]
    fn test_hue_distance_wraps() {
        assert_eq!(hue_distance(350.0, 10.0), 20.0);
        assert_eq!(hue_distance(90.0, 270.0), 180.0);
    }
}
