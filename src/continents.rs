//! Continent mask: macro landmass blobs that shape raw noise into continents.
//!
//! One of several hand-authored layouts is picked per generation, its blobs
//! jittered in position, size and strength, and a scatter of small islands
//! added on top.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::noise_field::NoiseField;

/// Parameters for continent and island generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinentParams {
    /// Maximum blob center offset as a fraction of the map dimension (either direction)
    pub position_jitter: f64,
    /// Multiplier range applied to template sizes
    pub size_jitter: (f64, f64),
    /// Multiplier range applied to template strengths
    pub strength_jitter: (f64, f64),
    /// Island count range (min inclusive, max exclusive)
    pub island_count: (usize, usize),
    pub island_size: (f64, f64),
    pub island_strength: (f64, f64),
    /// Falloff exponent range drawn per blob
    pub falloff_exponent: (f64, f64),
    /// Frequency of the coastline perturbation noise
    pub coastline_frequency: f64,
    /// Amplitude of the coastline perturbation noise
    pub coastline_amplitude: f64,
}

impl Default for ContinentParams {
    fn default() -> Self {
        Self {
            position_jitter: 0.15,
            size_jitter: (0.7, 1.3),
            strength_jitter: (0.6, 1.0),
            island_count: (5, 30),
            island_size: (0.03, 0.18),
            island_strength: (0.15, 0.55),
            falloff_exponent: (1.5, 2.0),
            coastline_frequency: 0.001,
            coastline_amplitude: 0.15,
        }
    }
}

/// A template blob in normalized map coordinates.
struct BlobTemplate {
    x: f64,
    y: f64,
    size: f64,
    strength: f64,
}

const fn blob(x: f64, y: f64, size: f64, strength: f64) -> BlobTemplate {
    BlobTemplate { x, y, size, strength }
}

const LAYOUTS: [&[BlobTemplate]; 4] = [
    &[
        blob(0.3, 0.4, 0.6, 1.0),
        blob(0.75, 0.25, 0.4, 0.8),
        blob(0.15, 0.8, 0.35, 0.7),
    ],
    &[
        blob(0.2, 0.3, 0.5, 0.9),
        blob(0.7, 0.6, 0.45, 0.85),
        blob(0.85, 0.15, 0.25, 0.6),
        blob(0.1, 0.85, 0.3, 0.65),
    ],
    &[
        blob(0.5, 0.2, 0.7, 1.0),
        blob(0.2, 0.7, 0.3, 0.7),
        blob(0.8, 0.8, 0.2, 0.5),
    ],
    &[
        blob(0.15, 0.15, 0.35, 0.8),
        blob(0.65, 0.3, 0.4, 0.85),
        blob(0.35, 0.75, 0.45, 0.9),
        blob(0.85, 0.7, 0.25, 0.6),
    ],
];

/// A landmass blob in cell coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Landmass {
    pub x: f64,
    pub y: f64,
    /// Radius as a fraction of the map dimensions
    pub size: f64,
    pub strength: f64,
    pub exponent: f64,
}

impl Landmass {
    /// Bounding-box test: false means `falloff` is zero at (x, y).
    #[inline]
    pub fn reaches(&self, x: f64, y: f64, width: f64, height: f64) -> bool {
        (x - self.x).abs() < width * self.size && (y - self.y).abs() < height * self.size
    }

    /// `max(0, 1 - d^p) * strength`, with `d` normalized by the blob size.
    pub fn falloff(&self, x: f64, y: f64, width: f64, height: f64) -> f64 {
        let dx = (x - self.x) / (width * self.size);
        let dy = (y - self.y) / (height * self.size);
        // Zero at normalized distance 1 and beyond
        let dist_sq = dx * dx + dy * dy;
        if dist_sq >= 1.0 {
            return 0.0;
        }
        (1.0 - dist_sq.sqrt().powf(self.exponent)).max(0.0) * self.strength
    }
}

/// All landmass blobs for one map plus the coastline noise.
#[derive(Clone, Debug)]
pub struct ContinentMask {
    pub width: usize,
    pub height: usize,
    pub layout_index: usize,
    /// Template continents first, then islands
    pub landmasses: Vec<Landmass>,
    pub island_count: usize,
    coast_noise: NoiseField,
    coastline_frequency: f64,
    coastline_amplitude: f64,
}

impl ContinentMask {
    pub fn generate<R: Rng>(
        width: usize,
        height: usize,
        params: &ContinentParams,
        coast_noise: NoiseField,
        rng: &mut R,
    ) -> Self {
        let w = width as f64;
        let h = height as f64;
        let layout_index = rng.gen_range(0..LAYOUTS.len());

        let mut landmasses = Vec::new();
        for template in LAYOUTS[layout_index] {
            let jx = (rng.gen::<f64>() - 0.5) * 2.0 * params.position_jitter;
            let jy = (rng.gen::<f64>() - 0.5) * 2.0 * params.position_jitter;
            landmasses.push(Landmass {
                x: w * (template.x + jx),
                y: h * (template.y + jy),
                size: template.size * lerp_range(params.size_jitter, rng.gen()),
                strength: template.strength * lerp_range(params.strength_jitter, rng.gen()),
                exponent: lerp_range(params.falloff_exponent, rng.gen()),
            });
        }

        let (min_islands, max_islands) = params.island_count;
        let island_count = if max_islands > min_islands {
            rng.gen_range(min_islands..max_islands)
        } else {
            min_islands
        };
        for _ in 0..island_count {
            landmasses.push(Landmass {
                x: rng.gen::<f64>() * w,
                y: rng.gen::<f64>() * h,
                size: lerp_range(params.island_size, rng.gen()),
                strength: lerp_range(params.island_strength, rng.gen()),
                exponent: lerp_range(params.falloff_exponent, rng.gen()),
            });
        }

        Self {
            width,
            height,
            layout_index,
            landmasses,
            island_count,
            coast_noise,
            coastline_frequency: params.coastline_frequency,
            coastline_amplitude: params.coastline_amplitude,
        }
    }

    /// Landmass factor at a cell: strongest blob falloff plus coastline noise, never negative.
    pub fn landmass_factor(&self, x: f64, y: f64) -> f64 {
        let w = self.width as f64;
        let h = self.height as f64;
        let strongest = self
            .landmasses
            .iter()
            .filter(|l| l.reaches(x, y, w, h))
            .map(|l| l.falloff(x, y, w, h))
            .fold(0.0, f64::max);
        let coast = self
            .coast_noise
            .sample(x * self.coastline_frequency, y * self.coastline_frequency)
            * self.coastline_amplitude;
        (strongest + coast).max(0.0)
    }
}

fn lerp_range(range: (f64, f64), t: f64) -> f64 {
    range.0 + (range.1 - range.0) * t
}
