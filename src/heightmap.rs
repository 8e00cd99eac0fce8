use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::continents::ContinentMask;
use crate::noise_field::NoiseField;
use crate::tilemap::Tilemap;

// =============================================================================
// TERRAIN PARAMETERS
// =============================================================================

/// Parameters for elevation synthesis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationParams {
    /// Frequency ranges for the continental, regional and local bands.
    /// Each generation draws one frequency per band from its range.
    pub band_frequencies: [(f64, f64); 3],
    /// Weights of the three bands (should sum to 1.0)
    pub band_weights: [f64; 3],
}

impl Default for ElevationParams {
    fn default() -> Self {
        Self {
            band_frequencies: [(0.005, 0.013), (0.02, 0.05), (0.06, 0.12)],
            band_weights: [0.4, 0.35, 0.25],
        }
    }
}

/// Band frequencies actually used for one map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElevationBands {
    pub frequencies: [f64; 3],
    pub weights: [f64; 3],
}

impl ElevationBands {
    pub fn draw<R: Rng>(params: &ElevationParams, rng: &mut R) -> Self {
        let mut frequencies = [0.0; 3];
        for (f, &(lo, hi)) in frequencies.iter_mut().zip(params.band_frequencies.iter()) {
            *f = lo + rng.gen::<f64>() * (hi - lo);
        }
        Self {
            frequencies,
            weights: params.band_weights,
        }
    }

    /// Raw band sum remapped from [-1, 1] to [0, 1].
    pub fn sample(&self, noise: &NoiseField, x: f64, y: f64) -> f64 {
        let mut e = 0.0;
        for (f, w) in self.frequencies.iter().zip(self.weights.iter()) {
            e += noise.sample(x * f, y * f) * w;
        }
        (e + 1.0) / 2.0
    }
}

// =============================================================================
// MAIN HEIGHTMAP GENERATION
// =============================================================================

/// Generate the elevation field:
/// 1. Three noise bands (continental, regional, local) remapped to [0, 1]
/// 2. Multiplied by the continent mask's landmass factor
/// 3. Clamped to [0, 1]
///
/// Cells are independent, so rows are computed in parallel.
pub fn generate_elevation<R: Rng>(
    width: usize,
    height: usize,
    noise: &NoiseField,
    mask: &ContinentMask,
    params: &ElevationParams,
    rng: &mut R,
) -> Tilemap<f32> {
    let bands = ElevationBands::draw(params, rng);

    let data: Vec<f32> = (0..width * height)
        .into_par_iter()
        .map(|idx| {
            let x = (idx % width) as f64;
            let y = (idx / width) as f64;
            let base = bands.sample(noise, x, y);
            let elevation = base * mask.landmass_factor(x, y);
            elevation.clamp(0.0, 1.0) as f32
        })
        .collect();

    Tilemap::from_vec(width, height, data)
}

/// Fraction of cells at or above `sea_level`.
pub fn land_fraction(elevation: &Tilemap<f32>, sea_level: f32) -> f32 {
    if elevation.is_empty() {
        return 0.0;
    }
    let land = elevation.as_slice().iter().filter(|&&e| e >= sea_level).count();
    land as f32 / elevation.len() as f32
}
