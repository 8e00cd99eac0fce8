//! Climate system for generating moisture and temperature maps
//! Based on latitude, elevation, and water proximity

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::noise_field::NoiseField;
use crate::tilemap::Tilemap;

// =============================================================================
// CLIMATE PARAMETERS
// =============================================================================

/// Parameters for the moisture and temperature fields
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateParams {
    /// Frequencies of the two moisture bands
    pub moisture_frequencies: [f64; 2],
    pub moisture_weights: [f64; 2],
    /// Coordinate offset so moisture does not mirror other fields sharing a seed
    pub moisture_offset: f64,
    /// Half-size of the square window searched for water
    pub water_search_radius: i64,
    /// Sampling stride inside the water search window
    pub water_search_stride: usize,
    /// Coastal boost is `max(0, reach - d / falloff) * weight`
    pub coastal_boost_reach: f32,
    pub coastal_boost_falloff: f32,
    pub coastal_boost_weight: f32,

    pub temperature_frequency: f64,
    pub temperature_offset: f64,
    /// How much colder the map edges are than the center row
    pub latitude_weight: f32,
    pub temperature_noise: f32,
    /// Temperature lost per unit of elevation
    pub elevation_lapse: f32,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            moisture_frequencies: [0.012, 0.06],
            moisture_weights: [0.7, 0.3],
            moisture_offset: 1000.0,
            water_search_radius: 50,
            water_search_stride: 5,
            coastal_boost_reach: 0.3,
            coastal_boost_falloff: 100.0,
            coastal_boost_weight: 0.5,
            temperature_frequency: 0.02,
            temperature_offset: 2000.0,
            latitude_weight: 0.8,
            temperature_noise: 0.3,
            elevation_lapse: 0.4,
        }
    }
}

// =============================================================================
// WATER PROXIMITY
// =============================================================================

/// Distance to the nearest water cell found in a strided square window around (x, y).
///
/// Returns `None` when no sampled cell in the window is below `sea_level`.
pub fn distance_to_water(
    elevation: &Tilemap<f32>,
    x: usize,
    y: usize,
    radius: i64,
    stride: usize,
    sea_level: f32,
) -> Option<f32> {
    let mut best: Option<f32> = None;
    let stride = stride.max(1);

    for dy in (-radius..=radius).step_by(stride) {
        for dx in (-radius..=radius).step_by(stride) {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            let Some(&e) = elevation.get_checked(nx, ny) else {
                continue;
            };
            if e < sea_level {
                let d = ((dx * dx + dy * dy) as f32).sqrt();
                best = Some(best.map_or(d, |b: f32| b.min(d)));
            }
        }
    }

    best
}

/// Windowed water distances for a whole map, computed once.
///
/// `distance(x, y)` equals `distance_to_water(elevation, x, y, radius, stride,
/// sea_level)`. The squared distance splits into a row pass (nearest sampled
/// water along x) and a column pass over the sampled rows.
pub struct WaterProximity {
    width: usize,
    /// Squared distance to the nearest sampled water cell, `None` if the window has none
    squared: Vec<Option<i64>>,
}

impl WaterProximity {
    pub fn build(elevation: &Tilemap<f32>, radius: i64, stride: usize, sea_level: f32) -> Self {
        let width = elevation.width;
        let height = elevation.height;
        let offsets: Vec<i64> = (-radius..=radius).step_by(stride.max(1)).collect();
        let water: Vec<bool> = elevation.as_slice().par_iter().map(|&e| e < sea_level).collect();

        let rows: Vec<Option<i64>> = (0..width * height)
            .into_par_iter()
            .map(|idx| {
                let (x, y) = (idx % width, idx / width);
                nearest_sampled(&offsets, x, width, |px| water[y * width + px].then_some(0))
            })
            .collect();
        let squared: Vec<Option<i64>> = (0..width * height)
            .into_par_iter()
            .map(|idx| {
                let (x, y) = (idx % width, idx / width);
                nearest_sampled(&offsets, y, height, |py| rows[py * width + x])
            })
            .collect();

        Self { width, squared }
    }

    pub fn distance(&self, x: usize, y: usize) -> Option<f32> {
        self.squared[y * self.width + x].map(|d2| (d2 as f32).sqrt())
    }
}

/// Smallest `d * d + value(pos + d)` over the sampled offsets that stay in `0..len`.
fn nearest_sampled(offsets: &[i64], pos: usize, len: usize, value: impl Fn(usize) -> Option<i64>) -> Option<i64> {
    offsets
        .iter()
        .filter_map(|&d| {
            let p = pos as i64 + d;
            if p < 0 || p >= len as i64 {
                return None;
            }
            value(p as usize).map(|rest| d * d + rest)
        })
        .min()
}

// =============================================================================
// MOISTURE GENERATION
// =============================================================================

/// Generate the moisture map.
///
/// Water cells are always fully moist; land near water gets a boost that fades
/// with distance. Requires a fully materialised elevation map.
pub fn generate_moisture(
    elevation: &Tilemap<f32>,
    noise: &NoiseField,
    params: &ClimateParams,
    sea_level: f32,
) -> Tilemap<f32> {
    let width = elevation.width;
    let height = elevation.height;
    let [f1, f2] = params.moisture_frequencies;
    let [w1, w2] = params.moisture_weights;
    let offset = params.moisture_offset;
    let water = WaterProximity::build(
        elevation,
        params.water_search_radius,
        params.water_search_stride,
        sea_level,
    );

    let data: Vec<f32> = (0..width * height)
        .into_par_iter()
        .map(|idx| {
            let x = idx % width;
            let y = idx / width;
            let e = *elevation.get(x, y);
            if e < sea_level {
                return 1.0;
            }

            let fx = x as f64;
            let fy = y as f64;
            let raw = noise.sample(fx * f1 + offset, fy * f1 + offset) * w1
                + noise.sample(fx * f2 + offset, fy * f2 + offset) * w2;
            let mut moisture = ((raw + 1.0) / 2.0) as f32;

            if let Some(d) = water.distance(x, y) {
                moisture += (params.coastal_boost_reach - d / params.coastal_boost_falloff).max(0.0)
                    * params.coastal_boost_weight;
            }

            moisture.clamp(0.0, 1.0)
        })
        .collect();

    Tilemap::from_vec(width, height, data)
}

// =============================================================================
// TEMPERATURE GENERATION
// =============================================================================

/// Generate the temperature map: warm center row, cold top and bottom edges,
/// noise perturbation, colder at altitude. Values in [0, 1].
pub fn generate_temperature(
    elevation: &Tilemap<f32>,
    noise: &NoiseField,
    params: &ClimateParams,
) -> Tilemap<f32> {
    let width = elevation.width;
    let height = elevation.height;
    let half = height as f32 / 2.0;
    let freq = params.temperature_frequency;
    let offset = params.temperature_offset;

    let data: Vec<f32> = (0..width * height)
        .into_par_iter()
        .map(|idx| {
            let x = idx % width;
            let y = idx / width;

            let latitude = (y as f32 - half).abs() / half;
            let mut temperature = 1.0 - latitude * params.latitude_weight;
            temperature += noise.sample(x as f64 * freq + offset, y as f64 * freq + offset) as f32
                * params.temperature_noise;
            temperature -= *elevation.get(x, y) * params.elevation_lapse;

            temperature.clamp(0.0, 1.0)
        })
        .collect();

    Tilemap::from_vec(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn island(width: usize, height: usize) -> Tilemap<f32> {
        // Water in the left quarter, land elsewhere
        Tilemap::from_fn(width, height, |x, _| if x < width / 4 { 0.02 } else { 0.4 })
    }

    #[test]
    fn test_distance_to_water_found_and_missing() {
        let map = island(200, 20);
        let near = distance_to_water(&map, 55, 10, 50, 5, 0.1).unwrap();
        assert!(near <= 10.0, "expected water within 10 cells, got {}", near);
        assert!(distance_to_water(&map, 180, 10, 50, 5, 0.1).is_none());
    }

    #[test]
    fn test_water_proximity_matches_window_scan() {
        // Irregular lakes, including one that touches the map edge
        let map = Tilemap::from_fn(97, 61, |x, y| {
            let lake_a = (x as i64 - 20).pow(2) + (y as i64 - 30).pow(2) < 40;
            let lake_b = x > 70 && y < 8 && (x + y) % 3 != 0;
            if lake_a || lake_b { 0.05f32 } else { 0.4 }
        });
        for (radius, stride) in [(50, 5), (12, 3), (7, 1), (9, 4)] {
            let table = WaterProximity::build(&map, radius, stride, 0.1);
            for (x, y, _) in map.iter() {
                assert_eq!(
                    table.distance(x, y),
                    distance_to_water(&map, x, y, radius, stride, 0.1),
                    "mismatch at ({}, {}) radius {} stride {}",
                    x,
                    y,
                    radius,
                    stride
                );
            }
        }

        let dry = Tilemap::new_with(30, 30, 0.5f32);
        assert_eq!(WaterProximity::build(&dry, 10, 2, 0.1).distance(15, 15), None);
    }

    #[test]
    fn test_water_is_fully_moist() {
        let map = island(120, 40);
        let moisture = generate_moisture(&map, &NoiseField::new(4), &ClimateParams::default(), 0.1);
        for (x, y, &m) in moisture.iter() {
            assert!((0.0..=1.0).contains(&m));
            if *map.get(x, y) < 0.1 {
                assert_eq!(m, 1.0);
            }
        }
    }

    #[test]
    fn test_coastal_cells_get_wetter() {
        let map = island(200, 20);
        let params = ClimateParams::default();
        let noise = NoiseField::new(12);
        let moisture = generate_moisture(&map, &noise, &params, 0.1);
        let dry_params = ClimateParams { coastal_boost_weight: 0.0, ..params.clone() };
        let dry = generate_moisture(&map, &noise, &dry_params, 0.1);
        assert!(moisture.get(52, 10) >= dry.get(52, 10));
        assert_eq!(moisture.get(190, 10), dry.get(190, 10));
    }

    #[test]
    fn test_temperature_latitude_and_altitude() {
        let params = ClimateParams { temperature_noise: 0.0, ..Default::default() };
        let noise = NoiseField::new(1);
        let low = Tilemap::new_with(10, 101, 0.0f32);
        let high = Tilemap::new_with(10, 101, 1.0f32);
        let t_low = generate_temperature(&low, &noise, &params);
        let t_high = generate_temperature(&high, &noise, &params);

        assert!(t_low.get(5, 50) > t_low.get(5, 0));
        assert!(t_low.get(5, 50) > t_low.get(5, 100));
        assert!(t_high.get(5, 50) < t_low.get(5, 50));
        for &t in t_high.as_slice() {
            assert!((0.0..=1.0).contains(&t));
        }
    }
}
