//! Biome classification.
//!
//! A cell's biome is a pure function of its (elevation, moisture, temperature)
//! triple, evaluated by walking an ordered rule table; the first rule that
//! matches wins.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::tilemap::Tilemap;

/// Biome labels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    #[default]
    Ocean,
    Coast,
    Mountain,
    SnowMountain,
    Desert,
    Tundra,
    TropicalForest,
    Forest,
    Taiga,
    Grassland,
    Savanna,
}

impl Biome {
    pub fn all() -> &'static [Self] {
        &[
            Self::Ocean,
            Self::Coast,
            Self::Mountain,
            Self::SnowMountain,
            Self::Desert,
            Self::Tundra,
            Self::TropicalForest,
            Self::Forest,
            Self::Taiga,
            Self::Grassland,
            Self::Savanna,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ocean => "ocean",
            Self::Coast => "coast",
            Self::Mountain => "mountain",
            Self::SnowMountain => "snow_mountain",
            Self::Desert => "desert",
            Self::Tundra => "tundra",
            Self::TropicalForest => "tropical_forest",
            Self::Forest => "forest",
            Self::Taiga => "taiga",
            Self::Grassland => "grassland",
            Self::Savanna => "savanna",
        }
    }

    /// Map color (RGB)
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Ocean => (44, 95, 124),
            Self::Coast => (74, 143, 168),
            Self::Mountain => (139, 115, 85),
            Self::SnowMountain => (212, 212, 212),
            Self::Desert => (212, 165, 116),
            Self::Forest => (61, 90, 61),
            Self::TropicalForest => (45, 74, 45),
            Self::Taiga => (74, 90, 74),
            Self::Grassland => (143, 160, 90),
            Self::Savanna => (184, 160, 130),
            Self::Tundra => (168, 168, 160),
        }
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Biome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown biome '{}'", s))
    }
}

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Threshold constants for the classification ladder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeThresholds {
    /// Elevation below this is ocean
    pub ocean_max: f32,
    /// Elevation below this (and not ocean) is coast
    pub coast_max: f32,
    /// Elevation above this is mountain
    pub mountain_min: f32,
    /// Mountains at or below this temperature are snow-capped
    pub snow_temperature: f32,
    /// Moisture below this is arid
    pub arid_moisture: f32,
    /// Arid cells warmer than this are desert, otherwise tundra
    pub desert_temperature: f32,
    /// Moisture above this is humid
    pub humid_moisture: f32,
    /// Humid cells warmer than this are tropical forest
    pub tropical_temperature: f32,
    /// Humid cells warmer than this (but not tropical) are forest, otherwise taiga
    pub forest_temperature: f32,
    /// Remaining cells colder than this are tundra
    pub cold_temperature: f32,
    /// Remaining cells wetter than this are grassland, otherwise savanna
    pub grassland_moisture: f32,
}

impl Default for BiomeThresholds {
    fn default() -> Self {
        Self {
            ocean_max: 0.12,
            coast_max: 0.18,
            mountain_min: 0.7,
            snow_temperature: 0.3,
            arid_moisture: 0.2,
            desert_temperature: 0.6,
            humid_moisture: 0.7,
            tropical_temperature: 0.7,
            forest_temperature: 0.4,
            cold_temperature: 0.3,
            grassland_moisture: 0.4,
        }
    }
}

/// Climate values at one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellClimate {
    pub elevation: f32,
    pub moisture: f32,
    pub temperature: f32,
}

// =============================================================================
// RULE TABLE
// =============================================================================

/// One rung of the classification ladder.
pub struct BiomeRule {
    pub apply: fn(&BiomeThresholds, CellClimate) -> Option<Biome>,
}

/// Ordered rules; order matters.
pub const BIOME_RULES: &[BiomeRule] = &[
    BiomeRule {
        apply: |t, c| (c.elevation < t.ocean_max).then_some(Biome::Ocean),
    },
    BiomeRule {
        apply: |t, c| (c.elevation < t.coast_max).then_some(Biome::Coast),
    },
    BiomeRule {
        apply: |t, c| {
            (c.elevation > t.mountain_min).then(|| {
                if c.temperature > t.snow_temperature {
                    Biome::Mountain
                } else {
                    Biome::SnowMountain
                }
            })
        },
    },
    BiomeRule {
        apply: |t, c| {
            (c.moisture < t.arid_moisture).then(|| {
                if c.temperature > t.desert_temperature {
                    Biome::Desert
                } else {
                    Biome::Tundra
                }
            })
        },
    },
    BiomeRule {
        apply: |t, c| {
            (c.moisture > t.humid_moisture).then(|| {
                if c.temperature > t.tropical_temperature {
                    Biome::TropicalForest
                } else if c.temperature > t.forest_temperature {
                    Biome::Forest
                } else {
                    Biome::Taiga
                }
            })
        },
    },
    BiomeRule {
        apply: |t, c| (c.temperature < t.cold_temperature).then_some(Biome::Tundra),
    },
    BiomeRule {
        apply: |t, c| {
            Some(if c.moisture > t.grassland_moisture {
                Biome::Grassland
            } else {
                Biome::Savanna
            })
        },
    },
];

/// Classify a single cell.
pub fn classify(thresholds: &BiomeThresholds, climate: CellClimate) -> Biome {
    BIOME_RULES
        .iter()
        .find_map(|rule| (rule.apply)(thresholds, climate))
        .unwrap_or(Biome::Grassland)
}

/// Generate biome map from elevation, moisture, and temperature
pub fn generate_biomes(
    elevation: &Tilemap<f32>,
    moisture: &Tilemap<f32>,
    temperature: &Tilemap<f32>,
    thresholds: &BiomeThresholds,
) -> Tilemap<Biome> {
    let width = elevation.width;
    let height = elevation.height;

    let data: Vec<Biome> = elevation
        .as_slice()
        .par_iter()
        .zip(moisture.as_slice().par_iter())
        .zip(temperature.as_slice().par_iter())
        .map(|((&e, &m), &t)| {
            classify(
                thresholds,
                CellClimate {
                    elevation: e,
                    moisture: m,
                    temperature: t,
                },
            )
        })
        .collect();

    Tilemap::from_vec(width, height, data)
}

/// Count cells per biome, in `Biome::all()` order.
pub fn biome_histogram(biomes: &Tilemap<Biome>) -> Vec<(Biome, usize)> {
    Biome::all()
        .iter()
        .map(|&b| (b, biomes.as_slice().iter().filter(|&&c| c == b).count()))
        .collect()
}
