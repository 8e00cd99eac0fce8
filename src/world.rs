//! World generation entry point and the generated world container.
//!
//! `WorldGenerator` validates its inputs up front; once constructed,
//! `generate()` always produces a complete `WorldMap`. Degenerate outcomes
//! (no rivers, fewer settlements than requested) only show up in feature counts.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::biomes::{self, Biome};
use crate::climate;
use crate::config::GeneratorConfig;
use crate::continents::ContinentMask;
use crate::error::GenerationError;
use crate::heightmap;
use crate::hydrology::{self, River};
use crate::noise_field::NoiseField;
use crate::placement::{self, PlacementMap, PointOfInterest, Settlement, SettlementTier};
use crate::roads::{self, Road};
use crate::seeds::WorldSeeds;
use crate::themes::Theme;
use crate::tilemap::Tilemap;

/// Everything placed on top of the terrain
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub cities: Vec<Settlement>,
    pub towns: Vec<Settlement>,
    pub villages: Vec<Settlement>,
    pub pois: Vec<PointOfInterest>,
    pub rivers: Vec<River>,
    pub roads: Vec<Road>,
}

impl Features {
    /// All settlements in placement order (cities, towns, villages).
    pub fn settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.cities.iter().chain(self.towns.iter()).chain(self.villages.iter())
    }
}

/// A fully generated world. Never mutated after generation.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldMap {
    pub width: usize,
    pub height: usize,
    /// Seeds used for generation (allows recreation)
    pub seeds: WorldSeeds,
    pub theme: Theme,
    pub config: GeneratorConfig,
    /// Elevation (0.0-1.0)
    pub elevation: Tilemap<f32>,
    /// Moisture (0.0-1.0, water cells are 1.0)
    pub moisture: Tilemap<f32>,
    /// Temperature (0.0-1.0)
    pub temperature: Tilemap<f32>,
    pub biomes: Tilemap<Biome>,
    pub features: Features,
}

/// Information about a single tile
#[derive(Clone, Debug, PartialEq)]
pub struct TileInfo {
    pub x: usize,
    pub y: usize,
    pub elevation: f32,
    pub moisture: f32,
    pub temperature: f32,
    pub biome: Biome,
}

impl TileInfo {
    /// Format moisture as string
    pub fn moisture_str(&self) -> String {
        let desc = if self.moisture < 0.2 {
            "arid"
        } else if self.moisture < 0.4 {
            "dry"
        } else if self.moisture < 0.6 {
            "moderate"
        } else if self.moisture < 0.8 {
            "wet"
        } else {
            "saturated"
        };
        format!("{:.2} ({})", self.moisture, desc)
    }

    pub fn temperature_str(&self) -> String {
        let desc = if self.temperature < 0.3 {
            "cold"
        } else if self.temperature < 0.6 {
            "temperate"
        } else {
            "warm"
        };
        format!("{:.2} ({})", self.temperature, desc)
    }
}

impl fmt::Display for TileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {} elevation {:.3}, moisture {}, temperature {}",
            self.x,
            self.y,
            self.biome,
            self.elevation,
            self.moisture_str(),
            self.temperature_str()
        )
    }
}

/// Feature counts for one world
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSummary {
    pub cities: usize,
    pub towns: usize,
    pub villages: usize,
    pub pois: usize,
    pub rivers: usize,
    pub tributaries: usize,
    pub roads: usize,
    /// Fraction of cells at or above sea level
    pub land_fraction: f32,
}

impl fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Land:        {:.1}%", self.land_fraction * 100.0)?;
        writeln!(f, "Cities:      {}", self.cities)?;
        writeln!(f, "Towns:       {}", self.towns)?;
        writeln!(f, "Villages:    {}", self.villages)?;
        writeln!(f, "POIs:        {}", self.pois)?;
        writeln!(f, "Rivers:      {} (+{} tributaries)", self.rivers, self.tributaries)?;
        write!(f, "Trade roads: {}", self.roads)
    }
}

impl WorldMap {
    pub fn seed(&self) -> u64 {
        self.seeds.master
    }

    pub fn tile_info(&self, x: usize, y: usize) -> Option<TileInfo> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(TileInfo {
            x,
            y,
            elevation: *self.elevation.get(x, y),
            moisture: *self.moisture.get(x, y),
            temperature: *self.temperature.get(x, y),
            biome: *self.biomes.get(x, y),
        })
    }

    pub fn biome_histogram(&self) -> Vec<(Biome, usize)> {
        biomes::biome_histogram(&self.biomes)
    }

    pub fn summary(&self) -> WorldSummary {
        let f = &self.features;
        let tributaries = f.rivers.iter().filter(|r| r.tributary).count();
        WorldSummary {
            cities: f.cities.len(),
            towns: f.towns.len(),
            villages: f.villages.len(),
            pois: f.pois.len(),
            rivers: f.rivers.len() - tributaries,
            tributaries,
            roads: f.roads.len(),
            land_fraction: heightmap::land_fraction(&self.elevation, self.config.sea_level),
        }
    }
}

/// Physical fields of a world, before any features are placed.
pub(crate) struct Terrain {
    pub elevation: Tilemap<f32>,
    pub moisture: Tilemap<f32>,
    pub temperature: Tilemap<f32>,
    pub biomes: Tilemap<Biome>,
}

/// Configured world generator
#[derive(Clone, Debug)]
pub struct WorldGenerator {
    width: usize,
    height: usize,
    seeds: WorldSeeds,
    theme: Theme,
    config: GeneratorConfig,
}

impl WorldGenerator {
    /// Generator with default configuration.
    ///
    /// Fails on zero dimensions or an unknown theme identifier.
    pub fn new(width: usize, height: usize, seed: u64, theme: &str) -> Result<Self, GenerationError> {
        if width == 0 || height == 0 {
            return Err(GenerationError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            seeds: WorldSeeds::from_master(seed),
            theme: theme.parse()?,
            config: GeneratorConfig::default(),
        })
    }

    /// Replace the configuration after validating it.
    pub fn with_config(mut self, config: GeneratorConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Replace the per-stage seeds, e.g. to vary rivers while keeping terrain.
    pub fn with_seeds(mut self, seeds: WorldSeeds) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn seeds(&self) -> &WorldSeeds {
        &self.seeds
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the whole pipeline.
    pub fn generate(&self) -> WorldMap {
        info!(
            width = self.width,
            height = self.height,
            seed = self.seeds.master,
            theme = %self.theme,
            "generating world"
        );

        let terrain = self.generate_terrain();
        let features = self.place_features(&terrain);

        let map = WorldMap {
            width: self.width,
            height: self.height,
            seeds: self.seeds.clone(),
            theme: self.theme,
            config: self.config.clone(),
            elevation: terrain.elevation,
            moisture: terrain.moisture,
            temperature: terrain.temperature,
            biomes: terrain.biomes,
            features,
        };
        info!(summary = ?map.summary(), "world generated");
        map
    }

    /// Elevation, moisture, temperature and biomes. Each field is fully
    /// materialised before the next stage reads it.
    pub(crate) fn generate_terrain(&self) -> Terrain {
        let cfg = &self.config;
        let (w, h) = (self.width, self.height);

        let mut rng = WorldSeeds::rng(self.seeds.continents);
        let mask = ContinentMask::generate(w, h, &cfg.continents, NoiseField::new(self.seeds.continents), &mut rng);
        debug!(
            layout = mask.layout_index,
            landmasses = mask.landmasses.len(),
            islands = mask.island_count,
            "continent mask"
        );

        let mut rng = WorldSeeds::rng(self.seeds.elevation);
        let elevation_noise = NoiseField::new(self.seeds.elevation);
        let elevation = heightmap::generate_elevation(w, h, &elevation_noise, &mask, &cfg.elevation, &mut rng);
        info!(
            land = heightmap::land_fraction(&elevation, cfg.sea_level),
            "elevation generated"
        );

        let moisture_noise = NoiseField::new(self.seeds.moisture);
        let moisture = climate::generate_moisture(&elevation, &moisture_noise, &cfg.climate, cfg.sea_level);
        let temperature_noise = NoiseField::new(self.seeds.temperature);
        let temperature = climate::generate_temperature(&elevation, &temperature_noise, &cfg.climate);
        info!("climate generated");

        let biomes = biomes::generate_biomes(&elevation, &moisture, &temperature, &cfg.biomes);
        debug!(histogram = ?biomes::biome_histogram(&biomes), "biomes classified");

        Terrain {
            elevation,
            moisture,
            temperature,
            biomes,
        }
    }

    fn place_features(&self, terrain: &Terrain) -> Features {
        let cfg = &self.config;

        let mut rng = WorldSeeds::rng(self.seeds.rivers);
        let rivers = hydrology::generate_rivers(
            &terrain.elevation,
            &terrain.moisture,
            &cfg.hydrology,
            cfg.sea_level,
            &mut rng,
        );

        let map = PlacementMap {
            elevation: &terrain.elevation,
            moisture: &terrain.moisture,
            biomes: &terrain.biomes,
            sea_level: cfg.sea_level,
        };
        let mut name_rng = WorldSeeds::rng(self.seeds.names);

        let mut rng = WorldSeeds::rng(self.seeds.settlements);
        let settlements = placement::place_settlements(
            &map,
            &rivers,
            self.theme,
            &cfg.settlements,
            &mut rng,
            &mut name_rng,
        );

        let mut rng = WorldSeeds::rng(self.seeds.pois);
        let pois = placement::place_pois(
            &map,
            &settlements,
            cfg.settlements.village.min_distance,
            self.theme,
            &cfg.pois,
            &mut rng,
            &mut name_rng,
        );

        let mut rng = WorldSeeds::rng(self.seeds.roads);
        let roads = roads::build_trade_routes(&settlements, self.width, self.height, &cfg.routes, &mut rng);

        let mut features = Features {
            pois,
            rivers,
            roads,
            ..Default::default()
        };
        for s in settlements {
            match s.tier {
                SettlementTier::City => features.cities.push(s),
                SettlementTier::Town => features.towns.push(s),
                SettlementTier::Village => features.villages.push(s),
            }
        }
        info!(
            cities = features.cities.len(),
            towns = features.towns.len(),
            villages = features.villages.len(),
            pois = features.pois.len(),
            roads = features.roads.len(),
            "features placed"
        );
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::Termination;

    fn small_world(seed: u64) -> WorldMap {
        WorldGenerator::new(200, 150, seed, "medieval").unwrap().generate()
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = small_world(42);
        let b = small_world(42);
        assert_eq!(a.biomes, b.biomes);
        assert_eq!(a.elevation, b.elevation);
        assert_eq!(a.features, b.features);
    }

    #[test]
    fn test_different_seeds_differ() {
        assert_ne!(small_world(1).elevation, small_world(2).elevation);
    }

    #[test]
    fn test_field_ranges_and_ocean_consistency() {
        let world = small_world(7);
        let sea = world.config.sea_level;
        assert_eq!(world.elevation.len(), 200 * 150);
        for (x, y, &e) in world.elevation.iter() {
            let m = *world.moisture.get(x, y);
            let t = *world.temperature.get(x, y);
            assert!((0.0..=1.0).contains(&e));
            assert!((0.0..=1.0).contains(&m));
            assert!((0.0..=1.0).contains(&t));
            if e < sea {
                assert_eq!(*world.biomes.get(x, y), Biome::Ocean);
            }
        }
    }

    #[test]
    fn test_settlements_match_fields_and_spacing() {
        let world = WorldGenerator::new(800, 600, 3, "fantasy").unwrap().generate();
        let placed: Vec<&Settlement> = world.features.settlements().collect();
        for (i, s) in placed.iter().enumerate() {
            assert_eq!(s.biome, *world.biomes.get(s.x, s.y));
            assert_eq!(s.elevation, *world.elevation.get(s.x, s.y));
            let min = world.config.settlements.tier(s.tier).min_distance;
            for earlier in &placed[..i] {
                assert!(s.distance_to(earlier.x as f32, earlier.y as f32) >= min);
            }
        }
    }

    #[test]
    fn test_pois_keep_village_distance_from_settlements() {
        let mut config = GeneratorConfig::default();
        config.settlements.village.min_distance = 120.0;
        let world = WorldGenerator::new(800, 600, 3, "medieval")
            .unwrap()
            .with_config(config)
            .unwrap()
            .generate();
        assert!(!world.features.pois.is_empty());
        for poi in &world.features.pois {
            for s in world.features.settlements() {
                let d = s.distance_to(poi.x as f32, poi.y as f32);
                assert!(d >= 120.0, "{} {} is {} from {}", poi.category.name(), poi.name, d, s.name);
            }
        }
    }

    // Basins and plateaus end most rivers Stuck or Cycle; Sea and MaxLength carry extra conditions
    #[test]
    fn test_rivers_end_with_documented_cause() {
        let world = WorldGenerator::new(600, 450, 11, "scifi").unwrap().generate();
        let sea = world.config.sea_level;
        let max = world.config.hydrology.max_river_length;
        for river in &world.features.rivers {
            let mouth = river.mouth().unwrap();
            match river.termination {
                Termination::Sea => assert!(mouth.elevation < sea),
                Termination::MaxLength => assert_eq!(river.len(), max),
                Termination::Confluence => assert!(river.tributary),
                Termination::Stuck | Termination::Cycle => {}
            }
            assert!(river.source().unwrap().elevation >= sea);
        }
    }

    #[test]
    fn test_second_generation_leaves_first_untouched() {
        let generator = WorldGenerator::new(200, 150, 42, "steampunk").unwrap();
        let first = generator.generate();
        let snapshot = first.clone();
        let _second = WorldGenerator::new(200, 150, 43, "steampunk").unwrap().generate();
        let _again = generator.generate();
        assert_eq!(first, snapshot);
    }

    #[test]
    fn test_road_endpoints_exact() {
        let world = WorldGenerator::new(800, 600, 5, "medieval").unwrap().generate();
        for road in &world.features.roads {
            assert_eq!(road.path.first(), Some(&(road.from.x, road.from.y)));
            assert_eq!(road.path.last(), Some(&(road.to.x, road.to.y)));
        }
    }

    #[test]
    fn test_constructor_rejects_bad_input() {
        assert!(matches!(
            WorldGenerator::new(0, 10, 1, "medieval"),
            Err(GenerationError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(matches!(
            WorldGenerator::new(10, 10, 1, "western"),
            Err(GenerationError::UnknownTheme(_))
        ));

        let mut config = GeneratorConfig::default();
        config.biomes.mountain_min = 0.1;
        let result = WorldGenerator::new(10, 10, 1, "medieval").unwrap().with_config(config);
        assert!(matches!(result, Err(GenerationError::InvalidConfig(_))));
    }

    #[test]
    fn test_submerged_world_has_no_rivers_or_cities() {
        let mut config = GeneratorConfig::default();
        // No landmass can lift the base noise above sea level
        config.continents.strength_jitter = (0.0, 0.0);
        config.continents.island_count = (0, 0);
        config.continents.coastline_amplitude = 0.0;
        let world = WorldGenerator::new(300, 200, 9, "medieval")
            .unwrap()
            .with_config(config)
            .unwrap()
            .generate();
        assert!(world.elevation.as_slice().iter().all(|&e| e < 0.1));
        assert!(world.features.rivers.is_empty());
        assert!(world.features.settlements().next().is_none());
        assert!(world.features.roads.is_empty());
    }

    #[test]
    fn test_tile_info_and_summary() {
        let world = small_world(4);
        let info = world.tile_info(10, 20).unwrap();
        assert_eq!(info.biome, *world.biomes.get(10, 20));
        assert!(world.tile_info(200, 0).is_none());

        let summary = world.summary();
        assert_eq!(summary.cities, world.features.cities.len());
        let total: usize = world.biome_histogram().iter().map(|(_, n)| n).sum();
        assert_eq!(total, 200 * 150);
    }

    #[test]
    fn test_river_seed_override_keeps_terrain() {
        let base = WorldGenerator::new(200, 150, 42, "medieval").unwrap();
        let seeds = WorldSeeds::builder(42).rivers(7).build();
        let varied = base.clone().with_seeds(seeds);
        assert_eq!(base.generate().elevation, varied.generate().elevation);
    }
}
