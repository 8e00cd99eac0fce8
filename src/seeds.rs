//! Seed management for world map generation
//!
//! Provides separate seeds for each pipeline stage, allowing fine-grained control
//! over which aspects of the map to vary or keep constant.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeds for all generation stages.
///
/// Each stage gets its own seed, derived from a master seed by default.
/// Individual seeds can be overridden for experimentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference and persistence)
    pub master: u64,
    /// Continent layout choice, blob jitter and island scatter
    pub continents: u64,
    /// Elevation noise
    pub elevation: u64,
    /// Moisture noise
    pub moisture: u64,
    /// Temperature noise
    pub temperature: u64,
    /// Watershed radii, source sampling and tributary junctions
    pub rivers: u64,
    /// Settlement placement
    pub settlements: u64,
    /// Point of interest placement
    pub pois: u64,
    /// Trade route jitter
    pub roads: u64,
    /// Theme lookups (names, specialties, POI flavor)
    pub names: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            continents: derive_seed(master, "continents"),
            elevation: derive_seed(master, "elevation"),
            moisture: derive_seed(master, "moisture"),
            temperature: derive_seed(master, "temperature"),
            rivers: derive_seed(master, "rivers"),
            settlements: derive_seed(master, "settlements"),
            pois: derive_seed(master, "pois"),
            roads: derive_seed(master, "roads"),
            names: derive_seed(master, "names"),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> WorldSeedsBuilder {
        WorldSeedsBuilder::new(master)
    }

    /// Seeded RNG for one stage.
    pub fn rng(stage_seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(stage_seed)
    }
}

/// Builder for customizing individual seeds while deriving others from master
pub struct WorldSeedsBuilder {
    seeds: WorldSeeds,
}

impl WorldSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: WorldSeeds::from_master(master),
        }
    }

    pub fn continents(mut self, seed: u64) -> Self {
        self.seeds.continents = seed;
        self
    }

    pub fn elevation(mut self, seed: u64) -> Self {
        self.seeds.elevation = seed;
        self
    }

    pub fn rivers(mut self, seed: u64) -> Self {
        self.seeds.rivers = seed;
        self
    }

    pub fn settlements(mut self, seed: u64) -> Self {
        self.seeds.settlements = seed;
        self
    }

    pub fn pois(mut self, seed: u64) -> Self {
        self.seeds.pois = seed;
        self
    }

    pub fn roads(mut self, seed: u64) -> Self {
        self.seeds.roads = seed;
        self
    }

    /// Build the final WorldSeeds
    pub fn build(self) -> WorldSeeds {
        self.seeds
    }
}

/// Derive a sub-seed from a master seed and a stage name.
fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, continents: {}, elevation: {}, moisture: {}, \
             temperature: {}, rivers: {}, settlements: {}, pois: {}, roads: {}, names: {} }}",
            self.master,
            self.continents,
            self.elevation,
            self.moisture,
            self.temperature,
            self.rivers,
            self.settlements,
            self.pois,
            self.roads,
            self.names,
        )
    }
}
