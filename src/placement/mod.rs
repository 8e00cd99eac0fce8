//! Rejection-sampling placement of settlements and points of interest.
//!
//! Both samplers draw uniformly random cells, reject those that break a
//! habitability or spacing rule, and give up after a fixed attempt budget.
//! Running out of attempts is normal and simply yields fewer features.

pub mod pois;
pub mod settlements;

use crate::biomes::Biome;
use crate::tilemap::Tilemap;

pub use pois::{place_pois, PoiCategory, PoiCategoryParams, PoiParams, PointOfInterest};
pub use settlements::{place_settlements, Settlement, SettlementParams, SettlementTier, TierParams};

/// Read-only view of the generated fields that placement decisions depend on.
#[derive(Clone, Copy)]
pub struct PlacementMap<'a> {
    pub elevation: &'a Tilemap<f32>,
    pub moisture: &'a Tilemap<f32>,
    pub biomes: &'a Tilemap<Biome>,
    pub sea_level: f32,
}

impl PlacementMap<'_> {
    pub fn width(&self) -> usize {
        self.elevation.width
    }

    pub fn height(&self) -> usize {
        self.elevation.height
    }
}

/// True if any settlement lies strictly closer than `distance` to (x, y).
pub fn too_close_to_settlement(settlements: &[Settlement], x: usize, y: usize, distance: f32) -> bool {
    settlements.iter().any(|s| s.distance_to(x as f32, y as f32) < distance)
}
