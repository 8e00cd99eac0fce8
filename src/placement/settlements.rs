//! Settlement placement.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{too_close_to_settlement, PlacementMap};
use crate::biomes::Biome;
use crate::climate::distance_to_water;
use crate::hydrology::River;
use crate::themes::Theme;

/// Settlement size class
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementTier {
    City,
    Town,
    Village,
}

impl SettlementTier {
    /// Placement order: higher tiers claim space first.
    pub fn all() -> &'static [Self] {
        &[Self::City, Self::Town, Self::Village]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Town => "town",
            Self::Village => "village",
        }
    }
}

impl std::fmt::Display for SettlementTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-tier placement rules
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierParams {
    /// Number of settlements requested
    pub count: usize,
    /// Minimum distance to every settlement placed before this one
    pub min_distance: f32,
    /// Population range (min inclusive, max exclusive)
    pub population: (f32, f32),
    /// Wealth is drawn from [0, wealth_max)
    pub wealth_max: f32,
    /// When set, the site needs sea within this distance or a river within `river_radius`
    pub water_radius: Option<f32>,
    pub river_radius: f32,
}

impl TierParams {
    pub fn for_tier(tier: SettlementTier) -> Self {
        match tier {
            SettlementTier::City => Self {
                count: 8,
                min_distance: 150.0,
                population: (50_000.0, 150_000.0),
                wealth_max: 100.0,
                water_radius: Some(100.0),
                river_radius: 50.0,
            },
            SettlementTier::Town => Self {
                count: 25,
                min_distance: 80.0,
                population: (5_000.0, 25_000.0),
                wealth_max: 60.0,
                water_radius: None,
                river_radius: 50.0,
            },
            SettlementTier::Village => Self {
                count: 60,
                min_distance: 40.0,
                population: (100.0, 2_100.0),
                wealth_max: 30.0,
                water_radius: None,
                river_radius: 50.0,
            },
        }
    }
}

/// Parameters for settlement placement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementParams {
    /// Random cells tried per requested settlement
    pub attempts: usize,
    /// Habitable elevation band (inclusive)
    pub habitable_elevation: (f32, f32),
    pub excluded_biomes: Vec<Biome>,
    /// Window used for the sea proximity test
    pub water_search_radius: i64,
    pub water_search_stride: usize,
    pub city: TierParams,
    pub town: TierParams,
    pub village: TierParams,
}

impl Default for SettlementParams {
    fn default() -> Self {
        Self {
            attempts: 1000,
            habitable_elevation: (0.15, 0.6),
            excluded_biomes: vec![Biome::Ocean, Biome::Desert],
            water_search_radius: 50,
            water_search_stride: 5,
            city: TierParams::for_tier(SettlementTier::City),
            town: TierParams::for_tier(SettlementTier::Town),
            village: TierParams::for_tier(SettlementTier::Village),
        }
    }
}

impl SettlementParams {
    pub fn tier(&self, tier: SettlementTier) -> &TierParams {
        match tier {
            SettlementTier::City => &self.city,
            SettlementTier::Town => &self.town,
            SettlementTier::Village => &self.village,
        }
    }
}

/// A placed settlement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub tier: SettlementTier,
    pub x: usize,
    pub y: usize,
    pub name: String,
    pub population: f32,
    pub wealth: f32,
    pub specialty: String,
    /// Field values at the settlement's cell
    pub biome: Biome,
    pub elevation: f32,
    pub moisture: f32,
}

impl Settlement {
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        ((self.x as f32 - x).powi(2) + (self.y as f32 - y).powi(2)).sqrt()
    }
}

/// Place cities, then towns, then villages.
///
/// Locations, population and wealth come from `rng`; names and specialties
/// come from `name_rng` through the theme. Returned in placement order.
pub fn place_settlements<R: Rng, N: Rng>(
    map: &PlacementMap,
    rivers: &[River],
    theme: Theme,
    params: &SettlementParams,
    rng: &mut R,
    name_rng: &mut N,
) -> Vec<Settlement> {
    let mut placed: Vec<Settlement> = Vec::new();

    for &tier in SettlementTier::all() {
        let tier_params = params.tier(tier);
        let before = placed.len();

        for _ in 0..tier_params.count {
            let Some((x, y)) = find_location(map, rivers, &placed, params, tier_params, rng) else {
                continue;
            };

            let (pop_lo, pop_hi) = tier_params.population;
            let population = pop_lo + rng.gen::<f32>() * (pop_hi - pop_lo);
            let wealth = rng.gen::<f32>() * tier_params.wealth_max;

            placed.push(Settlement {
                tier,
                x,
                y,
                name: theme.random_settlement_name(tier, name_rng),
                population,
                wealth,
                specialty: theme.random_specialty(tier, name_rng),
                biome: *map.biomes.get(x, y),
                elevation: *map.elevation.get(x, y),
                moisture: *map.moisture.get(x, y),
            });
        }

        let count = placed.len() - before;
        if count < tier_params.count {
            warn!(
                tier = tier.name(),
                placed = count,
                requested = tier_params.count,
                "settlement attempt budget exhausted"
            );
        } else {
            debug!(tier = tier.name(), placed = count, "settlements placed");
        }
    }

    placed
}

/// Rejection-sample one site for `tier`, or `None` once the budget is spent.
fn find_location<R: Rng>(
    map: &PlacementMap,
    rivers: &[River],
    placed: &[Settlement],
    params: &SettlementParams,
    tier: &TierParams,
    rng: &mut R,
) -> Option<(usize, usize)> {
    let (lo, hi) = params.habitable_elevation;

    for _ in 0..params.attempts {
        let x = rng.gen_range(0..map.width());
        let y = rng.gen_range(0..map.height());

        let elevation = *map.elevation.get(x, y);
        if elevation < lo || elevation > hi {
            continue;
        }
        if params.excluded_biomes.contains(map.biomes.get(x, y)) {
            continue;
        }

        if let Some(water_radius) = tier.water_radius {
            let near_sea = distance_to_water(
                map.elevation,
                x,
                y,
                params.water_search_radius,
                params.water_search_stride,
                map.sea_level,
            )
            .is_some_and(|d| d < water_radius);
            let near_river = || {
                rivers
                    .iter()
                    .any(|r| r.passes_within(x as f32, y as f32, tier.river_radius))
            };
            if !near_sea && !near_river() {
                continue;
            }
        }

        if too_close_to_settlement(placed, x, y, tier.min_distance) {
            continue;
        }

        return Some((x, y));
    }

    None
}
