//! Point of interest placement.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{too_close_to_settlement, PlacementMap, Settlement};
use crate::biomes::Biome;
use crate::themes::Theme;

/// Placement category; decides which biomes a POI may appear in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoiCategory {
    Ruin,
    Mine,
    Temple,
    Tower,
    Cave,
}

impl PoiCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ruin => "ruin",
            Self::Mine => "mine",
            Self::Temple => "temple",
            Self::Tower => "tower",
            Self::Cave => "cave",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoiCategoryParams {
    pub category: PoiCategory,
    pub count: usize,
    pub biomes: Vec<Biome>,
}

/// Parameters for POI placement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiParams {
    /// Random cells tried per requested POI
    pub attempts: usize,
    pub categories: Vec<PoiCategoryParams>,
}

impl Default for PoiParams {
    fn default() -> Self {
        use Biome::*;
        let category = |category, count, biomes: &[Biome]| PoiCategoryParams {
            category,
            count,
            biomes: biomes.to_vec(),
        };

        Self {
            attempts: 500,
            categories: vec![
                category(PoiCategory::Ruin, 30, &[Grassland, Forest, Desert]),
                category(PoiCategory::Mine, 20, &[Mountain, SnowMountain]),
                category(PoiCategory::Temple, 15, &[Grassland, Forest, Mountain]),
                category(PoiCategory::Tower, 12, &[Grassland, Coast]),
                category(PoiCategory::Cave, 25, &[Mountain, Forest]),
            ],
        }
    }
}

/// A placed point of interest
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub category: PoiCategory,
    /// Themed vocabulary key
    pub kind: String,
    pub name: String,
    pub icon: String,
    pub x: usize,
    pub y: usize,
    pub biome: Biome,
}

/// Place POIs category by category. POIs may cluster; only settlements repel
/// them, out to `clearance` (the village minimum distance).
pub fn place_pois<R: Rng, N: Rng>(
    map: &PlacementMap,
    settlements: &[Settlement],
    clearance: f32,
    theme: Theme,
    params: &PoiParams,
    rng: &mut R,
    name_rng: &mut N,
) -> Vec<PointOfInterest> {
    let mut pois = Vec::new();

    for category in &params.categories {
        let before = pois.len();

        for _ in 0..category.count {
            let Some((x, y)) = find_location(map, settlements, clearance, &category.biomes, params, rng) else {
                continue;
            };
            let flavor = theme.random_poi(name_rng);
            pois.push(PointOfInterest {
                category: category.category,
                kind: flavor.kind,
                name: flavor.name,
                icon: flavor.icon,
                x,
                y,
                biome: *map.biomes.get(x, y),
            });
        }

        debug!(
            category = category.category.name(),
            placed = pois.len() - before,
            requested = category.count,
            "points of interest placed"
        );
    }

    pois
}

fn find_location<R: Rng>(
    map: &PlacementMap,
    settlements: &[Settlement],
    clearance: f32,
    biomes: &[Biome],
    params: &PoiParams,
    rng: &mut R,
) -> Option<(usize, usize)> {
    for _ in 0..params.attempts {
        let x = rng.gen_range(0..map.width());
        let y = rng.gen_range(0..map.height());

        if !biomes.contains(map.biomes.get(x, y)) {
            continue;
        }
        if too_close_to_settlement(settlements, x, y, clearance) {
            continue;
        }
        return Some((x, y));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::SettlementTier;
    use crate::tilemap::Tilemap;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn striped_biomes() -> Tilemap<Biome> {
        // Vertical bands: mountain, forest, desert, ocean
        Tilemap::from_fn(400, 200, |x, _| match x / 100 {
            0 => Biome::Mountain,
            1 => Biome::Forest,
            2 => Biome::Desert,
            _ => Biome::Ocean,
        })
    }

    fn village(x: usize, y: usize) -> Settlement {
        Settlement {
            tier: SettlementTier::Village,
            x,
            y,
            name: "Oldthorpe".to_string(),
            population: 500.0,
            wealth: 10.0,
            specialty: "Farming".to_string(),
            biome: Biome::Forest,
            elevation: 0.3,
            moisture: 0.5,
        }
    }

    fn place(
        settlements: &[Settlement],
        clearance: f32,
        params: &PoiParams,
    ) -> (Tilemap<Biome>, Vec<PointOfInterest>) {
        let biomes = striped_biomes();
        let elevation = Tilemap::new_with(400, 200, 0.4f32);
        let moisture = Tilemap::new_with(400, 200, 0.5f32);
        let map = PlacementMap { elevation: &elevation, moisture: &moisture, biomes: &biomes, sea_level: 0.1 };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut names = ChaCha8Rng::seed_from_u64(12);
        let pois = place_pois(&map, settlements, clearance, Theme::Fantasy, params, &mut rng, &mut names);
        (biomes, pois)
    }

    #[test]
    fn test_pois_respect_biome_gates() {
        let params = PoiParams::default();
        let (biomes, pois) = place(&[], 40.0, &params);
        assert!(!pois.is_empty());
        for poi in &pois {
            let allowed = &params.categories.iter().find(|c| c.category == poi.category).unwrap().biomes;
            assert!(allowed.contains(&poi.biome));
            assert_eq!(*biomes.get(poi.x, poi.y), poi.biome);
            assert_ne!(poi.biome, Biome::Ocean);
        }
        // Towers need grassland or coast, neither exists here
        assert!(pois.iter().all(|p| p.category != PoiCategory::Tower));
    }

    #[test]
    fn test_pois_avoid_settlements() {
        let settlements = vec![village(150, 100), village(50, 50)];
        for clearance in [40.0, 90.0] {
            let (_, pois) = place(&settlements, clearance, &PoiParams::default());
            assert!(!pois.is_empty());
            for poi in &pois {
                for s in &settlements {
                    assert!(s.distance_to(poi.x as f32, poi.y as f32) >= clearance);
                }
            }
        }
    }

    #[test]
    fn test_poi_flavor_comes_from_theme() {
        let (_, pois) = place(&[], 40.0, &PoiParams::default());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let kinds: Vec<String> = (0..200).map(|_| Theme::Fantasy.random_poi(&mut rng).kind).collect();
        for poi in &pois {
            assert!(kinds.contains(&poi.kind));
            assert!(!poi.name.is_empty());
        }
    }
}
