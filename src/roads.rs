//! Trade routes between nearby cities and towns.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::placement::{Settlement, SettlementTier};

/// Road importance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadTier {
    /// Both ends are cities
    Major,
    Minor,
}

/// Back-reference to a settlement at one end of a road
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadEndpoint {
    pub x: usize,
    pub y: usize,
    pub name: String,
}

impl RoadEndpoint {
    fn of(settlement: &Settlement) -> Self {
        Self {
            x: settlement.x,
            y: settlement.y,
            name: settlement.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub from: RoadEndpoint,
    pub to: RoadEndpoint,
    pub path: Vec<(usize, usize)>,
    pub tier: RoadTier,
}

/// Parameters for trade route generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteParams {
    /// Only settlements strictly closer than this are connected
    pub max_link_distance: f32,
    /// Nearest neighbours linked from each city / town
    pub city_links: usize,
    pub town_links: usize,
    /// Length of each path step
    pub step: f32,
    /// Lateral jitter per step, uniform in [-jitter/2, jitter/2)
    pub jitter: f32,
    /// Walk stops once within this distance of the target on both axes
    pub arrival_tolerance: f32,
    /// Step cap is `ceil(distance / step) * factor + margin`
    pub step_cap_factor: usize,
    pub step_cap_margin: usize,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            max_link_distance: 300.0,
            city_links: 4,
            town_links: 2,
            step: 8.0,
            jitter: 3.0,
            arrival_tolerance: 5.0,
            step_cap_factor: 4,
            step_cap_margin: 64,
        }
    }
}

/// Walk from `start` toward `end` in fixed steps with random jitter,
/// clamped to the map.
///
/// The first point is exactly `start` and the last exactly `end`;
/// intermediate points are rounded to cells.
pub fn generate_route<R: Rng>(
    start: (usize, usize),
    end: (usize, usize),
    width: usize,
    height: usize,
    params: &RouteParams,
    rng: &mut R,
) -> Vec<(usize, usize)> {
    let mut path = vec![start];
    let (tx, ty) = (end.0 as f32, end.1 as f32);
    let (mut cx, mut cy) = (start.0 as f32, start.1 as f32);
    let max_x = width.saturating_sub(1) as f32;
    let max_y = height.saturating_sub(1) as f32;

    let distance = ((tx - cx).powi(2) + (ty - cy).powi(2)).sqrt();
    let cap = (distance / params.step).ceil() as usize * params.step_cap_factor + params.step_cap_margin;

    for _ in 0..cap {
        if (cx - tx).abs() <= params.arrival_tolerance && (cy - ty).abs() <= params.arrival_tolerance {
            break;
        }
        let dx = tx - cx;
        let dy = ty - cy;
        let d = (dx * dx + dy * dy).sqrt();
        if d == 0.0 {
            break;
        }

        let jx = (rng.gen::<f32>() - 0.5) * params.jitter;
        let jy = (rng.gen::<f32>() - 0.5) * params.jitter;
        cx = (cx + dx / d * params.step + jx).clamp(0.0, max_x);
        cy = (cy + dy / d * params.step + jy).clamp(0.0, max_y);

        path.push((cx.round() as usize, cy.round() as usize));
    }

    path.push(end);
    path
}

/// Connect each city to its nearest 4 and each town to its nearest 2
/// neighbours (cities and towns only), skipping pairs already connected in
/// either direction.
pub fn build_trade_routes<R: Rng>(
    settlements: &[Settlement],
    width: usize,
    height: usize,
    params: &RouteParams,
    rng: &mut R,
) -> Vec<Road> {
    let hubs: Vec<&Settlement> = settlements
        .iter()
        .filter(|s| matches!(s.tier, SettlementTier::City | SettlementTier::Town))
        .collect();

    let mut roads = Vec::new();
    let mut linked: HashSet<((usize, usize), (usize, usize))> = HashSet::new();

    for (i, origin) in hubs.iter().enumerate() {
        let mut nearby: Vec<(&Settlement, f32)> = hubs
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, other)| (*other, other.distance_to(origin.x as f32, origin.y as f32)))
            .filter(|&(_, d)| d < params.max_link_distance)
            .collect();
        nearby.sort_by(|a, b| a.1.total_cmp(&b.1));
        let links = match origin.tier {
            SettlementTier::City => params.city_links,
            _ => params.town_links,
        };

        for (target, _) in nearby.into_iter().take(links) {
            let a = (origin.x, origin.y);
            let b = (target.x, target.y);
            let key = if a <= b { (a, b) } else { (b, a) };
            if !linked.insert(key) {
                continue;
            }

            let path = generate_route(a, b, width, height, params, rng);
            let tier = if origin.tier == SettlementTier::City && target.tier == SettlementTier::City {
                RoadTier::Major
            } else {
                RoadTier::Minor
            };
            roads.push(Road {
                from: RoadEndpoint::of(origin),
                to: RoadEndpoint::of(target),
                path,
                tier,
            });
        }
    }

    if roads.is_empty() && hubs.len() > 1 {
        warn!(hubs = hubs.len(), "no settlements close enough for trade routes");
    }
    debug!(
        major = roads.iter().filter(|r| r.tier == RoadTier::Major).count(),
        minor = roads.iter().filter(|r| r.tier == RoadTier::Minor).count(),
        "trade routes built"
    );
    roads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::Biome;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn settlement(tier: SettlementTier, x: usize, y: usize, name: &str) -> Settlement {
        Settlement {
            tier,
            x,
            y,
            name: name.to_string(),
            population: 1000.0,
            wealth: 10.0,
            specialty: "Trade".to_string(),
            biome: Biome::Grassland,
            elevation: 0.3,
            moisture: 0.5,
        }
    }

    #[test]
    fn test_route_endpoints_exact() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let path = generate_route((10, 20), (250, 180), 400, 300, &RouteParams::default(), &mut rng);
        assert_eq!(path.first(), Some(&(10, 20)));
        assert_eq!(path.last(), Some(&(250, 180)));
        assert!(path.len() > 2);
        for &(x, y) in &path {
            assert!(x < 400 && y < 300);
        }
        for pair in path.windows(2).take(path.len() - 2) {
            let d = ((pair[0].0 as f32 - pair[1].0 as f32).powi(2) + (pair[0].1 as f32 - pair[1].1 as f32).powi(2)).sqrt();
            assert!(d < 12.0, "step of {} too long", d);
        }
    }

    #[test]
    fn test_route_between_adjacent_points() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let path = generate_route((5, 5), (7, 8), 20, 20, &RouteParams::default(), &mut rng);
        assert_eq!(path, vec![(5, 5), (7, 8)]);
    }

    #[test]
    fn test_route_terminates_with_heavy_jitter() {
        let params = RouteParams { jitter: 40.0, ..Default::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let path = generate_route((0, 0), (299, 299), 300, 300, &params, &mut rng);
        let cap = (((299.0f32 * 299.0 * 2.0).sqrt() / 8.0).ceil() as usize) * 4 + 64;
        assert!(path.len() <= cap + 2);
        assert_eq!(path.last(), Some(&(299, 299)));
    }

    #[test]
    fn test_trade_routes_dedup_and_tiers() {
        let settlements = vec![
            settlement(SettlementTier::City, 100, 100, "Castleford"),
            settlement(SettlementTier::City, 250, 100, "Keepwick"),
            settlement(SettlementTier::Town, 100, 220, "Millton"),
            settlement(SettlementTier::Village, 180, 180, "Oldby"),
            settlement(SettlementTier::City, 900, 900, "Fortgate"),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let roads = build_trade_routes(&settlements, 1000, 1000, &RouteParams::default(), &mut rng);

        // Castleford-Keepwick, Castleford-Millton, Keepwick-Millton
        assert_eq!(roads.len(), 3);
        let major: Vec<_> = roads.iter().filter(|r| r.tier == RoadTier::Major).collect();
        assert_eq!(major.len(), 1);
        assert_eq!(major[0].from.name, "Castleford");
        assert_eq!(major[0].to.name, "Keepwick");

        for road in &roads {
            assert_ne!(road.from.name, "Oldby");
            assert_ne!(road.to.name, "Oldby");
            assert_ne!(road.from.name, "Fortgate");
            assert_eq!(road.path.first(), Some(&(road.from.x, road.from.y)));
            assert_eq!(road.path.last(), Some(&(road.to.x, road.to.y)));
        }
    }

    #[test]
    fn test_town_links_limited_to_nearest() {
        let settlements = vec![
            settlement(SettlementTier::Town, 100, 100, "A"),
            settlement(SettlementTier::Town, 150, 100, "B"),
            settlement(SettlementTier::Town, 100, 160, "C"),
            settlement(SettlementTier::Town, 190, 190, "D"),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let roads = build_trade_routes(&settlements, 400, 400, &RouteParams::default(), &mut rng);
        let from_a: Vec<_> = roads.iter().filter(|r| r.from.name == "A").map(|r| r.to.name.as_str()).collect();
        assert_eq!(from_a, vec!["B", "C"]);
    }
}
