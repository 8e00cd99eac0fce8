//! Tributary generation for long rivers.

use std::f32::consts::TAU;

use rand::Rng;
use rayon::prelude::*;

use super::trace::{smooth_river, trace_river};
use super::{HydrologyParams, River, RiverPoint, Termination};
use crate::tilemap::Tilemap;

/// A planned tributary: where it should join and where it starts.
#[derive(Clone, Copy, Debug)]
struct TributaryPlan {
    junction: RiverPoint,
    source: (usize, usize),
}

/// Grow tributaries off every river longer than `tributary_parent_min_length`.
///
/// Junctions and sources are drawn sequentially from `rng`; the traces
/// themselves run in parallel. A traced tributary is kept only if it passes
/// within `join_tolerance` of its junction. It is cut at that point and the
/// junction sample is appended so the tributary visibly meets its parent.
pub fn generate_tributaries<R: Rng>(
    rivers: &[River],
    elevation: &Tilemap<f32>,
    moisture: &Tilemap<f32>,
    params: &HydrologyParams,
    sea_level: f32,
    rng: &mut R,
) -> Vec<River> {
    let mut plans = Vec::new();

    for parent in rivers.iter().filter(|r| !r.tributary) {
        if parent.len() <= params.tributary_parent_min_length {
            continue;
        }
        let count = params.tributary_base_count + parent.len() / params.tributary_per_length.max(1);
        let (lo, hi) = params.tributary_junction_range;

        for _ in 0..count {
            let fraction = lo + rng.gen::<f32>() * (hi - lo);
            let index = ((parent.len() as f32 * fraction) as usize).min(parent.len() - 1);
            let junction = parent.points[index];

            if let Some(source) = find_tributary_source(elevation, parent, &junction, params, rng) {
                plans.push(TributaryPlan { junction, source });
            }
        }
    }

    plans
        .par_iter()
        .filter_map(|plan| {
            let trace = trace_river(elevation, moisture, plan.source.0, plan.source.1, params, sea_level);
            splice(&trace.points, &plan.junction, params)
        })
        .collect()
}

/// Highest of `tributary_attempts` random samples around the junction that is
/// above the junction and clear of the parent river.
fn find_tributary_source<R: Rng>(
    elevation: &Tilemap<f32>,
    parent: &River,
    junction: &RiverPoint,
    params: &HydrologyParams,
    rng: &mut R,
) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), f32)> = None;

    for _ in 0..params.tributary_attempts {
        let angle = rng.gen::<f32>() * TAU;
        let distance = params.tributary_search_min + rng.gen::<f32>() * params.tributary_search_radius;
        let x = (junction.x + angle.cos() * distance).floor() as i64;
        let y = (junction.y + angle.sin() * distance).floor() as i64;

        let Some(&e) = elevation.get_checked(x, y) else {
            continue;
        };
        if e <= junction.elevation || best.is_some_and(|(_, b)| e <= b) {
            continue;
        }
        if parent.passes_within(x as f32, y as f32, params.tributary_clearance) {
            continue;
        }
        best = Some(((x as usize, y as usize), e));
    }

    best.map(|(pos, _)| pos)
}

/// Cut a raw trace at its first sample near the junction and attach the junction.
fn splice(raw: &[RiverPoint], junction: &RiverPoint, params: &HydrologyParams) -> Option<River> {
    let meet = raw
        .iter()
        .position(|p| p.distance_to(junction.x, junction.y) < params.join_tolerance)?;

    let mut points = smooth_river(&raw[..=meet]);
    let (last_width, last_elevation) = points
        .last()
        .map_or((params.min_width, junction.elevation), |p| (p.width, p.elevation));
    // The junction sample never sits above the tributary's last traced sample
    points.push(RiverPoint {
        width: last_width.max(junction.width),
        elevation: junction.elevation.min(last_elevation),
        ..*junction
    });

    (points.len() > params.tributary_min_length).then_some(River {
        points,
        termination: Termination::Confluence,
        tributary: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, y: f32, width: f32, elevation: f32) -> RiverPoint {
        RiverPoint { x, y, width, elevation }
    }

    #[test]
    fn test_splice_truncates_at_junction() {
        let raw: Vec<RiverPoint> = (0..40).map(|i| point(i as f32, 0.0, 1.0 + i as f32 * 0.01, 0.9)).collect();
        let junction = point(30.0, 5.0, 3.0, 0.3);
        let river = splice(&raw, &junction, &HydrologyParams::default()).unwrap();

        // First sample within 15 of (30, 5) is x = 16
        assert_eq!(river.len(), 18);
        assert_eq!(river.termination, Termination::Confluence);
        assert!(river.tributary);
        let mouth = river.mouth().unwrap();
        assert_eq!((mouth.x, mouth.y), (30.0, 5.0));
        assert_eq!(mouth.width, 3.0);
    }

    #[test]
    fn test_splice_keeps_descending_at_junction() {
        // Tributary ends at 0.25, parent sample at the junction is recorded higher
        let raw: Vec<RiverPoint> = (0..40).map(|i| point(i as f32, 0.0, 1.0, 0.6 - i as f32 * 0.01)).collect();
        let junction = point(30.0, 5.0, 2.0, 0.45);
        let river = splice(&raw, &junction, &HydrologyParams::default()).unwrap();

        for pair in river.points.windows(2) {
            assert!(pair[1].elevation <= pair[0].elevation);
        }
        let mouth = river.mouth().unwrap();
        assert_eq!((mouth.x, mouth.y), (30.0, 5.0));
        assert_eq!(mouth.elevation, raw[16].elevation);
    }

    #[test]
    fn test_splice_rejects_distant_trace() {
        let raw: Vec<RiverPoint> = (0..40).map(|i| point(i as f32, 0.0, 1.0, 0.9)).collect();
        let junction = point(20.0, 80.0, 2.0, 0.3);
        assert!(splice(&raw, &junction, &HydrologyParams::default()).is_none());
    }

    #[test]
    fn test_splice_rejects_short_tributary() {
        let raw: Vec<RiverPoint> = (0..40).map(|i| point(i as f32, 0.0, 1.0, 0.9)).collect();
        let junction = point(3.0, 0.0, 2.0, 0.3);
        assert!(splice(&raw, &junction, &HydrologyParams::default()).is_none());
    }

    #[test]
    fn test_short_parents_get_no_tributaries() {
        use rand::SeedableRng;
        let elevation = Tilemap::new_with(200, 200, 0.5f32);
        let moisture = Tilemap::new_with(200, 200, 0.5f32);
        let parent = River {
            points: (0..80).map(|i| point(i as f32, 100.0, 1.0, 0.5)).collect(),
            termination: Termination::Sea,
            tributary: false,
        };
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(4);
        let tribs = generate_tributaries(&[parent], &elevation, &moisture, &HydrologyParams::default(), 0.1, &mut rng);
        assert!(tribs.is_empty());
    }

    #[test]
    fn test_tributary_sources_are_uphill_and_clear() {
        use rand::SeedableRng;
        // Valley running along y = 100, rising to both sides
        let elevation = Tilemap::from_fn(300, 200, |_, y| 0.2 + (y as f32 - 100.0).abs() / 200.0);
        let parent = River {
            points: (0..300).map(|i| point(i as f32, 100.0, 2.0, 0.2)).collect(),
            termination: Termination::Sea,
            tributary: false,
        };
        let junction = parent.points[150];
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(8);
        let params = HydrologyParams::default();
        let (x, y) = find_tributary_source(&elevation, &parent, &junction, &params, &mut rng).unwrap();
        assert!(*elevation.get(x, y) > junction.elevation);
        assert!(!parent.passes_within(x as f32, y as f32, params.tributary_clearance));
    }
}
