//! Downhill river tracing with momentum, width growth and meandering.

use std::collections::HashSet;

use super::{HydrologyParams, RiverPoint, Termination};
use crate::tilemap::Tilemap;

/// Raw (unsmoothed) result of tracing one river.
#[derive(Clone, Debug, PartialEq)]
pub struct RiverTrace {
    pub points: Vec<RiverPoint>,
    pub termination: Termination,
}

/// A neighbor cell considered for the next step.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    x: usize,
    y: usize,
    elevation: f32,
    moisture: f32,
    distance: f32,
    alignment: f32,
}

#[inline]
fn pack(x: usize, y: usize) -> u64 {
    ((x as u64) << 32) | y as u64
}

/// Trace a river from a source cell until it reaches the sea, gets stuck,
/// revisits a cell, or reaches `max_river_length` samples.
///
/// Every recorded sample's elevation is at or below the previous one.
pub fn trace_river(
    elevation: &Tilemap<f32>,
    moisture: &Tilemap<f32>,
    start_x: usize,
    start_y: usize,
    params: &HydrologyParams,
    sea_level: f32,
) -> RiverTrace {
    let mut points = vec![RiverPoint {
        x: start_x as f32,
        y: start_y as f32,
        width: params.min_width,
        elevation: *elevation.get(start_x, start_y),
    }];
    let (mut cx, mut cy) = (start_x, start_y);
    let mut visited: HashSet<u64> = HashSet::new();
    let mut momentum = (0.0f32, 0.0f32);
    let mut width = params.min_width;

    let termination = loop {
        if points.len() >= params.max_river_length {
            break Termination::MaxLength;
        }
        if !visited.insert(pack(cx, cy)) {
            break Termination::Cycle;
        }

        let current = *elevation.get(cx, cy);
        if current < sea_level {
            break Termination::Sea;
        }

        let candidates = neighbor_candidates(elevation, moisture, cx, cy, momentum, params.search_radius);
        let Some(next) = select_direction(&candidates, current, params) else {
            break Termination::Stuck;
        };

        let step = (next.x as f32 - cx as f32, next.y as f32 - cy as f32);
        momentum = (
            momentum.0 * params.momentum_retention + step.0 * params.momentum_gain,
            momentum.1 * params.momentum_retention + step.1 * params.momentum_gain,
        );

        let drop = current - next.elevation;
        width = (width + drop * params.width_growth).min(params.max_width);

        cx = next.x;
        cy = next.y;

        let (mx, my) = meander_offset(momentum, points.len(), params);
        points.push(RiverPoint {
            x: cx as f32 + mx,
            y: cy as f32 + my,
            width: width.max(params.min_width),
            elevation: next.elevation,
        });
    };

    RiverTrace { points, termination }
}

/// Enumerate cells in the square window around (x, y), excluding the center.
fn neighbor_candidates(
    elevation: &Tilemap<f32>,
    moisture: &Tilemap<f32>,
    x: usize,
    y: usize,
    momentum: (f32, f32),
    radius: i64,
) -> Vec<Candidate> {
    let side = (2 * radius + 1) as usize;
    let mut candidates = Vec::with_capacity(side * side);

    for dx in -radius..=radius {
        for dy in -radius..=radius {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if !elevation.in_bounds(nx, ny) {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);

            let distance = ((dx * dx + dy * dy) as f32).sqrt();
            let alignment = (momentum.0 * dx as f32 + momentum.1 * dy as f32) / distance.max(1.0);

            candidates.push(Candidate {
                x: nx,
                y: ny,
                elevation: *elevation.get(nx, ny),
                moisture: *moisture.get(nx, ny),
                distance,
                alignment,
            });
        }
    }

    candidates
}

/// Pick the best strictly-downhill candidate, or the first level one when
/// nothing is lower.
fn select_direction(candidates: &[Candidate], current: f32, params: &HydrologyParams) -> Option<Candidate> {
    let mut best: Option<(Candidate, f32)> = None;

    for c in candidates.iter().filter(|c| c.elevation < current) {
        let score = (current - c.elevation) * params.drop_weight
            + params.distance_weight / c.distance
            + c.alignment * params.momentum_weight
            + c.moisture * params.moisture_weight;

        if best.map_or(true, |(_, s)| score > s) {
            best = Some((*c, score));
        }
    }

    match best {
        Some((c, _)) => Some(c),
        None => candidates.iter().find(|c| c.elevation <= current).copied(),
    }
}

/// Perpendicular offset that bends long rivers into gentle meanders.
fn meander_offset(momentum: (f32, f32), river_length: usize, params: &HydrologyParams) -> (f32, f32) {
    let perp = (-momentum.1, momentum.0);
    let length = (perp.0 * perp.0 + perp.1 * perp.1).sqrt();

    if length > 0.0 && river_length > params.meander_start {
        let strength = (river_length as f32 * params.meander_growth).min(params.meander_max);
        let offset = (river_length as f32 * params.meander_frequency).sin() * strength;
        (perp.0 / length * offset, perp.1 / length * offset)
    } else {
        (0.0, 0.0)
    }
}

/// 1-2-1 weighted moving average over the interior samples; endpoints are kept.
pub fn smooth_river(points: &[RiverPoint]) -> Vec<RiverPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut smoothed = Vec::with_capacity(points.len());
    smoothed.push(points[0]);

    for window in points.windows(3) {
        let (prev, curr, next) = (window[0], window[1], window[2]);
        smoothed.push(RiverPoint {
            x: (prev.x + curr.x * 2.0 + next.x) / 4.0,
            y: (prev.y + curr.y * 2.0 + next.y) / 4.0,
            width: curr.width,
            elevation: curr.elevation,
        });
    }

    smoothed.push(points[points.len() - 1]);
    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slope(width: usize, height: usize) -> Tilemap<f32> {
        // High at the top row, falling linearly to 0 at the bottom
        Tilemap::from_fn(width, height, |_, y| 1.0 - y as f32 / (height - 1) as f32)
    }

    #[test]
    fn test_trace_descends_monotonically() {
        let elevation = slope(40, 200);
        let moisture = Tilemap::new_with(40, 200, 0.5f32);
        let trace = trace_river(&elevation, &moisture, 20, 2, &HydrologyParams::default(), 0.1);

        assert_eq!(trace.termination, Termination::Sea);
        for pair in trace.points.windows(2) {
            assert!(pair[1].elevation <= pair[0].elevation);
            let step = pair[0].distance_to(pair[1].x, pair[1].y);
            assert!(step < 3.0, "step of {} exceeds the search window", step);
        }
        assert!(trace.points.last().unwrap().elevation < 0.1);
    }

    #[test]
    fn test_trace_stuck_in_pit() {
        // Bowl with its floor above sea level
        let elevation = Tilemap::from_fn(21, 21, |x, y| {
            let d = ((x as f32 - 10.0).powi(2) + (y as f32 - 10.0).powi(2)).sqrt();
            0.5 + d * 0.01
        });
        let moisture = Tilemap::new_with(21, 21, 0.5f32);
        let trace = trace_river(&elevation, &moisture, 3, 10, &HydrologyParams::default(), 0.1);

        assert_eq!(trace.termination, Termination::Stuck);
        let last = trace.points.last().unwrap();
        assert_eq!((last.x.round(), last.y.round()), (10.0, 10.0));
    }

    #[test]
    fn test_trace_flat_terminates_by_cycle_guard() {
        let elevation = Tilemap::new_with(30, 30, 0.5f32);
        let moisture = Tilemap::new_with(30, 30, 0.5f32);
        let trace = trace_river(&elevation, &moisture, 15, 15, &HydrologyParams::default(), 0.1);
        assert_eq!(trace.termination, Termination::Cycle);
        assert!(trace.points.len() < 30);
    }

    #[test]
    fn test_trace_respects_length_cap() {
        let elevation = slope(20, 2000);
        let moisture = Tilemap::new_with(20, 2000, 0.5f32);
        let params = HydrologyParams { max_river_length: 60, ..Default::default() };
        let trace = trace_river(&elevation, &moisture, 10, 0, &params, 0.1);
        assert_eq!(trace.termination, Termination::MaxLength);
        assert_eq!(trace.points.len(), 60);
    }

    #[test]
    fn test_source_below_sea_level_is_single_sample() {
        let elevation = Tilemap::new_with(10, 10, 0.05f32);
        let moisture = Tilemap::new_with(10, 10, 1.0f32);
        let trace = trace_river(&elevation, &moisture, 5, 5, &HydrologyParams::default(), 0.1);
        assert_eq!(trace.termination, Termination::Sea);
        assert_eq!(trace.points.len(), 1);
    }

    #[test]
    fn test_meander_waits_for_minimum_length() {
        let params = HydrologyParams::default();
        assert_eq!(meander_offset((1.0, 0.0), 10, &params), (0.0, 0.0));
        let (mx, my) = meander_offset((1.0, 0.0), 120, &params);
        assert_eq!(mx, 0.0);
        assert!(my.abs() <= params.meander_max);
    }

    #[test]
    fn test_smoothing_keeps_endpoints() {
        let pts: Vec<RiverPoint> = (0..5)
            .map(|i| RiverPoint {
                x: i as f32,
                y: if i % 2 == 0 { 0.0 } else { 4.0 },
                width: 1.0 + i as f32 * 0.5,
                elevation: 1.0 - i as f32 * 0.1,
            })
            .collect();
        let smoothed = smooth_river(&pts);
        assert_eq!(smoothed.len(), pts.len());
        assert_eq!(smoothed[0], pts[0]);
        assert_eq!(smoothed[4], pts[4]);
        assert_eq!(smoothed[1].y, 2.0);
        assert_eq!(smoothed[2].width, pts[2].width);
    }
}
