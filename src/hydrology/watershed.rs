//! Watershed discovery and river source selection.

use std::collections::HashSet;
use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::HydrologyParams;
use crate::tilemap::Tilemap;

/// A highland region that seeds rivers
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Watershed {
    pub x: usize,
    pub y: usize,
    pub radius: f32,
}

/// Scan the map on a coarse grid and record samples whose elevation lies
/// strictly inside the highland band, at most one per `watershed_cell` block.
pub fn find_watersheds<R: Rng>(elevation: &Tilemap<f32>, params: &HydrologyParams, rng: &mut R) -> Vec<Watershed> {
    let stride = params.watershed_stride.max(1);
    let cell = params.watershed_cell.max(1);
    let (band_lo, band_hi) = params.highland_band;
    let (radius_lo, radius_hi) = params.watershed_radius;
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut watersheds = Vec::new();

    for y in (0..elevation.height).step_by(stride) {
        for x in (0..elevation.width).step_by(stride) {
            let e = *elevation.get(x, y);
            if e > band_lo && e < band_hi && seen.insert((x / cell, y / cell)) {
                let radius = radius_lo + rng.gen::<f32>() * (radius_hi - radius_lo);
                watersheds.push(Watershed { x, y, radius });
            }
        }
    }

    watersheds
}

/// Pick up to `count` river sources inside a watershed.
///
/// Each source is the highest of `source_attempts` random samples within the
/// watershed radius that is above `source_min_elevation` and not closer than
/// `source_spacing` to an already chosen source. Fewer sources than requested
/// is normal.
pub fn find_river_sources<R: Rng>(
    elevation: &Tilemap<f32>,
    watershed: &Watershed,
    count: usize,
    params: &HydrologyParams,
    rng: &mut R,
) -> Vec<(usize, usize)> {
    let mut sources: Vec<(usize, usize)> = Vec::with_capacity(count);

    for _ in 0..count {
        let mut best: Option<((usize, usize), f32)> = None;

        for _ in 0..params.source_attempts {
            let angle = rng.gen::<f32>() * TAU;
            let distance = rng.gen::<f32>() * watershed.radius;
            let x = (watershed.x as f32 + angle.cos() * distance).floor() as i64;
            let y = (watershed.y as f32 + angle.sin() * distance).floor() as i64;

            let Some(&e) = elevation.get_checked(x, y) else {
                continue;
            };
            if e <= params.source_min_elevation || best.is_some_and(|(_, b)| e <= b) {
                continue;
            }

            let (x, y) = (x as usize, y as usize);
            let too_close = sources.iter().any(|&(sx, sy)| {
                let dx = sx as f32 - x as f32;
                let dy = sy as f32 - y as f32;
                (dx * dx + dy * dy).sqrt() < params.source_spacing
            });
            if !too_close {
                best = Some(((x, y), e));
            }
        }

        if let Some((pos, _)) = best {
            sources.push(pos);
        }
    }

    sources
}
