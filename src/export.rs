//! PNG previews of generated worlds.

use std::path::Path;

use image::{ImageBuffer, Luma, Rgb, RgbImage};

use crate::error::GenerationError;
use crate::placement::SettlementTier;
use crate::roads::RoadTier;
use crate::tilemap::Tilemap;
use crate::world::WorldMap;

const RIVER_COLOR: [u8; 3] = [40, 100, 160];
const RIVER_WIDE_COLOR: [u8; 3] = [80, 170, 240];
const MAJOR_ROAD_COLOR: [u8; 3] = [139, 115, 85];
const MINOR_ROAD_COLOR: [u8; 3] = [101, 67, 33];
const POI_COLOR: [u8; 3] = [44, 24, 16];

fn settlement_style(tier: SettlementTier) -> ([u8; 3], i64) {
    match tier {
        SettlementTier::City => ([218, 165, 32], 3),
        SettlementTier::Town => ([205, 133, 63], 2),
        SettlementTier::Village => ([139, 69, 19], 1),
    }
}

/// Render biome colors with rivers, roads, POIs and settlements on top.
pub fn render_biome_image(world: &WorldMap) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::new(world.width as u32, world.height as u32);

    for (x, y, biome) in world.biomes.iter() {
        let (r, g, b) = biome.color();
        img.put_pixel(x as u32, y as u32, Rgb([r, g, b]));
    }

    for road in &world.features.roads {
        let color = match road.tier {
            RoadTier::Major => MAJOR_ROAD_COLOR,
            RoadTier::Minor => MINOR_ROAD_COLOR,
        };
        for pair in road.path.windows(2) {
            let a = (pair[0].0 as f32, pair[0].1 as f32);
            let b = (pair[1].0 as f32, pair[1].1 as f32);
            draw_line(&mut img, a, b, 0, color);
        }
    }

    for river in &world.features.rivers {
        for pair in river.points.windows(2) {
            let color = if pair[1].width > 3.0 { RIVER_WIDE_COLOR } else { RIVER_COLOR };
            let radius = (pair[1].width / 2.0).floor() as i64;
            draw_line(&mut img, (pair[0].x, pair[0].y), (pair[1].x, pair[1].y), radius, color);
        }
    }

    for poi in &world.features.pois {
        fill_square(&mut img, poi.x as i64, poi.y as i64, 1, POI_COLOR);
    }

    for s in world.features.settlements() {
        let (color, radius) = settlement_style(s.tier);
        fill_square(&mut img, s.x as i64, s.y as i64, radius, color);
    }

    img
}

pub fn export_biome_png(world: &WorldMap, path: &Path) -> Result<(), GenerationError> {
    render_biome_image(world).save(path)?;
    Ok(())
}

/// Greyscale rendering of a scalar field, stretched to its own min/max.
pub fn export_field_png(field: &Tilemap<f32>, path: &Path) -> Result<(), GenerationError> {
    let (min, max) = field.min_max();
    let range = (max - min).max(f32::EPSILON);
    let img = ImageBuffer::from_fn(field.width as u32, field.height as u32, |x, y| {
        let v = (*field.get(x as usize, y as usize) - min) / range;
        Luma([(v.clamp(0.0, 1.0) * 255.0) as u8])
    });
    img.save(path)?;
    Ok(())
}

/// Elevation rendered with a spectral colormap. Values are expected in [0, 1].
pub fn export_elevation_png(elevation: &Tilemap<f32>, path: &Path) -> Result<(), GenerationError> {
    let mut img: RgbImage = ImageBuffer::new(elevation.width as u32, elevation.height as u32);
    for (x, y, &e) in elevation.iter() {
        img.put_pixel(x as u32, y as u32, Rgb(spectral_colormap(e.clamp(0.0, 1.0))));
    }
    img.save(path)?;
    Ok(())
}

/// Spectral colormap (matplotlib style): dark blue -> cyan -> green -> yellow -> orange -> red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],
        [0.20, 0.53, 0.74],
        [0.40, 0.76, 0.65],
        [0.67, 0.87, 0.64],
        [0.90, 0.96, 0.60],
        [1.00, 1.00, 0.75],
        [1.00, 0.88, 0.55],
        [0.99, 0.68, 0.38],
        [0.96, 0.43, 0.26],
        [0.84, 0.24, 0.31],
        [0.62, 0.00, 0.26],
    ];

    let t_scaled = t * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f32;
    let (c1, c2) = (colors[idx], colors[idx + 1]);

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}

fn fill_square(img: &mut RgbImage, cx: i64, cy: i64, radius: i64, color: [u8; 3]) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            if x >= 0 && y >= 0 && x < w && y < h {
                img.put_pixel(x as u32, y as u32, Rgb(color));
            }
        }
    }
}

/// Stamp squares of `radius` along the segment a-b, one per unit step.
fn draw_line(img: &mut RgbImage, a: (f32, f32), b: (f32, f32), radius: i64, color: [u8; 3]) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = (a.0 + dx * t).round() as i64;
        let y = (a.1 + dy * t).round() as i64;
        fill_square(img, x, y, radius, color);
    }
}
