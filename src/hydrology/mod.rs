//! River network generation.
//!
//! Rivers are found in three passes:
//! 1. Watershed discovery - coarse scan for highland regions
//! 2. Source selection and tracing - the highest points of each watershed are
//!    traced downhill with momentum-smoothed steps until they reach the sea,
//!    get stuck, loop, or hit the length cap
//! 3. Tributaries - side streams traced from higher ground next to long rivers,
//!    kept only if they happen to pass near their junction
//!
//! Tracing only reads the elevation and moisture maps, so independent traces
//! run in parallel and are collected back in source order.

pub mod trace;
pub mod tributaries;
pub mod watershed;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::tilemap::Tilemap;

pub use trace::{smooth_river, trace_river, RiverTrace};
pub use tributaries::generate_tributaries;
pub use watershed::{find_river_sources, find_watersheds, Watershed};

/// Parameters for river generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrologyParams {
    // =========================================================================
    // Watersheds and sources
    // =========================================================================
    /// Stride of the coarse watershed scan (cells)
    pub watershed_stride: usize,
    /// Side of the block keying watershed dedup; one watershed per block
    pub watershed_cell: usize,
    /// Elevation band (exclusive) that counts as highland
    pub highland_band: (f32, f32),
    /// Watershed radius range
    pub watershed_radius: (f32, f32),
    /// Sources requested per watershed (min inclusive, max exclusive)
    pub sources_per_watershed: (usize, usize),
    /// Random samples drawn per requested source
    pub source_attempts: usize,
    /// Sources must be strictly above this elevation
    pub source_min_elevation: f32,
    /// Minimum distance between sources of the same watershed
    pub source_spacing: f32,

    // =========================================================================
    // Tracing
    // =========================================================================
    /// Half-size of the candidate window around the current cell
    pub search_radius: i64,
    /// Maximum samples per river (including the source)
    pub max_river_length: usize,
    /// Traces with this many samples or fewer are discarded
    pub min_river_length: usize,
    /// Score weight of the elevation drop
    pub drop_weight: f32,
    /// Score weight of the inverse step distance
    pub distance_weight: f32,
    /// Score weight of momentum alignment
    pub momentum_weight: f32,
    /// Score weight of destination moisture
    pub moisture_weight: f32,
    /// Fraction of the old momentum kept each step
    pub momentum_retention: f32,
    /// Fraction of the realised step added to momentum
    pub momentum_gain: f32,
    /// Width gained per unit of elevation drop
    pub width_growth: f32,
    pub min_width: f32,
    pub max_width: f32,
    /// Meandering starts once the river has more samples than this
    pub meander_start: usize,
    /// Meander amplitude gained per sample
    pub meander_growth: f32,
    pub meander_max: f32,
    pub meander_frequency: f32,

    // =========================================================================
    // Tributaries
    // =========================================================================
    /// Rivers with more samples than this get tributaries
    pub tributary_parent_min_length: usize,
    /// Tributary attempts = base + parent_length / per_length
    pub tributary_base_count: usize,
    pub tributary_per_length: usize,
    /// Junction position range as a fraction of the parent length
    pub tributary_junction_range: (f32, f32),
    /// Source search distance is `search_min + rand * search_radius`
    pub tributary_search_min: f32,
    pub tributary_search_radius: f32,
    pub tributary_attempts: usize,
    /// Tributary sources must be at least this far from every parent sample
    pub tributary_clearance: f32,
    /// A tributary joins if it passes within this distance of the junction
    pub join_tolerance: f32,
    /// Spliced tributaries with this many samples or fewer are discarded
    pub tributary_min_length: usize,
}

impl Default for HydrologyParams {
    fn default() -> Self {
        Self {
            watershed_stride: 100,
            watershed_cell: 100,
            highland_band: (0.4, 0.8),
            watershed_radius: (150.0, 250.0),
            sources_per_watershed: (2, 8),
            source_attempts: 200,
            source_min_elevation: 0.6,
            source_spacing: 50.0,

            search_radius: 2,
            max_river_length: 800,
            min_river_length: 25,
            drop_weight: 2.0,
            distance_weight: 1.0,
            momentum_weight: 0.3,
            moisture_weight: 0.2,
            momentum_retention: 0.7,
            momentum_gain: 0.3,
            width_growth: 10.0,
            min_width: 1.0,
            max_width: 5.0,
            meander_start: 50,
            meander_growth: 0.0005,
            meander_max: 0.1,
            meander_frequency: 0.03,

            tributary_parent_min_length: 100,
            tributary_base_count: 2,
            tributary_per_length: 150,
            tributary_junction_range: (0.3, 0.7),
            tributary_search_min: 30.0,
            tributary_search_radius: 100.0,
            tributary_attempts: 100,
            tributary_clearance: 20.0,
            join_tolerance: 15.0,
            tributary_min_length: 15,
        }
    }
}

/// A sample along a river path
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiverPoint {
    pub x: f32,
    pub y: f32,
    /// Channel width, a proxy for accumulated flow
    pub width: f32,
    /// Elevation of the underlying cell when the sample was traced
    pub elevation: f32,
}

impl RiverPoint {
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }
}

/// Why a trace stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Reached a cell below sea level
    Sea,
    /// No neighbor at or below the current elevation
    Stuck,
    /// Stepped onto a cell already visited by this trace
    Cycle,
    /// Hit the sample cap
    MaxLength,
    /// Tributary spliced onto its parent; the last sample is the junction
    Confluence,
}

/// A traced and smoothed river
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct River {
    pub points: Vec<RiverPoint>,
    pub termination: Termination,
    pub tributary: bool,
}

impl River {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn source(&self) -> Option<&RiverPoint> {
        self.points.first()
    }

    pub fn mouth(&self) -> Option<&RiverPoint> {
        self.points.last()
    }

    /// True if any sample lies strictly closer than `distance` to (x, y).
    pub fn passes_within(&self, x: f32, y: f32, distance: f32) -> bool {
        self.points.iter().any(|p| p.distance_to(x, y) < distance)
    }
}

/// Generate the full river network: main rivers followed by their tributaries.
///
/// An empty result is a valid outcome (no highland, or no trace long enough).
pub fn generate_rivers<R: Rng>(
    elevation: &Tilemap<f32>,
    moisture: &Tilemap<f32>,
    params: &HydrologyParams,
    sea_level: f32,
    rng: &mut R,
) -> Vec<River> {
    let watersheds = find_watersheds(elevation, params, rng);
    if watersheds.is_empty() {
        warn!("no watersheds found; map will have no rivers");
        return Vec::new();
    }

    let mut sources = Vec::new();
    for watershed in &watersheds {
        let (lo, hi) = params.sources_per_watershed;
        let count = if hi > lo { rng.gen_range(lo..hi) } else { lo };
        sources.extend(find_river_sources(elevation, watershed, count, params, rng));
    }
    debug!(watersheds = watersheds.len(), sources = sources.len(), "river sources selected");

    let traces: Vec<RiverTrace> = sources
        .par_iter()
        .map(|&(x, y)| trace_river(elevation, moisture, x, y, params, sea_level))
        .collect();

    let mut rivers: Vec<River> = traces
        .into_iter()
        .filter(|t| t.points.len() > params.min_river_length)
        .map(|t| River {
            points: smooth_river(&t.points),
            termination: t.termination,
            tributary: false,
        })
        .collect();

    let main_count = rivers.len();
    let tributaries = generate_tributaries(&rivers, elevation, moisture, params, sea_level, rng);
    rivers.extend(tributaries);

    info!(
        rivers = main_count,
        tributaries = rivers.len() - main_count,
        "river network traced"
    );
    rivers
}
