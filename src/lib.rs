//! Procedural world map generation library
//!
//! Turns a seed into a themed world map: elevation, moisture and temperature
//! fields, biomes, rivers, settlements, points of interest and trade routes.

pub mod biomes;
pub mod climate;
pub mod config;
pub mod continents;
pub mod error;
pub mod export;
pub mod heightmap;
pub mod hydrology;
pub mod noise_field;
pub mod persistence;
pub mod placement;
pub mod roads;
pub mod seeds;
pub mod themes;
pub mod tilemap;
pub mod world;

pub use config::GeneratorConfig;
pub use error::GenerationError;
pub use themes::Theme;
pub use world::{Features, WorldGenerator, WorldMap};
