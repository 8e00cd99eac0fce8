//! Generator configuration.
//!
//! Every tunable constant of the pipeline lives here, grouped by stage.
//! Defaults reproduce the stock world look; partial JSON files are accepted
//! and fill the rest from defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::biomes::BiomeThresholds;
use crate::climate::ClimateParams;
use crate::continents::ContinentParams;
use crate::error::GenerationError;
use crate::heightmap::ElevationParams;
use crate::hydrology::HydrologyParams;
use crate::placement::{PoiParams, SettlementParams, TierParams};
use crate::roads::RouteParams;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Elevation below which a cell counts as water for moisture, water
    /// proximity and river termination
    pub sea_level: f32,
    pub continents: ContinentParams,
    pub elevation: ElevationParams,
    pub climate: ClimateParams,
    pub biomes: BiomeThresholds,
    pub hydrology: HydrologyParams,
    pub settlements: SettlementParams,
    pub pois: PoiParams,
    pub routes: RouteParams,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sea_level: 0.1,
            continents: ContinentParams::default(),
            elevation: ElevationParams::default(),
            climate: ClimateParams::default(),
            biomes: BiomeThresholds::default(),
            hydrology: HydrologyParams::default(),
            settlements: SettlementParams::default(),
            pois: PoiParams::default(),
            routes: RouteParams::default(),
        }
    }
}

fn ensure(ok: bool, message: impl FnOnce() -> String) -> Result<(), GenerationError> {
    if ok {
        Ok(())
    } else {
        Err(GenerationError::InvalidConfig(message()))
    }
}

fn ensure_range<T: PartialOrd + std::fmt::Debug>(name: &str, range: (T, T)) -> Result<(), GenerationError> {
    ensure(range.0 <= range.1, || format!("{} range {:?} has min > max", name, range))
}

impl GeneratorConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, GenerationError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        info!(path = %path.display(), "loaded generator config");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, GenerationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check ordering and range constraints between parameters.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let b = &self.biomes;
        ensure((0.0..=1.0).contains(&self.sea_level), || {
            format!("sea_level {} outside [0, 1]", self.sea_level)
        })?;
        ensure(self.sea_level <= b.ocean_max, || {
            format!("sea_level {} above ocean_max {}", self.sea_level, b.ocean_max)
        })?;
        ensure(b.ocean_max < b.coast_max && b.coast_max < b.mountain_min, || {
            format!(
                "biome elevation thresholds must increase: ocean {} < coast {} < mountain {}",
                b.ocean_max, b.coast_max, b.mountain_min
            )
        })?;

        let c = &self.continents;
        ensure_range("continents.island_count", c.island_count)?;
        ensure_range("continents.island_size", c.island_size)?;
        ensure_range("continents.island_strength", c.island_strength)?;
        ensure_range("continents.falloff_exponent", c.falloff_exponent)?;
        for (i, band) in self.elevation.band_frequencies.iter().enumerate() {
            ensure_range(&format!("elevation.band_frequencies[{}]", i), *band)?;
        }

        let h = &self.hydrology;
        ensure(h.watershed_stride > 0, || "hydrology.watershed_stride must be positive".to_string())?;
        ensure(h.watershed_cell > 0, || "hydrology.watershed_cell must be positive".to_string())?;
        ensure(h.search_radius > 0, || "hydrology.search_radius must be positive".to_string())?;
        ensure(h.max_river_length > 0, || "hydrology.max_river_length must be positive".to_string())?;
        ensure(h.min_width <= h.max_width, || {
            format!("hydrology width range {}..{} has min > max", h.min_width, h.max_width)
        })?;
        ensure_range("hydrology.highland_band", h.highland_band)?;
        ensure_range("hydrology.watershed_radius", h.watershed_radius)?;
        ensure_range("hydrology.sources_per_watershed", h.sources_per_watershed)?;
        ensure_range("hydrology.tributary_junction_range", h.tributary_junction_range)?;
        ensure(
            h.tributary_junction_range.0 >= 0.0 && h.tributary_junction_range.1 <= 1.0,
            || "hydrology.tributary_junction_range must lie within [0, 1]".to_string(),
        )?;

        let s = &self.settlements;
        ensure(s.attempts > 0, || "settlements.attempts must be positive".to_string())?;
        ensure_range("settlements.habitable_elevation", s.habitable_elevation)?;
        for (name, tier) in [("city", &s.city), ("town", &s.town), ("village", &s.village)] {
            validate_tier(name, tier)?;
        }

        ensure(self.pois.attempts > 0, || "pois.attempts must be positive".to_string())?;
        ensure(self.routes.step > 0.0, || "routes.step must be positive".to_string())?;
        ensure(self.routes.arrival_tolerance >= 0.0, || {
            "routes.arrival_tolerance must not be negative".to_string()
        })?;

        Ok(())
    }
}

fn validate_tier(name: &str, tier: &TierParams) -> Result<(), GenerationError> {
    ensure(tier.min_distance >= 0.0, || format!("settlements.{}.min_distance is negative", name))?;
    ensure(tier.wealth_max >= 0.0, || format!("settlements.{}.wealth_max is negative", name))?;
    ensure_range(&format!("settlements.{}.population", name), tier.population)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        GeneratorConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "sea_level": 0.08, "hydrology": { "max_river_length": 400 } }"#;
        let config: GeneratorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sea_level, 0.08);
        assert_eq!(config.hydrology.max_river_length, 400);
        assert_eq!(config.hydrology.search_radius, 2);
        assert_eq!(config.settlements, SettlementParams::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_json_round_trip() {
        let config = GeneratorConfig::default();
        let parsed: GeneratorConfig = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_misordered_thresholds() {
        let mut config = GeneratorConfig::default();
        config.biomes.coast_max = 0.8;
        assert!(matches!(config.validate(), Err(GenerationError::InvalidConfig(_))));

        let mut config = GeneratorConfig::default();
        config.sea_level = 0.2;
        assert!(matches!(config.validate(), Err(GenerationError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_ranges_and_zero_budgets() {
        let mut config = GeneratorConfig::default();
        config.settlements.city.population = (10.0, 5.0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("settlements.city.population"));

        let mut config = GeneratorConfig::default();
        config.pois.attempts = 0;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.hydrology.watershed_stride = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = GeneratorConfig::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(GenerationError::Io(_))));
    }
}
