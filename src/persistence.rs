//! Save and load worlds as JSON.
//!
//! Only the inputs and the placed features are stored. Dense fields are
//! regenerated from the stored seeds, theme and config on load, which is
//! exact because generation is deterministic.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::seeds::WorldSeeds;
use crate::themes::Theme;
use crate::world::{Features, WorldGenerator, WorldMap};

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// On-disk representation of a world
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSaveFile {
    pub version: u32,
    pub width: usize,
    pub height: usize,
    pub seeds: WorldSeeds,
    pub theme: Theme,
    #[serde(default)]
    pub config: GeneratorConfig,
    pub features: Features,
}

impl WorldSaveFile {
    pub fn from_world(world: &WorldMap) -> Self {
        Self {
            version: SAVE_VERSION,
            width: world.width,
            height: world.height,
            seeds: world.seeds.clone(),
            theme: world.theme,
            config: world.config.clone(),
            features: world.features.clone(),
        }
    }

    /// Rebuild the world: regenerate the fields and attach the saved features.
    pub fn into_world(self) -> Result<WorldMap, GenerationError> {
        if self.version > SAVE_VERSION {
            return Err(GenerationError::UnsupportedSaveVersion {
                found: self.version,
                supported: SAVE_VERSION,
            });
        }

        let generator = WorldGenerator::new(self.width, self.height, self.seeds.master, self.theme.id())?
            .with_seeds(self.seeds.clone())
            .with_config(self.config.clone())?;
        let terrain = generator.generate_terrain();

        Ok(WorldMap {
            width: self.width,
            height: self.height,
            seeds: self.seeds,
            theme: self.theme,
            config: self.config,
            elevation: terrain.elevation,
            moisture: terrain.moisture,
            temperature: terrain.temperature,
            biomes: terrain.biomes,
            features: self.features,
        })
    }
}

pub fn to_json(world: &WorldMap) -> Result<String, GenerationError> {
    Ok(serde_json::to_string_pretty(&WorldSaveFile::from_world(world))?)
}

pub fn from_json(json: &str) -> Result<WorldMap, GenerationError> {
    let save: WorldSaveFile = serde_json::from_str(json)?;
    save.into_world()
}

pub fn save_world(world: &WorldMap, path: &Path) -> Result<(), GenerationError> {
    fs::write(path, to_json(world)?)?;
    info!(path = %path.display(), "world saved");
    Ok(())
}

pub fn load_world(path: &Path) -> Result<WorldMap, GenerationError> {
    let json = fs::read_to_string(path)?;
    let world = from_json(&json)?;
    info!(path = %path.display(), seed = world.seed(), "world loaded");
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldMap {
        WorldGenerator::new(240, 180, 42, "fantasy").unwrap().generate()
    }

    #[test]
    fn test_json_round_trip_reproduces_world() {
        let original = world();
        let restored = from_json(&to_json(&original).unwrap()).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_file_round_trip() {
        let original = world();
        let path = std::env::temp_dir().join(format!("worldmap_save_{}.json", std::process::id()));
        save_world(&original, &path).unwrap();
        let restored = load_world(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(restored.features, original.features);
        assert_eq!(restored.biomes, original.biomes);
    }

    #[test]
    fn test_rejects_newer_version() {
        let mut save = WorldSaveFile::from_world(&world());
        save.version = SAVE_VERSION + 1;
        let json = serde_json::to_string(&save).unwrap();
        assert!(matches!(
            from_json(&json),
            Err(GenerationError::UnsupportedSaveVersion { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(from_json("{ not json"), Err(GenerationError::Json(_))));
    }
}
