use std::error::Error;
use std::fs;
use std::path::Path;

use loam_runtime::StreamConfig;
use loam_world::{DEFAULT_SEED, GeneratorKind, VoxelWorld, WorldGenConfig};
use serde::{Deserialize, Serialize};

/// Top-level engine configuration, one TOML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub generator: GeneratorKind,
    #[serde(default)]
    pub worldgen: WorldGenConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            generator: GeneratorKind::default(),
            worldgen: WorldGenConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, Box<dyn Error>> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn build_world(&self) -> VoxelWorld {
        VoxelWorld::from_kind(self.generator, self.seed, &self.worldgen)
    }

    /// Push generator settings from `self` into a running world.
    /// Returns true when anything changed; resident chunks are then regenerated.
    pub fn apply_to(&self, world: &mut VoxelWorld) -> bool {
        let kind_changed = world.generator().name() != self.generator.name();
        let seed_changed = world.seed() != self.seed;
        let cfg_changed = world.worldgen_config() != &self.worldgen;
        if !(kind_changed || seed_changed || cfg_changed) {
            return false;
        }
        if cfg_changed {
            world.set_worldgen_config(&self.worldgen);
        }
        if kind_changed {
            world.set_generator(self.generator.build(self.seed, &self.worldgen));
        } else if seed_changed {
            world.set_seed(self.seed);
        }
        let n = world.regenerate_loaded_chunks();
        log::info!("applied config: {} ({} chunks regenerated)", self.generator, n);
        true
    }
}

pub fn load_config_from_path(path: &Path) -> Result<EngineConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    EngineConfig::from_toml_str(&s)
}

/// Config from `path` if given, defaults otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<EngineConfig, Box<dyn Error>> {
    match path {
        Some(p) => {
            let cfg = load_config_from_path(p)?;
            log::info!("loaded config from {}", p.display());
            Ok(cfg)
        }
        None => Ok(EngineConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.seed, 12345);
        assert_eq!(cfg.generator, GeneratorKind::Terrain3d);
        assert_eq!(cfg.stream.view_distance, 8);
    }

    #[test]
    fn partial_sections_fill_in() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            seed = 7
            generator = "flat"

            [worldgen.flat]
            thickness = 9

            [stream]
            view_distance = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.generator, GeneratorKind::Flat);
        assert_eq!(cfg.worldgen.flat.thickness, 9);
        assert_eq!(cfg.stream.view_distance, 3);
        assert_eq!(cfg.stream.hysteresis, 2);
        let w = cfg.build_world();
        assert_eq!(w.height(0, 0), 9);
    }

    #[test]
    fn unknown_generator_is_an_error() {
        assert!(EngineConfig::from_toml_str("generator = \"voronoi\"").is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = EngineConfig::default();
        let s = cfg.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&s).unwrap(), cfg);
    }

    #[test]
    fn apply_regenerates_on_seed_change() {
        let mut cfg = EngineConfig {
            generator: GeneratorKind::Flat,
            ..EngineConfig::default()
        };
        let mut w = cfg.build_world();
        w.load_chunk(loam_chunk::ChunkPos::new(0, 0));
        assert!(!cfg.apply_to(&mut w));

        cfg.worldgen.flat.thickness = 6;
        assert!(cfg.apply_to(&mut w));
        assert_eq!(w.height(3, 3), 6);
        assert_eq!(w.loaded_chunk_count(), 1);

        cfg.generator = GeneratorKind::Empty;
        assert!(cfg.apply_to(&mut w));
        assert_eq!(w.generator().name(), "empty");
    }

    #[test]
    fn missing_file_reports_error() {
        let p = std::env::temp_dir().join("loam-definitely-missing.toml");
        assert!(load_config_from_path(&p).is_err());
    }
}
