use loam_blocks::VoxelType;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub caves: Caves,
    #[serde(default)]
    pub trees: Trees,
    #[serde(default)]
    pub ores: Ores,
    #[serde(default)]
    pub flat: Flat,
}

/// Column height: `base + (fbm(x·f, z·f) + 1) · amplitude`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Height {
    #[serde(default = "default_height_freq")]
    pub frequency: f32,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
    #[serde(default = "default_base")]
    pub base: i32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
}
fn default_height_freq() -> f32 {
    0.01
}
fn default_octaves() -> u32 {
    4
}
fn default_persistence() -> f32 {
    0.5
}
fn default_lacunarity() -> f32 {
    2.0
}
fn default_base() -> i32 {
    40
}
fn default_amplitude() -> f32 {
    20.0
}
impl Default for Height {
    fn default() -> Self {
        Self {
            frequency: default_height_freq(),
            octaves: default_octaves(),
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
            base: default_base(),
            amplitude: default_amplitude(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Surface voxel is grass strictly above this height.
    #[serde(default = "default_grass_above")]
    pub grass_above: i32,
    /// Sand strictly above this height (and topsoil is dirt); stone otherwise.
    #[serde(default = "default_sand_above")]
    pub sand_above: i32,
    #[serde(default = "default_topsoil")]
    pub topsoil_thickness: i32,
}
fn default_grass_above() -> i32 {
    62
}
fn default_sand_above() -> i32 {
    58
}
fn default_topsoil() -> i32 {
    3
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            grass_above: default_grass_above(),
            sand_above: default_sand_above(),
            topsoil_thickness: default_topsoil(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Caves {
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default = "default_cave_freq")]
    pub frequency: f32,
    #[serde(default = "default_cave_threshold")]
    pub threshold: f32,
}
fn default_true() -> bool {
    true
}
fn default_cave_freq() -> f32 {
    0.05
}
fn default_cave_threshold() -> f32 {
    0.5
}
impl Default for Caves {
    fn default() -> Self {
        Self {
            enable: true,
            frequency: default_cave_freq(),
            threshold: default_cave_threshold(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trees {
    #[serde(default = "default_true")]
    pub enable: bool,
    /// Chance per grass column of rooting a tree.
    #[serde(default = "default_tree_density")]
    pub density: f32,
    #[serde(default = "default_trunk_min")]
    pub trunk_min: i32,
    #[serde(default = "default_trunk_max")]
    pub trunk_max: i32,
    #[serde(default = "default_leaf_radius")]
    pub leaf_radius: i32,
}
fn default_tree_density() -> f32 {
    0.02
}
fn default_trunk_min() -> i32 {
    4
}
fn default_trunk_max() -> i32 {
    6
}
fn default_leaf_radius() -> i32 {
    2
}
impl Default for Trees {
    fn default() -> Self {
        Self {
            enable: true,
            density: default_tree_density(),
            trunk_min: default_trunk_min(),
            trunk_max: default_trunk_max(),
            leaf_radius: default_leaf_radius(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ores {
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default = "default_ore_rules")]
    pub rules: Vec<OreRule>,
}

/// Random-walk pockets of `block` replacing stone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OreRule {
    pub block: VoxelType,
    /// Pockets attempted per chunk.
    pub attempts: u32,
    #[serde(default)]
    pub min_y: i32,
    pub max_y: i32,
    /// Voxels visited by each pocket's walk.
    pub size: u32,
}
fn default_ore_rules() -> Vec<OreRule> {
    vec![
        OreRule {
            block: VoxelType::CoalOre,
            attempts: 12,
            min_y: 5,
            max_y: 96,
            size: 8,
        },
        OreRule {
            block: VoxelType::IronOre,
            attempts: 6,
            min_y: 2,
            max_y: 48,
            size: 5,
        },
    ]
}
impl Default for Ores {
    fn default() -> Self {
        Self {
            enable: true,
            rules: default_ore_rules(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flat {
    /// Grass layer height; bedrock at 0 and stone in between.
    #[serde(default = "default_flat_thickness")]
    pub thickness: i32,
}
fn default_flat_thickness() -> i32 {
    4
}
impl Default for Flat {
    fn default() -> Self {
        Self {
            thickness: default_flat_thickness(),
        }
    }
}

impl WorldGenConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: WorldGenConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String, Box<dyn Error>> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn load_params_from_path(path: &Path) -> Result<WorldGenConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg = WorldGenConfig::from_toml_str(&s)?;
    log::debug!(target: "worldgen", "loaded worldgen params from {}", path.display());
    Ok(cfg)
}
