//! Terrain generators and the factory that selects one by name.

mod features;
mod flat;
mod surface;
mod terrain;

use loam_blocks::{Voxel, VoxelType};
use loam_chunk::{Chunk, ChunkPos, WorldPos};
use serde::{Deserialize, Serialize};

use crate::worldgen::WorldGenConfig;

pub use self::features::{hash2, rand01};
pub use self::flat::{EmptyTerrain, FlatTerrain};
pub use self::terrain::NoiseTerrain;

/// A feature voxel that may only overwrite `replace`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureWrite {
    pub pos: WorldPos,
    pub voxel: Voxel,
    pub replace: VoxelType,
}

impl FeatureWrite {
    /// Apply to `chunk` if the target lies inside it and holds the replaceable type.
    pub fn apply(&self, chunk: &mut Chunk) -> bool {
        match chunk.get_world(self.pos) {
            Some(cur) if cur.ty == self.replace => chunk.set_world(self.pos, self.voxel),
            _ => false,
        }
    }
}

/// Receives feature writes that fall outside the chunk being generated.
pub trait VoxelSink {
    fn defer(&mut self, write: FeatureWrite);
}

impl VoxelSink for Vec<FeatureWrite> {
    fn defer(&mut self, write: FeatureWrite) {
        self.push(write);
    }
}

/// Drops everything.
pub struct NullSink;

impl VoxelSink for NullSink {
    fn defer(&mut self, _write: FeatureWrite) {}
}

pub trait TerrainGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    fn seed(&self) -> u64;

    fn set_seed(&mut self, seed: u64);

    /// Base terrain only.
    fn generate_chunk(&self, chunk: &mut Chunk);

    /// Base terrain plus ores and trees. Writes that leave the chunk go to `sink`.
    fn generate_chunk_with_assets(&self, chunk: &mut Chunk, sink: &mut dyn VoxelSink) {
        let _ = sink;
        self.generate_chunk(chunk);
    }

    /// Surface y of the column at world `(x, z)`; -1 when the column is empty.
    fn height(&self, x: i32, z: i32) -> i32;

    fn boxed_clone(&self) -> Box<dyn TerrainGenerator>;
}

impl Clone for Box<dyn TerrainGenerator> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Finished chunk plus the feature writes it pushed onto its neighbours.
#[derive(Clone, Debug)]
pub struct GeneratedChunk {
    pub chunk: Chunk,
    pub spill: Vec<FeatureWrite>,
}

pub fn generate(generator: &dyn TerrainGenerator, pos: ChunkPos) -> GeneratedChunk {
    let mut chunk = Chunk::new(pos);
    let mut spill = Vec::new();
    generator.generate_chunk_with_assets(&mut chunk, &mut spill);
    GeneratedChunk { chunk, spill }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorKind {
    #[default]
    #[serde(rename = "terrain3d")]
    Terrain3d,
    #[serde(rename = "flat")]
    Flat,
    #[serde(rename = "empty")]
    Empty,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 3] = [
        GeneratorKind::Terrain3d,
        GeneratorKind::Flat,
        GeneratorKind::Empty,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::Terrain3d => "terrain3d",
            GeneratorKind::Flat => "flat",
            GeneratorKind::Empty => "empty",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }

    pub fn build(self, seed: u64, cfg: &WorldGenConfig) -> Box<dyn TerrainGenerator> {
        match self {
            GeneratorKind::Terrain3d => Box::new(NoiseTerrain::new(seed, cfg.clone())),
            GeneratorKind::Flat => Box::new(FlatTerrain::new(seed, cfg.flat.thickness)),
            GeneratorKind::Empty => Box::new(EmptyTerrain::new(seed)),
        }
    }
}

impl std::fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for GeneratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            format!(
                "unknown generator '{}' (expected one of: {})",
                s,
                Self::names().join(", ")
            )
        })
    }
}
