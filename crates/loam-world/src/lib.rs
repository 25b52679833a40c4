//! Procedural terrain and the resident chunk store.
#![forbid(unsafe_code)]

mod deferred;
pub mod generation;
pub mod noise;
mod world;
pub mod worldgen;

pub use deferred::{DeferredStats, DeferredWrites};
pub use generation::{
    EmptyTerrain, FeatureWrite, FlatTerrain, GeneratedChunk, GeneratorKind, NoiseTerrain,
    NullSink, TerrainGenerator, VoxelSink, generate,
};
pub use noise::NoiseGenerator;
pub use world::{DEFAULT_SEED, VoxelWorld};
pub use worldgen::WorldGenConfig;
