use loam_blocks::{Voxel, VoxelType};
use loam_chunk::{CHUNK_HEIGHT, CHUNK_SIZE, Chunk};

use super::TerrainGenerator;

/// Bedrock floor, stone fill and a grass top at `thickness`.
#[derive(Clone, Debug)]
pub struct FlatTerrain {
    seed: u64,
    thickness: i32,
}

impl FlatTerrain {
    pub fn new(seed: u64, thickness: i32) -> Self {
        Self {
            seed,
            thickness: thickness.clamp(0, CHUNK_HEIGHT as i32 - 1),
        }
    }
}

impl TerrainGenerator for FlatTerrain {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    fn generate_chunk(&self, chunk: &mut Chunk) {
        let top = self.thickness as usize;
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                if top > 1 {
                    chunk.fill_column(lx, lz, 1, top - 1, Voxel::new(VoxelType::Stone));
                }
                chunk.set(lx, 0, lz, Voxel::new(VoxelType::Bedrock));
                if top > 0 {
                    chunk.set(lx, top, lz, Voxel::new(VoxelType::Grass));
                }
            }
        }
        chunk.mark_dirty();
    }

    fn height(&self, _x: i32, _z: i32) -> i32 {
        self.thickness
    }

    fn boxed_clone(&self) -> Box<dyn TerrainGenerator> {
        Box::new(self.clone())
    }
}

/// Generates nothing; useful for editing sandboxes and tests.
#[derive(Clone, Debug)]
pub struct EmptyTerrain {
    seed: u64,
}

impl EmptyTerrain {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl TerrainGenerator for EmptyTerrain {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    fn generate_chunk(&self, chunk: &mut Chunk) {
        chunk.mark_dirty();
    }

    fn height(&self, _x: i32, _z: i32) -> i32 {
        -1
    }

    fn boxed_clone(&self) -> Box<dyn TerrainGenerator> {
        Box::new(self.clone())
    }
}
