use loam_blocks::{Voxel, VoxelType};
use loam_chunk::{CHUNK_HEIGHT, CHUNK_SIZE, Chunk};

use super::features::{place_ores, place_trees};
use super::surface::{is_deep, select_surface_voxel};
use super::{TerrainGenerator, VoxelSink};
use crate::noise::NoiseGenerator;
use crate::worldgen::WorldGenConfig;

/// Heightmap terrain from 2D fBm with optional 3D cave carving.
#[derive(Clone, Debug)]
pub struct NoiseTerrain {
    noise: NoiseGenerator,
    params: WorldGenConfig,
}

impl NoiseTerrain {
    pub fn new(seed: u64, params: WorldGenConfig) -> Self {
        Self {
            noise: NoiseGenerator::new(seed),
            params,
        }
    }

    #[inline]
    pub fn params(&self) -> &WorldGenConfig {
        &self.params
    }

    pub fn noise(&self) -> &NoiseGenerator {
        &self.noise
    }

    fn is_cave(&self, x: i32, y: i32, z: i32) -> bool {
        let c = &self.params.caves;
        if !c.enable {
            return false;
        }
        let f = c.frequency;
        self.noise.perlin_3d(x as f32 * f, y as f32 * f, z as f32 * f) > c.threshold
    }

    fn fill_base(&self, chunk: &mut Chunk) {
        let origin = chunk.pos().origin();
        let surface = &self.params.surface;
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let wx = origin.x + lx as i32;
                let wz = origin.z + lz as i32;
                let h = self.height(wx, wz);
                for y in 0..=h {
                    let mut ty = select_surface_voxel(surface, y, h);
                    if ty == VoxelType::Stone && is_deep(surface, y, h) && self.is_cave(wx, y, wz) {
                        ty = VoxelType::Air;
                    }
                    if ty != VoxelType::Air {
                        chunk.set(lx, y as usize, lz, Voxel::new(ty));
                    }
                }
            }
        }
    }
}

impl TerrainGenerator for NoiseTerrain {
    fn name(&self) -> &'static str {
        "terrain3d"
    }

    fn seed(&self) -> u64 {
        self.noise.seed()
    }

    fn set_seed(&mut self, seed: u64) {
        self.noise.set_seed(seed);
    }

    fn generate_chunk(&self, chunk: &mut Chunk) {
        self.fill_base(chunk);
        chunk.mark_dirty();
    }

    fn generate_chunk_with_assets(&self, chunk: &mut Chunk, sink: &mut dyn VoxelSink) {
        self.fill_base(chunk);
        let seed = self.seed();
        if self.params.ores.enable {
            place_ores(chunk, seed, &self.params.ores.rules);
        }
        if self.params.trees.enable {
            place_trees(chunk, seed, &self.params.trees, sink);
        }
        chunk.mark_dirty();
    }

    fn height(&self, x: i32, z: i32) -> i32 {
        let h = &self.params.height;
        let n = self.noise.fractal_2d(
            x as f32 * h.frequency,
            z as f32 * h.frequency,
            h.octaves,
            h.persistence,
            h.lacunarity,
        );
        (h.base + ((n + 1.0) * h.amplitude) as i32).clamp(0, CHUNK_HEIGHT as i32 - 1)
    }

    fn boxed_clone(&self) -> Box<dyn TerrainGenerator> {
        Box::new(self.clone())
    }
}
