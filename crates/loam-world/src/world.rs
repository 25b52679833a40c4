use std::sync::Arc;

use hashbrown::HashMap;
use loam_blocks::Voxel;
use loam_chunk::{CHUNK_SIZE, Chunk, ChunkPos, WorldPos};
use rayon::prelude::*;

use crate::deferred::{DeferredStats, DeferredWrites};
use crate::generation::{FeatureWrite, GeneratedChunk, GeneratorKind, TerrainGenerator, generate};
use crate::worldgen::WorldGenConfig;

pub const DEFAULT_SEED: u64 = 12345;

/// Resident chunk store plus the generator that fills new chunks.
///
/// Reads and writes never load chunks implicitly; callers stream content in
/// with [`VoxelWorld::load_chunk`] or publish pre-generated chunks with
/// [`VoxelWorld::insert_chunk`].
pub struct VoxelWorld {
    chunks: HashMap<ChunkPos, Chunk>,
    generator: Arc<dyn TerrainGenerator>,
    config: WorldGenConfig,
    revision: u64,
    deferred: DeferredWrites,
}

impl VoxelWorld {
    pub fn new(generator: Box<dyn TerrainGenerator>) -> Self {
        Self {
            chunks: HashMap::new(),
            generator: Arc::from(generator),
            config: WorldGenConfig::default(),
            revision: 0,
            deferred: DeferredWrites::new(),
        }
    }

    pub fn with_config(cfg: &WorldGenConfig) -> Self {
        Self::from_kind(GeneratorKind::Terrain3d, DEFAULT_SEED, cfg)
    }

    pub fn from_kind(kind: GeneratorKind, seed: u64, cfg: &WorldGenConfig) -> Self {
        let mut w = Self::new(kind.build(seed, cfg));
        w.config = cfg.clone();
        w
    }

    /// Reset to the default noise generator and seed, keeping the current config.
    pub fn initialize(&mut self) {
        self.replace_generator(GeneratorKind::Terrain3d.build(DEFAULT_SEED, &self.config));
        log::info!(target: "world", "initialized terrain3d generator (seed {})", DEFAULT_SEED);
    }

    /// Shared snapshot of the current generator, safe to hand to worker threads.
    #[inline]
    pub fn generator(&self) -> Arc<dyn TerrainGenerator> {
        Arc::clone(&self.generator)
    }

    /// Bumped whenever the generator is replaced, reseeded, or reconfigured.
    #[inline]
    pub fn generator_revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.generator.seed()
    }

    #[inline]
    pub fn worldgen_config(&self) -> &WorldGenConfig {
        &self.config
    }

    pub fn set_generator(&mut self, generator: Box<dyn TerrainGenerator>) {
        let name = generator.name();
        self.replace_generator(generator);
        log::info!(target: "world", "generator set to {} (rev {})", name, self.revision);
    }

    fn replace_generator(&mut self, generator: Box<dyn TerrainGenerator>) {
        self.generator = Arc::from(generator);
        self.revision += 1;
        // Spill recorded under the old generator no longer matches what it would emit.
        self.deferred.clear();
    }

    /// Affects chunks generated from now on; resident chunks are left as they are.
    pub fn set_seed(&mut self, seed: u64) {
        let mut g = self.generator.boxed_clone();
        g.set_seed(seed);
        self.replace_generator(g);
        log::info!(target: "world", "world reseeded to {} (rev {})", seed, self.revision);
    }

    /// Rebuild the generator from `cfg`, keeping its kind and seed.
    pub fn set_worldgen_config(&mut self, cfg: &WorldGenConfig) {
        self.config = cfg.clone();
        match GeneratorKind::from_name(self.generator.name()) {
            Some(kind) => {
                let g = kind.build(self.generator.seed(), cfg);
                self.replace_generator(g);
                log::info!(target: "world", "worldgen config applied to {} (rev {})", kind, self.revision);
            }
            None => log::warn!(
                target: "world",
                "generator '{}' is not built from worldgen config; keeping it",
                self.generator.name()
            ),
        }
    }

    #[inline]
    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    #[inline]
    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    #[inline]
    pub fn is_chunk_loaded(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    #[inline]
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Resident positions in a stable order.
    pub fn chunk_positions(&self) -> Vec<ChunkPos> {
        let mut v: Vec<ChunkPos> = self.chunks.keys().copied().collect();
        v.sort();
        v
    }

    /// Generate synchronously if absent. Loading a resident chunk is a no-op.
    pub fn load_chunk(&mut self, pos: ChunkPos) -> &Chunk {
        if !self.chunks.contains_key(&pos) {
            let generated = generate(self.generator.as_ref(), pos);
            self.insert_generated(generated);
            log::debug!(target: "world", "loaded chunk ({}, {})", pos.x, pos.z);
        }
        self.chunks.entry(pos).or_insert_with(|| Chunk::new(pos))
    }

    /// Publish a complete chunk. Refuses to replace a resident one.
    pub fn insert_chunk(&mut self, mut chunk: Chunk) -> bool {
        let pos = chunk.pos();
        if self.chunks.contains_key(&pos) {
            return false;
        }
        for w in self.deferred.for_chunk(pos) {
            w.apply(&mut chunk);
        }
        chunk.mark_dirty();
        self.chunks.insert(pos, chunk);
        true
    }

    /// Publish a chunk together with the feature writes it spilled onto neighbours.
    pub fn insert_generated(&mut self, generated: GeneratedChunk) -> bool {
        let GeneratedChunk { chunk, spill } = generated;
        let source = chunk.pos();
        if !self.insert_chunk(chunk) {
            return false;
        }
        self.record_spill(source, spill);
        true
    }

    fn record_spill(&mut self, source: ChunkPos, spill: Vec<FeatureWrite>) {
        for w in spill {
            if let Some(target) = self.chunks.get_mut(&w.pos.chunk()) {
                w.apply(target);
            }
            self.deferred.record(source, w);
        }
    }

    /// Also forgets deferred spill that no resident chunk can use any more.
    pub fn unload_chunk(&mut self, pos: ChunkPos) -> bool {
        if self.chunks.remove(&pos).is_none() {
            return false;
        }
        let chunks = &self.chunks;
        let pruned = self.deferred.prune(|p| chunks.contains_key(&p));
        log::debug!(
            target: "world",
            "unloaded chunk ({}, {}), pruned {} deferred entries",
            pos.x,
            pos.z,
            pruned
        );
        true
    }

    pub fn clear_all_chunks(&mut self) {
        let n = self.chunks.len();
        self.chunks.clear();
        self.deferred.clear();
        log::info!(target: "world", "cleared {} chunks", n);
    }

    /// `None` when the containing chunk is not resident. Heights outside the
    /// column read as air.
    pub fn get_voxel(&self, p: WorldPos) -> Option<Voxel> {
        let chunk = self.chunks.get(&p.chunk())?;
        if !p.y_in_range() {
            return Some(Voxel::AIR);
        }
        chunk.get_world(p)
    }

    /// False when the chunk is absent or y is out of range. Edits on a chunk
    /// border also dirty the resident neighbour sharing that face.
    pub fn set_voxel(&mut self, p: WorldPos, v: Voxel) -> bool {
        let Some((cpos, local)) = p.to_chunk_local() else {
            return false;
        };
        let Some(chunk) = self.chunks.get_mut(&cpos) else {
            return false;
        };
        if !chunk.set_local(local, v) {
            return false;
        }
        let edge = CHUNK_SIZE - 1;
        let mut neighbours = Vec::new();
        if local.x == 0 {
            neighbours.push(cpos.offset(-1, 0));
        }
        if local.x == edge {
            neighbours.push(cpos.offset(1, 0));
        }
        if local.z == 0 {
            neighbours.push(cpos.offset(0, -1));
        }
        if local.z == edge {
            neighbours.push(cpos.offset(0, 1));
        }
        for n in neighbours {
            if let Some(c) = self.chunks.get_mut(&n) {
                c.mark_dirty();
            }
        }
        true
    }

    /// Surface height the current generator reports for a column.
    #[inline]
    pub fn height(&self, x: i32, z: i32) -> i32 {
        self.generator.height(x, z)
    }

    /// Rebuild every resident chunk with the current generator. Generation runs
    /// on the rayon pool; publication stays on this thread.
    pub fn regenerate_loaded_chunks(&mut self) -> usize {
        let positions = self.chunk_positions();
        if positions.is_empty() {
            return 0;
        }
        let generator = self.generator();
        let start = std::time::Instant::now();
        let fresh: Vec<GeneratedChunk> = positions
            .par_iter()
            .map(|&pos| generate(generator.as_ref(), pos))
            .collect();
        self.deferred.clear();
        let mut spill = Vec::with_capacity(fresh.len());
        for g in fresh {
            let pos = g.chunk.pos();
            let mut chunk = g.chunk;
            chunk.mark_dirty();
            self.chunks.insert(pos, chunk);
            spill.push((pos, g.spill));
        }
        for (source, writes) in spill {
            self.record_spill(source, writes);
        }
        log::info!(
            target: "world",
            "regenerated {} chunks in {:?}",
            positions.len(),
            start.elapsed()
        );
        positions.len()
    }

    /// Drain chunks whose content changed since the last call.
    pub fn take_dirty_chunks(&mut self) -> Vec<ChunkPos> {
        let mut out = Vec::new();
        for (pos, chunk) in self.chunks.iter_mut() {
            if chunk.is_dirty() {
                chunk.clear_dirty();
                out.push(*pos);
            }
        }
        out.sort();
        out
    }

    pub fn deferred_stats(&self) -> DeferredStats {
        self.deferred.stats()
    }
}

impl Default for VoxelWorld {
    fn default() -> Self {
        Self::with_config(&WorldGenConfig::default())
    }
}

impl std::fmt::Debug for VoxelWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxelWorld")
            .field("generator", &self.generator.name())
            .field("seed", &self.generator.seed())
            .field("revision", &self.revision)
            .field("chunks", &self.chunks.len())
            .finish()
    }
}
