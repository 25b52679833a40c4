//! Chunk coordinates and dense voxel storage.
#![forbid(unsafe_code)]

mod coords;

pub use coords::{CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME, ChunkPos, LocalPos, WorldPos};
use loam_blocks::{Voxel, VoxelType};

/// One resident column of `16 x 256 x 16` voxels.
#[derive(Clone, Debug)]
pub struct Chunk {
    pos: ChunkPos,
    voxels: Vec<Voxel>,
    dirty: bool,
}

impl Chunk {
    /// All-air chunk.
    pub fn new(pos: ChunkPos) -> Self {
        Self {
            pos,
            voxels: vec![Voxel::AIR; CHUNK_VOLUME],
            dirty: false,
        }
    }

    /// Rebuild from stored voxels; short or long input is padded with air or truncated.
    pub fn from_voxels(pos: ChunkPos, voxels: Vec<Voxel>) -> Self {
        let mut v = voxels;
        if v.len() != CHUNK_VOLUME {
            v.resize(CHUNK_VOLUME, Voxel::AIR);
        }
        Self {
            pos,
            voxels: v,
            dirty: false,
        }
    }

    #[inline]
    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    #[inline]
    pub fn idx(x: usize, y: usize, z: usize) -> usize {
        x + CHUNK_SIZE * (z + CHUNK_SIZE * y)
    }

    /// Out-of-bounds reads are air.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Voxel {
        if !LocalPos::new(x, y, z).in_bounds() {
            return Voxel::AIR;
        }
        self.voxels[Self::idx(x, y, z)]
    }

    #[inline]
    pub fn get_local(&self, p: LocalPos) -> Voxel {
        self.get(p.x, p.y, p.z)
    }

    /// Writes and marks the chunk dirty. Returns false when out of bounds.
    pub fn set(&mut self, x: usize, y: usize, z: usize, v: Voxel) -> bool {
        if !LocalPos::new(x, y, z).in_bounds() {
            return false;
        }
        self.voxels[Self::idx(x, y, z)] = v;
        self.dirty = true;
        true
    }

    #[inline]
    pub fn set_local(&mut self, p: LocalPos, v: Voxel) -> bool {
        self.set(p.x, p.y, p.z, v)
    }

    #[inline]
    pub fn contains_world(&self, p: WorldPos) -> bool {
        p.y_in_range() && p.chunk() == self.pos
    }

    pub fn get_world(&self, p: WorldPos) -> Option<Voxel> {
        if !self.contains_world(p) {
            return None;
        }
        let (_, l) = p.to_chunk_local()?;
        Some(self.get_local(l))
    }

    pub fn set_world(&mut self, p: WorldPos, v: Voxel) -> bool {
        if !self.contains_world(p) {
            return false;
        }
        match p.to_chunk_local() {
            Some((_, l)) => self.set_local(l, v),
            None => false,
        }
    }

    /// Fill the inclusive y range `[y0, y1]` of one column.
    pub fn fill_column(&mut self, x: usize, z: usize, y0: usize, y1: usize, v: Voxel) {
        if x >= CHUNK_SIZE || z >= CHUNK_SIZE {
            return;
        }
        let top = y1.min(CHUNK_HEIGHT - 1);
        for y in y0..=top {
            self.voxels[Self::idx(x, y, z)] = v;
        }
        self.dirty = true;
    }

    pub fn fill(&mut self, v: Voxel) {
        self.voxels.fill(v);
        self.dirty = true;
    }

    #[inline]
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub fn into_voxels(self) -> Vec<Voxel> {
        self.voxels
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn has_non_air(&self) -> bool {
        self.voxels.iter().any(|v| !v.is_air())
    }

    pub fn count(&self, ty: VoxelType) -> usize {
        self.voxels.iter().filter(|v| v.ty == ty).count()
    }

    /// Highest y in the column whose voxel is not air.
    pub fn top_solid(&self, x: usize, z: usize) -> Option<usize> {
        if x >= CHUNK_SIZE || z >= CHUNK_SIZE {
            return None;
        }
        (0..CHUNK_HEIGHT).rev().find(|&y| !self.voxels[Self::idx(x, y, z)].is_air())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_marks_dirty_and_rejects_out_of_bounds() {
        let mut c = Chunk::new(ChunkPos::new(0, 0));
        assert!(!c.is_dirty());
        assert!(!c.set(16, 0, 0, Voxel::new(VoxelType::Stone)));
        assert!(!c.is_dirty());
        assert!(c.set(3, 200, 4, Voxel::new(VoxelType::Stone)));
        assert!(c.is_dirty());
        assert_eq!(c.get(3, 200, 4).ty, VoxelType::Stone);
        assert_eq!(c.get(3, 999, 4), Voxel::AIR);
        assert_eq!(c.top_solid(3, 4), Some(200));
    }

    #[test]
    fn world_access_respects_chunk_bounds() {
        let mut c = Chunk::new(ChunkPos::new(-1, 2));
        let inside = WorldPos::new(-1, 10, 32);
        assert!(c.set_world(inside, Voxel::new(VoxelType::Dirt)));
        assert_eq!(c.get_world(inside).map(|v| v.ty), Some(VoxelType::Dirt));
        assert_eq!(c.get(15, 10, 0).ty, VoxelType::Dirt);
        assert!(c.get_world(WorldPos::new(0, 10, 32)).is_none());
        assert!(!c.set_world(WorldPos::new(-1, 256, 32), Voxel::AIR));
    }
}
