use hashbrown::{HashMap, HashSet};
use loam_chunk::{ChunkPos, WorldPos};

use crate::generation::FeatureWrite;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredStats {
    pub chunk_entries: usize,
    pub writes: usize,
}

/// Feature writes keyed by the chunk they land in.
///
/// Each target also remembers which chunks emitted into it. Entries outlive
/// the target chunk's residency while one of those sources stays resident, so
/// a chunk that is unloaded and streamed back in receives its neighbours'
/// canopies again. Once neither the target nor any source is resident the
/// entry is dropped; regenerating a source re-emits it. A later write to the
/// same voxel replaces the earlier one, which keeps re-emitted spill idempotent.
#[derive(Default, Debug, Clone)]
pub struct DeferredWrites {
    inner: HashMap<ChunkPos, Target>,
}

#[derive(Default, Debug, Clone)]
struct Target {
    writes: HashMap<WorldPos, FeatureWrite>,
    sources: HashSet<ChunkPos>,
}

impl DeferredWrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a write emitted while generating `source`.
    pub fn record(&mut self, source: ChunkPos, write: FeatureWrite) {
        let t = self.inner.entry(write.pos.chunk()).or_default();
        t.sources.insert(source);
        t.writes.insert(write.pos, write);
    }

    /// Writes targeting `pos`, sorted by position.
    pub fn for_chunk(&self, pos: ChunkPos) -> Vec<FeatureWrite> {
        let mut out: Vec<FeatureWrite> = self
            .inner
            .get(&pos)
            .map(|t| t.writes.values().copied().collect())
            .unwrap_or_default();
        out.sort_by_key(|w| (w.pos.y, w.pos.z, w.pos.x));
        out
    }

    pub fn has_chunk(&self, pos: ChunkPos) -> bool {
        self.inner.contains_key(&pos)
    }

    /// Drop every target that is not resident and has no resident source.
    /// Returns the number of targets removed.
    pub fn prune(&mut self, is_resident: impl Fn(ChunkPos) -> bool) -> usize {
        let before = self.inner.len();
        self.inner
            .retain(|pos, t| is_resident(*pos) || t.sources.iter().any(|s| is_resident(*s)));
        before - self.inner.len()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn stats(&self) -> DeferredStats {
        DeferredStats {
            chunk_entries: self.inner.len(),
            writes: self.inner.values().map(|t| t.writes.len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_blocks::{Voxel, VoxelType};

    fn leaf(x: i32, y: i32, z: i32) -> FeatureWrite {
        FeatureWrite {
            pos: WorldPos::new(x, y, z),
            voxel: Voxel::new(VoxelType::Leaves),
            replace: VoxelType::Air,
        }
    }

    #[test]
    fn writes_group_by_target_chunk_and_dedup() {
        let src = ChunkPos::new(0, 0);
        let mut d = DeferredWrites::new();
        d.record(src, leaf(-1, 40, 3));
        d.record(src, leaf(-1, 40, 3));
        d.record(src, leaf(-2, 41, 3));
        d.record(src, leaf(16, 40, 0));
        assert_eq!(
            d.stats(),
            DeferredStats {
                chunk_entries: 2,
                writes: 3
            }
        );
        let w = d.for_chunk(ChunkPos::new(-1, 0));
        assert_eq!(w.len(), 2);
        assert_eq!(w[0].pos.y, 40);
        assert!(d.for_chunk(ChunkPos::new(5, 5)).is_empty());
    }

    #[test]
    fn prune_keeps_targets_with_a_resident_source() {
        let mut d = DeferredWrites::new();
        d.record(ChunkPos::new(0, 0), leaf(-1, 40, 3));
        d.record(ChunkPos::new(2, 0), leaf(16, 40, 0));
        d.record(ChunkPos::new(0, 0), leaf(16, 41, 0));

        // (1, 0) still has the resident source (2, 0)
        assert_eq!(d.prune(|p| p == ChunkPos::new(2, 0)), 1);
        assert!(!d.has_chunk(ChunkPos::new(-1, 0)));
        assert_eq!(d.for_chunk(ChunkPos::new(1, 0)).len(), 2);

        // A resident target keeps its entry with no source around
        assert_eq!(d.prune(|p| p == ChunkPos::new(1, 0)), 0);
        assert_eq!(d.prune(|_| false), 1);
        assert_eq!(d.stats(), DeferredStats::default());
    }
}
