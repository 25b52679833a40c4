use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::HashSet;
use loam_chunk::ChunkPos;

/// Lifecycle of a streamed chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestState {
    Queued,
    Generating,
    Resident,
    Cancelled,
}

/// Pending load; lower `priority` (ring radius) is served first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub pos: ChunkPos,
    pub priority: i32,
}

impl Ord for LoadRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest (priority, x, z) first
        (other.priority, other.pos.x, other.pos.z).cmp(&(self.priority, self.pos.x, self.pos.z))
    }
}

impl PartialOrd for LoadRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue and its membership set. Both change together under one lock.
#[derive(Default, Debug)]
pub(crate) struct LoadQueue {
    heap: BinaryHeap<LoadRequest>,
    pending: HashSet<ChunkPos>,
}

impl LoadQueue {
    /// False when the position is already queued.
    pub(crate) fn push(&mut self, req: LoadRequest) -> bool {
        if !self.pending.insert(req.pos) {
            return false;
        }
        self.heap.push(req);
        true
    }

    pub(crate) fn pop(&mut self) -> Option<LoadRequest> {
        let req = self.heap.pop()?;
        self.pending.remove(&req.pos);
        Some(req)
    }

    #[inline]
    pub(crate) fn contains(&self, pos: ChunkPos) -> bool {
        self.pending.contains(&pos)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Drop every request rejected by `keep`, returning the dropped positions.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&LoadRequest) -> bool) -> Vec<ChunkPos> {
        let mut dropped = Vec::new();
        let pending = &mut self.pending;
        self.heap.retain(|r| {
            if keep(r) {
                true
            } else {
                pending.remove(&r.pos);
                dropped.push(r.pos);
                false
            }
        });
        dropped
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
        self.pending.clear();
    }
}
