use std::hash::Hash;

use hashbrown::{HashMap, HashSet};
use loam_geom::{Aabb, IVec3, Vec3};

/// Bodies covering more cells than this skip the grid and are tested against
/// every other body instead.
pub const MAX_BODY_CELLS: u64 = 4096;

/// A body tracked by the broad phase. `key` refers back to the owning entity.
///
/// Two static bodies are never reported as a pair. A pair involving a trigger
/// is reported with [`CollisionPair::trigger`] set so callers can skip the
/// physical response.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionBody<K> {
    pub key: K,
    pub aabb: Aabb,
    pub velocity: Vec3,
    pub is_static: bool,
    pub is_trigger: bool,
}

impl<K> CollisionBody<K> {
    pub fn new(key: K, aabb: Aabb) -> Self {
        Self {
            key,
            aabb,
            velocity: Vec3::ZERO,
            is_static: false,
            is_trigger: false,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn static_body(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

/// Overlapping pair; `a` was inserted before `b` and `normal` points from `b` towards `a`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionPair<K> {
    pub a: K,
    pub b: K,
    pub normal: Vec3,
    pub depth: f32,
    /// Velocity of `a` relative to `b`.
    pub relative_velocity: Vec3,
    /// Either body is a trigger.
    pub trigger: bool,
}

impl<K> CollisionPair<K> {
    /// The bodies are already moving apart along the contact normal.
    #[inline]
    pub fn is_separating(&self) -> bool {
        self.relative_velocity.dot(self.normal) > 0.0
    }
}

#[derive(Debug)]
struct Bucket {
    cell: IVec3,
    members: Vec<usize>,
}

#[derive(Debug)]
struct Slot<K> {
    body: CollisionBody<K>,
    seq: u64,
    cells: Vec<IVec3>,
}

/// Uniform grid broad phase over hashed cell coordinates.
///
/// Cells hash with the usual three-prime xor. Each hash bucket keeps the real
/// cell coordinate, so two cells sharing a hash never share members.
#[derive(Debug)]
pub struct SpatialHash<K> {
    cell_size: f32,
    slots: Vec<Option<Slot<K>>>,
    free: Vec<usize>,
    index: HashMap<K, usize>,
    buckets: HashMap<i32, Vec<Bucket>>,
    oversized: Vec<usize>,
    next_seq: u64,
}

#[inline]
fn cell_hash(c: IVec3) -> i32 {
    c.x.wrapping_mul(73_856_093) ^ c.y.wrapping_mul(19_349_663) ^ c.z.wrapping_mul(83_492_791)
}

impl<K: Copy + Eq + Hash> SpatialHash<K> {
    /// Non-positive or non-finite sizes fall back to 1.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            buckets: HashMap::new(),
            oversized: Vec::new(),
            next_seq: 0,
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.buckets.clear();
        self.oversized.clear();
    }

    #[inline]
    fn cell_of(&self, p: Vec3) -> IVec3 {
        IVec3::floor_of(p / self.cell_size)
    }

    /// Cells overlapped by `aabb`, or `None` when there are more than
    /// [`MAX_BODY_CELLS`]. Non-finite boxes cover nothing.
    fn cells_covering(&self, aabb: &Aabb) -> Option<Vec<IVec3>> {
        if !aabb.min.is_finite() || !aabb.max.is_finite() {
            return Some(Vec::new());
        }
        let lo = self.cell_of(aabb.min);
        let hi = self.cell_of(aabb.max);
        let span = |a: i32, b: i32| (i64::from(b) - i64::from(a) + 1).max(0) as u64;
        let count = span(lo.x, hi.x)
            .saturating_mul(span(lo.y, hi.y))
            .saturating_mul(span(lo.z, hi.z));
        if count > MAX_BODY_CELLS {
            return None;
        }
        let mut out = Vec::with_capacity(count as usize);
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    out.push(IVec3::new(x, y, z));
                }
            }
        }
        Some(out)
    }

    fn bucket(&self, cell: IVec3) -> Option<&Bucket> {
        self.buckets
            .get(&cell_hash(cell))?
            .iter()
            .find(|b| b.cell == cell)
    }

    fn link(&mut self, slot_idx: usize, cells: &[IVec3]) {
        for &cell in cells {
            let chain = self.buckets.entry(cell_hash(cell)).or_default();
            match chain.iter_mut().find(|b| b.cell == cell) {
                Some(b) => b.members.push(slot_idx),
                None => chain.push(Bucket {
                    cell,
                    members: vec![slot_idx],
                }),
            }
        }
    }

    /// Insert or replace the body stored under `body.key`. Returns true if the key is new.
    pub fn insert(&mut self, body: CollisionBody<K>) -> bool {
        let replaced = self.remove(body.key).is_some();
        let slot_idx = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };
        let cells = match self.cells_covering(&body.aabb) {
            Some(cells) => {
                self.link(slot_idx, &cells);
                cells
            }
            None => {
                log::debug!(target: "physics", "body spans more than {} cells; kept off the grid", MAX_BODY_CELLS);
                self.oversized.push(slot_idx);
                Vec::new()
            }
        };
        self.index.insert(body.key, slot_idx);
        self.slots[slot_idx] = Some(Slot {
            body,
            seq: self.next_seq,
            cells,
        });
        self.next_seq += 1;
        !replaced
    }

    /// Remove a body by key, returning it.
    pub fn remove(&mut self, key: K) -> Option<CollisionBody<K>> {
        let slot_idx = self.index.remove(&key)?;
        let slot = self.slots.get_mut(slot_idx)?.take()?;
        self.oversized.retain(|&i| i != slot_idx);
        for cell in &slot.cells {
            let h = cell_hash(*cell);
            let Some(chain) = self.buckets.get_mut(&h) else {
                continue;
            };
            if let Some(b) = chain.iter_mut().find(|b| b.cell == *cell) {
                b.members.retain(|&m| m != slot_idx);
            }
            chain.retain(|b| !b.members.is_empty());
            if chain.is_empty() {
                self.buckets.remove(&h);
            }
        }
        self.free.push(slot_idx);
        Some(slot.body)
    }

    pub fn get(&self, key: K) -> Option<&CollisionBody<K>> {
        let idx = *self.index.get(&key)?;
        self.slots.get(idx)?.as_ref().map(|s| &s.body)
    }

    #[inline]
    fn seq_of(&self, idx: usize) -> u64 {
        self.slots[idx].as_ref().map_or(u64::MAX, |s| s.seq)
    }

    #[inline]
    fn overlaps(&self, idx: usize, aabb: &Aabb) -> bool {
        self.slots[idx]
            .as_ref()
            .is_some_and(|s| s.body.aabb.intersects(aabb))
    }

    /// Candidate bodies sharing a cell with `aabb`, each once, in insertion order.
    /// Grid candidates are not tested for actual overlap; bodies kept off the
    /// grid, and every body when `aabb` itself is too large to walk, are.
    pub fn query(&self, aabb: &Aabb) -> Vec<&CollisionBody<K>> {
        let mut seen = HashSet::new();
        let mut hits: Vec<usize> = Vec::new();
        match self.cells_covering(aabb) {
            Some(cells) => {
                for cell in cells {
                    if let Some(b) = self.bucket(cell) {
                        for &m in &b.members {
                            if seen.insert(m) {
                                hits.push(m);
                            }
                        }
                    }
                }
            }
            None => {
                for idx in 0..self.slots.len() {
                    if self.overlaps(idx, aabb) && seen.insert(idx) {
                        hits.push(idx);
                    }
                }
            }
        }
        for &idx in &self.oversized {
            if self.overlaps(idx, aabb) && seen.insert(idx) {
                hits.push(idx);
            }
        }
        hits.sort_by_key(|&i| self.seq_of(i));
        hits.into_iter()
            .filter_map(|i| self.slots[i].as_ref().map(|s| &s.body))
            .collect()
    }

    /// Overlapping pairs among bodies sharing a cell, plus pairs with a body
    /// kept off the grid. A pair spanning several shared cells is reported
    /// once; pairs of two static bodies are skipped. Output is ordered by
    /// insertion of `a`, then `b`.
    pub fn find_collisions(&self) -> Vec<CollisionPair<K>> {
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut found: Vec<(u64, u64, CollisionPair<K>)> = Vec::new();
        let mut test = |x: usize, y: usize| {
            let (ia, ib) = if self.seq_of(x) > self.seq_of(y) { (y, x) } else { (x, y) };
            if ia == ib || !seen.insert((ia, ib)) {
                return;
            }
            let (Some(sa), Some(sb)) = (self.slots[ia].as_ref(), self.slots[ib].as_ref()) else {
                return;
            };
            let (a, b) = (&sa.body, &sb.body);
            if a.is_static && b.is_static {
                return;
            }
            if let Some(p) = Aabb::penetration(&a.aabb, &b.aabb) {
                found.push((
                    sa.seq,
                    sb.seq,
                    CollisionPair {
                        a: a.key,
                        b: b.key,
                        normal: p.normal,
                        depth: p.depth,
                        relative_velocity: a.velocity - b.velocity,
                        trigger: a.is_trigger || b.is_trigger,
                    },
                ));
            }
        };
        for bucket in self.buckets.values().flatten() {
            let m = &bucket.members;
            for i in 0..m.len() {
                for j in (i + 1)..m.len() {
                    test(m[i], m[j]);
                }
            }
        }
        for &big in &self.oversized {
            for other in 0..self.slots.len() {
                test(big, other);
            }
        }
        found.sort_by_key(|&(a, b, _)| (a, b));
        log::trace!(target: "physics", "broad phase: {} bodies, {} pairs", self.len(), found.len());
        found.into_iter().map(|(_, _, p)| p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colliding_hashes_keep_cells_apart() {
        let a = IVec3::new(1, 0, 0);
        let b = IVec3::new(0, 238_370_179, 0);
        assert_eq!(cell_hash(a), cell_hash(b));
        let mut h: SpatialHash<u32> = SpatialHash::new(1.0);
        h.link(0, &[a]);
        h.link(1, &[b]);
        assert_eq!(h.cell_count(), 2);
        assert_eq!(h.bucket(a).map(|x| x.members.clone()), Some(vec![0]));
        assert_eq!(h.bucket(b).map(|x| x.members.clone()), Some(vec![1]));
        assert!(h.bucket(IVec3::new(0, 0, 0)).is_none());
    }

    #[test]
    fn invalid_cell_size_falls_back() {
        let h: SpatialHash<u8> = SpatialHash::new(0.0);
        assert_eq!(h.cell_size(), 1.0);
        let h: SpatialHash<u8> = SpatialHash::new(f32::NAN);
        assert_eq!(h.cell_size(), 1.0);
    }
}
