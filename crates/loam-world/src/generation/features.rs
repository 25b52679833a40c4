use loam_blocks::{Voxel, VoxelType};
use loam_chunk::{CHUNK_HEIGHT, CHUNK_SIZE, Chunk, WorldPos};

use super::{FeatureWrite, VoxelSink};
use crate::worldgen::{OreRule, Trees};

const TREE_SALT: u32 = 0x000A_53F9;
const TRUNK_SALT: u32 = 0x0051_F0A7;
const ORE_SALT: u32 = 0x00C0_A1ED;

pub fn hash2(ix: i32, iz: i32, seed: u32) -> u32 {
    let mut h = (ix as u32).wrapping_mul(0x85eb_ca6b)
        ^ (iz as u32).wrapping_mul(0xc2b2_ae35)
        ^ seed.wrapping_mul(0x27d4_eb2d);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

/// Uniform draw in `[0, 1)` keyed by world column and salt.
pub fn rand01(seed: u64, ix: i32, iz: i32, salt: u32) -> f32 {
    let h = hash2(ix, iz, (fold(seed) ^ salt).wrapping_add(0x9E37_79B9));
    ((h & 0x00FF_FFFF) as f32) / 16_777_216.0
}

#[inline]
fn fold(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

fn emit(chunk: &mut Chunk, sink: &mut dyn VoxelSink, write: FeatureWrite) {
    if chunk.contains_world(write.pos) {
        write.apply(chunk);
    } else if write.pos.y_in_range() {
        sink.defer(write);
    }
}

pub(super) fn place_trees(chunk: &mut Chunk, seed: u64, params: &Trees, sink: &mut dyn VoxelSink) {
    let origin = chunk.pos().origin();
    let span = (params.trunk_max - params.trunk_min).max(0) as u32;
    // Roots are chosen against the untouched surface so earlier trees cannot hide later ones.
    let mut roots = Vec::new();
    for lz in 0..CHUNK_SIZE {
        for lx in 0..CHUNK_SIZE {
            let Some(surf) = chunk.top_solid(lx, lz) else {
                continue;
            };
            if chunk.get(lx, surf, lz).ty != VoxelType::Grass {
                continue;
            }
            let wx = origin.x + lx as i32;
            let wz = origin.z + lz as i32;
            if rand01(seed, wx, wz, TREE_SALT) >= params.density {
                continue;
            }
            let th = params.trunk_min.max(1)
                + (hash2(wx, wz, fold(seed) ^ TRUNK_SALT) % (span + 1)) as i32;
            let surf = surf as i32;
            if surf <= 2 || surf + th + 2 >= CHUNK_HEIGHT as i32 {
                continue;
            }
            roots.push((WorldPos::new(wx, surf, wz), th));
        }
    }
    let pos = chunk.pos();
    log::trace!(target: "worldgen", "chunk ({}, {}): {} trees", pos.x, pos.z, roots.len());
    for (root, th) in roots {
        grow_tree(chunk, sink, root, th, params.leaf_radius.max(1));
    }
}

fn grow_tree(chunk: &mut Chunk, sink: &mut dyn VoxelSink, root: WorldPos, th: i32, leaf_r: i32) {
    let wood = Voxel::new(VoxelType::Wood);
    let leaves = Voxel::new(VoxelType::Leaves);
    for dy in 1..=th {
        emit(
            chunk,
            sink,
            FeatureWrite {
                pos: root.offset(0, dy, 0),
                voxel: wood,
                replace: VoxelType::Air,
            },
        );
    }
    let top = root.offset(0, th, 0);
    for dy in -2..=1 {
        let r = if dy >= 1 { leaf_r - 1 } else { leaf_r };
        for dz in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dz == 0 && dy <= 0 {
                    continue;
                }
                if r > 0 && dx.abs() == r && dz.abs() == r {
                    continue;
                }
                emit(
                    chunk,
                    sink,
                    FeatureWrite {
                        pos: top.offset(dx, dy, dz),
                        voxel: leaves,
                        replace: VoxelType::Air,
                    },
                );
            }
        }
    }
}

/// Random-walk pockets clipped to the chunk. Only stone is replaced.
pub(super) fn place_ores(chunk: &mut Chunk, seed: u64, rules: &[OreRule]) {
    let origin = chunk.pos().origin();
    let top = CHUNK_HEIGHT as i32 - 1;
    for rule in rules {
        let min_y = rule.min_y.clamp(0, top);
        let max_y = rule.max_y.clamp(min_y, top);
        let y_span = (max_y - min_y + 1) as u32;
        for attempt in 0..rule.attempts {
            let salt = fold(seed) ^ ORE_SALT ^ (u32::from(rule.block.id()) << 24) ^ attempt;
            let h = hash2(origin.x, origin.z, salt);
            let mut x = (h % CHUNK_SIZE as u32) as i32;
            let mut z = ((h >> 4) % CHUNK_SIZE as u32) as i32;
            let mut y = min_y + ((h >> 8) % y_span) as i32;
            for step in 0..rule.size {
                if x < 0 || z < 0 || x >= CHUNK_SIZE as i32 || z >= CHUNK_SIZE as i32 || y < 1 || y > top {
                    break;
                }
                let (lx, ly, lz) = (x as usize, y as usize, z as usize);
                if chunk.get(lx, ly, lz).ty == VoxelType::Stone {
                    chunk.set(lx, ly, lz, Voxel::new(rule.block));
                }
                match hash2(origin.x + x, origin.z + z, salt.wrapping_add(step + y as u32)) % 6 {
                    0 => x += 1,
                    1 => x -= 1,
                    2 => y += 1,
                    3 => y -= 1,
                    4 => z += 1,
                    _ => z -= 1,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_chunk::ChunkPos;

    #[test]
    fn rand01_is_in_unit_interval_and_deterministic() {
        for i in -50..50 {
            let r = rand01(12345, i * 7, -i * 13, TREE_SALT);
            assert!((0.0..1.0).contains(&r));
            assert_eq!(r, rand01(12345, i * 7, -i * 13, TREE_SALT));
        }
    }

    #[test]
    fn ores_only_replace_stone() {
        let mut c = Chunk::new(ChunkPos::new(2, -3));
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                c.fill_column(lx, lz, 0, 20, Voxel::new(VoxelType::Stone));
                c.fill_column(lx, lz, 21, 40, Voxel::new(VoxelType::Dirt));
            }
        }
        let rule = OreRule {
            block: VoxelType::CoalOre,
            attempts: 64,
            min_y: 1,
            max_y: 40,
            size: 12,
        };
        place_ores(&mut c, 9, std::slice::from_ref(&rule));
        assert!(c.count(VoxelType::CoalOre) > 0);
        assert_eq!(c.count(VoxelType::Dirt), CHUNK_SIZE * CHUNK_SIZE * 20);
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                for y in 41..CHUNK_HEIGHT {
                    assert!(c.get(lx, y, lz).is_air());
                }
            }
        }
    }

    #[test]
    fn tree_at_chunk_edge_spills_into_sink() {
        let mut c = Chunk::new(ChunkPos::new(0, 0));
        c.fill_column(15, 8, 0, 30, Voxel::new(VoxelType::Grass));
        let mut spill: Vec<FeatureWrite> = Vec::new();
        grow_tree(&mut c, &mut spill, WorldPos::new(15, 30, 8), 5, 2);
        assert_eq!(c.get(15, 35, 8).ty, VoxelType::Wood);
        assert!(!spill.is_empty());
        assert!(spill.iter().all(|w| w.pos.x >= 16 && w.voxel.ty == VoxelType::Leaves));
        assert!(spill.iter().all(|w| w.replace == VoxelType::Air));
    }
}
