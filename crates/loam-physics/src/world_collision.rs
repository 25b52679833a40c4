use loam_chunk::{CHUNK_HEIGHT, CHUNK_SIZE, ChunkPos, WorldPos};
use loam_geom::{Aabb, Axis, Sphere, Vec3};
use loam_world::VoxelWorld;

use crate::blocks_at;

const SIZE: i32 = CHUNK_SIZE as i32;

/// Integer cells covered by `[lo, hi)` along one axis.
#[inline]
fn cell_span(lo: f32, hi: f32) -> (i32, i32) {
    (lo.floor() as i32, (hi.ceil() as i32).saturating_sub(1))
}

/// Whether `hit` holds for any cell of the inclusive spans that lies in a
/// resident chunk. Only resident chunks are walked, so the work is bounded by
/// the resident set however large the spans are.
fn any_resident_cell(
    world: &VoxelWorld,
    (x0, x1): (i32, i32),
    (y0, y1): (i32, i32),
    (z0, z1): (i32, i32),
    mut hit: impl FnMut(i32, i32, i32) -> bool,
) -> bool {
    // Outside the vertical range everything reads as air
    let (y0, y1) = (y0.max(0), y1.min(CHUNK_HEIGHT as i32 - 1));
    if x0 > x1 || y0 > y1 || z0 > z1 {
        return false;
    }
    let lo = ChunkPos::from_world(WorldPos::new(x0, 0, z0));
    let hi = ChunkPos::from_world(WorldPos::new(x1, 0, z1));
    let area = (i64::from(hi.x) - i64::from(lo.x) + 1) * (i64::from(hi.z) - i64::from(lo.z) + 1);
    let chunks: Vec<ChunkPos> = if area <= world.loaded_chunk_count() as i64 {
        (lo.x..=hi.x)
            .flat_map(|x| (lo.z..=hi.z).map(move |z| ChunkPos::new(x, z)))
            .filter(|p| world.is_chunk_loaded(*p))
            .collect()
    } else {
        world
            .chunk_positions()
            .into_iter()
            .filter(|p| (lo.x..=hi.x).contains(&p.x) && (lo.z..=hi.z).contains(&p.z))
            .collect()
    };
    for cpos in chunks {
        let o = cpos.origin();
        let (cx0, cx1) = (x0.max(o.x), x1.min(o.x + SIZE - 1));
        let (cz0, cz1) = (z0.max(o.z), z1.min(o.z + SIZE - 1));
        for y in y0..=y1 {
            for z in cz0..=cz1 {
                for x in cx0..=cx1 {
                    if hit(x, y, z) {
                        return true;
                    }
                }
            }
        }
    }
    false
}

/// Whether any blocking voxel overlaps the box.
///
/// The max side is half-open: a box whose bottom sits exactly on a block top
/// does not collide with it.
pub fn test_aabb_voxel_world(aabb: &Aabb, world: Option<&VoxelWorld>) -> bool {
    let Some(world) = world else {
        return false;
    };
    if !aabb.min.is_finite() || !aabb.max.is_finite() {
        return false;
    }
    any_resident_cell(
        world,
        cell_span(aabb.min.x, aabb.max.x),
        cell_span(aabb.min.y, aabb.max.y),
        cell_span(aabb.min.z, aabb.max.z),
        |x, y, z| blocks_at(world, x, y, z),
    )
}

/// Whether any blocking voxel touches the sphere.
pub fn test_sphere_voxel_world(sphere: &Sphere, world: Option<&VoxelWorld>) -> bool {
    let Some(world) = world else {
        return false;
    };
    let b = sphere.bounds();
    if !b.min.is_finite() || !b.max.is_finite() || sphere.radius < 0.0 {
        return false;
    }
    let span = |lo: f32, hi: f32| (lo.floor() as i32, hi.floor() as i32);
    any_resident_cell(
        world,
        span(b.min.x, b.max.x),
        span(b.min.y, b.max.y),
        span(b.min.z, b.max.z),
        |x, y, z| blocks_at(world, x, y, z) && sphere.intersects_aabb(&Aabb::voxel(x, y, z)),
    )
}

/// Axis-separated sweep: the box is moved along each axis alone and that
/// velocity component is zeroed when the moved box overlaps solid voxels.
///
/// Not a continuous sweep, so a fast diagonal mover can still tunnel through
/// thin geometry.
pub fn sweep_aabb_voxel_world(aabb: &Aabb, velocity: Vec3, world: Option<&VoxelWorld>) -> Vec3 {
    let Some(world) = world else {
        return velocity;
    };
    let mut out = velocity;
    for axis in Axis::ALL {
        let v = velocity.axis(axis);
        if v == 0.0 {
            continue;
        }
        let moved = aabb.translated(Vec3::ZERO.with_axis(axis, v));
        if test_aabb_voxel_world(&moved, Some(world)) {
            log::trace!(target: "physics", "sweep blocked on {:?}", axis);
            out = out.with_axis(axis, 0.0);
        }
    }
    out
}
