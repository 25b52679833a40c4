//! Voxel-world collision queries and broad-phase partitioning.
#![forbid(unsafe_code)]

mod raycast;
mod spatial_hash;
mod world_collision;

pub use raycast::{VoxelHit, raycast_voxel, raycast_voxels_with};
pub use spatial_hash::{CollisionBody, CollisionPair, MAX_BODY_CELLS, SpatialHash};
pub use world_collision::{sweep_aabb_voxel_world, test_aabb_voxel_world, test_sphere_voxel_world};

use loam_chunk::WorldPos;
use loam_world::VoxelWorld;

/// True when the voxel at `(x, y, z)` is resident and stops movement.
/// Unloaded chunks count as empty space.
#[inline]
pub(crate) fn blocks_at(world: &VoxelWorld, x: i32, y: i32, z: i32) -> bool {
    world
        .get_voxel(WorldPos::new(x, y, z))
        .is_some_and(|v| v.blocks_movement())
}
