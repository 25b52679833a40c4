use loam_geom::{DIR_EPSILON, IVec3, Ray, Vec3};
use loam_world::VoxelWorld;

use crate::blocks_at;

/// Result of a voxel raycast. `hit == false` leaves the other fields zeroed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VoxelHit {
    pub hit: bool,
    pub distance: f32,
    pub point: Vec3,
    /// Face normal of the entered side; zero when the ray starts inside the block.
    pub normal: IVec3,
    pub block: IVec3,
}

impl VoxelHit {
    pub const MISS: VoxelHit = VoxelHit {
        hit: false,
        distance: 0.0,
        point: Vec3::ZERO,
        normal: IVec3::ZERO,
        block: IVec3::ZERO,
    };
}

#[inline]
fn inv_or_max(v: f32) -> f32 {
    if v.abs() < DIR_EPSILON {
        f32::MAX
    } else {
        1.0 / v.abs()
    }
}

#[inline]
fn step_of(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// First blocking voxel along `ray` within `max_distance`, against a world.
/// Liquids and air are passed through; unloaded chunks are empty.
pub fn raycast_voxel(ray: &Ray, world: Option<&VoxelWorld>, max_distance: f32) -> VoxelHit {
    let Some(world) = world else {
        return VoxelHit::MISS;
    };
    raycast_voxels_with(ray, max_distance, |x, y, z| blocks_at(world, x, y, z))
}

/// Grid traversal (Amanatides & Woo) with a caller-supplied blocking test.
///
/// Traversal stops after `2 * max_distance` cell steps or once the entry
/// distance exceeds `max_distance`, whichever comes first.
pub fn raycast_voxels_with<F>(ray: &Ray, max_distance: f32, mut is_blocking: F) -> VoxelHit
where
    F: FnMut(i32, i32, i32) -> bool,
{
    if ray.is_degenerate() || !max_distance.is_finite() || max_distance <= 0.0 {
        return VoxelHit::MISS;
    }
    let o = ray.origin;
    let d = ray.direction;

    let mut cell = IVec3::floor_of(o);
    if is_blocking(cell.x, cell.y, cell.z) {
        return VoxelHit {
            hit: true,
            distance: 0.0,
            point: o,
            normal: IVec3::ZERO,
            block: cell,
        };
    }

    let step = IVec3::new(step_of(d.x), step_of(d.y), step_of(d.z));
    let delta = [inv_or_max(d.x), inv_or_max(d.y), inv_or_max(d.z)];
    let side = |p: f32, s: i32, inv: f32| {
        let f = p - p.floor();
        match s {
            1 => (1.0 - f) * inv,
            -1 => f * inv,
            _ => f32::MAX,
        }
    };
    let mut t_max = [
        side(o.x, step.x, delta[0]),
        side(o.y, step.y, delta[1]),
        side(o.z, step.z, delta[2]),
    ];

    let max_steps = (max_distance * 2.0).ceil() as usize;
    for _ in 0..max_steps {
        let axis = if t_max[0] < t_max[1] {
            if t_max[0] < t_max[2] { 0 } else { 2 }
        } else if t_max[1] < t_max[2] {
            1
        } else {
            2
        };
        let t = t_max[axis];
        if t > max_distance {
            return VoxelHit::MISS;
        }
        t_max[axis] += delta[axis];
        let normal = match axis {
            0 => {
                cell.x += step.x;
                IVec3::new(-step.x, 0, 0)
            }
            1 => {
                cell.y += step.y;
                IVec3::new(0, -step.y, 0)
            }
            _ => {
                cell.z += step.z;
                IVec3::new(0, 0, -step.z)
            }
        };
        if is_blocking(cell.x, cell.y, cell.z) {
            return VoxelHit {
                hit: true,
                distance: t,
                point: ray.point_at(t),
                normal,
                block: cell,
            };
        }
    }
    log::trace!(target: "physics", "raycast step cap reached after {} steps", max_steps);
    VoxelHit::MISS
}
