use loam_blocks::{Voxel, VoxelType};
use loam_chunk::{ChunkPos, WorldPos};
use loam_geom::{Aabb, IVec3, Ray, Sphere, Vec3};
use loam_physics::{
    CollisionBody, MAX_BODY_CELLS, SpatialHash, raycast_voxel, sweep_aabb_voxel_world,
    test_aabb_voxel_world, test_sphere_voxel_world,
};
use loam_world::{GeneratorKind, VoxelWorld, WorldGenConfig};
use proptest::prelude::*;

fn empty_world(chunks: &[(i32, i32)]) -> VoxelWorld {
    let mut w = VoxelWorld::from_kind(GeneratorKind::Empty, 0, &WorldGenConfig::default());
    for &(x, z) in chunks {
        w.load_chunk(ChunkPos::new(x, z));
    }
    w
}

fn put(w: &mut VoxelWorld, x: i32, y: i32, z: i32, ty: VoxelType) {
    assert!(w.set_voxel(WorldPos::new(x, y, z), Voxel::from(ty)));
}

#[test]
fn ray_down_hits_single_block_top() {
    let mut w = empty_world(&[(0, 0)]);
    put(&mut w, 5, 10, 5, VoxelType::Stone);
    let ray = Ray::new(Vec3::new(5.0, 20.0, 5.0), Vec3::new(0.0, -1.0, 0.0));
    let hit = raycast_voxel(&ray, Some(&w), 100.0);
    assert!(hit.hit);
    assert_eq!(hit.block, IVec3::new(5, 10, 5));
    assert_eq!(hit.normal, IVec3::new(0, 1, 0));
    assert!((hit.distance - 9.0).abs() < 1e-4);
}

#[test]
fn ray_passes_through_water_and_unloaded_chunks() {
    let mut w = empty_world(&[(0, 0)]);
    put(&mut w, 3, 12, 3, VoxelType::Water);
    put(&mut w, 3, 8, 3, VoxelType::Dirt);
    let down = Ray::new(Vec3::new(3.5, 20.5, 3.5), Vec3::new(0.0, -1.0, 0.0));
    let hit = raycast_voxel(&down, Some(&w), 50.0);
    assert_eq!(hit.block, IVec3::new(3, 8, 3));

    // Nothing resident to the west
    let west = Ray::new(Vec3::new(0.5, 8.5, 3.5), Vec3::new(-1.0, 0.0, 0.0));
    assert!(!raycast_voxel(&west, Some(&w), 40.0).hit);
}

#[test]
fn ray_crosses_chunk_borders() {
    let mut w = empty_world(&[(0, 0), (1, 0), (-1, 0)]);
    put(&mut w, 20, 4, 2, VoxelType::Stone);
    put(&mut w, -3, 4, 2, VoxelType::Stone);
    let east = Ray::new(Vec3::new(0.5, 4.5, 2.5), Vec3::new(1.0, 0.0, 0.0));
    let hit = raycast_voxel(&east, Some(&w), 30.0);
    assert_eq!(hit.block, IVec3::new(20, 4, 2));
    assert_eq!(hit.normal, IVec3::new(-1, 0, 0));
    let west = Ray::new(Vec3::new(0.5, 4.5, 2.5), Vec3::new(-1.0, 0.0, 0.0));
    let hit = raycast_voxel(&west, Some(&w), 30.0);
    assert_eq!(hit.block, IVec3::new(-3, 4, 2));
    assert_eq!(hit.normal, IVec3::new(1, 0, 0));
}

#[test]
fn box_resting_on_floor_does_not_collide() {
    let mut w = empty_world(&[(0, 0)]);
    for x in 0..4 {
        for z in 0..4 {
            put(&mut w, x, 9, z, VoxelType::Stone);
        }
    }
    let standing = Aabb::new(Vec3::new(1.2, 10.0, 1.2), Vec3::new(1.8, 11.8, 1.8));
    assert!(!test_aabb_voxel_world(&standing, Some(&w)));
    let sunk = standing.translated(Vec3::new(0.0, -0.1, 0.0));
    assert!(test_aabb_voxel_world(&sunk, Some(&w)));
    let falling = sweep_aabb_voxel_world(&standing, Vec3::new(0.0, -0.5, 0.0), Some(&w));
    assert_eq!(falling, Vec3::ZERO);
}

#[test]
fn sweep_zeroes_only_the_blocked_axis() {
    let mut w = empty_world(&[(0, 0)]);
    for y in 10..13 {
        for z in 0..4 {
            put(&mut w, 2, y, z, VoxelType::Stone);
        }
    }
    let body = Aabb::new(Vec3::new(0.5, 10.0, 0.5), Vec3::new(1.5, 11.8, 1.5));
    let v = sweep_aabb_voxel_world(&body, Vec3::new(1.0, 0.0, 0.25), Some(&w));
    assert_eq!(v.x, 0.0);
    assert_eq!(v.y, 0.0);
    assert_eq!(v.z, 0.25);

    let v = sweep_aabb_voxel_world(&body, Vec3::new(-0.3, 0.4, 0.0), Some(&w));
    assert_eq!(v, Vec3::new(-0.3, 0.4, 0.0));
}

#[test]
fn spatial_hash_reports_each_pair_once() {
    let mut h: SpatialHash<u32> = SpatialHash::new(1.0);
    // Both span the same four cells
    h.insert(CollisionBody::new(
        1,
        Aabb::new(Vec3::new(0.2, 0.2, 0.2), Vec3::new(1.8, 0.8, 1.8)),
    ));
    h.insert(CollisionBody::new(
        2,
        Aabb::new(Vec3::new(0.5, 0.3, 0.5), Vec3::new(1.5, 0.9, 1.5)),
    ));
    h.insert(CollisionBody::new(3, Aabb::voxel(10, 10, 10)));
    let pairs = h.find_collisions();
    assert_eq!(pairs.len(), 1);
    assert_eq!((pairs[0].a, pairs[0].b), (1, 2));
    assert!(pairs[0].depth > 0.0);
}

#[test]
fn spatial_hash_penetration_scenario() {
    let mut h: SpatialHash<&str> = SpatialHash::new(4.0);
    h.insert(CollisionBody::new("left", Aabb::new(Vec3::ZERO, Vec3::ONE)));
    h.insert(CollisionBody::new(
        "right",
        Aabb::new(Vec3::new(0.7, 0.0, 0.0), Vec3::new(1.7, 1.0, 1.0)),
    ));
    let pairs = h.find_collisions();
    assert_eq!(pairs.len(), 1);
    assert!((pairs[0].depth - 0.3).abs() < 1e-5);
    assert_eq!(pairs[0].normal, Vec3::new(-1.0, 0.0, 0.0));
}

#[test]
fn spatial_hash_query_and_remove() {
    let mut h: SpatialHash<u32> = SpatialHash::new(2.0);
    for i in 0..5u32 {
        let x = i as i32 * 3;
        assert!(h.insert(CollisionBody::new(i, Aabb::voxel(x, 0, 0))));
    }
    assert_eq!(h.len(), 5);
    let keys = |h: &SpatialHash<u32>, b: Aabb| h.query(&b).iter().map(|c| c.key).collect::<Vec<_>>();
    let wide = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(20.0, 2.0, 2.0));
    assert_eq!(keys(&h, wide), vec![0, 1, 2, 3, 4]);

    assert!(h.remove(2).is_some());
    assert!(h.remove(2).is_none());
    assert_eq!(keys(&h, wide), vec![0, 1, 3, 4]);

    // Re-inserting a key moves it rather than duplicating it
    assert!(!h.insert(CollisionBody::new(0, Aabb::voxel(100, 0, 0))));
    assert_eq!(h.len(), 4);
    assert_eq!(keys(&h, wide), vec![1, 3, 4]);

    h.clear();
    assert!(h.is_empty());
    assert_eq!(h.cell_count(), 0);
    assert!(h.query(&wide).is_empty());
}

#[test]
fn sphere_touches_only_nearby_solid() {
    let mut w = empty_world(&[(0, 0)]);
    put(&mut w, 4, 4, 4, VoxelType::Stone);
    put(&mut w, 6, 4, 4, VoxelType::Water);
    // Closest point of the block is its corner (5, 5, 5)
    let near_corner = Sphere::new(Vec3::new(5.5, 5.5, 5.5), 0.9);
    assert!(test_sphere_voxel_world(&near_corner, Some(&w)));
    let short = Sphere::new(Vec3::new(5.5, 5.5, 5.5), 0.8);
    assert!(!test_sphere_voxel_world(&short, Some(&w)));
    let in_water = Sphere::new(Vec3::new(6.5, 4.5, 4.5), 0.4);
    assert!(!test_sphere_voxel_world(&in_water, Some(&w)));
}

#[test]
fn null_world_gives_empty_results() {
    let ray = Ray::new(Vec3::ZERO, Vec3::UP);
    assert!(!raycast_voxel(&ray, None, 10.0).hit);
    assert!(!test_aabb_voxel_world(&Aabb::voxel(0, 0, 0), None));
}

#[test]
fn huge_boxes_only_walk_resident_chunks() {
    let mut w = empty_world(&[(0, 0), (-3, 2)]);
    put(&mut w, -40, 100, 40, VoxelType::Stone);
    let huge = Aabb::new(Vec3::new(-1e9, -1e9, -1e9), Vec3::new(1e9, 1e9, 1e9));
    assert!(test_aabb_voxel_world(&huge, Some(&w)));
    let far = Aabb::new(Vec3::new(1e8, 0.0, 1e8), Vec3::new(1e9, 200.0, 1e9));
    assert!(!test_aabb_voxel_world(&far, Some(&w)));
    assert!(test_sphere_voxel_world(&Sphere::new(Vec3::new(0.0, 100.0, 0.0), 1e7), Some(&w)));

    // Only the destination on each axis is tested, so a huge step returns at once
    let body = Aabb::new(Vec3::new(-40.5, 101.0, 40.2), Vec3::new(-39.5, 102.0, 40.8));
    let v = sweep_aabb_voxel_world(&body, Vec3::new(3e9, -1e9, 0.0), Some(&w));
    assert_eq!(v, Vec3::new(3e9, -1e9, 0.0));
    let v = sweep_aabb_voxel_world(&body, Vec3::new(0.0, -1.5, 0.0), Some(&w));
    assert_eq!(v, Vec3::ZERO);
}

#[test]
fn oversized_bodies_stay_off_the_grid() {
    let mut h: SpatialHash<u32> = SpatialHash::new(1.0);
    let ground = Aabb::new(Vec3::new(-1e6, -1.0, -1e6), Vec3::new(1e6, 0.0, 1e6));
    h.insert(CollisionBody::new(1, ground));
    assert_eq!(h.cell_count(), 0);
    h.insert(CollisionBody::new(2, Aabb::new(Vec3::new(3.0, -0.5, 3.0), Vec3::new(4.0, 1.0, 4.0))));
    h.insert(CollisionBody::new(3, Aabb::voxel(3, 5, 3)));

    let near = Aabb::new(Vec3::new(2.5, -0.2, 2.5), Vec3::new(3.5, 0.5, 3.5));
    let keys: Vec<u32> = h.query(&near).iter().map(|b| b.key).collect();
    assert_eq!(keys, vec![1, 2]);
    let everything = Aabb::new(Vec3::new(-1e7, -1e7, -1e7), Vec3::new(1e7, 1e7, 1e7));
    assert_eq!(h.query(&everything).len(), 3);

    let pairs = h.find_collisions();
    assert_eq!(pairs.len(), 1);
    assert_eq!((pairs[0].a, pairs[0].b), (1, 2));

    assert!(h.remove(1).is_some());
    assert!(h.find_collisions().is_empty());
    assert!(h.query(&near).iter().all(|b| b.key != 1));
    assert!(MAX_BODY_CELLS >= 64);
}

#[test]
fn static_pairs_are_skipped_and_triggers_flagged() {
    let mut h: SpatialHash<&str> = SpatialHash::new(2.0);
    let unit = Aabb::new(Vec3::ZERO, Vec3::ONE);
    let shifted = unit.translated(Vec3::new(0.5, 0.0, 0.0));
    h.insert(CollisionBody::new("wall", unit).static_body());
    h.insert(CollisionBody::new("floor", shifted).static_body());
    assert!(h.find_collisions().is_empty());

    h.insert(CollisionBody::new("zone", shifted.translated(Vec3::new(0.0, 0.5, 0.0))).trigger());
    let pairs = h.find_collisions();
    assert_eq!(pairs.len(), 2);
    assert!(pairs.iter().all(|p| p.trigger && p.b == "zone"));

    h.clear();
    h.insert(CollisionBody::new("left", unit).with_velocity(Vec3::new(1.0, 0.0, 0.0)));
    h.insert(CollisionBody::new("right", shifted).static_body());
    let pairs = h.find_collisions();
    assert_eq!(pairs.len(), 1);
    assert!(!pairs[0].trigger);
    // Normal points from right towards left while left keeps moving right
    assert_eq!(pairs[0].normal, Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(pairs[0].relative_velocity, Vec3::new(1.0, 0.0, 0.0));
    assert!(!pairs[0].is_separating());
}

proptest! {
    #[test]
    fn query_finds_every_overlapping_body(
        boxes in proptest::collection::vec((-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0, 0.1f32..3.0), 1..24),
        corner in (-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0),
    ) {
        let mut h: SpatialHash<usize> = SpatialHash::new(2.5);
        let mut all = Vec::new();
        for (i, (x, y, z, s)) in boxes.into_iter().enumerate() {
            let b = Aabb::new(Vec3::new(x, y, z), Vec3::new(x + s, y + s, z + s));
            h.insert(CollisionBody::new(i, b));
            all.push(b);
        }
        let q = Aabb::new(Vec3::new(corner.0, corner.1, corner.2), Vec3::new(corner.0 + 2.0, corner.1 + 2.0, corner.2 + 2.0));
        let found: Vec<usize> = h.query(&q).iter().map(|c| c.key).collect();
        for (i, b) in all.iter().enumerate() {
            if b.intersects(&q) {
                prop_assert!(found.contains(&i));
            }
        }
        let mut sorted = found.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted, found);
    }
}
