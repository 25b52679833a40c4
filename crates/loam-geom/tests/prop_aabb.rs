use loam_geom::{Aabb, Ray, Sphere, Vec3, raycast_aabb, raycast_sphere};
use proptest::num::f32::NORMAL;
use proptest::prelude::*;
use proptest::strategy::Strategy;

fn approx_abs_rel(a: f32, b: f32, atol: f32, rtol: f32) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff <= atol + rtol * scale
}

fn bounded_f32() -> impl Strategy<Value = f32> {
    NORMAL.prop_filter("bounded", |v| v.is_finite() && v.abs() <= 1e3)
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (bounded_f32(), bounded_f32(), bounded_f32()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn small_vec3() -> impl Strategy<Value = Vec3> {
    (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn extent() -> impl Strategy<Value = f32> {
    0.01f32..50.0
}

// Well-formed boxes: min <= max on every axis
fn arb_aabb() -> impl Strategy<Value = Aabb> {
    (arb_vec3(), extent(), extent(), extent())
        .prop_map(|(min, ex, ey, ez)| Aabb::new(min, min + Vec3::new(ex, ey, ez)))
}

fn arb_dir() -> impl Strategy<Value = Vec3> {
    arb_vec3().prop_filter("non-zero", |v| v.length() > 1e-2)
}

proptest! {
    #[test]
    fn intersects_is_symmetric(a in arb_aabb(), b in arb_aabb()) {
        prop_assert_eq!(a.intersects(&b), b.intersects(&a));
    }

    #[test]
    fn box_contains_its_center(a in arb_aabb()) {
        prop_assert!(a.contains(a.center()));
        prop_assert!(a.intersects(&a));
    }

    #[test]
    fn closest_point_lies_in_box(a in arb_aabb(), p in arb_vec3()) {
        let c = a.closest_point(p);
        prop_assert!(a.contains(c));
        if a.contains(p) {
            prop_assert_eq!(c, p);
        }
    }

    // Penetration exists exactly when boxes overlap and never exceeds the smaller box
    #[test]
    fn penetration_bounded_by_sizes(a in arb_aabb(), b in arb_aabb()) {
        match Aabb::penetration(&a, &b) {
            None => prop_assert!(!a.intersects(&b)),
            Some(p) => {
                prop_assert!(p.depth >= 0.0);
                let limit = a.size().axis(p.axis).max(b.size().axis(p.axis));
                prop_assert!(p.depth <= limit + 1e-3);
                prop_assert!(approx_abs_rel(p.normal.length(), 1.0, 1e-6, 0.0));
            }
        }
    }

    // Translating by the penetration resolves the overlap (up to touching)
    #[test]
    fn penetration_push_out_separates(a in arb_aabb(), b in arb_aabb()) {
        if let Some(p) = Aabb::penetration(&a, &b) {
            let moved = a.translated(p.normal * (p.depth + 1e-2));
            prop_assert!(!moved.intersects(&b));
        }
    }

    #[test]
    fn sphere_aabb_matches_closest_distance(a in arb_aabb(), c in arb_vec3(), r in 0.0f32..20.0) {
        let s = Sphere::new(c, r);
        let d = (a.closest_point(c) - c).length();
        if d < r * 0.99 {
            prop_assert!(s.intersects_aabb(&a));
        }
        if d > r * 1.01 + 1e-3 {
            prop_assert!(!s.intersects_aabb(&a));
        }
    }

    // Slab hits land on the box surface in front of the origin
    #[test]
    fn raycast_aabb_hit_is_on_box(o in arb_vec3(), d in arb_dir(), a in arb_aabb()) {
        let ray = Ray::new(o, d);
        if let Some(hit) = raycast_aabb(&ray, &a) {
            prop_assert!(hit.distance >= 0.0);
            prop_assert!(hit.point.is_finite());
            let grown = Aabb::new(a.min - Vec3::splat(1e-2), a.max + Vec3::splat(1e-2));
            prop_assert!(grown.contains(hit.point));
        }
    }

    // Aiming at the center from outside always hits
    #[test]
    fn ray_towards_center_hits(o in arb_vec3(), a in arb_aabb()) {
        prop_assume!(!a.contains(o));
        let dir = a.center() - o;
        prop_assume!(dir.length() > 1e-2);
        prop_assert!(raycast_aabb(&Ray::new(o, dir), &a).is_some());
    }

    #[test]
    fn raycast_sphere_hit_is_on_surface(o in small_vec3(), d in arb_dir(), c in small_vec3(), r in 0.1f32..50.0) {
        let ray = Ray::new(o, d);
        if let Some(hit) = raycast_sphere(&ray, &Sphere::new(c, r)) {
            prop_assert!(hit.distance >= 0.0);
            let dist = (hit.point - c).length();
            prop_assert!(approx_abs_rel(dist, r, 1e-2, 1e-3));
        }
    }
}
