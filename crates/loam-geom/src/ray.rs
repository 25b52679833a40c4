use crate::{Aabb, Axis, DIR_EPSILON, Sphere, Vec3};

/// Face-matching tolerance for slab hit normals.
const FACE_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

impl Ray {
    /// Ray with a normalized direction. A zero direction is kept as-is and
    /// every query against it misses.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalized(),
        }
    }

    /// `None` when the direction cannot be normalized.
    pub fn try_new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let len = direction.length();
        if !origin.is_finite() || !len.is_finite() || len < 1e-6 {
            return None;
        }
        Some(Self {
            origin,
            direction: direction / len,
        })
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !self.origin.is_finite()
            || !self.direction.is_finite()
            || self.direction.length_squared() < DIR_EPSILON
    }
}

/// Slab test. Axes with a (near) zero direction component are handled without
/// dividing: the origin must already lie inside that slab.
pub fn raycast_aabb(ray: &Ray, aabb: &Aabb) -> Option<RayHit> {
    if ray.is_degenerate() {
        return None;
    }
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    for axis in Axis::ALL {
        let o = ray.origin.axis(axis);
        let d = ray.direction.axis(axis);
        let (lo, hi) = (aabb.min.axis(axis), aabb.max.axis(axis));
        if d.abs() < DIR_EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let t0 = (lo - o) * inv;
        let t1 = (hi - o) * inv;
        t_enter = t_enter.max(t0.min(t1));
        t_exit = t_exit.min(t0.max(t1));
    }
    if t_enter > t_exit || t_exit < 0.0 {
        return None;
    }
    let distance = if t_enter >= 0.0 { t_enter } else { t_exit };
    let point = ray.point_at(distance);
    Some(RayHit {
        distance,
        point,
        normal: face_normal(aabb, point),
    })
}

fn face_normal(aabb: &Aabb, p: Vec3) -> Vec3 {
    for axis in Axis::ALL {
        if (p.axis(axis) - aabb.min.axis(axis)).abs() < FACE_EPSILON {
            return Vec3::unit(axis, -1.0);
        }
        if (p.axis(axis) - aabb.max.axis(axis)).abs() < FACE_EPSILON {
            return Vec3::unit(axis, 1.0);
        }
    }
    Vec3::ZERO
}

/// Nearest root of `|o + t·d − c|² = r²` that is not behind the origin.
pub fn raycast_sphere(ray: &Ray, sphere: &Sphere) -> Option<RayHit> {
    if ray.is_degenerate() || !(sphere.radius >= 0.0) {
        return None;
    }
    let oc = ray.origin - sphere.center;
    let a = ray.direction.dot(ray.direction);
    let b = oc.dot(ray.direction);
    let c = oc.dot(oc) - sphere.radius * sphere.radius;
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t0 = (-b - sq) / a;
    let t1 = (-b + sq) / a;
    let distance = if t0 >= 0.0 { t0 } else { t1 };
    if distance < 0.0 {
        return None;
    }
    let point = ray.point_at(distance);
    Some(RayHit {
        distance,
        point,
        normal: (point - sphere.center).normalized(),
    })
}
