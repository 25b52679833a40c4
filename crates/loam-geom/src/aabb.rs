use crate::{Axis, Vec3};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Minimum-overlap separation between two boxes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penetration {
    pub axis: Axis,
    /// Unit normal along `axis`, pointing from the second box towards the first.
    pub normal: Vec3,
    pub depth: f32,
}

impl Aabb {
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn from_center_half_extents(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    /// Unit cube whose min corner sits on an integer cell.
    #[inline]
    pub fn voxel(x: i32, y: i32, z: i32) -> Self {
        let min = Vec3::new(x as f32, y as f32, z as f32);
        Self::new(min, min + Vec3::ONE)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn translated(&self, offset: Vec3) -> Aabb {
        Aabb::new(self.min + offset, self.max + offset)
    }

    /// Point inside or on the boundary.
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Closed-interval overlap on every axis; touching faces count.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    #[inline]
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    /// Smallest box containing both.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Separating axis of least overlap. Ties resolve in x, y, z order.
    pub fn penetration(a: &Aabb, b: &Aabb) -> Option<Penetration> {
        if !a.intersects(b) {
            return None;
        }
        let overlap = |axis: Axis| {
            (a.max.axis(axis) - b.min.axis(axis)).min(b.max.axis(axis) - a.min.axis(axis))
        };
        let (ox, oy, oz) = (overlap(Axis::X), overlap(Axis::Y), overlap(Axis::Z));
        let (axis, depth) = if ox <= oy && ox <= oz {
            (Axis::X, ox)
        } else if oy <= oz {
            (Axis::Y, oy)
        } else {
            (Axis::Z, oz)
        };
        let sign = if a.center().axis(axis) < b.center().axis(axis) {
            -1.0
        } else {
            1.0
        };
        Some(Penetration {
            axis,
            normal: Vec3::unit(axis, sign),
            depth,
        })
    }
}
