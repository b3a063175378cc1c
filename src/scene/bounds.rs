//! Bounding Volumes
//!
//! Scratch volumes used by light culling: a bounding sphere and an
//! axis-aligned bounding box with matrix transform support.

use glam::{Mat4, Vec3};

/// A bounding sphere.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Resets this sphere in place (scratch-volume reuse).
    pub fn set(&mut self, center: Vec3, radius: f32) {
        self.center = center;
        self.radius = radius;
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0)
    }
}

/// An axis-aligned bounding box, stored as center + half extents.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// The unit box used as the canonical ranged-directional light volume.
    #[must_use]
    pub fn unit() -> Self {
        Self::new(Vec3::ZERO, Vec3::splat(0.5))
    }

    /// Writes `aabb` transformed by `matrix` into `self`.
    ///
    /// The transformed box stays axis-aligned: the new half extents are the
    /// absolute rotation/scale part applied to the old half extents.
    pub fn transform_from(&mut self, aabb: &Aabb, matrix: &Mat4) {
        self.center = matrix.transform_point3(aabb.center);

        let m = glam::Mat3::from_mat4(*matrix);
        let abs_x = m.x_axis.abs();
        let abs_y = m.y_axis.abs();
        let abs_z = m.z_axis.abs();
        self.half_extents = abs_x * aabb.half_extents.x
            + abs_y * aabb.half_extents.y
            + abs_z * aabb.half_extents.z;
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_transform_translation() {
        let mut out = Aabb::default();
        out.transform_from(&Aabb::unit(), &Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)));
        assert!((out.center.x - 3.0).abs() < 1e-6);
        assert!((out.half_extents.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_aabb_transform_scale() {
        let mut out = Aabb::default();
        out.transform_from(&Aabb::unit(), &Mat4::from_scale(Vec3::new(4.0, 2.0, 1.0)));
        assert!((out.half_extents.x - 2.0).abs() < 1e-6);
        assert!((out.half_extents.y - 1.0).abs() < 1e-6);
    }
}
