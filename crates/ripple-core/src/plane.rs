//! Mirror plane math.
//!
//! A [`Plane`] is the infinite plane coincident with a reflective surface,
//! stored as a unit normal plus a signed constant so that a point `p` lies
//! on the plane when `dot(normal, p) + constant == 0`.

use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::error::{Result, RippleError};

/// An infinite plane defined by a unit normal and a signed constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal of the plane.
    normal: Vec3,
    /// Signed distance from the origin along the normal, negated.
    constant: f32,
}

impl Plane {
    /// Creates a plane from a normal direction and a point on the plane.
    ///
    /// Returns [`RippleError::DegenerateNormal`] if the normal cannot be
    /// normalized.
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Result<Self> {
        let n = normal
            .try_normalize()
            .ok_or(RippleError::DegenerateNormal)?;
        Ok(Self {
            normal: n,
            constant: -point.dot(n),
        })
    }

    /// Returns the unit normal of the plane.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Returns the plane constant.
    pub fn constant(&self) -> f32 {
        self.constant
    }

    /// Returns the plane as a 4-component vector `(nx, ny, nz, constant)`.
    pub fn to_vec4(&self) -> Vec4 {
        self.normal.extend(self.constant)
    }

    /// Returns the signed distance from a point to the plane.
    ///
    /// Positive values are on the normal side.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    /// Projects a point onto the plane.
    pub fn project(&self, point: Vec3) -> Vec3 {
        point - self.signed_distance(point) * self.normal
    }

    /// Reflects a point across the plane.
    pub fn reflect_point(&self, point: Vec3) -> Vec3 {
        point - 2.0 * self.signed_distance(point) * self.normal
    }

    /// Reflects a direction vector across the plane.
    ///
    /// Directions ignore the plane offset: `v' = v - 2*dot(v, n)*n`.
    pub fn reflect_vector(&self, v: Vec3) -> Vec3 {
        v - 2.0 * v.dot(self.normal) * self.normal
    }

    /// Returns the matrix that reflects points across this plane.
    ///
    /// Reflection matrix formula:
    /// | 1-2nx²   -2nxny   -2nxnz   -2nxd |
    /// | -2nxny   1-2ny²   -2nynz   -2nyd |
    /// | -2nxnz   -2nynz   1-2nz²   -2nzd |
    /// |    0        0        0       1   |
    pub fn reflection_matrix(&self) -> Mat4 {
        let n = self.normal;
        let d = self.constant;

        Mat4::from_cols(
            Vec4::new(1.0 - 2.0 * n.x * n.x, -2.0 * n.x * n.y, -2.0 * n.x * n.z, 0.0),
            Vec4::new(-2.0 * n.x * n.y, 1.0 - 2.0 * n.y * n.y, -2.0 * n.y * n.z, 0.0),
            Vec4::new(-2.0 * n.x * n.z, -2.0 * n.y * n.z, 1.0 - 2.0 * n.z * n.z, 0.0),
            Vec4::new(-2.0 * n.x * d, -2.0 * n.y * d, -2.0 * n.z * d, 1.0),
        )
    }

    /// Transforms the plane by an affine matrix.
    ///
    /// The normal is transformed by the inverse-transpose of the upper 3x3
    /// block; the constant is recomputed from a transformed reference point.
    pub fn transformed(&self, matrix: Mat4) -> Self {
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        let reference = matrix.transform_point3(self.normal * -self.constant);
        let normal = (normal_matrix * self.normal).normalize();
        Self {
            normal,
            constant: -reference.dot(normal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_creation() {
        let plane = Plane::from_normal_and_point(Vec3::Y, Vec3::ZERO).unwrap();
        assert_eq!(plane.normal(), Vec3::Y);
        assert_eq!(plane.constant(), 0.0);
    }

    #[test]
    fn test_degenerate_normal_rejected() {
        assert!(Plane::from_normal_and_point(Vec3::ZERO, Vec3::ZERO).is_err());
    }

    #[test]
    fn test_non_unit_normal_is_normalized() {
        let plane = Plane::from_normal_and_point(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO).unwrap();
        assert!((plane.normal().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_signed_distance() {
        let plane = Plane::from_normal_and_point(Vec3::Y, Vec3::new(0.0, 1.0, 0.0)).unwrap();

        assert!(plane.signed_distance(Vec3::new(0.0, 3.0, 0.0)) > 0.0);
        assert!(plane.signed_distance(Vec3::new(0.0, -1.0, 0.0)) < 0.0);
        assert!(plane.signed_distance(Vec3::new(7.0, 1.0, -2.0)).abs() < 1e-6);
    }

    #[test]
    fn test_project() {
        let plane = Plane::from_normal_and_point(Vec3::Y, Vec3::ZERO).unwrap();
        let projected = plane.project(Vec3::new(1.0, 5.0, 2.0));
        assert!((projected - Vec3::new(1.0, 0.0, 2.0)).length() < 1e-6);
    }

    #[test]
    fn test_reflect_point_across_offset_plane() {
        let plane = Plane::from_normal_and_point(Vec3::Y, Vec3::new(0.0, 1.0, 0.0)).unwrap();

        // Distance from plane is 2, so the image is 2 below the plane.
        let reflected = plane.reflect_point(Vec3::new(0.0, 3.0, 0.0));
        assert!((reflected - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_reflect_vector_ignores_offset() {
        let plane = Plane::from_normal_and_point(Vec3::Y, Vec3::new(0.0, 10.0, 0.0)).unwrap();
        let reflected = plane.reflect_vector(Vec3::new(1.0, 2.0, 3.0));
        assert!((reflected - Vec3::new(1.0, -2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_reflection_matrix_matches_reflect_point() {
        let plane =
            Plane::from_normal_and_point(Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.0, 2.0, 0.0))
                .unwrap();
        let mat = plane.reflection_matrix();

        let point = Vec3::new(1.0, 2.0, 3.0);
        let via_matrix = mat.transform_point3(point);
        let via_method = plane.reflect_point(point);
        assert!((via_matrix - via_method).length() < 1e-5);
    }

    #[test]
    fn test_reflection_is_involution() {
        let plane = Plane::from_normal_and_point(Vec3::Y, Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let mat = plane.reflection_matrix();
        let double = mat * mat;

        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((double.col(j)[i] - expected).abs() < 0.001);
            }
        }
    }

    #[test]
    fn test_transformed_by_translation() {
        let plane = Plane::from_normal_and_point(Vec3::Y, Vec3::ZERO).unwrap();
        let moved = plane.transformed(Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));

        assert!((moved.normal() - Vec3::Y).length() < 1e-6);
        assert!(moved.signed_distance(Vec3::new(5.0, 2.0, -1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_transformed_by_rotation() {
        let plane = Plane::from_normal_and_point(Vec3::Z, Vec3::ZERO).unwrap();
        let rotated =
            plane.transformed(Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2));

        // Local +Z normal rotated by -90 degrees about X points up.
        assert!((rotated.normal() - Vec3::Y).length() < 1e-5);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn finite_vec3() -> impl Strategy<Value = Vec3> {
            (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0)
                .prop_map(|(x, y, z)| Vec3::new(x, y, z))
        }

        proptest! {
            #[test]
            fn reflect_point_is_involution(
                p in finite_vec3(),
                origin in finite_vec3(),
                n in finite_vec3().prop_filter("non-degenerate", |v| v.length() > 0.1),
            ) {
                let plane = Plane::from_normal_and_point(n, origin).unwrap();
                let twice = plane.reflect_point(plane.reflect_point(p));
                prop_assert!((twice - p).length() < 1e-2);
            }

            #[test]
            fn reflection_preserves_distance_magnitude(
                p in finite_vec3(),
                origin in finite_vec3(),
                n in finite_vec3().prop_filter("non-degenerate", |v| v.length() > 0.1),
            ) {
                let plane = Plane::from_normal_and_point(n, origin).unwrap();
                let d = plane.signed_distance(p);
                let d_reflected = plane.signed_distance(plane.reflect_point(p));
                prop_assert!((d + d_reflected).abs() < 1e-2);
            }
        }
    }
}
