//! Vector and matrix math for the transform stage

use std::ops::{Add, Mul, Sub};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 3D Vector
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn extend(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

/// 2D Vector (for texture coordinates)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer 2D point (pixel coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IVec2 {
    pub x: i32,
    pub y: i32,
}

impl IVec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Homogeneous 4D vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Divide xyz by w. No guard against w == 0: points on the camera plane
    /// produce infinities, which the rasterizer's bounding-box clamp absorbs.
    pub fn perspective_divide(self) -> Vec3 {
        self.xyz().scale(1.0 / self.w)
    }

    fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

/// 4x4 matrix, row-major (`rows[r][c]`), acting on column vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub rows: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Right-handed view matrix looking from `eye` at `target`
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);

        Mat4 {
            rows: [
                [s.x, s.y, s.z, -s.dot(eye)],
                [u.x, u.y, u.z, -u.dot(eye)],
                [-f.x, -f.y, -f.z, f.dot(eye)],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Right-handed OpenGL-style projection. NDC z runs from -1 at `near`
    /// to +1 at `far`.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov_y / 2.0).tan();

        Mat4 {
            rows: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, (far + near) / (near - far), 2.0 * far * near / (near - far)],
                [0.0, 0.0, -1.0, 0.0],
            ],
        }
    }

    pub fn transform(&self, v: Vec4) -> Vec4 {
        let v = v.to_array();
        let row = |r: usize| -> f32 {
            self.rows[r]
                .iter()
                .zip(v.iter())
                .map(|(m, x)| m * x)
                .sum()
        };
        Vec4::new(row(0), row(1), row(2), row(3))
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.rows[r][k] * other.rows[k][c]).sum();
            }
        }
        Mat4 { rows }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        self.transform(v)
    }
}

/// Barycentric coordinates of `p` in the screen triangle (a, b, c).
///
/// Returns the weights of (a, b, c) in that order. A degenerate triangle
/// yields `(-1, 1, 1)`, which fails the inside test for every pixel.
/// Differences are taken in `i64`, so any `i32` input is safe.
pub fn barycentric(a: IVec2, b: IVec2, c: IVec2, p: IVec2) -> Vec3 {
    let d = |from: i32, to: i32| (to as i64 - from as i64) as f32;
    let u = Vec3::new(d(a.x, c.x), d(a.x, b.x), d(p.x, a.x))
        .cross(Vec3::new(d(a.y, c.y), d(a.y, b.y), d(p.y, a.y)));

    if u.z.abs() < DEGENERATE_EPSILON {
        return Vec3::new(-1.0, 1.0, 1.0);
    }

    Vec3::new(1.0 - (u.x + u.y) / u.z, u.y / u.z, u.x / u.z)
}

/// Twice the signed screen area below which a triangle is treated as degenerate
pub const DEGENERATE_EPSILON: f32 = 1e-2;

/// Weighted blend of three per-vertex scalars
pub fn barycentric_interpolate(bc: Vec3, a: f32, b: f32, c: f32) -> f32 {
    bc.x * a + bc.y * b + bc.z * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_normalize_zero_stays_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn test_barycentric_inside() {
        let a = IVec2::new(10, 10);
        let b = IVec2::new(10, 50);
        let c = IVec2::new(50, 10);
        let bc = barycentric(a, b, c, IVec2::new(20, 20));
        assert!((bc.x - 0.5).abs() < 1e-6);
        assert!((bc.y - 0.25).abs() < 1e-6);
        assert!((bc.z - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_barycentric_at_vertices() {
        let a = IVec2::new(10, 10);
        let b = IVec2::new(10, 50);
        let c = IVec2::new(50, 10);
        assert_eq!(barycentric(a, b, c, a), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(barycentric(a, b, c, b), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(barycentric(a, b, c, c), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_barycentric_outside() {
        let a = IVec2::new(10, 10);
        let b = IVec2::new(10, 50);
        let c = IVec2::new(50, 10);
        let bc = barycentric(a, b, c, IVec2::new(45, 45));
        assert!(bc.x < 0.0);
    }

    #[test]
    fn test_barycentric_degenerate() {
        let a = IVec2::new(10, 10);
        let c = IVec2::new(40, 40);
        let bc = barycentric(a, a, c, IVec2::new(20, 20));
        assert_eq!(bc, Vec3::new(-1.0, 1.0, 1.0));
    }

    #[test]
    fn test_barycentric_extreme_coordinates() {
        let a = IVec2::new(i32::MIN, i32::MIN);
        let b = IVec2::new(i32::MAX, 0);
        let c = IVec2::new(0, i32::MAX);
        let bc = barycentric(a, b, c, IVec2::new(10, 10));
        assert!(bc.x.is_finite() && bc.y.is_finite() && bc.z.is_finite());
        assert!((bc.x + bc.y + bc.z - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_look_at_moves_target_down_negative_z() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UP);
        let p = view * Vec3::ZERO.extend(1.0);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!((p.z + 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_perspective_maps_near_and_far() {
        let proj = Mat4::perspective(std::f32::consts::FRAC_PI_3, 1.5, 0.1, 100.0);
        let near = (proj * Vec4::new(0.0, 0.0, -0.1, 1.0)).perspective_divide();
        let far = (proj * Vec4::new(0.0, 0.0, -100.0, 1.0)).perspective_divide();
        assert!((near.z + 1.0).abs() < 1e-4);
        assert!((far.z - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_identity_product() {
        let view = Mat4::look_at(Vec3::new(1.0, 0.8, 3.0), Vec3::ZERO, Vec3::UP);
        assert_eq!(Mat4::IDENTITY * view, view);
    }
}
