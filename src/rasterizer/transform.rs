//! Model space to screen space
//!
//! Depth convention: the projection is right-handed with NDC z growing away
//! from the camera (-1 at near, +1 at far). Screen depth is `-ndc.z`, so a
//! larger depth is always nearer and the depth test keeps the larger value.

use serde::{Deserialize, Serialize};

use super::math::{IVec2, Mat4, Vec3};

/// Camera placement and lens, fixed at device construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(1.0, 0.8, 3.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
            fov_y: std::f32::consts::FRAC_PI_3,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at(self.eye, self.target, self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(self.fov_y, aspect, self.near, self.far)
    }
}

/// A projected vertex: truncated pixel coordinates plus depth
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
    pub z: f32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn xy(self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }
}

/// Pixel coordinates are clamped to `[-GUARD_BAND, GUARD_BAND]` so that
/// points on or behind the eye plane stay well inside `i32`.
pub const GUARD_BAND: f32 = (1 << 20) as f32;

/// Map NDC to pixels. Y is flipped because row 0 is the top of the image.
/// Coordinates are truncated toward zero after clamping to the guard band.
/// NaN maps to 0.
pub fn ndc_to_screen(ndc: Vec3, width: usize, height: usize) -> ScreenPoint {
    let w = width as f32;
    let h = height as f32;
    let pixel = |v: f32| v.clamp(-GUARD_BAND, GUARD_BAND) as i32;
    ScreenPoint {
        x: pixel((ndc.x + 1.0) * w / 2.0),
        y: pixel(h - (ndc.y + 1.0) * h / 2.0),
        z: -ndc.z,
    }
}

/// Combined view-projection and viewport
#[derive(Debug, Clone)]
pub struct Transform {
    view_proj: Mat4,
    width: usize,
    height: usize,
}

impl Transform {
    pub fn new(view: Mat4, projection: Mat4, width: usize, height: usize) -> Self {
        Self {
            view_proj: projection * view,
            width,
            height,
        }
    }

    pub fn from_camera(camera: &Camera, width: usize, height: usize) -> Self {
        let aspect = width as f32 / height as f32;
        Self::new(camera.view(), camera.projection(aspect), width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Project a model-space position. No clipping: points behind the camera
    /// or on its plane project to whatever the divide yields.
    pub fn to_screen(&self, pos: Vec3) -> ScreenPoint {
        let clip = self.view_proj * pos.extend(1.0);
        ndc_to_screen(clip.perspective_divide(), self.width, self.height)
    }
}
