//! Core rendering functions
//! Triangle rasterization with a z-buffer and flat Lambertian shading

use super::framebuffer::{DepthBuffer, Framebuffer};
use super::math::{barycentric, barycentric_interpolate, IVec2, Vec2, Vec3};
use super::transform::{ScreenPoint, Transform};
use super::types::{Color, Texture, Vertex};

/// Exponent applied to textured fragments (1 / 2.2)
pub const GAMMA: f32 = 1.0 / 2.2;

/// Everything needed to turn vertices into pixels, fixed per device
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub transform: Transform,
    /// Normalized direction towards the light
    pub light_dir: Vec3,
}

impl Pipeline {
    pub fn new(transform: Transform, light_dir: Vec3) -> Self {
        Self {
            transform,
            light_dir: light_dir.normalize(),
        }
    }
}

/// Projected triangle ready for rasterization
#[derive(Debug, Clone, Copy)]
pub struct ScreenTriangle {
    pub points: [ScreenPoint; 3],
    pub uvs: [Vec2; 3],
    /// Flat shading color, one per triangle
    pub color: Color,
}

/// Counters for one draw call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub triangles: usize,
    /// Triangles skipped because they face away from the light
    pub culled: usize,
    /// Fragments that passed the depth test
    pub pixels: usize,
}

/// Flat Lambertian shade of a world-space triangle.
///
/// Returns `None` when the face normal points away from the light
/// (intensity <= 0); such triangles are not rasterized at all.
pub fn flat_shade(world: [Vec3; 3], light_dir: Vec3) -> Option<Color> {
    let normal = (world[1] - world[0]).cross(world[2] - world[1]).normalize();
    let intensity = normal.dot(light_dir);
    if intensity > 0.0 {
        Some(Color::gray(intensity.min(1.0)))
    } else {
        None
    }
}

/// Half-open pixel box `[min, max)` covering the triangle, clamped to the image.
/// An empty box (min >= max on either axis) covers nothing.
pub fn bounding_box(points: &[ScreenPoint; 3], width: usize, height: usize) -> (IVec2, IVec2) {
    if width == 0 || height == 0 {
        return (IVec2::new(0, 0), IVec2::new(0, 0));
    }
    let bound = IVec2::new(width as i32 - 1, height as i32 - 1);
    let mut min = bound;
    let mut max = IVec2::new(0, 0);

    for p in points {
        min.x = min.x.min(p.x.max(0));
        min.y = min.y.min(p.y.max(0));
        max.x = max.x.max(p.x.min(bound.x));
        max.y = max.y.max(p.y.min(bound.y));
    }

    (min, max)
}

/// Rasterize a single triangle. Returns how many pixels were written.
pub fn rasterize_triangle(
    fb: &mut Framebuffer,
    depth: &mut DepthBuffer,
    tri: &ScreenTriangle,
    texture: Option<&Texture>,
) -> usize {
    let (min, max) = bounding_box(&tri.points, fb.width, fb.height);
    let [a, b, c] = tri.points;
    let mut written = 0;

    for x in min.x..max.x {
        for y in min.y..max.y {
            let bc = barycentric(a.xy(), b.xy(), c.xy(), IVec2::new(x, y));
            if bc.x < 0.0 || bc.y < 0.0 || bc.z < 0.0 {
                continue;
            }

            let z = barycentric_interpolate(bc, a.z, b.z, c.z);
            let (px, py) = (x as usize, y as usize);
            if !depth.test_and_set(px, py, z) {
                continue;
            }

            let color = match texture {
                Some(tex) => {
                    // Screen-space linear, not perspective-correct
                    let u = barycentric_interpolate(bc, tri.uvs[0].x, tri.uvs[1].x, tri.uvs[2].x);
                    let v = barycentric_interpolate(bc, tri.uvs[0].y, tri.uvs[1].y, tri.uvs[2].y);
                    (tri.color * tex.sample(u, v)).gamma(GAMMA)
                }
                None => tri.color,
            };

            fb.set_pixel(px, py, color);
            written += 1;
        }
    }

    written
}

/// Run the whole pipeline over an indexed triangle list.
///
/// Indices are consumed in consecutive triples; a trailing partial triple is
/// ignored. Every index must be < `vertices.len()` (out-of-range panics).
pub fn draw_triangles(
    fb: &mut Framebuffer,
    depth: &mut DepthBuffer,
    vertices: &[Vertex],
    indices: &[u32],
    pipeline: &Pipeline,
    texture: Option<&Texture>,
) -> DrawStats {
    let mut stats = DrawStats::default();

    for tri in indices.chunks_exact(3) {
        let v = [
            &vertices[tri[0] as usize],
            &vertices[tri[1] as usize],
            &vertices[tri[2] as usize],
        ];
        stats.triangles += 1;

        let world = [v[0].pos, v[1].pos, v[2].pos];
        let Some(color) = flat_shade(world, pipeline.light_dir) else {
            stats.culled += 1;
            continue;
        };

        let screen = ScreenTriangle {
            points: world.map(|p| pipeline.transform.to_screen(p)),
            uvs: [v[0].texcoord, v[1].texcoord, v[2].texcoord],
            color,
        };
        stats.pixels += rasterize_triangle(fb, depth, &screen, texture);
    }

    stats
}
