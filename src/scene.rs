//! Indexed meshes and their device buffers

use crate::device::{Device, UniqueBuffer};
use crate::rasterizer::{Color, DepthBuffer, DrawStats, Framebuffer, Pipeline, Vec2, Vec3, Vertex};

/// Vertex array plus a flat triangle index list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// A mesh uploaded to a device. Both buffers are destroyed on drop.
#[derive(Debug)]
pub struct MeshBuffers<'d> {
    pub vertices: UniqueBuffer<'d>,
    pub indices: UniqueBuffer<'d>,
}

impl MeshBuffers<'_> {
    /// Make these the device's current vertex and index buffers
    pub fn bind(&self, device: &Device) {
        device.bind_vertex_buffer(*self.vertices);
        device.bind_index_buffer(*self.indices);
    }
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Copy vertices and indices into device buffers
    pub fn upload<'d>(&self, device: &'d Device) -> MeshBuffers<'d> {
        MeshBuffers {
            vertices: UniqueBuffer::new(device, bytemuck::cast_slice(&self.vertices)),
            indices: UniqueBuffer::new(device, bytemuck::cast_slice(&self.indices)),
        }
    }

    /// Upload, bind, draw and release in one go
    pub fn draw(&self, device: &Device, fb: &mut Framebuffer, depth: &mut DepthBuffer) -> DrawStats {
        let buffers = self.upload(device);
        buffers.bind(device);
        device.draw_indexed(fb, depth)
    }

    /// Overlay triangle edges, ignoring depth and lighting
    pub fn draw_wireframe(&self, pipeline: &Pipeline, fb: &mut Framebuffer, color: Color) {
        for tri in self.indices.chunks_exact(3) {
            let p = [tri[0], tri[1], tri[2]]
                .map(|i| pipeline.transform.to_screen(self.vertices[i as usize].pos).xy());
            for i in 0..3 {
                fb.draw_line(p[i], p[(i + 1) % 3], color);
            }
        }
    }

    /// Unit cube (side 2, centered on the origin) with outward winding
    pub fn cube() -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        let positions = [
            // Front face
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            // Back face
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            // Top face
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, -1.0),
            // Bottom face
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            // Right face
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            // Left face
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
        ];

        let normals = [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
        ];

        let uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        for (face, normal) in normals.iter().enumerate() {
            let base = face * 4;
            for (i, uv) in uvs.iter().enumerate() {
                vertices.push(Vertex::new(positions[base + i], *normal, *uv));
            }

            // Two triangles per face
            let b = base as u32;
            indices.extend_from_slice(&[b, b + 1, b + 2, b, b + 2, b + 3]);
        }

        Self { vertices, indices }
    }
}
