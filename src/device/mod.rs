//! Software graphics device
//!
//! A tiny immediate-mode API in the shape of a hardware one: raw byte
//! buffers behind opaque handles, one bound vertex buffer and one bound
//! index buffer, and a single `draw_indexed` entry point that runs the
//! whole pipeline synchronously.
//!
//! Misuse (stale or foreign handles, drawing with nothing bound, indices
//! past the end of the vertex buffer) is a caller bug and panics. The
//! `try_*` variants report the same conditions as [`DeviceError`].

mod handle;
mod unique;

pub use handle::Buffer;
pub use unique::UniqueBuffer;

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::{ConfigError, RenderConfig};
use crate::rasterizer::{draw_triangles, DepthBuffer, DrawStats, Framebuffer, Pipeline, Texture, Vertex};
use handle::BufferArena;

static NEXT_DEVICE_ID: AtomicU32 = AtomicU32::new(0);

const VERTEX_SIZE: usize = std::mem::size_of::<Vertex>();
const INDEX_SIZE: usize = std::mem::size_of::<u32>();

/// Device precondition violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("buffer {0:?} was destroyed")]
    StaleHandle(Buffer),

    #[error("buffer {0:?} belongs to another device")]
    ForeignHandle(Buffer),

    #[error("no vertex buffer bound")]
    NoVertexBuffer,

    #[error("no index buffer bound")]
    NoIndexBuffer,

    #[error("vertex buffer is {len} bytes, not a multiple of {}", VERTEX_SIZE)]
    MisalignedVertexBuffer { len: usize },

    #[error("index buffer is {len} bytes, not a multiple of {}", INDEX_SIZE)]
    MisalignedIndexBuffer { len: usize },

    #[error("index {index} out of range for {count} vertices")]
    IndexOutOfRange { index: u32, count: usize },

    #[error("render target is {got_width}x{got_height}, device renders {width}x{height}")]
    TargetSizeMismatch {
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },
}

/// Software rendering device.
///
/// Methods take `&self` so scoped [`UniqueBuffer`]s can borrow the device
/// while it is still used; the device is not `Sync`.
pub struct Device {
    id: u32,
    buffers: RefCell<BufferArena>,
    vertex_buffer: Cell<Option<Buffer>>,
    index_buffer: Cell<Option<Buffer>>,
    pipeline: Pipeline,
    texture: Option<Texture>,
}

impl Device {
    /// Panics if the config is invalid (zero width or height).
    pub fn new(config: &RenderConfig) -> Self {
        match Self::try_new(config) {
            Ok(device) => device,
            Err(e) => panic!("Device::new: {e}"),
        }
    }

    pub fn try_new(config: &RenderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let id = NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed);
        log::debug!("device {id}: {}x{}", config.width, config.height);

        Ok(Self {
            id,
            buffers: RefCell::new(BufferArena::new(id)),
            vertex_buffer: Cell::new(None),
            index_buffer: Cell::new(None),
            pipeline: config.pipeline(),
            texture: None,
        })
    }

    /// Sample this texture for every drawn fragment
    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn width(&self) -> usize {
        self.pipeline.transform.width()
    }

    pub fn height(&self) -> usize {
        self.pipeline.transform.height()
    }

    /// Color target sized for this device, cleared to black
    pub fn create_framebuffer(&self) -> Framebuffer {
        Framebuffer::new(self.width(), self.height())
    }

    /// Depth target sized for this device, reset to `-inf`
    pub fn create_depth_buffer(&self) -> DepthBuffer {
        DepthBuffer::new(self.width(), self.height())
    }

    /// Copy `bytes` into device storage
    pub fn create_buffer(&self, bytes: &[u8]) -> Buffer {
        let buffer = self.buffers.borrow_mut().insert(bytes);
        log::trace!("device {}: created {:?} ({} bytes)", self.id, buffer, bytes.len());
        buffer
    }

    /// Release a buffer. Panics if the handle is stale or foreign.
    pub fn destroy_buffer(&self, buffer: Buffer) {
        if let Err(e) = self.try_destroy_buffer(buffer) {
            panic!("destroy_buffer: {e}");
        }
    }

    pub fn try_destroy_buffer(&self, buffer: Buffer) -> Result<(), DeviceError> {
        self.buffers.borrow_mut().remove(buffer)?;
        log::trace!("device {}: destroyed {:?}", self.id, buffer);
        Ok(())
    }

    /// Number of live buffers
    pub fn buffer_count(&self) -> usize {
        self.buffers.borrow().len()
    }

    /// Replace the vertex buffer binding. Panics if the handle is stale or foreign.
    pub fn bind_vertex_buffer(&self, buffer: Buffer) {
        self.checked(buffer, "bind_vertex_buffer");
        self.vertex_buffer.set(Some(buffer));
    }

    /// Replace the index buffer binding. Panics if the handle is stale or foreign.
    pub fn bind_index_buffer(&self, buffer: Buffer) {
        self.checked(buffer, "bind_index_buffer");
        self.index_buffer.set(Some(buffer));
    }

    fn checked(&self, buffer: Buffer, op: &str) {
        if let Err(e) = self.buffers.borrow().get(buffer) {
            panic!("{op}: {e}");
        }
    }

    /// Draw the bound index buffer as a triangle list over the bound vertex
    /// buffer. Panics on any precondition violation.
    pub fn draw_indexed(&self, fb: &mut Framebuffer, depth: &mut DepthBuffer) -> DrawStats {
        match self.try_draw_indexed(fb, depth) {
            Ok(stats) => stats,
            Err(e) => panic!("draw_indexed: {e}"),
        }
    }

    /// Same as [`Device::draw_indexed`], but reports precondition violations.
    /// Nothing is drawn when an error is returned.
    pub fn try_draw_indexed(
        &self,
        fb: &mut Framebuffer,
        depth: &mut DepthBuffer,
    ) -> Result<DrawStats, DeviceError> {
        self.check_target(fb.width, fb.height)?;
        self.check_target(depth.width, depth.height)?;

        let vertex_buffer = self.vertex_buffer.get().ok_or(DeviceError::NoVertexBuffer)?;
        let index_buffer = self.index_buffer.get().ok_or(DeviceError::NoIndexBuffer)?;

        let buffers = self.buffers.borrow();
        let vertices = read_vertices(buffers.get(vertex_buffer)?)?;
        let indices = read_indices(buffers.get(index_buffer)?)?;
        drop(buffers);

        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(DeviceError::IndexOutOfRange {
                index,
                count: vertices.len(),
            });
        }
        if indices.len() % 3 != 0 {
            log::warn!(
                "device {}: {} indices is not a multiple of 3, ignoring the last {}",
                self.id,
                indices.len(),
                indices.len() % 3
            );
        }

        let stats = draw_triangles(fb, depth, &vertices, &indices, &self.pipeline, self.texture.as_ref());
        log::debug!(
            "device {}: drew {} triangles ({} culled), {} pixels",
            self.id,
            stats.triangles,
            stats.culled,
            stats.pixels
        );
        Ok(stats)
    }

    fn check_target(&self, width: usize, height: usize) -> Result<(), DeviceError> {
        if width != self.width() || height != self.height() {
            return Err(DeviceError::TargetSizeMismatch {
                width: self.width(),
                height: self.height(),
                got_width: width,
                got_height: height,
            });
        }
        Ok(())
    }
}

fn read_vertices(bytes: &[u8]) -> Result<Vec<Vertex>, DeviceError> {
    if bytes.len() % VERTEX_SIZE != 0 {
        return Err(DeviceError::MisalignedVertexBuffer { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(VERTEX_SIZE)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

fn read_indices(bytes: &[u8]) -> Result<Vec<u32>, DeviceError> {
    if bytes.len() % INDEX_SIZE != 0 {
        return Err(DeviceError::MisalignedIndexBuffer { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(INDEX_SIZE)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}
