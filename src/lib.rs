//! yasr: yet another software rasterizer
//!
//! Projects indexed triangle meshes through a view/projection transform,
//! rasterizes them with barycentric coordinates and a z-buffer, and shades
//! them flat (optionally textured). A small handle-based [`device::Device`]
//! mirrors the shape of a hardware API: create buffers, bind them, draw.

pub mod assets;
pub mod config;
pub mod device;
pub mod logging;
pub mod rasterizer;
pub mod scene;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
