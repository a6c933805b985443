//! CPU triangle rasterizer
//!
//! Features:
//! - Flat Lambertian shading, one color per triangle
//! - Affine (screen-space linear) texture mapping with gamma correction
//! - Z-buffer where the larger depth wins
//! - No clipping: geometry is clamped to the image, never cut

mod framebuffer;
mod math;
mod render;
mod transform;
mod types;

pub use framebuffer::*;
pub use math::*;
pub use render::*;
pub use transform::*;
pub use types::*;
