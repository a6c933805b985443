//! Core types for the rasterizer

use std::fmt;
use std::ops::Mul;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::math::{Vec2, Vec3};

/// Float RGB color, working range [0, 1)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0 };
    pub const GREEN: Color = Color { r: 0.0, g: 1.0, b: 0.0 };
    pub const BLUE: Color = Color { r: 0.0, g: 0.0, b: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Same value in all three channels
    pub const fn gray(i: f32) -> Self {
        Self { r: i, g: i, b: i }
    }

    /// Raise every channel to `exponent`
    pub fn gamma(self, exponent: f32) -> Self {
        Self {
            r: self.r.powf(exponent),
            g: self.g.powf(exponent),
            b: self.b.powf(exponent),
        }
    }

    fn channel_to_u8(c: f32) -> u8 {
        // `as` saturates, so out-of-range channels clamp to 0 or 255
        (c * 255.99) as u8
    }

    /// Pack as 0x00RRGGBB (XRGB8888 display surfaces)
    pub fn to_u32(self) -> u32 {
        let r = Self::channel_to_u8(self.r) as u32;
        let g = Self::channel_to_u8(self.g) as u32;
        let b = Self::channel_to_u8(self.b) as u32;
        (r << 16) | (g << 8) | b
    }

    /// Convert to opaque [u8; 4] RGBA
    pub fn to_bytes(self) -> [u8; 4] {
        [
            Self::channel_to_u8(self.r),
            Self::channel_to_u8(self.g),
            Self::channel_to_u8(self.b),
            255,
        ]
    }
}

impl Mul for Color {
    type Output = Color;
    fn mul(self, other: Color) -> Color {
        Color {
            r: self.r * other.r,
            g: self.g * other.g,
            b: self.b * other.b,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({},{},{})", self.r, self.g, self.b)
    }
}

/// A vertex with position, normal, and texture coordinate.
///
/// `#[repr(C)]` and `Pod` so vertex arrays can be uploaded to a device
/// buffer as raw bytes and read back without copies of the layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
pub struct Vertex {
    pub pos: Vec3,
    pub normal: Vec3,
    pub texcoord: Vec2,
}

impl Vertex {
    pub fn new(pos: Vec3, normal: Vec3, texcoord: Vec2) -> Self {
        Self { pos, normal, texcoord }
    }

    pub fn from_pos(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vec3::new(x, y, z),
            normal: Vec3::ZERO,
            texcoord: Vec2::default(),
        }
    }
}

/// Float texture, as produced by the image loader
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    /// Channels per texel; the first three are read as RGB
    pub channels: usize,
    pub data: Vec<f32>,
}

/// Reasons a texture cannot be built from raw channel data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextureError {
    #[error("texture has zero size ({width}x{height})")]
    Empty { width: usize, height: usize },

    #[error("texture needs at least 3 channels, got {0}")]
    TooFewChannels(usize),

    #[error("texture data has {got} values, expected {expected}")]
    SizeMismatch { expected: usize, got: usize },
}

impl Texture {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        if channels < 3 {
            return Err(TextureError::TooFewChannels(channels));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Single-color texture. Panics if either dimension is zero.
    pub fn solid(width: usize, height: usize, color: Color) -> Self {
        assert!(width > 0 && height > 0, "empty {width}x{height} texture");
        let data = std::iter::repeat([color.r, color.g, color.b])
            .take(width * height)
            .flatten()
            .collect();
        Self {
            width,
            height,
            channels: 3,
            data,
        }
    }

    /// Create a checkerboard test texture. Panics if either dimension is zero.
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        assert!(width > 0 && height > 0, "empty {width}x{height} texture");
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                let c = if ((x / 4) + (y / 4)) % 2 == 0 { color1 } else { color2 };
                data.extend_from_slice(&[c.r, c.g, c.b]);
            }
        }
        Self {
            width,
            height,
            channels: 3,
            data,
        }
    }

    /// Nearest-texel sample, no filtering.
    ///
    /// V is flipped (v = 1 is the top row). Texel coordinates are truncated
    /// and clamped into the texture, so v = 0 reads the last row.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let w = self.width as f32;
        let h = self.height as f32;
        let tx = ((u * w).max(0.0) as usize).min(self.width - 1);
        let ty = ((h - (v * h).max(0.0)).max(0.0) as usize).min(self.height - 1);
        self.texel(tx, ty)
    }

    /// Texel at x,y (caller keeps coordinates in range)
    pub fn texel(&self, x: usize, y: usize) -> Color {
        let i = (y * self.width + x) * self.channels;
        Color::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn test_color_to_u32() {
        assert_eq!(Color::RED.to_u32(), 0x00FF_0000);
        assert_eq!(Color::new(0.0, 1.0, 0.0).to_u32(), 0x0000_FF00);
        assert_eq!(Color::BLACK.to_u32(), 0);
    }

    #[test]
    fn test_color_to_u32_saturates() {
        assert_eq!(Color::new(2.0, -1.0, 0.0).to_u32(), 0x00FF_0000);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::new(1.0, 0.5, 0.0).to_string(), "RGB(1,0.5,0)");
    }

    #[test]
    fn test_gamma() {
        let c = Color::gray(0.25).gamma(0.5);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert!((c.b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_texture_new_validates() {
        assert_eq!(
            Texture::new(2, 2, 3, vec![0.0; 11]).unwrap_err(),
            TextureError::SizeMismatch { expected: 12, got: 11 }
        );
        assert_eq!(
            Texture::new(2, 2, 1, vec![0.0; 4]).unwrap_err(),
            TextureError::TooFewChannels(1)
        );
        assert!(Texture::new(0, 2, 3, vec![]).is_err());
        assert!(Texture::new(2, 2, 4, vec![0.0; 16]).is_ok());
    }

    #[test]
    #[should_panic(expected = "empty 0x4 texture")]
    fn test_solid_rejects_empty() {
        Texture::solid(0, 4, Color::WHITE);
    }

    #[test]
    #[should_panic(expected = "empty 4x0 texture")]
    fn test_checkerboard_rejects_empty() {
        Texture::checkerboard(4, 0, Color::WHITE, Color::BLACK);
    }

    #[test]
    fn test_sample_flips_v() {
        // 1x2 texture: top row red, bottom row blue
        let tex = Texture::new(1, 2, 3, vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(tex.sample(0.0, 0.9), Color::RED);
        assert_eq!(tex.sample(0.0, 0.1), Color::BLUE);
    }

    #[test]
    fn test_sample_clamps_edges() {
        let tex = Texture::checkerboard(8, 8, Color::WHITE, Color::BLACK);
        // v = 0 would address row 8; clamps to the last row
        assert_eq!(tex.sample(0.0, 0.0), tex.texel(0, 7));
        assert_eq!(tex.sample(1.0, 1.0), tex.texel(7, 0));
        assert_eq!(tex.sample(-3.0, 5.0), tex.texel(0, 0));
    }
}
