//! Color and depth targets

use super::math::IVec2;
use super::types::Color;

/// Framebuffer for software rendering
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pub pixels: Vec<Color>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![Color::BLACK; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Pixel at x,y. Not clamped: out-of-range coordinates panic.
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    /// Write pixel at x,y. Not clamped: callers keep coordinates in range.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        self.pixels[y * self.width + x] = color;
    }

    /// Draw a line from p0 to p1, skipping pixels outside the image.
    /// Only the part of the line over the image is walked.
    pub fn draw_line(&mut self, p0: IVec2, p1: IVec2, color: Color) {
        let (mut x0, mut y0) = (p0.x as i64, p0.y as i64);
        let (mut x1, mut y1) = (p1.x as i64, p1.y as i64);

        // Steep lines are walked along y by transposing
        let steep = (x0 - x1).abs() < (y0 - y1).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }

        let extent = if steep { self.height } else { self.width } as i64;
        let dx = x1 - x0;
        for x in x0.max(0)..=x1.min(extent - 1) {
            let t = if dx == 0 { 0.0 } else { (x - x0) as f64 / dx as f64 };
            let y = (y0 as f64 * (1.0 - t) + y1 as f64 * t).round() as i64;
            let (px, py) = if steep { (y, x) } else { (x, y) };
            if px >= 0 && py >= 0 && (px as usize) < self.width && (py as usize) < self.height {
                self.set_pixel(px as usize, py as usize, color);
            }
        }
    }

    /// Pack into RGBA8 bytes, row 0 first
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_bytes()).collect()
    }

    /// Pack into 0x00RRGGBB words for XRGB display surfaces
    pub fn to_xrgb(&self) -> Vec<u32> {
        self.pixels.iter().map(|c| c.to_u32()).collect()
    }
}

/// Per-pixel depth. Larger values are nearer; `-inf` means nothing drawn.
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    pub values: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            values: vec![f32::NEG_INFINITY; width * height],
            width,
            height,
        }
    }

    /// Forget everything drawn; call before each frame that redraws the scene
    pub fn reset(&mut self) {
        self.values.fill(f32::NEG_INFINITY);
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    /// Depth test at x,y. Stores `z` and returns true iff it is nearer
    /// (strictly larger) than what is stored.
    pub fn test_and_set(&mut self, x: usize, y: usize, z: f32) -> bool {
        let stored = &mut self.values[y * self.width + x];
        if z > *stored {
            *stored = z;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_starts_empty() {
        let depth = DepthBuffer::new(4, 3);
        assert_eq!(depth.values.len(), 12);
        assert!(depth.values.iter().all(|d| *d == f32::NEG_INFINITY));
    }

    #[test]
    fn test_depth_test_keeps_larger() {
        let mut depth = DepthBuffer::new(2, 2);
        assert!(depth.test_and_set(1, 1, 0.2));
        assert!(!depth.test_and_set(1, 1, 0.2));
        assert!(!depth.test_and_set(1, 1, 0.1));
        assert!(depth.test_and_set(1, 1, 0.8));
        assert_eq!(depth.get(1, 1), 0.8);

        depth.reset();
        assert_eq!(depth.get(1, 1), f32::NEG_INFINITY);
    }

    #[test]
    fn test_horizontal_line() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_line(IVec2::new(2, 5), IVec2::new(7, 5), Color::WHITE);
        for x in 2..=7 {
            assert_eq!(fb.pixel(x, 5), Color::WHITE);
        }
        assert_eq!(fb.pixel(1, 5), Color::BLACK);
        assert_eq!(fb.pixel(8, 5), Color::BLACK);
    }

    #[test]
    fn test_steep_line_is_continuous() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_line(IVec2::new(4, 9), IVec2::new(5, 0), Color::WHITE);
        for y in 0..10 {
            let lit = (0..10).filter(|&x| fb.pixel(x, y) == Color::WHITE).count();
            assert_eq!(lit, 1, "row {y}");
        }
    }

    #[test]
    fn test_line_clips_to_image() {
        let mut fb = Framebuffer::new(4, 4);
        fb.draw_line(IVec2::new(-10, 1), IVec2::new(10, 1), Color::RED);
        assert!((0..4).all(|x| fb.pixel(x, 1) == Color::RED));
    }

    #[test]
    fn test_line_with_extreme_endpoints() {
        let mut fb = Framebuffer::new(4, 4);
        fb.draw_line(IVec2::new(i32::MIN, 2), IVec2::new(i32::MAX, 2), Color::RED);
        assert!((0..4).all(|x| fb.pixel(x, 2) == Color::RED));

        fb.draw_line(IVec2::new(i32::MIN, i32::MIN), IVec2::new(i32::MAX, i32::MAX), Color::GREEN);
        assert!(fb.pixels.iter().any(|c| *c == Color::GREEN));
    }

    #[test]
    fn test_to_rgba8() {
        let mut fb = Framebuffer::new(2, 1);
        fb.set_pixel(1, 0, Color::RED);
        assert_eq!(fb.to_rgba8(), vec![0, 0, 0, 255, 255, 0, 0, 255]);
        assert_eq!(fb.to_xrgb(), vec![0, 0x00FF_0000]);
    }
}
