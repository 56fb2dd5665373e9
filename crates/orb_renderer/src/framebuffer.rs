//! Float framebuffer handed from the render drivers to post-processing.

use orb_math::Color;

use crate::{RenderError, RenderResult};

/// Row-major buffer of linear colors. Row 0 is the bottom of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a new framebuffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Wrap pixels produced elsewhere, e.g. read back from a device.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> RenderResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(RenderError::FramebufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Mean absolute per-channel difference, or `None` when sizes differ.
    ///
    /// Used to compare backends, which agree statistically but not bit for bit.
    pub fn mean_abs_difference(&self, other: &Framebuffer) -> Option<f32> {
        if self.width != other.width || self.height != other.height {
            return None;
        }
        if self.pixels.is_empty() {
            return Some(0.0);
        }
        let total: f64 = self
            .pixels
            .iter()
            .zip(&other.pixels)
            .map(|(a, b)| f64::from((*a - *b).abs().element_sum()))
            .sum();
        Some((total / (self.pixels.len() * 3) as f64) as f32)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
