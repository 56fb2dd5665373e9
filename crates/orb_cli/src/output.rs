//! Post-processing: gamma, 8-bit quantization, vertical flip and PNG output.

use std::path::Path;

use anyhow::{Context, Result};
use image::RgbImage;
use orb_renderer::{Color, Framebuffer};

/// Gamma 2 encoding; negative channels clamp to zero.
pub fn gamma_encode(c: f32) -> f32 {
    c.max(0.0).sqrt()
}

/// Map an encoded channel in [0, 1] to a byte.
pub fn quantize(c: f32) -> u8 {
    (c * 255.999).clamp(0.0, 255.0) as u8
}

pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [
        quantize(gamma_encode(color.x)),
        quantize(gamma_encode(color.y)),
        quantize(gamma_encode(color.z)),
    ]
}

/// Encode a framebuffer for saving. Row 0 of the framebuffer is the bottom
/// of the picture, so rows are written in reverse.
pub fn to_rgb_image(framebuffer: &Framebuffer) -> RgbImage {
    let height = framebuffer.height();
    RgbImage::from_fn(framebuffer.width(), height, |x, y| {
        image::Rgb(color_to_rgb(framebuffer.get(x, height - 1 - y)))
    })
}

pub fn save_png(framebuffer: &Framebuffer, path: &Path) -> Result<()> {
    to_rgb_image(framebuffer)
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Saved {}", path.display());
    Ok(())
}
