//! Core path tracing kernel.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative bounce loop with a fixed depth budget
//! - Implicit sky gradient as the only light source
//! - Anti-aliasing via jittered multi-sampling

use orb_math::{Color, Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::{Camera, PixelRng, RenderError, RenderResult, Scene};

/// Horizon color of the sky gradient.
pub const SKY_WHITE: Color = Vec3::ONE;

/// Zenith color of the sky gradient.
pub const SKY_BLUE: Color = Vec3::new(0.5, 0.7, 1.0);

/// Render configuration shared by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
}

impl RenderSettings {
    pub fn new(width: u32, height: u32, samples_per_pixel: u32, max_depth: u32) -> Self {
        Self {
            width,
            height,
            samples_per_pixel,
            max_depth,
        }
    }

    /// Reject zero-sized images and empty sample or bounce budgets.
    pub fn validate(&self) -> RenderResult<()> {
        let checks = [
            ("width", self.width),
            ("height", self.height),
            ("samples_per_pixel", self.samples_per_pixel),
            ("max_depth", self.max_depth),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(RenderError::InvalidSettings {
                    field,
                    reason: "must be non-zero",
                });
            }
        }
        self.pixel_count().map(|_| ())
    }

    /// Everything a backend checks before rendering: these settings, the
    /// camera's image size against them, and every sphere in the scene.
    pub fn validate_render(&self, scene: &Scene, camera: &Camera) -> RenderResult<()> {
        self.validate()?;

        let (camera_width, camera_height) = camera.image_size();
        if (camera_width, camera_height) != (self.width, self.height) {
            return Err(RenderError::CameraSizeMismatch {
                camera_width,
                camera_height,
                width: self.width,
                height: self.height,
            });
        }

        scene.validate()
    }

    /// Number of pixels, checked against address-space overflow.
    pub fn pixel_count(&self) -> RenderResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .ok_or(RenderError::ImageTooLarge {
                width: self.width,
                height: self.height,
            })
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 400,
            height: 225,
            samples_per_pixel: 10,
            max_depth: 10,
        }
    }
}

/// Compute sky gradient background for a ray direction of any length.
pub fn sky_color(direction: Vec3) -> Color {
    let a = 0.5 * (direction.y / direction.length() + 1.0);
    SKY_WHITE * (1.0 - a) + SKY_BLUE * a
}

/// Compute the color carried back along one sample path.
///
/// The path bounces until it escapes to the sky or spends `max_depth`
/// interactions. A path that never reaches the sky contributes black: its
/// light is treated as fully absorbed.
pub fn trace_path(ray: &Ray, scene: &Scene, max_depth: u32, rng: &mut PixelRng) -> Color {
    let mut ray = *ray;
    let mut attenuation = Color::ONE;

    for _ in 0..max_depth {
        let Some(rec) = scene.hit(&ray) else {
            return attenuation * sky_color(ray.direction());
        };

        let sphere = &scene.spheres()[rec.index];
        attenuation *= sphere.albedo;
        ray = sphere.material.scatter(&ray, &rec, rng);
    }

    Color::ZERO
}

/// Render a single pixel with multi-sampling.
///
/// The caller owns the generator; drivers seed it with
/// [`PixelRng::for_pixel`] so the result only depends on the coordinates.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    settings: &RenderSettings,
    rng: &mut PixelRng,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..settings.samples_per_pixel {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += trace_path(&ray, scene, settings.max_depth, rng);
    }

    // Average the samples
    pixel_color / settings.samples_per_pixel as f32
}
