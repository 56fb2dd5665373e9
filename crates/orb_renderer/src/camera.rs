//! Camera for ray generation.
//!
//! `CameraParams` holds the high-level description (where the eye is, where
//! it looks, lens settings) and `Camera` the derived, immutable state the
//! kernel steps through: the viewport corner, per-pixel step vectors and the
//! defocus disk basis.

use orb_math::{Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::PixelRng;

/// High-level camera description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub vfov_degrees: f32,
    /// Distance from camera to plane of perfect focus
    pub focus_distance: f32,
    /// Variation angle of rays through each pixel, 0 = pinhole
    pub defocus_angle_degrees: f32,
}

impl CameraParams {
    /// Create camera parameters with default settings.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            up: Vec3::Y,
            vfov_degrees: 90.0,
            focus_distance: 1.0,
            defocus_angle_degrees: 0.0,
        }
    }

    /// Minimal pinhole form: a position, a view direction and a field of view.
    ///
    /// Equivalent to the full form with +Y up and no defocus blur.
    pub fn pinhole(position: Vec3, direction: Vec3, vfov_degrees: f32) -> Self {
        Self::new()
            .with_position(position, position + direction, Vec3::Y)
            .with_lens(vfov_degrees, 0.0, 1.0)
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, up: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.up = up;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov_degrees: f32, defocus_angle_degrees: f32, focus_distance: f32) -> Self {
        self.vfov_degrees = vfov_degrees;
        self.defocus_angle_degrees = defocus_angle_degrees;
        self.focus_distance = focus_distance;
        self
    }
}

impl Default for CameraParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Derived camera state for an image of a given size.
///
/// `step_v` walks along +v, so increasing pixel rows move up the image:
/// row 0 is the bottom row of the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    width: u32,
    height: u32,
    origin: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    viewport_upper_left: Vec3,
    step_u: Vec3,
    step_v: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Derive the camera for a `width` x `height` image.
    ///
    /// `up` must not be parallel to the view direction; the basis is
    /// degenerate otherwise.
    pub fn new(params: &CameraParams, width: u32, height: u32) -> Self {
        let origin = params.look_from;

        // Calculate camera basis vectors
        let w = (params.look_from - params.look_at).normalize();
        let u = params.up.cross(w).normalize();
        let v = w.cross(u);

        // Calculate viewport dimensions
        let theta = params.vfov_degrees.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan() * params.focus_distance;
        let viewport_width = viewport_height * (width as f32 / height as f32);

        // Calculate viewport vectors
        let viewport_u = viewport_width * u;
        let viewport_v = viewport_height * v;

        // Calculate pixel step vectors
        let step_u = viewport_u / width as f32;
        let step_v = viewport_v / height as f32;

        let viewport_upper_left =
            origin - params.focus_distance * w - viewport_u / 2.0 - viewport_v / 2.0;

        // Calculate defocus disk basis vectors
        let defocus_radius =
            params.focus_distance * (params.defocus_angle_degrees.to_radians() / 2.0).tan();

        Self {
            width,
            height,
            origin,
            u,
            v,
            w,
            viewport_upper_left,
            step_u,
            step_v,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        }
    }

    /// Image size in pixels the step vectors were derived for.
    pub fn image_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Orthonormal basis (u, v, w); w points backwards from the view direction.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    pub fn viewport_upper_left(&self) -> Vec3 {
        self.viewport_upper_left
    }

    pub fn step_u(&self) -> Vec3 {
        self.step_u
    }

    pub fn step_v(&self) -> Vec3 {
        self.step_v
    }

    pub fn defocus_disk_u(&self) -> Vec3 {
        self.defocus_disk_u
    }

    pub fn defocus_disk_v(&self) -> Vec3 {
        self.defocus_disk_v
    }

    /// True when the defocus disk has non-zero size.
    pub fn has_defocus(&self) -> bool {
        self.defocus_disk_u.length_squared() > 0.0
    }

    /// Generate a jittered ray through pixel (x, y).
    ///
    /// Draws two samples for the in-pixel jitter, then two more for the lens
    /// when depth of field is enabled.
    pub fn get_ray(&self, x: u32, y: u32, rng: &mut PixelRng) -> Ray {
        let jitter_u = rng.next_f32();
        let jitter_v = rng.next_f32();

        let pixel_sample = self.viewport_upper_left
            + (x as f32 + jitter_u) * self.step_u
            + (y as f32 + jitter_v) * self.step_v;

        let ray_origin = if self.has_defocus() {
            self.defocus_disk_sample(rng)
        } else {
            self.origin
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut PixelRng) -> Vec3 {
        let p = rng.in_unit_disk();
        self.origin + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}
