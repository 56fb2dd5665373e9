//! Sphere primitive for ray tracing.

use orb_math::{Color, Interval, Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::Material;

/// A sphere with its surface appearance.
///
/// Immutable once the scene is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    /// Per-channel reflectance in [0, 1]
    pub albedo: Color,
    pub material: Material,
}

impl Sphere {
    /// Create a new sphere. Geometry is checked by [`Sphere::validate`].
    pub fn new(center: Vec3, radius: f32, albedo: Color, material: Material) -> Self {
        Self {
            center,
            radius,
            albedo,
            material,
        }
    }

    /// Reject geometry the intersection test cannot handle: a zero radius
    /// divides the normal by zero, a negative one turns normals inside out.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.center.is_finite() {
            return Err("center must be finite");
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err("radius must be finite and greater than zero");
        }
        Ok(())
    }

    /// Intersect a ray with this sphere.
    ///
    /// Returns the smallest root strictly inside `ray_t`. When the near root
    /// is rejected (behind the origin, or within the self-intersection
    /// epsilon) the far root is tried, so rays travelling inside a sphere
    /// still find its back face.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let half_b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (-half_b - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (-half_b + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        Some(root)
    }

    /// Outward unit normal at a point on the surface.
    #[inline]
    pub fn outward_normal(&self, p: Vec3) -> Vec3 {
        (p - self.center) / self.radius
    }
}
