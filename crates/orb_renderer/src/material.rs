//! Closed set of surface scattering laws.

use orb_math::{Ray, Vec3, Vec3Ext};
use serde::{Deserialize, Serialize};

use crate::{HitRecord, PixelRng};

/// Surface material of a sphere.
///
/// Each variant carries exactly one parameter, which keeps the flat
/// transfer record (one float plus a tag) lossless.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Material {
    /// Diffuse surface. `roughness` blends between a fixed normal bounce
    /// (0.0) and a full Lambertian scatter (1.0).
    Lambertian { roughness: f32 },
    /// Specular surface. `fuzz` jitters the mirror direction, 0.0 = perfect mirror.
    Metal { fuzz: f32 },
    /// Transparent surface with the given index of refraction (> 1.0 for glass).
    Dielectric { refraction_index: f32 },
}

impl Material {
    /// Lambertian material with the given roughness.
    pub fn lambertian(roughness: f32) -> Self {
        Self::Lambertian { roughness }
    }

    /// Metal material with the given fuzziness.
    pub fn metal(fuzz: f32) -> Self {
        Self::Metal { fuzz }
    }

    /// Dielectric material with the given index of refraction.
    pub fn dielectric(refraction_index: f32) -> Self {
        Self::Dielectric { refraction_index }
    }

    /// The single per-variant parameter (roughness, fuzz or index of refraction).
    pub fn parameter(&self) -> f32 {
        match *self {
            Self::Lambertian { roughness } => roughness,
            Self::Metal { fuzz } => fuzz,
            Self::Dielectric { refraction_index } => refraction_index,
        }
    }

    /// Pick the direction of the next bounce.
    ///
    /// Every material scatters; absorption only happens through the bounce
    /// budget running out.
    pub fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut PixelRng) -> Ray {
        let direction = match *self {
            Self::Lambertian { roughness } => {
                let scatter_direction = rec.normal + roughness * rng.unit_vector();

                // Catch degenerate scatter direction
                if scatter_direction.near_zero() {
                    rec.normal
                } else {
                    scatter_direction
                }
            }
            Self::Metal { fuzz } => {
                // Reflect the unit direction so fuzz is relative to a unit-length
                // reflection. Fuzzed directions that dip below the surface are kept.
                let reflected = ray_in.direction().normalize().reflect(rec.normal);
                reflected + fuzz * rng.unit_vector()
            }
            Self::Dielectric { refraction_index } => {
                let refraction_ratio = if rec.front_face {
                    1.0 / refraction_index
                } else {
                    refraction_index
                };

                let unit_direction = ray_in.direction().normalize();
                let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

                // Check for total internal reflection
                let cannot_refract = refraction_ratio * sin_theta > 1.0;

                if cannot_refract || reflectance(cos_theta, refraction_ratio) > rng.next_f32() {
                    unit_direction.reflect(rec.normal)
                } else {
                    unit_direction.refract(rec.normal, refraction_ratio)
                }
            }
        };

        Ray::new(rec.p, direction)
    }
}

/// Schlick's approximation for reflectance
pub fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
