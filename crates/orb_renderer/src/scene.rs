//! Scene model: an ordered array of spheres.
//!
//! Index 0 is conventionally the ground sphere. Intersection is a brute-force
//! linear scan that always resolves the globally closest hit.

use orb_math::{Interval, Ray};
use serde::{Deserialize, Serialize};

use crate::{HitRecord, RenderError, RenderResult, Sphere};

/// Hits closer than this (in ray-direction units) are treated as the surface
/// the ray just left.
pub const T_MIN: f32 = 0.001;

/// An ordered, render-immutable collection of spheres.
///
/// Serializes as a plain array of spheres; deserialization rejects spheres
/// that fail [`Sphere::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Sphere>", into = "Vec<Sphere>")]
pub struct Scene {
    spheres: Vec<Sphere>,
}

impl Scene {
    /// Create a scene from a list of spheres.
    pub fn new(spheres: Vec<Sphere>) -> Self {
        Self { spheres }
    }

    /// Add a sphere to the end of the list.
    pub fn push(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    /// All spheres in scene order.
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    /// Get the number of spheres.
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Check every sphere, reporting the first invalid one by index.
    pub fn validate(&self) -> RenderResult<()> {
        for (index, sphere) in self.spheres.iter().enumerate() {
            sphere
                .validate()
                .map_err(|reason| RenderError::InvalidSphere { index, reason })?;
        }
        Ok(())
    }

    /// Find the closest intersection with t in (T_MIN, infinity).
    pub fn hit(&self, ray: &Ray) -> Option<HitRecord> {
        self.hit_within(ray, Interval::new(T_MIN, f32::INFINITY))
    }

    /// Find the closest intersection within `ray_t`.
    ///
    /// Every sphere is tested; there is no early exit, so overlapping spheres
    /// resolve to whichever surface is nearest.
    pub fn hit_within(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<(f32, usize)> = None;
        let mut search = ray_t;

        for (index, sphere) in self.spheres.iter().enumerate() {
            if let Some(t) = sphere.hit(ray, search) {
                closest = Some((t, index));
                search = search.with_max(t);
            }
        }

        closest.map(|(t, index)| {
            let sphere = &self.spheres[index];
            let outward_normal = sphere.outward_normal(ray.at(t));
            HitRecord::new(ray, t, outward_normal, index)
        })
    }
}

impl TryFrom<Vec<Sphere>> for Scene {
    type Error = RenderError;

    fn try_from(spheres: Vec<Sphere>) -> RenderResult<Self> {
        let scene = Self::new(spheres);
        scene.validate()?;
        Ok(scene)
    }
}

impl From<Scene> for Vec<Sphere> {
    fn from(scene: Scene) -> Self {
        scene.spheres
    }
}
