//! HitRecord for ray-sphere intersection.

use orb_math::{Ray, Vec3};

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Parameter t where the intersection occurs, in ray-direction units
    pub t: f32,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Index of the sphere that was hit in the scene array
    pub index: usize,
}

impl HitRecord {
    /// Build a record from the hit parameter and the outward normal at `p`.
    ///
    /// The normal is always stored pointing against the ray direction, so we
    /// need to track whether we hit the front or back face.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, index: usize) -> Self {
        // Grazing hits (dot == 0) count as entering from outside
        let front_face = ray.direction().dot(outward_normal) <= 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            p: ray.at(t),
            normal,
            t,
            front_face,
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_face_keeps_normal() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let rec = HitRecord::new(&ray, 4.0, Vec3::Z, 0);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
        assert_eq!(rec.p, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_back_face_flips_normal() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let rec = HitRecord::new(&ray, 1.0, Vec3::NEG_Z, 3);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);
        assert_eq!(rec.index, 3);
    }
}
