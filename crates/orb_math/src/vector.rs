// Scattering helpers for Vec3
//
// Extends glam::Vec3 with the reflect/refract operations the shading kernel needs.
// glam already provides dot(), cross(), normalize() and length().

use glam::Vec3;

/// Threshold below which every component counts as zero.
const NEAR_ZERO: f32 = 1e-8;

/// Extension trait for Vec3 to provide ray tracing utilities
pub trait Vec3Ext {
    /// Reflect this vector about a surface normal `n` (expected unit length).
    fn reflect(self, n: Vec3) -> Vec3;

    /// Refract this unit vector through a surface with normal `n`.
    ///
    /// `etai_over_etat` is the ratio of refraction indices (incident over
    /// transmitted). Uses the perpendicular/parallel decomposition; callers
    /// must rule out total internal reflection beforehand.
    fn refract(self, n: Vec3, etai_over_etat: f32) -> Vec3;

    /// True when all three components are below 1e-8 in magnitude.
    fn near_zero(self) -> bool;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn reflect(self, n: Vec3) -> Vec3 {
        self - 2.0 * self.dot(n) * n
    }

    #[inline]
    fn refract(self, n: Vec3, etai_over_etat: f32) -> Vec3 {
        let cos_theta = (-self).dot(n).min(1.0);
        let r_out_perp = etai_over_etat * (self + cos_theta * n);
        let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
        r_out_perp + r_out_parallel
    }

    #[inline]
    fn near_zero(self) -> bool {
        self.abs().cmplt(Vec3::splat(NEAR_ZERO)).all()
    }
}
