//! Per-pixel deterministic random numbers.
//!
//! Every pixel owns a generator seeded from its coordinates
//! (`x + width * y`), so a pixel's samples do not depend on which worker
//! renders it or in what order. The generator is a PCG-style hash over a
//! 32-bit state; the same arithmetic runs in the WGSL kernel.

use orb_math::Vec3;
use std::f32::consts::PI;

/// Scale mapping the top 24 bits of a `u32` to `[0, 1)`.
const INV_2_POW_24: f32 = 1.0 / 16_777_216.0;

/// Counter-based hash generator with a 32-bit state.
///
/// Statistically adequate for sampling, not for cryptography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRng {
    state: u32,
}

impl PixelRng {
    /// Create a generator from a raw seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Create the generator owned by pixel (x, y) of an image `width` pixels wide.
    pub fn for_pixel(x: u32, y: u32, width: u32) -> Self {
        Self::new(x.wrapping_add(width.wrapping_mul(y)))
    }

    /// Advance the state and return the next hashed word.
    #[inline]
    pub fn next_word(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(747_796_405)
            .wrapping_add(2_891_336_453);
        let state = self.state;
        let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
        (word >> 22) ^ word
    }

    /// Uniform float in `[0, 1)`.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_word() >> 8) as f32 * INV_2_POW_24
    }

    /// Uniformly distributed point on the unit sphere.
    ///
    /// Spherical coordinates: uniform cosine of the polar angle and uniform
    /// azimuth, so no rejection loop.
    pub fn unit_vector(&mut self) -> Vec3 {
        let z = 1.0 - 2.0 * self.next_f32();
        let phi = 2.0 * PI * self.next_f32();
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * phi.cos(), r * phi.sin(), z)
    }

    /// Uniformly distributed point in the unit disk (z = 0).
    ///
    /// The square-root radius keeps the density uniform over area.
    pub fn in_unit_disk(&mut self) -> Vec3 {
        let r = self.next_f32().sqrt();
        let theta = 2.0 * PI * self.next_f32();
        Vec3::new(r * theta.cos(), r * theta.sin(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = PixelRng::for_pixel(17, 4, 640);
        let mut b = PixelRng::new(17 + 640 * 4);
        for _ in 0..64 {
            assert_eq!(a.next_word(), b.next_word());
        }
    }

    #[test]
    fn test_neighbouring_pixels_diverge() {
        let mut a = PixelRng::for_pixel(0, 0, 100);
        let mut b = PixelRng::for_pixel(1, 0, 100);
        let same = (0..32).filter(|_| a.next_word() == b.next_word()).count();
        assert_eq!(same, 0);
    }

    #[test]
    fn test_f32_range_and_mean() {
        let mut rng = PixelRng::new(12345);
        let n = 20_000;
        let mut sum = 0.0f64;
        for _ in 0..n {
            let u = rng.next_f32();
            assert!((0.0..1.0).contains(&u), "sample {u} out of [0, 1)");
            sum += u as f64;
        }
        let mean = sum / n as f64;
        assert!((mean - 0.5).abs() < 0.01, "mean={mean}");
    }

    #[test]
    fn test_unit_vector_is_unit_and_centred() {
        let mut rng = PixelRng::new(7);
        let mut mean = Vec3::ZERO;
        let n = 10_000;
        for _ in 0..n {
            let v = rng.unit_vector();
            assert!((v.length() - 1.0).abs() < 1e-4);
            mean += v;
        }
        mean /= n as f32;
        // Uniform on the sphere: mean tends to the origin
        assert!(mean.length() < 0.05, "mean={mean:?}");
    }

    #[test]
    fn test_unit_disk_bounds_and_area_density() {
        let mut rng = PixelRng::new(99);
        let n = 10_000;
        let mut inner = 0;
        for _ in 0..n {
            let p = rng.in_unit_disk();
            assert_eq!(p.z, 0.0);
            assert!(p.length() <= 1.0 + 1e-6);
            if p.length() < std::f32::consts::FRAC_1_SQRT_2 {
                inner += 1;
            }
        }
        // Half the area lies inside radius 1/sqrt(2)
        let fraction = inner as f32 / n as f32;
        assert!((fraction - 0.5).abs() < 0.03, "fraction={fraction}");
    }
}
