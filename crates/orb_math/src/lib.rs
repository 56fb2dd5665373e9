// Re-export glam for convenience
pub use glam::*;

// Orb math types
mod interval;
mod ray;
mod vector;

pub use interval::Interval;
pub use ray::Ray;
pub use vector::Vec3Ext;

/// Linear-space RGB radiance.
///
/// Algebraically identical to `Vec3` (component-wise add/multiply/scale),
/// kept as a separate name so signatures say which one they mean.
pub type Color = Vec3;
