//! Orb Renderer - Monte Carlo sphere path tracing
//!
//! The rendering engine: per-pixel random streams, the sphere scene model,
//! camera ray generation, the intersection & shading kernel and the parallel
//! CPU driver. The accelerator driver lives in `orb_gpu` and consumes the
//! flat records from [`transfer`].

mod backend;
mod camera;
mod error;
mod framebuffer;
mod hittable;
mod material;
mod renderer;
mod rng;
mod scene;
mod sphere;
pub mod transfer;

pub use backend::{CpuRenderer, RenderBackend};
pub use camera::{Camera, CameraParams};
pub use error::{RenderError, RenderResult};
pub use framebuffer::Framebuffer;
pub use hittable::HitRecord;
pub use material::{reflectance, Material};
pub use renderer::{render_pixel, sky_color, trace_path, RenderSettings, SKY_BLUE, SKY_WHITE};
pub use rng::PixelRng;
pub use scene::{Scene, T_MIN};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from orb_math
pub use orb_math::{Color, Interval, Ray, Vec3};
