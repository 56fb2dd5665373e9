//! Orb GPU - accelerator render driver
//!
//! Runs the path tracing kernel as a wgpu compute shader, one invocation per
//! pixel. The scene and camera are uploaded once per render, the kernel is
//! dispatched over the whole image and the packed float framebuffer is read
//! back. Results follow the same distributions as the CPU driver but are not
//! bit-identical to it.

mod error;
mod renderer;

pub use error::{GpuError, GpuResult};
pub use renderer::{GpuRenderer, GpuTimings, GpuUniforms, KERNEL_SOURCE, WORKGROUP_SIZE};
