//! Errors from the accelerator path.
//!
//! Kept apart from `orb_renderer::RenderError` so a device failure is never
//! mistaken for a CPU-path failure.

use std::path::PathBuf;

use orb_renderer::RenderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No compatible GPU adapter available")]
    NoAdapter,

    #[error("Failed to request GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("Kernel source {path} could not be read: {source}")]
    KernelSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Kernel failed to compile:\n{0}")]
    KernelCompile(String),

    #[error("Framebuffer of {bytes} bytes exceeds the device limit of {limit} bytes")]
    FramebufferTooLarge { bytes: u64, limit: u64 },

    #[error("Dispatch of {groups_x}x{groups_y} workgroups exceeds the device limit of {limit} per dimension")]
    DispatchTooLarge { groups_x: u32, groups_y: u32, limit: u32 },

    #[error("Scene of {spheres} spheres exceeds the device storage limit of {limit} bytes")]
    SceneTooLarge { spheres: usize, limit: u64 },

    #[error("Failed to map readback buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("Readback channel closed before the buffer was mapped")]
    ReadbackChannelClosed,

    #[error("Device error during render: {0}")]
    Device(String),

    #[error(transparent)]
    Settings(#[from] RenderError),
}

pub type GpuResult<T> = Result<T, GpuError>;
