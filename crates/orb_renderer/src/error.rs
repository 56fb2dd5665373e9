//! Error types for scene validation, settings validation and CPU rendering.

use thiserror::Error;

/// Errors that can occur before or during a CPU render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render setting `{field}`: {reason}")]
    InvalidSettings {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Image of {width}x{height} pixels does not fit in memory")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("Sphere {index} is invalid: {reason}")]
    InvalidSphere { index: usize, reason: &'static str },

    #[error("Camera was built for {camera_width}x{camera_height} pixels, render requested {width}x{height}")]
    CameraSizeMismatch {
        camera_width: u32,
        camera_height: u32,
        width: u32,
        height: u32,
    },

    #[error("Framebuffer expects {expected} pixels, got {actual}")]
    FramebufferSize { expected: usize, actual: usize },

    #[error("Failed to build worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type RenderResult<T> = Result<T, RenderError>;
