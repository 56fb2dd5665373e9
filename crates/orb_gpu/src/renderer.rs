//! wgpu host side: device setup, kernel compilation, upload, dispatch and
//! readback.

use std::path::Path;
use std::time::{Duration, Instant};

use bytemuck::{Pod, Zeroable};
use futures_intrusive::channel::shared::oneshot_channel;
use orb_math::Color;
use orb_renderer::transfer::{sphere_records, CameraRecord, SphereRecord};
use orb_renderer::{Camera, Framebuffer, RenderBackend, RenderSettings, Scene};
use wgpu::util::DeviceExt;

use crate::{GpuError, GpuResult};

/// The path tracing kernel, compiled into the binary.
pub const KERNEL_SOURCE: &str = include_str!("shaders/path_tracer.wgsl");

/// Workgroup edge length; must match `@workgroup_size` in the kernel.
pub const WORKGROUP_SIZE: u32 = 8;

const KERNEL_ENTRY_POINT: &str = "main";

/// Bytes of one framebuffer pixel on the device (packed RGB f32).
const PIXEL_BYTES: u64 = 3 * std::mem::size_of::<f32>() as u64;

/// Per-render parameters, laid out like the kernel's `Uniforms` struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuUniforms {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub sphere_count: u32,
    pub _pad: [u32; 3],
    pub camera: CameraRecord,
}

impl GpuUniforms {
    pub fn new(settings: &RenderSettings, sphere_count: u32, camera: &Camera) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            samples_per_pixel: settings.samples_per_pixel,
            max_depth: settings.max_depth,
            sphere_count,
            _pad: [0; 3],
            camera: CameraRecord::from(camera),
        }
    }
}

/// Wall-clock breakdown of one accelerator render.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GpuTimings {
    /// Buffer creation and host-to-device copies
    pub upload: Duration,
    /// Dispatch until the device reports the kernel finished
    pub kernel: Duration,
    /// Device-to-host copy and mapping
    pub readback: Duration,
}

impl GpuTimings {
    /// Time spent moving data rather than computing.
    pub fn transfer(&self) -> Duration {
        self.upload + self.readback
    }

    pub fn total(&self) -> Duration {
        self.upload + self.kernel + self.readback
    }
}

/// Compute-shader renderer.
///
/// Owns the device and a compiled pipeline; each render uploads the scene,
/// dispatches one invocation per pixel and reads the image back.
pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    limits: wgpu::Limits,
}

impl GpuRenderer {
    /// Create a renderer on the default adapter with the built-in kernel.
    pub fn new() -> GpuResult<Self> {
        pollster::block_on(Self::with_kernel_source("orb path tracer", KERNEL_SOURCE))
    }

    /// Create a renderer compiling the kernel from a WGSL file on disk.
    pub fn from_kernel_file(path: impl AsRef<Path>) -> GpuResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| GpuError::KernelSource {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded kernel source from {}", path.display());
        pollster::block_on(Self::with_kernel_source(&path.display().to_string(), &source))
    }

    /// Acquire a device and compile `source` into the compute pipeline.
    pub async fn with_kernel_source(label: &str, source: &str) -> GpuResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::util::backend_bits_from_env().unwrap_or(wgpu::Backends::PRIMARY),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::util::power_preference_from_env()
                    .unwrap_or(wgpu::PowerPreference::HighPerformance),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();
        log::info!(
            "Using adapter {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.device_type,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Orb Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: limits.clone(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        device.on_uncaptured_error(Box::new(|error| {
            log::error!("Uncaptured device error: {error}");
        }));

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Orb Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Spheres
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Framebuffer
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Orb Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Orb Path Tracer Pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: KERNEL_ENTRY_POINT,
            compilation_options: Default::default(),
            cache: None,
        });

        if let Some(error) = device.pop_error_scope().await {
            return Err(GpuError::KernelCompile(error.to_string()));
        }

        log::info!("Kernel {label} compiled");

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            limits,
        })
    }

    /// Render and report where the time went.
    pub fn render_timed(
        &self,
        settings: &RenderSettings,
        scene: &Scene,
        camera: &Camera,
    ) -> GpuResult<(Framebuffer, GpuTimings)> {
        settings.validate_render(scene, camera)?;
        let pixel_count = settings.pixel_count()?;
        let (groups_x, groups_y) = self.dispatch_size(settings)?;
        let output_size = self.output_size(pixel_count)?;

        log::info!(
            "GPU render {}x{}, {} spp, depth {}, {} spheres",
            settings.width,
            settings.height,
            settings.samples_per_pixel,
            settings.max_depth,
            scene.len()
        );

        // Upload
        let upload_start = Instant::now();
        let mut records = sphere_records(scene.spheres());
        let sphere_count = records.len() as u32;
        // Zero-sized storage bindings are invalid; the kernel never reads past sphere_count
        if records.is_empty() {
            records.push(SphereRecord::zeroed());
        }
        let sphere_bytes = (records.len() * std::mem::size_of::<SphereRecord>()) as u64;
        if sphere_bytes > self.storage_limit() {
            return Err(GpuError::SceneTooLarge {
                spheres: scene.len(),
                limit: self.storage_limit(),
            });
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let uniforms = GpuUniforms::new(settings, sphere_count, camera);
        let uniform_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Orb Uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let sphere_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Orb Spheres"),
            contents: bytemuck::cast_slice(&records),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Orb Framebuffer"),
            size: output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Orb Readback"),
            size: output_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Orb Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: sphere_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output_buffer.as_entire_binding(),
                },
            ],
        });
        let upload = upload_start.elapsed();

        // Kernel
        let kernel_start = Instant::now();
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Orb Compute Encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Orb Path Trace Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        let submission = self.queue.submit(std::iter::once(encoder.finish()));
        self.device.poll(wgpu::Maintain::wait_for(submission));
        let kernel = kernel_start.elapsed();

        // Readback
        let readback_start = Instant::now();
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Orb Readback Encoder"),
        });
        encoder.copy_buffer_to_buffer(&output_buffer, 0, &staging_buffer, 0, output_size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging_buffer.slice(..);
        let (sender, receiver) = oneshot_channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GpuError::Device(error.to_string()));
        }
        pollster::block_on(receiver.receive()).ok_or(GpuError::ReadbackChannelClosed)??;

        let pixels: Vec<Color> = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, f32>(&data)
                .chunks_exact(3)
                .map(|rgb| Color::new(rgb[0], rgb[1], rgb[2]))
                .collect()
        };
        staging_buffer.unmap();
        let readback = readback_start.elapsed();

        let timings = GpuTimings {
            upload,
            kernel,
            readback,
        };
        log::info!(
            "GPU render done in {} us: upload {} us, kernel {} us, readback {} us",
            timings.total().as_micros(),
            timings.upload.as_micros(),
            timings.kernel.as_micros(),
            timings.readback.as_micros()
        );

        let framebuffer = Framebuffer::from_pixels(settings.width, settings.height, pixels)?;
        Ok((framebuffer, timings))
    }

    fn dispatch_size(&self, settings: &RenderSettings) -> GpuResult<(u32, u32)> {
        let groups_x = settings.width.div_ceil(WORKGROUP_SIZE);
        let groups_y = settings.height.div_ceil(WORKGROUP_SIZE);
        let limit = self.limits.max_compute_workgroups_per_dimension;
        if groups_x > limit || groups_y > limit {
            return Err(GpuError::DispatchTooLarge {
                groups_x,
                groups_y,
                limit,
            });
        }
        Ok((groups_x, groups_y))
    }

    fn output_size(&self, pixel_count: usize) -> GpuResult<u64> {
        let limit = self.storage_limit();
        match (pixel_count as u64).checked_mul(PIXEL_BYTES) {
            Some(bytes) if bytes <= limit => Ok(bytes),
            Some(bytes) => Err(GpuError::FramebufferTooLarge { bytes, limit }),
            None => Err(GpuError::FramebufferTooLarge {
                bytes: u64::MAX,
                limit,
            }),
        }
    }

    fn storage_limit(&self) -> u64 {
        u64::from(self.limits.max_storage_buffer_binding_size).min(self.limits.max_buffer_size)
    }
}

impl RenderBackend for GpuRenderer {
    type Error = GpuError;

    fn name(&self) -> &'static str {
        "gpu"
    }

    fn render(
        &mut self,
        settings: &RenderSettings,
        scene: &Scene,
        camera: &Camera,
    ) -> GpuResult<Framebuffer> {
        self.render_timed(settings, scene, camera)
            .map(|(framebuffer, _)| framebuffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniforms_match_kernel_layout() {
        assert_eq!(std::mem::size_of::<GpuUniforms>(), 128);
        assert_eq!(std::mem::offset_of!(GpuUniforms, camera), 32);
    }

    #[test]
    fn test_uniforms_carry_settings() {
        let settings = RenderSettings::new(64, 32, 4, 6);
        let camera = Camera::new(&orb_renderer::CameraParams::new(), 64, 32);
        let uniforms = GpuUniforms::new(&settings, 3, &camera);
        assert_eq!(uniforms.width, 64);
        assert_eq!(uniforms.height, 32);
        assert_eq!(uniforms.samples_per_pixel, 4);
        assert_eq!(uniforms.max_depth, 6);
        assert_eq!(uniforms.sphere_count, 3);
        assert_eq!(uniforms.camera, CameraRecord::from(&camera));
    }

    #[test]
    fn test_timings_sum() {
        let timings = GpuTimings {
            upload: Duration::from_micros(10),
            kernel: Duration::from_micros(100),
            readback: Duration::from_micros(5),
        };
        assert_eq!(timings.transfer(), Duration::from_micros(15));
        assert_eq!(timings.total(), Duration::from_micros(115));
    }

    #[test]
    fn test_kernel_workgroup_size_matches_host() {
        let expected = format!("@workgroup_size({WORKGROUP_SIZE}, {WORKGROUP_SIZE}, 1)");
        assert!(KERNEL_SOURCE.contains(&expected));
    }
}
