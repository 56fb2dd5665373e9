//! Orb - render the sphere showcase scene on the CPU, the GPU, or both.

mod bench;
mod output;
mod scene;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use orb_gpu::GpuRenderer;
use orb_renderer::{
    Camera, CameraParams, CpuRenderer, Framebuffer, RenderBackend, RenderSettings, Scene, Vec3,
};

use crate::bench::{cycles_per_pixel, BenchRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Cpu,
    Gpu,
    Both,
}

impl Backend {
    fn runs_cpu(self) -> bool {
        matches!(self, Backend::Cpu | Backend::Both)
    }

    fn runs_gpu(self) -> bool {
        matches!(self, Backend::Gpu | Backend::Both)
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Monte Carlo sphere path tracer")]
struct Args {
    /// Width of the rendered image
    width: u32,

    /// Height of the rendered image
    height: u32,

    /// Samples per pixel
    #[arg(short = 's', long = "samples", default_value_t = 8)]
    samples: u32,

    /// Maximum bounces per path
    #[arg(short = 'd', long = "depth", default_value_t = 5)]
    depth: u32,

    /// Grid size of the small random spheres
    #[arg(long = "spheres-sqrt", default_value_t = 10)]
    spheres_sqrt: u32,

    /// Seed for scene population
    #[arg(long = "seed", default_value_t = 0)]
    seed: u64,

    /// Load spheres from a JSON file instead of generating them
    #[arg(long = "scene")]
    scene: Option<PathBuf>,

    /// Which renderer(s) to run
    #[arg(short = 'b', long = "backend", value_enum, default_value_t = Backend::Both)]
    backend: Backend,

    /// Output PNG; a backend suffix is added when both renderers run
    #[arg(short = 'o', long = "output", default_value = "render.png")]
    output: PathBuf,

    /// WGSL kernel to compile instead of the built-in one
    #[arg(long = "kernel")]
    kernel: Option<PathBuf>,

    /// Append a timing row to this CSV file
    #[arg(long = "bench")]
    bench: Option<PathBuf>,

    /// CPU worker threads (0 = one per core)
    #[arg(short = 't', long = "threads", default_value_t = 0)]
    threads: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let settings = RenderSettings::new(args.width, args.height, args.samples, args.depth);
    settings.validate().context("Invalid render settings")?;
    let pixels = settings.pixel_count()? as u64;

    let start = Instant::now();
    let scene = match &args.scene {
        Some(path) => scene::load_scene_file(path)?,
        None => scene::random_scene(args.spheres_sqrt, args.seed),
    };
    log::info!("Scene with {} spheres built in {:?}", scene.len(), start.elapsed());

    let camera_params = CameraParams::new()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);
    let camera = Camera::new(&camera_params, settings.width, settings.height);

    let mut record = BenchRecord {
        sqrt_spheres: args.spheres_sqrt,
        rays_per_pixel: args.samples,
        depth: args.depth,
        pixels,
        ..Default::default()
    };

    let gpu_image = if args.backend.runs_gpu() {
        match render_gpu(&args, &settings, &scene, &camera) {
            Ok((image, kernel, transfer)) => {
                record.gpu = kernel;
                record.transfer = transfer;
                report("GPU kernel", kernel, pixels);
                report("GPU transfer", transfer, pixels);
                Some(image)
            }
            Err(err) if args.backend == Backend::Both => {
                log::error!("GPU render failed, continuing with CPU only: {err:#}");
                None
            }
            Err(err) => return Err(err),
        }
    } else {
        None
    };

    let cpu_image = if args.backend.runs_cpu() {
        let mut cpu = CpuRenderer::with_threads(args.threads)?;
        log::info!("CPU render on {} threads", cpu.thread_count());
        let start = Instant::now();
        let image = cpu.render(&settings, &scene, &camera)?;
        record.cpu = start.elapsed();
        report("CPU", record.cpu, pixels);
        Some(image)
    } else {
        None
    };

    if let (Some(cpu_image), Some(gpu_image)) = (&cpu_image, &gpu_image) {
        if let Some(difference) = cpu_image.mean_abs_difference(gpu_image) {
            log::info!("Mean absolute CPU/GPU difference: {difference:.5}");
        }
    }

    let both = cpu_image.is_some() && gpu_image.is_some();
    if let Some(image) = &cpu_image {
        output::save_png(image, &output_path(&args.output, "cpu", both))?;
    }
    if let Some(image) = &gpu_image {
        output::save_png(image, &output_path(&args.output, "gpu", both))?;
    }

    if let Some(path) = &args.bench {
        record
            .append_to(path)
            .with_context(|| format!("Failed to append benchmark to {}", path.display()))?;
    }

    Ok(())
}

/// Returns the image, the kernel time and the transfer time.
fn render_gpu(
    args: &Args,
    settings: &RenderSettings,
    scene: &Scene,
    camera: &Camera,
) -> Result<(Framebuffer, Duration, Duration)> {
    let gpu = match &args.kernel {
        Some(path) => GpuRenderer::from_kernel_file(path)?,
        None => GpuRenderer::new()?,
    };
    let (image, timings) = gpu
        .render_timed(settings, scene, camera)
        .context("GPU render failed")?;
    Ok((image, timings.kernel, timings.transfer()))
}

fn report(label: &str, elapsed: Duration, pixels: u64) {
    log::info!(
        "{label}: {} us, {:.1} cycles per pixel",
        elapsed.as_micros(),
        cycles_per_pixel(elapsed, pixels)
    );
}

/// `render.png` becomes `render_cpu.png` / `render_gpu.png` when both run.
fn output_path(base: &Path, backend: &str, suffixed: bool) -> PathBuf {
    if !suffixed {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string());
    let extension = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    base.with_file_name(format!("{stem}_{backend}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "orb", "320", "180", "--samples", "4", "--backend", "cpu", "--seed", "9",
        ])
        .unwrap();
        assert_eq!(args.width, 320);
        assert_eq!(args.height, 180);
        assert_eq!(args.samples, 4);
        assert_eq!(args.depth, 5);
        assert_eq!(args.seed, 9);
        assert_eq!(args.backend, Backend::Cpu);
        assert!(args.scene.is_none());
    }

    #[test]
    fn test_args_require_dimensions() {
        assert!(Args::try_parse_from(["orb", "320"]).is_err());
    }

    #[test]
    fn test_output_path_suffix() {
        let base = Path::new("out/render.png");
        assert_eq!(output_path(base, "cpu", false), PathBuf::from("out/render.png"));
        assert_eq!(output_path(base, "gpu", true), PathBuf::from("out/render_gpu.png"));
    }

    #[test]
    fn test_backend_selection() {
        assert!(Backend::Both.runs_cpu() && Backend::Both.runs_gpu());
        assert!(Backend::Cpu.runs_cpu() && !Backend::Cpu.runs_gpu());
        assert!(!Backend::Gpu.runs_cpu() && Backend::Gpu.runs_gpu());
    }
}
