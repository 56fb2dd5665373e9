//! Render backends and the parallel CPU driver.
//!
//! Pixels carry no data dependency on each other, so the CPU driver hands
//! whole rows to rayon's work-stealing pool. Each pixel seeds its own
//! generator and writes only its own cell: no locks, and the output does not
//! depend on thread count or scheduling.

use std::time::Instant;

use rayon::prelude::*;

use crate::{render_pixel, Camera, Framebuffer, PixelRng, RenderError, RenderSettings, Scene};

/// A way of turning a scene into a framebuffer.
///
/// Backends take the same inputs and follow the same bounce algorithm, so
/// one can be substituted for another.
pub trait RenderBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Render every pixel of `settings.width` x `settings.height`.
    fn render(
        &mut self,
        settings: &RenderSettings,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<Framebuffer, Self::Error>;
}

/// Multi-threaded CPU renderer.
#[derive(Default)]
pub struct CpuRenderer {
    pool: Option<rayon::ThreadPool>,
}

impl CpuRenderer {
    /// Renderer using rayon's global pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Renderer with a dedicated pool of `threads` workers (0 = one per core).
    pub fn with_threads(threads: usize) -> Result<Self, RenderError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("orb-cpu-{index}"))
            .build()?;
        Ok(Self { pool: Some(pool) })
    }

    /// Number of worker threads rows are spread over.
    pub fn thread_count(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn render_rows(
        framebuffer: &mut Framebuffer,
        settings: &RenderSettings,
        scene: &Scene,
        camera: &Camera,
    ) {
        let width = settings.width;
        framebuffer
            .pixels_mut()
            .par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let y = y as u32;
                for (x, pixel) in row.iter_mut().enumerate() {
                    let x = x as u32;
                    let mut rng = PixelRng::for_pixel(x, y, width);
                    *pixel = render_pixel(camera, scene, x, y, settings, &mut rng);
                }
            });
    }
}

impl RenderBackend for CpuRenderer {
    type Error = RenderError;

    fn name(&self) -> &'static str {
        "cpu"
    }

    fn render(
        &mut self,
        settings: &RenderSettings,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<Framebuffer, RenderError> {
        settings.validate_render(scene, camera)?;

        log::info!(
            "CPU render {}x{} @ {} spp, depth {}, {} spheres on {} threads",
            settings.width,
            settings.height,
            settings.samples_per_pixel,
            settings.max_depth,
            scene.len(),
            self.thread_count()
        );

        let start = Instant::now();
        let mut framebuffer = Framebuffer::new(settings.width, settings.height);

        match &self.pool {
            Some(pool) => {
                pool.install(|| Self::render_rows(&mut framebuffer, settings, scene, camera))
            }
            None => Self::render_rows(&mut framebuffer, settings, scene, camera),
        }

        let elapsed = start.elapsed();
        log::info!(
            "CPU render finished in {:?} ({:.3} us/pixel)",
            elapsed,
            elapsed.as_secs_f64() * 1.0e6 / framebuffer.pixels().len() as f64
        );

        Ok(framebuffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraParams, Material, Sphere};
    use orb_math::{Color, Vec3};

    fn small_scene() -> (Scene, Camera, RenderSettings) {
        let scene = Scene::new(vec![
            Sphere::new(Vec3::new(0.0, -100.5, -1.0), 100.0, Color::splat(0.5), Material::lambertian(1.0)),
            Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Color::new(0.8, 0.3, 0.3), Material::metal(0.2)),
        ]);
        let settings = RenderSettings::new(12, 8, 4, 6);
        let camera = Camera::new(
            &CameraParams::pinhole(Vec3::ZERO, Vec3::NEG_Z, 90.0),
            settings.width,
            settings.height,
        );
        (scene, camera, settings)
    }

    #[test]
    fn test_thread_count_does_not_change_output() {
        let (scene, camera, settings) = small_scene();

        let single = CpuRenderer::with_threads(1)
            .unwrap()
            .render(&settings, &scene, &camera)
            .unwrap();
        let many = CpuRenderer::with_threads(4)
            .unwrap()
            .render(&settings, &scene, &camera)
            .unwrap();

        assert_eq!(single, many);
    }

    #[test]
    fn test_invalid_settings_rejected_before_rendering() {
        let (scene, camera, _) = small_scene();
        let err = CpuRenderer::new()
            .render(&RenderSettings::new(12, 0, 4, 6), &scene, &camera)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidSettings { field: "height", .. }));
    }

    #[test]
    fn test_camera_built_for_other_size_is_rejected() {
        let (scene, _, _) = small_scene();
        let camera = Camera::new(&CameraParams::pinhole(Vec3::ZERO, Vec3::NEG_Z, 90.0), 4, 4);
        let err = CpuRenderer::new()
            .render(&RenderSettings::new(8, 8, 1, 1), &scene, &camera)
            .unwrap_err();
        assert!(matches!(err, RenderError::CameraSizeMismatch { .. }));
    }

    #[test]
    fn test_degenerate_sphere_is_rejected() {
        let (_, camera, settings) = small_scene();
        let scene = Scene::new(vec![Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            -0.5,
            Color::ONE,
            Material::dielectric(1.5),
        )]);
        let err = CpuRenderer::new()
            .render(&settings, &scene, &camera)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidSphere { index: 0, .. }));
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(CpuRenderer::new().name(), "cpu");
    }
}
