//! Timing report and the benchmark CSV.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

/// Nominal clock used to express timings as cycles per pixel.
pub const NOMINAL_CLOCK_HZ: f64 = 2.8e9;

pub const CSV_HEADER: &str = "sqrt_spheres;rays_per_pixel;depth;pixels;gpu_us;gpu_cpp;transfer_us;transfer_cpp;cpu_us;cpu_cpp";

pub fn cycles_per_pixel(elapsed: Duration, pixels: u64) -> f64 {
    if pixels == 0 {
        return 0.0;
    }
    elapsed.as_secs_f64() * NOMINAL_CLOCK_HZ / pixels as f64
}

/// One benchmark run. Backends that did not run report zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BenchRecord {
    pub sqrt_spheres: u32,
    pub rays_per_pixel: u32,
    pub depth: u32,
    pub pixels: u64,
    pub gpu: Duration,
    pub transfer: Duration,
    pub cpu: Duration,
}

impl BenchRecord {
    pub fn to_csv_row(&self) -> String {
        format!(
            "{};{};{};{};{};{:.3};{};{:.3};{};{:.3}",
            self.sqrt_spheres,
            self.rays_per_pixel,
            self.depth,
            self.pixels,
            self.gpu.as_micros(),
            cycles_per_pixel(self.gpu, self.pixels),
            self.transfer.as_micros(),
            cycles_per_pixel(self.transfer, self.pixels),
            self.cpu.as_micros(),
            cycles_per_pixel(self.cpu, self.pixels),
        )
    }

    /// Append this record, writing the header first if the file is new or empty.
    pub fn append_to(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let is_empty = file.metadata().map(|m| m.len() == 0).unwrap_or(true);
        if is_empty {
            writeln!(file, "{CSV_HEADER}")?;
        }
        writeln!(file, "{}", self.to_csv_row())?;
        Ok(())
    }
}
