//! Flat, `Pod` records for uploading the scene and camera to a device.
//!
//! Layouts match the WGSL structs in the accelerator kernel byte for byte:
//! every `vec3<f32>` is 16-byte aligned, so records pad to multiples of 16.

use bytemuck::{Pod, Zeroable};
use crate::{Camera, Material, Sphere};

pub const MATERIAL_LAMBERTIAN: u32 = 0;
pub const MATERIAL_METAL: u32 = 1;
pub const MATERIAL_DIELECTRIC: u32 = 2;

/// One sphere: 48 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SphereRecord {
    pub center: [f32; 3],
    pub radius: f32,
    pub albedo: [f32; 3],
    /// Roughness, fuzz or refraction index depending on `material`
    pub parameter: f32,
    pub material: u32,
    pub _pad: [u32; 3],
}

impl From<&Sphere> for SphereRecord {
    fn from(sphere: &Sphere) -> Self {
        let material = match sphere.material {
            Material::Lambertian { .. } => MATERIAL_LAMBERTIAN,
            Material::Metal { .. } => MATERIAL_METAL,
            Material::Dielectric { .. } => MATERIAL_DIELECTRIC,
        };
        Self {
            center: sphere.center.to_array(),
            radius: sphere.radius,
            albedo: sphere.albedo.to_array(),
            parameter: sphere.material.parameter(),
            material,
            _pad: [0; 3],
        }
    }
}

/// Derived camera state: 96 bytes. `origin.w` is 1.0 when depth of field is on.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraRecord {
    pub origin: [f32; 4],
    pub viewport_upper_left: [f32; 4],
    pub step_u: [f32; 4],
    pub step_v: [f32; 4],
    pub defocus_disk_u: [f32; 4],
    pub defocus_disk_v: [f32; 4],
}

impl From<&Camera> for CameraRecord {
    fn from(camera: &Camera) -> Self {
        let defocus = if camera.has_defocus() { 1.0 } else { 0.0 };
        Self {
            origin: camera.origin().extend(defocus).to_array(),
            viewport_upper_left: camera.viewport_upper_left().extend(0.0).to_array(),
            step_u: camera.step_u().extend(0.0).to_array(),
            step_v: camera.step_v().extend(0.0).to_array(),
            defocus_disk_u: camera.defocus_disk_u().extend(0.0).to_array(),
            defocus_disk_v: camera.defocus_disk_v().extend(0.0).to_array(),
        }
    }
}

/// Encode a whole scene in order.
pub fn sphere_records(spheres: &[Sphere]) -> Vec<SphereRecord> {
    spheres.iter().map(SphereRecord::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CameraParams;
    use orb_math::{Color, Vec3};

    #[test]
    fn test_record_sizes_match_kernel_layout() {
        assert_eq!(std::mem::size_of::<SphereRecord>(), 48);
        assert_eq!(std::mem::size_of::<CameraRecord>(), 96);
    }

    #[test]
    fn test_sphere_record_carries_tag_and_parameter() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5, Color::ONE, Material::dielectric(1.5));
        let record = SphereRecord::from(&sphere);
        assert_eq!(record.material, MATERIAL_DIELECTRIC);
        assert_eq!(record.parameter, 1.5);
        assert_eq!(record.center, [1.0, 2.0, 3.0]);
        assert_eq!(record.radius, 0.5);
        assert_eq!(record.albedo, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_scene_order_is_preserved() {
        let spheres = [
            Sphere::new(Vec3::ZERO, 1.0, Color::ONE, Material::lambertian(0.7)),
            Sphere::new(Vec3::X, 0.2, Color::ONE, Material::metal(0.3)),
        ];
        let records = sphere_records(&spheres);
        let tags: Vec<u32> = records.iter().map(|r| r.material).collect();
        assert_eq!(tags, [MATERIAL_LAMBERTIAN, MATERIAL_METAL]);
        assert_eq!(records[1].parameter, 0.3);
    }

    #[test]
    fn test_camera_record_defocus_flag() {
        let pinhole = Camera::new(&CameraParams::pinhole(Vec3::ZERO, Vec3::NEG_Z, 60.0), 8, 8);
        assert_eq!(CameraRecord::from(&pinhole).origin[3], 0.0);

        let params = CameraParams::new()
            .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.6, 10.0);
        let record = CameraRecord::from(&Camera::new(&params, 8, 8));
        assert_eq!(record.origin[3], 1.0);
        assert_eq!(record.origin[..3], [13.0, 2.0, 3.0]);
    }
}
