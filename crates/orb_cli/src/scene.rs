//! Scene population: the procedural showcase scene and JSON scene files.

use std::path::Path;

use anyhow::{Context, Result};
use orb_renderer::{Color, Material, Scene, Sphere, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Ground, three large spheres and an `sqrt_spheres` x `sqrt_spheres` grid
/// of small random spheres around the origin.
pub fn random_scene(sqrt_spheres: u32, seed: u64) -> Scene {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut scene = Scene::default();

    // Ground
    scene.push(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Color::splat(0.5),
        Material::lambertian(1.0),
    ));

    // Three main spheres
    scene.push(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Color::new(0.4, 0.2, 0.1),
        Material::lambertian(1.0),
    ));
    scene.push(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Color::new(0.7, 0.6, 0.5),
        Material::metal(0.0),
    ));
    scene.push(Sphere::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        Color::ONE,
        Material::dielectric(1.5),
    ));

    // Small random spheres
    let offset = (sqrt_spheres / 2) as f32;
    for i in 0..sqrt_spheres {
        for j in 0..sqrt_spheres {
            let radius = rng.gen_range(0.1..=0.3);
            let center = Vec3::new(
                i as f32 - offset + rng.gen::<f32>(),
                radius,
                j as f32 - offset + rng.gen::<f32>(),
            );

            let choose_mat: f32 = rng.gen();
            let sphere = if choose_mat < 0.8 {
                // Diffuse
                let albedo = Color::new(rng.gen(), rng.gen(), rng.gen());
                Sphere::new(center, radius, albedo, Material::lambertian(rng.gen_range(0.8..=1.0)))
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = Color::new(
                    rng.gen_range(0.5..=1.0),
                    rng.gen_range(0.5..=1.0),
                    rng.gen_range(0.5..=1.0),
                );
                Sphere::new(center, radius, albedo, Material::metal(rng.gen_range(0.0..=0.1)))
            } else {
                // Glass
                Sphere::new(center, radius, Color::ONE, Material::dielectric(rng.gen_range(1.1..=4.0)))
            };
            scene.push(sphere);
        }
    }

    log::debug!("Populated scene with {} spheres (seed {seed})", scene.len());
    scene
}

/// Load a JSON array of spheres.
pub fn load_scene_file(path: &Path) -> Result<Scene> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file {}", path.display()))?;
    let scene: Scene = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse scene file {}", path.display()))?;
    log::info!("Loaded {} spheres from {}", scene.len(), path.display());
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_scene_sphere_count() {
        assert_eq!(random_scene(0, 1).len(), 4);
        assert_eq!(random_scene(5, 1).len(), 4 + 25);
    }

    #[test]
    fn test_random_scene_is_reproducible() {
        assert_eq!(random_scene(6, 42), random_scene(6, 42));
        assert_ne!(random_scene(6, 42), random_scene(6, 43));
    }

    #[test]
    fn test_small_spheres_rest_on_ground() {
        let scene = random_scene(8, 7);
        for sphere in &scene.spheres()[4..] {
            assert!((0.1..=0.3).contains(&sphere.radius));
            assert_eq!(sphere.center.y, sphere.radius);
            match sphere.material {
                Material::Lambertian { roughness } => assert!((0.8..=1.0).contains(&roughness)),
                Material::Metal { fuzz } => assert!((0.0..=0.1).contains(&fuzz)),
                Material::Dielectric { refraction_index } => {
                    assert!((1.1..=4.0).contains(&refraction_index));
                    assert_eq!(sphere.albedo, Color::ONE);
                }
            }
        }
    }

    #[test]
    fn test_load_scene_file() {
        let path = std::env::temp_dir().join(format!("orb_scene_{}.json", std::process::id()));
        let json = r#"[
            {"center": [0.0, 0.0, -1.0], "radius": 0.5, "albedo": [0.8, 0.3, 0.3],
             "material": {"type": "lambertian", "roughness": 1.0}},
            {"center": [1.0, 0.0, -1.0], "radius": 0.5, "albedo": [1.0, 1.0, 1.0],
             "material": {"type": "dielectric", "refraction_index": 1.5}}
        ]"#;
        std::fs::write(&path, json).unwrap();

        let scene = load_scene_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.spheres()[1].material, Material::dielectric(1.5));
    }

    #[test]
    fn test_unknown_material_in_scene_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("orb_bad_scene_{}.json", std::process::id()));
        let json = r#"[{"center": [0.0, 0.0, 0.0], "radius": 1.0, "albedo": [1.0, 1.0, 1.0],
                        "material": {"type": "plastic"}}]"#;
        std::fs::write(&path, json).unwrap();

        let result = load_scene_file(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn test_degenerate_radius_in_scene_file_is_an_error() {
        for (tag, radius) in [("zero", "0.0"), ("negative", "-1.0")] {
            let path = std::env::temp_dir().join(format!(
                "orb_{tag}_radius_{}.json",
                std::process::id()
            ));
            let json = format!(
                r#"[{{"center": [0.0, 0.0, 0.0], "radius": {radius}, "albedo": [1.0, 1.0, 1.0],
                      "material": {{"type": "lambertian", "roughness": 1.0}}}}]"#
            );
            std::fs::write(&path, json).unwrap();

            let result = load_scene_file(&path);
            std::fs::remove_file(&path).unwrap();

            let message = format!("{:#}", result.unwrap_err());
            assert!(message.contains("Sphere 0 is invalid"), "{message}");
        }
    }
}
