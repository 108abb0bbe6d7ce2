/// GPU Culling Test and Benchmark
///
/// Culls the ring demo scene and a large random scene, on the GPU when an
/// adapter is available, and checks every frame against the serial CPU kernel.
///
/// Usage: gpu_culling_test [config.toml]

use anyhow::{bail, Context, Result};
use cgmath::{Matrix4, Point3, Vector3};
use instance_culling::{
    demo_scene, CpuCuller, CpuDispatchMode, CullingCamera, CullingConfig, CullingSystem, GpuState,
    InstanceSet,
};
use std::time::Instant;

/// Test configuration
const RANDOM_INSTANCES: usize = 50_000;
const WORLD_SIZE: f32 = 400.0;
const ITERATIONS: u32 = 50;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("GPU Culling Test");
    println!("================\n");

    let mut config = match std::env::args().nth(1) {
        Some(path) => CullingConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => CullingConfig::default(),
    };
    config.max_instances = config.max_instances.max(RANDOM_INSTANCES as u32);

    let gpu = match GpuState::new_headless_blocking() {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            log::warn!("GPU initialisation failed: {}", e);
            None
        }
    };

    let mut system = CullingSystem::new(config.clone(), gpu)?;
    let reference = CpuCuller::new(CpuDispatchMode::Serial, 0)?;
    println!(
        "Backend: {}\n",
        if system.uses_gpu() { "GPU" } else { "CPU" }
    );

    let scenes = [
        ("Ring scene", demo_scene()),
        ("Random scene", random_scene(RANDOM_INSTANCES, WORLD_SIZE)),
    ];

    let cameras = [
        ("Default view", Point3::new(0.0, 5.0, -15.0), Point3::new(0.0, 0.0, 0.0)),
        ("Overhead", Point3::new(0.0, 60.0, -0.1), Point3::new(0.0, 0.0, 0.0)),
        ("Side view", Point3::new(30.0, 2.0, 0.0), Point3::new(0.0, 0.0, 0.0)),
    ];

    let mut camera = CullingCamera::new(1280, 720);

    for (scene_name, instances) in &scenes {
        println!("Scene: {} ({} instances)", scene_name, instances.count());

        for (camera_name, eye, target) in cameras {
            camera.eye = eye;
            camera.target = target;
            let frustum = camera.frustum();

            let output = system.cull(&frustum, instances)?;
            let expected = reference.cull(
                &frustum,
                instances,
                config.box_half_extent,
                config.index_count_per_instance,
            )?;

            if !output.is_consistent(instances.count()) {
                bail!("{} / {}: inconsistent culling output", scene_name, camera_name);
            }
            if output.sorted_indices() != expected.visible_indices {
                bail!(
                    "{} / {}: visible set differs from CPU reference ({} vs {})",
                    scene_name,
                    camera_name,
                    output.visible_count(),
                    expected.visible_count()
                );
            }

            let start = Instant::now();
            for _ in 0..ITERATIONS {
                system.cull(&frustum, instances)?;
            }
            let elapsed = start.elapsed();

            let stats = system.last_stats();
            println!("  {}:", camera_name);
            println!("    Total: {}", stats.total_instances);
            println!("    Visible: {}", stats.visible);
            println!("    Culled: {}", stats.culled);
            println!("    Visibility: {:.1}%", stats.visible_ratio() * 100.0);
            println!(
                "    Time per frame: {:.3}ms (including readback)",
                elapsed.as_secs_f64() * 1000.0 / ITERATIONS as f64
            );
        }
        println!();
    }

    println!("All frames matched the CPU reference");
    Ok(())
}

fn random_scene(count: usize, world_size: f32) -> InstanceSet {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let half = world_size / 2.0;

    InstanceSet::from_matrices((0..count).map(|i| {
        let position = Vector3::new(
            rng.gen_range(-half..half),
            rng.gen_range(-half * 0.1..half * 0.1),
            rng.gen_range(-half..half),
        );
        let model = Matrix4::from_translation(position) * Matrix4::from_scale(0.5);
        (model, (i % 2) as u32)
    }))
}
