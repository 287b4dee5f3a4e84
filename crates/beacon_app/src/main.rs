use std::error::Error;

use beacon_core::{Camera, RenderSettings, init_compute_pool};
use beacon_renderer::{ClusterBuffer, DeferredPass, LightBuffer};
use glam::Vec3;

mod scene;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Usage: beacon_app [settings.json] [output.png]
    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => RenderSettings::load(&path)?,
        None => {
            log::info!("No settings file given, using defaults");
            RenderSettings::default()
        }
    };
    let output = args.next().unwrap_or_else(|| "frame.png".to_owned());

    init_compute_pool(settings.compute_threads);

    let camera = Camera::from(&settings.camera);
    let pass = DeferredPass::from_settings(&settings, Vec3::ZERO);
    log::debug!("Render settings: {settings:?}");

    // 1. Geometry pass
    let gbuffers = scene::build_gbuffers(&settings, &camera)?;

    // 2. Light assignment: pack lights and per-cluster lists
    let lights = scene::place_lights(settings.num_lights);
    let light_buffer = LightBuffer::encode(&lights)?;
    let mut cluster_buffer = ClusterBuffer::new(&settings.clusters)?;
    let dropped = scene::assign_lights(&pass.uniforms.grid, &mut cluster_buffer, &lights);
    if dropped > 0 {
        log::warn!(
            "{dropped} light assignments exceeded the per-cluster capacity of {}",
            cluster_buffer.capacity()
        );
    }

    // 3. Shading pass
    let frame = pass.render(&gbuffers, &cluster_buffer, &light_buffer);
    log::info!(
        "Rendered {}x{} frame with {} lights",
        frame.width,
        frame.height,
        light_buffer.num_lights()
    );

    image::save_buffer(
        &output,
        &frame.to_rgba8(),
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
    )?;
    log::info!("Wrote {output}");

    Ok(())
}
