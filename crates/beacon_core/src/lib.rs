pub use rayon;

pub mod camera;
pub mod settings;

pub use camera::{Camera, FrustumExtents};
pub use settings::{CameraSettings, ClusterSettings, RenderSettings, SettingsError, cluster_capacity};

/// Configures the global compute pool used by the deferred pass.
/// `threads == 0` lets rayon pick one worker per available core.
pub fn init_compute_pool(threads: usize) {
    // Rayon initializes itself globally the first time you use it,
    // so this only has an effect when called before any parallel work.
    let result = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("beacon-shade-{i}"))
        .build_global();

    match result {
        Ok(()) => log::info!(
            "Compute pool ready with {} threads",
            rayon::current_num_threads()
        ),
        // Already built (tests, repeated setup). Keep the existing pool.
        Err(e) => log::debug!("Compute pool left unchanged: {e}"),
    }
}
