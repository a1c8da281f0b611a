// PicFlip - batch 180-degree image rotation with a Slint GUI.
//
// Threading model:
// - Main thread: Slint event loop (required by the GUI backend)
// - Tokio runtime: rotation workflow orchestration
// - Rayon pool: per-file decode/rotate/encode, bounded by the worker count

use anyhow::{Context, Result};
use picflip::metrics::Metrics;
use picflip::ui::GuiController;
use picflip::{ConfigManager, StateManager};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    // Hold the guard for the lifetime of main so buffered log lines are
    // flushed on exit
    let _log_guard = picflip::logging::setup_logging("logs", "picflip", false, true)
        .context("Failed to initialize logging")?;

    tracing::info!("{} v{} starting", picflip::APP_NAME, picflip::VERSION);

    // Tokio handles orchestration only; the pixel work runs on rayon
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(4)
        .thread_name("picflip-worker")
        .build()
        .context("Failed to create tokio runtime")?;

    let state_manager = Arc::new(StateManager::new());

    let config_manager =
        Arc::new(ConfigManager::new("config").context("Failed to initialize config manager")?);

    match config_manager.load_user_config() {
        Ok(user_config) => {
            state_manager.load_from_user_config(&user_config);
            tracing::info!("Settings loaded from {}", config_manager.config_dir());
        }
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {:#}", e);
        }
    }

    let metrics = Arc::new(Metrics::new());

    let controller = GuiController::new(
        Arc::clone(&state_manager),
        Arc::clone(&config_manager),
        Arc::clone(&metrics),
        runtime.handle().clone(),
    )
    .context("Failed to initialize GUI")?;

    tracing::info!("Entering GUI event loop");
    controller
        .run()
        .map_err(|e| anyhow::anyhow!("GUI event loop failed: {}", e))?;

    tracing::info!("GUI closed, shutting down");

    // Give a cancelled run a moment to observe the signal before the
    // runtime is torn down
    if state_manager.read(|s| s.is_rotating) {
        tracing::warn!("Rotation still active at shutdown, waiting briefly");
        std::thread::sleep(Duration::from_millis(500));
    }

    metrics.log_summary();

    runtime.shutdown_timeout(Duration::from_secs(5));
    tracing::info!("Shutdown complete");

    Ok(())
}
