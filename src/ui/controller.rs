// GUI Controller - bridges the Slint window with state management and the
// rotation services.
//
// Responsibilities:
// - Wiring Slint callbacks (rotate, cancel, browse) to state and async tasks
// - Subscribing to state changes and pushing them into the window, including
//   the title, which doubles as the progress display
// - Orchestrating the rotation workflow: scan, parallel batch, completion

use crate::config::ConfigManager;
use crate::metrics::Metrics;
use crate::models::{RotateSettings, UserConfig};
use crate::services::rotation::{BatchSummary, RotationError, RotationService};
use crate::services::scanner;
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::EventLoopBridge;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

// Include the generated Slint code
slint::include_modules!();

/// GUI controller that wires the Slint window to application state and the
/// rotation services.
///
/// # Example
/// ```ignore
/// let state_manager = Arc::new(StateManager::new());
/// let config_manager = Arc::new(ConfigManager::new("config")?);
/// let metrics = Arc::new(Metrics::new());
/// let runtime = tokio::runtime::Runtime::new()?;
///
/// let controller = GuiController::new(
///     state_manager,
///     config_manager,
///     metrics,
///     runtime.handle().clone(),
/// )?;
/// controller.run()?; // blocks until the window is closed
/// ```
pub struct GuiController {
    /// The Slint window
    ui: MainWindow,

    /// Event loop bridge for coordinating between tokio and Slint
    _bridge: EventLoopBridge<MainWindow>,

    /// Shared state manager
    state_manager: Arc<StateManager>,

    /// Kept alive for the browse callbacks that persist settings
    _config_manager: Arc<ConfigManager>,

    /// Cancellation sender; `true` requests cancellation of the active run
    cancel_tx: Arc<watch::Sender<bool>>,
}

impl GuiController {
    /// Create a new GUI controller.
    pub fn new(
        state_manager: Arc<StateManager>,
        config_manager: Arc<ConfigManager>,
        metrics: Arc<Metrics>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;

        let bridge = EventLoopBridge::new(&ui, tokio_handle);

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let cancel_tx = Arc::new(cancel_tx);

        Self::sync_ui_with_state(&ui, &state_manager);

        Self::setup_callbacks(
            &ui,
            &bridge,
            &state_manager,
            &config_manager,
            &metrics,
            &cancel_tx,
            cancel_rx,
        );

        Self::setup_state_subscription(&bridge, &state_manager, &metrics);

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
            state_manager,
            _config_manager: config_manager,
            cancel_tx,
        })
    }

    /// Run the GUI (blocks until the window is closed).
    ///
    /// If a rotation is still active when the window closes, cancellation is
    /// requested so the worker pool winds down instead of writing files into
    /// a dead session.
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        let result = self.ui.run();

        if self.state_manager.read(|s| s.is_rotating) {
            self.request_cancel();
        }

        result
    }

    /// Request cancellation of the active rotation run.
    pub fn request_cancel(&self) {
        tracing::info!("Cancellation requested");
        let _ = self.cancel_tx.send(true);
        self.state_manager.request_cancel();
    }

    /// Initialize the window with the current state, called once at startup.
    fn sync_ui_with_state(ui: &MainWindow, state_manager: &StateManager) {
        let state = state_manager.snapshot();

        ui.set_input_dir(state.input_dir.to_string().into());
        ui.set_output_dir(state.output_dir.to_string().into());
        ui.set_is_rotating(state.is_rotating);
        ui.set_progress_current(state.progress as i32);
        ui.set_progress_total(state.total_files as i32);
        ui.set_current_file(state.current_file.unwrap_or_default().into());
        ui.set_status_message(state.status_message.into());

        tracing::debug!("UI synchronized with initial state");
    }

    /// Connect Slint UI events (button clicks, window close) to Rust logic.
    fn setup_callbacks(
        ui: &MainWindow,
        bridge: &EventLoopBridge<MainWindow>,
        state_manager: &Arc<StateManager>,
        config_manager: &Arc<ConfigManager>,
        metrics: &Arc<Metrics>,
        cancel_tx: &Arc<watch::Sender<bool>>,
        cancel_rx: watch::Receiver<bool>,
    ) {
        let state = Arc::clone(state_manager);
        let metrics_clone = Arc::clone(metrics);
        let cancel_tx_clone = Arc::clone(cancel_tx);
        let bridge_handle = bridge.clone_handle();

        // Start rotation
        ui.on_start_rotation(move || {
            tracing::info!("Rotate button clicked");

            // Claim the run before the async hop; a second click in the
            // window between spawn and start_rotation must lose here
            if !state.try_begin_run() {
                tracing::warn!("Rotation already in progress - ignoring");
                return;
            }

            // Reset the cancellation signal for the new run
            let _ = cancel_tx_clone.send(false);

            let state = Arc::clone(&state);
            let metrics = Arc::clone(&metrics_clone);
            let cancel = cancel_rx.clone();

            bridge_handle.spawn_async(move || async move {
                if let Err(e) = Self::run_rotation_workflow(
                    Arc::clone(&state),
                    metrics,
                    cancel,
                )
                .await
                {
                    tracing::error!("Rotation workflow error: {:#}", e);
                    state.set_status(format!("Error: {}", e));
                }
                // Idempotent; covers exit paths that never reached
                // start_rotation or finish_rotation
                state.release_run_claim();
            });
        });

        let state = Arc::clone(state_manager);
        let cancel_tx_clone = Arc::clone(cancel_tx);

        // Cancel rotation - workers observe the watch channel once per item
        ui.on_cancel_rotation(move || {
            tracing::info!("Cancel button clicked - requesting cancellation");
            let _ = cancel_tx_clone.send(true);
            state.request_cancel();
        });

        let state = Arc::clone(state_manager);
        let config = Arc::clone(config_manager);

        // Browse input folder
        ui.on_browse_input(move || {
            tracing::debug!("Browse input clicked");

            if let Some(dir) = Self::show_folder_picker("Select Input Folder") {
                tracing::info!("Input folder selected: {}", dir);
                state.set_input_dir(dir);
                Self::persist_settings(&config, &state);
            }
        });

        let state = Arc::clone(state_manager);
        let config = Arc::clone(config_manager);

        // Browse output folder
        ui.on_browse_output(move || {
            tracing::debug!("Browse output clicked");

            if let Some(dir) = Self::show_folder_picker("Select Output Folder") {
                tracing::info!("Output folder selected: {}", dir);
                state.set_output_dir(dir);
                Self::persist_settings(&config, &state);
            }
        });

        let state = Arc::clone(state_manager);
        let cancel_tx_clone = Arc::clone(cancel_tx);

        // Closing the window during a run cancels it first
        ui.window().on_close_requested(move || {
            if state.read(|s| s.is_rotating) {
                tracing::warn!("Close requested during rotation - cancelling");
                let _ = cancel_tx_clone.send(true);
                state.request_cancel();
            }
            slint::CloseRequestResponse::HideWindow
        });

        tracing::debug!("UI callbacks configured");
    }

    /// Listen for state change events on a background thread and marshal the
    /// resulting UI updates onto the Slint event loop.
    fn setup_state_subscription(
        bridge: &EventLoopBridge<MainWindow>,
        state_manager: &Arc<StateManager>,
        metrics: &Arc<Metrics>,
    ) {
        let bridge_handle = bridge.clone_handle();
        let state_manager_clone = Arc::clone(state_manager);
        let metrics = Arc::clone(metrics);
        let mut rx = state_manager.subscribe();

        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            loop {
                match rx.blocking_recv() {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);

                        match change {
                            StateChange::DirectoriesChanged => {
                                let snapshot = state_manager_clone.snapshot();
                                metrics.record_ui_update();
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_input_dir(snapshot.input_dir.to_string().into());
                                    ui.set_output_dir(snapshot.output_dir.to_string().into());
                                });
                            }

                            StateChange::RotationStarted { total_files } => {
                                tracing::info!("Rotation started: {} files", total_files);
                                metrics.record_ui_update();
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_is_rotating(true);
                                    ui.set_progress_current(0);
                                    ui.set_progress_total(total_files as i32);
                                    ui.set_current_file("".into());
                                });
                            }

                            StateChange::ProgressUpdated {
                                current,
                                total,
                                current_file,
                            } => {
                                metrics.record_ui_update();
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_progress_current(current as i32);
                                    ui.set_progress_total(total as i32);
                                    ui.set_current_file(
                                        current_file.unwrap_or_default().into(),
                                    );
                                });
                            }

                            StateChange::FileProcessed { file, ok, message } => {
                                // Progress and status events carry the UI
                                // change; this one is for the log
                                tracing::debug!(
                                    "File processed: {} (ok={}) - {}",
                                    file,
                                    ok,
                                    message
                                );
                            }

                            StateChange::RotationFinished {
                                rotated,
                                failed,
                                cancelled,
                            } => {
                                tracing::info!(
                                    "Rotation finished: rotated={}, failed={}, cancelled={}",
                                    rotated,
                                    failed,
                                    cancelled
                                );
                                metrics.record_ui_update();
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_is_rotating(false);
                                    ui.set_current_file("".into());
                                });
                            }

                            StateChange::StatusChanged { message } => {
                                // The status message is the window title
                                metrics.record_ui_update();
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_status_message(message.into());
                                });
                            }

                            StateChange::SettingsChanged => {
                                tracing::debug!("Settings changed");
                            }

                            StateChange::StateReset => {
                                tracing::info!("State reset");
                                metrics.record_ui_update();
                                bridge_handle.update_ui(|ui| {
                                    ui.set_is_rotating(false);
                                    ui.set_progress_current(0);
                                    ui.set_progress_total(0);
                                    ui.set_current_file("".into());
                                });
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        tracing::info!(
                            "State broadcast channel closed - shutting down subscription thread"
                        );
                        break;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        // Recoverable; keep receiving
                        tracing::warn!(
                            "State subscription lagged - {} events were skipped",
                            skipped
                        );
                    }
                }
            }

            tracing::debug!("State subscription thread terminated gracefully");
        });
    }

    /// Show a native folder picker.
    ///
    /// # Returns
    /// The selected directory, or None if cancelled.
    fn show_folder_picker(title: &str) -> Option<Utf8PathBuf> {
        rfd::FileDialog::new()
            .set_title(title)
            .pick_folder()
            .and_then(|path| {
                Utf8PathBuf::from_path_buf(path)
                    .map_err(|path| {
                        tracing::error!(
                            "Selected path is not UTF-8: {}",
                            path.display()
                        );
                    })
                    .ok()
            })
    }

    /// Write the current directory and worker settings back to the YAML
    /// settings file.
    fn persist_settings(config_manager: &ConfigManager, state_manager: &StateManager) {
        let config = state_manager.read(|s| UserConfig {
            settings: RotateSettings {
                input_dir: s.input_dir.to_string(),
                output_dir: s.output_dir.to_string(),
                worker_threads: s.worker_threads,
                debug_mode: s.debug_mode,
            },
        });

        if let Err(e) = config_manager.save_user_config(&config) {
            tracing::error!("Failed to save settings: {:#}", e);
        }
    }

    // ===== Rotation orchestration =====

    /// Run the complete rotation workflow:
    /// 1. Scan the input directory for JPEG files
    /// 2. Mark the run started in state
    /// 3. Drive the rayon batch from a blocking task, recording each file
    /// 4. Finish with a completion summary or the cancellation message
    ///
    /// All UI effects flow through state change events; this method never
    /// touches the window directly.
    async fn run_rotation_workflow(
        state: Arc<StateManager>,
        metrics: Arc<Metrics>,
        cancel_rx: watch::Receiver<bool>,
    ) -> Result<()> {
        tracing::info!("Starting rotation workflow");

        let (input_dir, output_dir, workers) = state.read(|s| {
            (
                s.input_dir.clone(),
                s.output_dir.clone(),
                s.worker_threads,
            )
        });

        // walkdir is blocking I/O, so it runs off the async worker threads
        let scan_dir = input_dir.clone();
        let files = tokio::task::spawn_blocking(move || scanner::scan_images(&scan_dir))
            .await
            .context("Scan task panicked")?
            .with_context(|| format!("Failed to scan {}", input_dir))?;

        if files.is_empty() {
            tracing::warn!("No pictures found in {}", input_dir);
            state.set_status(format!("No pictures found in {}", input_dir));
            return Ok(());
        }

        state.start_rotation(files.len());

        let service = RotationService::new(workers);
        let started = Instant::now();

        let state_for_items = Arc::clone(&state);
        let metrics_for_items = Arc::clone(&metrics);

        let result = tokio::task::spawn_blocking(move || {
            service.rotate_batch(&files, &output_dir, cancel_rx, |outcome| {
                if outcome.ok {
                    metrics_for_items.record_file_rotated();
                } else {
                    metrics_for_items.record_file_failed();
                }
                state_for_items.add_file_result(outcome.file_name, outcome.ok, outcome.message);
            })
        })
        .await
        .context("Rotation task panicked")?;

        metrics.record_rotation_time(started.elapsed());

        match result {
            Ok(BatchSummary { rotated, failed }) => {
                tracing::info!(
                    "Rotation workflow completed: {} rotated, {} failed",
                    rotated,
                    failed
                );
                state.finish_rotation(false);
            }
            Err(RotationError::Cancelled) => {
                tracing::warn!("Rotation workflow cancelled by user");
                metrics.record_run_cancelled();
                state.finish_rotation(true);
            }
            Err(e) => {
                // Clear the run flags; the caller reports the error in the
                // status message
                state.update(|s| {
                    s.is_rotating = false;
                    s.current_file = None;
                });
                return Err(e).context("Rotation batch failed");
            }
        }

        Ok(())
    }
}
