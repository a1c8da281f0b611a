use camino::Utf8PathBuf;
use std::collections::HashSet;

/// Default input folder scanned for JPEG files.
pub const DEFAULT_INPUT_DIR: &str = "TestPictures";

/// Default output folder for rotated copies.
pub const DEFAULT_OUTPUT_DIR: &str = "ModifiedPictures";

/// Single source of truth for all application state.
///
/// Contains the configured directories, runtime flags for the active rotation
/// run, progress tracking, and per-run results.
///
/// # Thread Safety
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by
/// [`crate::state::StateManager`]. Never access it directly from multiple
/// threads - go through the manager:
/// - [`read()`](crate::state::StateManager::read) for read-only access
/// - [`update()`](crate::state::StateManager::update) for mutations with
///   automatic change events
#[derive(Clone, Debug)]
pub struct AppState {
    // Directories
    pub input_dir: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,

    // Runtime state
    pub is_rotating: bool,
    /// A Rotate click has claimed the next run but the workflow has not
    /// reached `start_rotation` yet. Blocks a second click from spawning a
    /// concurrent run during that window.
    pub run_pending: bool,
    pub cancel_requested: bool,
    pub current_file: Option<String>,
    pub status_message: String,

    // Progress state
    pub progress: usize,
    pub total_files: usize,

    // Results of the current run
    pub rotated_files: HashSet<String>,
    pub failed_files: HashSet<String>,

    // Settings
    pub worker_threads: usize, // 0 means one worker per logical processor
    pub debug_mode: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            input_dir: Utf8PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),

            is_rotating: false,
            run_pending: false,
            cancel_requested: false,
            current_file: None,
            status_message: "PicFlip - Ready".to_string(),

            progress: 0,
            total_files: 0,

            rotated_files: HashSet::new(),
            failed_files: HashSet::new(),

            worker_threads: 0,
            debug_mode: false,
        }
    }
}

impl AppState {
    /// Number of rayon workers the next run will use.
    ///
    /// A configured value of 0 means "one per logical processor", matching
    /// the processor-count bound of the parallel loop.
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get()
        } else {
            self.worker_threads
        }
    }

    /// Summary of the current run as (rotated, failed, total).
    pub fn run_stats(&self) -> (usize, usize, usize) {
        (
            self.rotated_files.len(),
            self.failed_files.len(),
            self.total_files,
        )
    }

    /// Record the outcome of a single file and advance progress.
    pub fn add_result(&mut self, file: String, ok: bool) {
        if ok {
            self.rotated_files.insert(file);
        } else {
            self.failed_files.insert(file);
        }
        self.progress += 1;
    }

    /// Reset all run-related state to initial values.
    pub fn reset_run_state(&mut self) {
        self.is_rotating = false;
        self.run_pending = false;
        self.cancel_requested = false;
        self.current_file = None;
        self.status_message = "PicFlip - Ready".to_string();
        self.progress = 0;
        self.total_files = 0;
        self.rotated_files.clear();
        self.failed_files.clear();
    }
}
