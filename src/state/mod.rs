// State management module
//
// Wraps AppState with thread-safe access via Arc<RwLock<T>> and emits change
// events for GUI updates.

use crate::models::AppState;
use camino::Utf8PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified.
///
/// Subscribers (primarily the GUI) react to these instead of polling state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Input or output directory changed
    DirectoriesChanged,

    /// A rotation run has started
    RotationStarted { total_files: usize },

    /// Progress during a rotation run
    ProgressUpdated {
        current: usize,
        total: usize,
        current_file: Option<String>,
    },

    /// One file finished processing
    FileProcessed {
        file: String,
        ok: bool,
        message: String,
    },

    /// A rotation run has finished
    RotationFinished {
        rotated: usize,
        failed: usize,
        cancelled: bool,
    },

    /// The status message (shown as the window title) changed
    StatusChanged { message: String },

    /// Settings have been updated
    SettingsChanged,

    /// State has been reset
    StateReset,
}

/// Thread-safe state manager with event emission.
///
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes in [`update()`](Self::update) and emits
///   [`StateChange`] events on a tokio broadcast channel
/// - Supports any number of subscribers via [`subscribe()`](Self::subscribe)
pub struct StateManager {
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state and a broadcast buffer of
    /// 100 events.
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state.
    pub fn snapshot(&self) -> AppState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events.
    ///
    /// Captures the old state, applies the update, diffs the two, and emits
    /// one event per detected change.
    ///
    /// # Returns
    /// The StateChange events that were emitted.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = self.detect_changes(&old_state, &state);

        for change in &changes {
            // Send errors just mean no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Diff two states and generate the events to emit.
    fn detect_changes(&self, old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.input_dir != new.input_dir || old.output_dir != new.output_dir {
            changes.push(StateChange::DirectoriesChanged);
        }

        if old.is_rotating != new.is_rotating {
            if new.is_rotating {
                changes.push(StateChange::RotationStarted {
                    total_files: new.total_files,
                });
            } else {
                changes.push(StateChange::RotationFinished {
                    rotated: new.rotated_files.len(),
                    failed: new.failed_files.len(),
                    cancelled: new.cancel_requested,
                });
            }
        }

        if old.progress != new.progress
            || old.total_files != new.total_files
            || old.current_file != new.current_file
        {
            changes.push(StateChange::ProgressUpdated {
                current: new.progress,
                total: new.total_files,
                current_file: new.current_file.clone(),
            });
        }

        if old.status_message != new.status_message {
            changes.push(StateChange::StatusChanged {
                message: new.status_message.clone(),
            });
        }

        if old.worker_threads != new.worker_threads || old.debug_mode != new.debug_mode {
            changes.push(StateChange::SettingsChanged);
        }

        changes
    }

    // Convenience methods for common state updates

    /// Set the input directory.
    pub fn set_input_dir(&self, dir: Utf8PathBuf) -> Vec<StateChange> {
        self.update(|state| {
            state.input_dir = dir;
        })
    }

    /// Set the output directory.
    pub fn set_output_dir(&self, dir: Utf8PathBuf) -> Vec<StateChange> {
        self.update(|state| {
            state.output_dir = dir;
        })
    }

    /// Set the status message shown in the window title.
    pub fn set_status(&self, message: impl Into<String>) -> Vec<StateChange> {
        let message = message.into();
        self.update(|state| {
            state.status_message = message;
        })
    }

    /// Claim the next rotation run.
    ///
    /// Checks and sets the pending flag under a single write lock, so of two
    /// rapid Rotate clicks exactly one wins; the loser sees `false` and must
    /// not spawn a workflow. Released by [`start_rotation`](Self::start_rotation)
    /// handing over to `is_rotating`, by [`finish_rotation`](Self::finish_rotation),
    /// or explicitly on a workflow exit path that never reached either.
    pub fn try_begin_run(&self) -> bool {
        let mut state = self.state.write().unwrap();
        if state.is_rotating || state.run_pending {
            return false;
        }
        state.run_pending = true;
        true
    }

    /// Release a claimed run without finishing it.
    ///
    /// Idempotent; called on workflow exit paths (scan error, empty folder)
    /// that never reach `start_rotation`/`finish_rotation`.
    pub fn release_run_claim(&self) {
        let mut state = self.state.write().unwrap();
        state.run_pending = false;
    }

    /// Start a rotation run over the given number of files.
    pub fn start_rotation(&self, total_files: usize) -> Vec<StateChange> {
        self.update(|state| {
            state.is_rotating = true;
            state.run_pending = false;
            state.cancel_requested = false;
            state.progress = 0;
            state.total_files = total_files;
            state.current_file = None;
            state.status_message = format!("Rotating {} pictures...", total_files);
            state.rotated_files.clear();
            state.failed_files.clear();
        })
    }

    /// Flag the active run for cancellation.
    ///
    /// Workers observe the watch channel, not this flag; the flag records the
    /// user's intent so the finish event can report a cancelled run.
    pub fn request_cancel(&self) -> Vec<StateChange> {
        self.update(|state| {
            if state.is_rotating {
                state.cancel_requested = true;
                state.status_message = "Cancelling...".to_string();
            }
        })
    }

    /// Record the result of processing one file.
    ///
    /// Also surfaces the per-file message as the status (and thus the window
    /// title), mirroring per-item progress reporting.
    pub fn add_file_result(
        &self,
        file: String,
        ok: bool,
        message: String,
    ) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.current_file = Some(file.clone());
            state.status_message = message.clone();
            state.add_result(file.clone(), ok);
        });

        let file_event = StateChange::FileProcessed { file, ok, message };
        let _ = self.state_tx.send(file_event.clone());
        changes.push(file_event);

        changes
    }

    /// Finish the active run.
    ///
    /// The status message becomes the cancellation message or a completion
    /// summary, which the GUI writes into the window title.
    pub fn finish_rotation(&self, cancelled: bool) -> Vec<StateChange> {
        self.update(|state| {
            state.is_rotating = false;
            state.run_pending = false;
            state.cancel_requested = cancelled;
            state.current_file = None;
            state.status_message = if cancelled {
                "Rotation cancelled by user".to_string()
            } else {
                let (rotated, failed, _) = state.run_stats();
                if failed > 0 {
                    format!("Done! {} rotated, {} failed", rotated, failed)
                } else {
                    format!("Done! {} rotated", rotated)
                }
            };
        })
    }

    /// Reset all run-related state.
    pub fn reset_run_state(&self) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.reset_run_state();
        });

        let reset_event = StateChange::StateReset;
        let _ = self.state_tx.send(reset_event.clone());
        changes.push(reset_event);

        changes
    }

    /// Update settings.
    pub fn update_settings<F>(&self, settings_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        self.update(settings_fn)
    }

    /// Populate state from the loaded user configuration.
    pub fn load_from_user_config(
        &self,
        user_config: &crate::models::UserConfig,
    ) -> Vec<StateChange> {
        self.update(|state| {
            let settings = &user_config.settings;

            if !settings.input_dir.is_empty() {
                state.input_dir = Utf8PathBuf::from(&settings.input_dir);
            }
            if !settings.output_dir.is_empty() {
                state.output_dir = Utf8PathBuf::from(&settings.output_dir);
            }
            state.worker_threads = settings.worker_threads;
            state.debug_mode = settings.debug_mode;

            tracing::info!(
                "Loaded settings: input={}, output={}, workers={}",
                state.input_dir,
                state.output_dir,
                state.effective_worker_threads()
            );
        })
    }

}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Cloneable so it can be captured by multiple UI callbacks
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
