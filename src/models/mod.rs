//! Data models for the PicFlip application.
//!
//! - [`AppState`]: the central state container holding directories, run flags,
//!   progress, and per-run results
//! - [`UserConfig`]: user preferences loaded from `PicFlip Settings.yaml`
//!
//! Config structs derive `Serialize`/`Deserialize` for YAML persistence.
//! `AppState` is wrapped in `Arc<RwLock<>>` by
//! [`StateManager`](crate::state::StateManager); all mutations go through its
//! `update()` method so change events stay consistent.

pub mod app_state;
pub mod config;

pub use app_state::{AppState, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
pub use config::{RotateSettings, UserConfig};
