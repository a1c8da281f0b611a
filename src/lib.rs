//! PicFlip - batch 180-degree image rotation with a Slint GUI.
//!
//! Scans an input directory recursively for JPEG files, rotates each one
//! 180 degrees on a rayon worker pool bounded by the processor count, and
//! writes the results into an output directory. Per-file progress is shown
//! in the window title, and the user can cancel the run at any time;
//! workers poll the cancellation signal once per file.
//!
//! # Architecture
//!
//! - [`models`]: application state and the YAML settings schema
//! - [`state`]: `StateManager` with broadcast change events
//! - [`services`]: directory scanning and the parallel rotation batch
//! - [`config`]: settings persistence
//! - [`ui`]: Slint window, event loop bridge, and the controller
//! - [`metrics`]: lock-free performance counters
//!
//! Three kinds of threads cooperate: Slint's event loop on the main thread,
//! a tokio runtime for orchestration, and rayon workers for the pixel work.
//! All UI updates are marshalled onto the Slint thread through the
//! [`ui::EventLoopBridge`].

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{AppState, UserConfig};
pub use state::{StateChange, StateManager};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "PicFlip";
