//! Services module - pure business logic for batch image rotation.
//!
//! Framework-agnostic: no Slint, no GUI code. The UI layer drives these
//! services and renders their results.
//!
//! # Components
//!
//! - [`scanner`]: recursive `*.jpg`/`*.jpeg` directory scan via `walkdir`
//! - [`RotationService`]: decode → rotate 180° → encode per file, executed as
//!   a rayon parallel loop bounded by the processor count, with cooperative
//!   cancellation polled once per item

pub mod rotation;
pub mod scanner;

pub use rotation::{BatchSummary, FileOutcome, RotationError, RotationService};
pub use scanner::{scan_images, JPEG_EXTENSIONS};
