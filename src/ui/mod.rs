//! UI module - Slint window, event loop bridging, and the GUI controller.
//!
//! The window title is bound to the status message and serves as the
//! progress display during a rotation run.

pub mod bridge;
pub mod controller;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle};
pub use controller::GuiController;
