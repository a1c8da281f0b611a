// EventLoopBridge - coordinates between the tokio runtime and the Slint
// event loop.
//
// Two event loops run in this application: Slint's single-threaded GUI loop
// and tokio's multi-threaded runtime. The bridge marshals UI updates from
// tokio tasks (and rayon workers reporting through them) onto the Slint
// thread, and lets Slint callbacks spawn async work.

use slint::ComponentHandle;
use std::future::Future;
use tokio::sync::mpsc;

/// Bridge between the tokio runtime and the Slint event loop.
///
/// Owns the handler thread and the update channel; callbacks work through
/// cloneable [`EventLoopBridgeHandle`]s obtained from
/// [`clone_handle()`](Self::clone_handle).
pub struct EventLoopBridge<T: ComponentHandle> {
    tokio_handle: tokio::runtime::Handle,

    /// Pending UI updates; bounded so a lagging UI cannot grow memory
    /// without limit
    ui_update_tx: mpsc::Sender<Box<dyn FnOnce(&T) + Send>>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create a bridge for the given UI component.
    ///
    /// Spawns a handler thread that drains queued updates and forwards each
    /// one to the Slint event loop via `upgrade_in_event_loop`.
    pub fn new(ui: &T, tokio_handle: tokio::runtime::Handle) -> Self {
        let ui_weak = ui.as_weak();
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<Box<dyn FnOnce(&T) + Send>>(100);

        std::thread::spawn(move || {
            tracing::debug!("EventLoopBridge handler thread started");

            while let Some(update_fn) = ui_update_rx.blocking_recv() {
                let result = ui_weak.upgrade_in_event_loop(move |ui| {
                    update_fn(&ui);
                });

                if let Err(e) = result {
                    // The event loop has likely stopped; shut the thread down
                    tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                    break;
                }
            }

            tracing::debug!("EventLoopBridge handler thread terminated");
        });

        Self {
            tokio_handle,
            ui_update_tx,
        }
    }

    /// Get a cloneable handle for capture in multiple Slint callbacks.
    pub fn clone_handle(&self) -> EventLoopBridgeHandle<T> {
        EventLoopBridgeHandle {
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

fn send_update<T>(tx: &mpsc::Sender<Box<dyn FnOnce(&T) + Send>>, update: impl FnOnce(&T) + Send + 'static) {
    match tx.try_send(Box::new(update)) {
        Ok(_) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!("UI update channel full - dropping update");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::warn!("Failed to send UI update - handler thread has stopped");
        }
    }
}

/// Cloneable handle to the bridge for use inside callbacks.
pub struct EventLoopBridgeHandle<T: ComponentHandle> {
    tokio_handle: tokio::runtime::Handle,
    ui_update_tx: mpsc::Sender<Box<dyn FnOnce(&T) + Send>>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridgeHandle<T> {
    /// Schedule a UI update from any thread.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        send_update(&self.ui_update_tx, update);
    }

    /// Spawn an async task on the tokio runtime.
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }
}
