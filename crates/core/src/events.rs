//! Single-consumer dispatch of directory events to the app's handlers.
//!
//! The host's event callbacks are modeled as messages on one mpsc queue
//! consumed by one cooperative task. Handler errors are logged and the
//! event abandoned with no retry; the next independent event or scheduled
//! pass repairs whatever was missed. No error stops the loop.

use std::sync::Arc;

use tmpc_directory::DirectoryEvent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::App;

/// Consume directory events until the channel closes.
///
/// Spawn this as a background task:
///
/// ```ignore
/// let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
/// tokio::spawn(run_event_loop(Arc::clone(&app), rx));
/// ```
pub async fn run_event_loop(app: Arc<App>, mut rx: mpsc::UnboundedReceiver<DirectoryEvent>) {
    while let Some(event) = rx.recv().await {
        let result = match event {
            DirectoryEvent::TabCreated(tab) => app.handle_tab_created(tab).await,
            DirectoryEvent::TabRemoved { id } => app.handle_tab_removed(id).await,
            DirectoryEvent::ContainerCreated(container) => {
                app.handle_container_created(container).await
            }
            DirectoryEvent::ContainerUpdated(container) => {
                app.handle_container_updated(container).await
            }
            DirectoryEvent::ContainerRemoved { id } => app.handle_container_removed(id).await,
        };
        if let Err(error) = result {
            warn!(%error, "event handler failed, abandoning event");
        }
    }
    debug!("event loop ended (channel closed)");
}
