//! Lifecycle events emitted by the host's directories.

use serde::{Deserialize, Serialize};

use crate::types::{Container, ContainerId, Tab, TabId};

/// A single lifecycle notification.
///
/// Delivery order relative to directory query results is not guaranteed:
/// a tab whose `TabRemoved` event has been delivered may still appear in a
/// subsequent `list_tabs` snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DirectoryEvent {
    TabCreated(Tab),
    TabRemoved { id: TabId },
    ContainerCreated(Container),
    ContainerUpdated(Container),
    ContainerRemoved { id: ContainerId },
}
