//! In-memory directory of owned containers and their open tabs.
//!
//! The store is the service's volatile belief about which containers it
//! owns and which tabs they hold. A forward map `container -> tabs` and a
//! reverse index `tab -> container` are kept consistent by every
//! operation. Nothing here touches the host directories; reconciliation
//! decides when the belief is wrong and corrects it.

use std::collections::{HashMap, HashSet};

use tmpc_directory::{ContainerId, Tab, TabId};

/// Volatile map of owned containers to their open tabs.
#[derive(Debug, Default)]
pub struct StateStore {
    containers: HashMap<ContainerId, HashSet<TabId>>,
    tabs: HashMap<TabId, ContainerId>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a container. Idempotent; an already-tracked
    /// container keeps its recorded tabs.
    pub fn record_container(&mut self, id: ContainerId) {
        self.containers.entry(id).or_default();
    }

    /// Record a tab under its container.
    ///
    /// Returns false (and records nothing) when the tab's container is not
    /// tracked; tabs in foreign containers are none of our business.
    pub fn record_tab(&mut self, tab: &Tab) -> bool {
        let Some(tabs) = self.containers.get_mut(&tab.container_id) else {
            return false;
        };
        tabs.insert(tab.id);
        self.tabs.insert(tab.id, tab.container_id.clone());
        true
    }

    /// Forget a tab, returning the container it was recorded under.
    pub fn forget_tab(&mut self, id: TabId) -> Option<ContainerId> {
        let container_id = self.tabs.remove(&id)?;
        if let Some(tabs) = self.containers.get_mut(&container_id) {
            tabs.remove(&id);
        }
        Some(container_id)
    }

    /// Stop tracking a container, dropping its tabs from the reverse index.
    pub fn forget_container(&mut self, id: &ContainerId) {
        if let Some(tabs) = self.containers.remove(id) {
            for tab in tabs {
                self.tabs.remove(&tab);
            }
        }
    }

    pub fn is_tracked(&self, id: &ContainerId) -> bool {
        self.containers.contains_key(id)
    }

    /// Whether a tracked container has no recorded tabs. Untracked
    /// containers are not "empty"; they are unknown.
    pub fn is_empty_container(&self, id: &ContainerId) -> bool {
        self.containers.get(id).is_some_and(HashSet::is_empty)
    }

    pub fn container_of(&self, tab: TabId) -> Option<&ContainerId> {
        self.tabs.get(&tab)
    }

    pub fn tracked_containers(&self) -> impl Iterator<Item = &ContainerId> {
        self.containers.keys()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Drop everything. Used by full reconciliation before repopulating.
    pub fn clear(&mut self) {
        self.containers.clear();
        self.tabs.clear();
    }

    /// Snapshot of the forward map, for comparisons in tests and logs.
    pub fn snapshot(&self) -> HashMap<ContainerId, HashSet<TabId>> {
        self.containers.clone()
    }
}
