//! In-memory directories for tests and local harnesses.
//!
//! `MemoryDirectory` implements both directory traits over plain maps and
//! exposes controller knobs for exercising the service without a host:
//! an injectable per-query delay, simulated read-after-write lag for
//! removed tabs, and instrumentation of concurrent list queries.
//!
//! # Example
//!
//! ```ignore
//! let dir = Arc::new(MemoryDirectory::new());
//! let app = Arc::new(App::new(dir.clone(), dir.clone()));
//!
//! let container = dir.seed_container("Shopping");
//! let tab = dir.seed_tab(&container.id, WindowId(1), 0);
//! app.rebuild().await?;
//! ```

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tmpc_directory::{
    Container, ContainerColor, ContainerDirectory, ContainerIcon, ContainerId, ContainerPatch,
    DirectoryError, DirectoryEvent, NewContainer, NewTab, Result, Tab, TabDirectory, TabId,
    TabQuery, WindowId,
};
use tokio::sync::mpsc;

#[derive(Default)]
struct Inner {
    containers: BTreeMap<ContainerId, Container>,
    tabs: BTreeMap<TabId, Tab>,
    /// Removed tabs still visible to queries until [`MemoryDirectory::settle`].
    lagging: HashSet<TabId>,
    next_container: u64,
    next_tab: u64,
}

/// In-memory implementation of both directory traits.
#[derive(Default)]
pub struct MemoryDirectory {
    inner: Mutex<Inner>,
    query_delay: Mutex<Duration>,
    lag_removed_tabs: Mutex<bool>,
    events: Mutex<Option<mpsc::UnboundedSender<DirectoryEvent>>>,
    lists_inflight: AtomicUsize,
    lists_inflight_peak: AtomicUsize,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    // Controller surface

    /// Deliver lifecycle events for every mutation to the given sender.
    pub fn set_event_sink(&self, tx: mpsc::UnboundedSender<DirectoryEvent>) {
        *self.events.lock() = Some(tx);
    }

    /// Delay every list query, widening suspension windows for race tests.
    pub fn set_query_delay(&self, delay: Duration) {
        *self.query_delay.lock() = delay;
    }

    /// When enabled, removed tabs keep appearing in queries until
    /// [`settle`](Self::settle) - the read-after-write lag real hosts show.
    pub fn set_tab_removal_lag(&self, lag: bool) {
        *self.lag_removed_tabs.lock() = lag;
    }

    /// Flush lagging removals out of query results.
    pub fn settle(&self) {
        let mut inner = self.inner.lock();
        let lagging = std::mem::take(&mut inner.lagging);
        for id in lagging {
            inner.tabs.remove(&id);
        }
    }

    /// Seed a container directly, bypassing events. Test setup only.
    pub fn seed_container(&self, name: &str) -> Container {
        let mut inner = self.inner.lock();
        inner.next_container += 1;
        let container = Container {
            id: ContainerId(format!("mem-container-{}", inner.next_container)),
            name: name.to_string(),
            color: ContainerColor::Blue,
            icon: ContainerIcon::Circle,
        };
        inner
            .containers
            .insert(container.id.clone(), container.clone());
        container
    }

    /// Seed an open tab directly, bypassing events. Test setup only.
    pub fn seed_tab(&self, container: &ContainerId, window: WindowId, index: u32) -> Tab {
        let mut inner = self.inner.lock();
        inner.next_tab += 1;
        let tab = Tab {
            id: TabId(inner.next_tab),
            container_id: container.clone(),
            window_id: window,
            index,
            active: false,
        };
        inner.tabs.insert(tab.id, tab.clone());
        tab
    }

    pub fn container(&self, id: &ContainerId) -> Option<Container> {
        self.inner.lock().containers.get(id).cloned()
    }

    pub fn contains_container(&self, id: &ContainerId) -> bool {
        self.inner.lock().containers.contains_key(id)
    }

    pub fn container_count(&self) -> usize {
        self.inner.lock().containers.len()
    }

    /// Highest number of list queries ever in flight at once.
    pub fn peak_concurrent_lists(&self) -> usize {
        self.lists_inflight_peak.load(Ordering::Relaxed)
    }

    fn emit(&self, event: DirectoryEvent) {
        if let Some(tx) = self.events.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    async fn list_entered(&self) -> ListGuard<'_> {
        let inflight = self.lists_inflight.fetch_add(1, Ordering::SeqCst) + 1;
        self.lists_inflight_peak
            .fetch_max(inflight, Ordering::SeqCst);
        let delay = *self.query_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        ListGuard(self)
    }
}

struct ListGuard<'a>(&'a MemoryDirectory);

impl Drop for ListGuard<'_> {
    fn drop(&mut self) {
        self.0.lists_inflight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContainerDirectory for MemoryDirectory {
    async fn list_containers(&self) -> Result<Vec<Container>> {
        let _guard = self.list_entered().await;
        Ok(self.inner.lock().containers.values().cloned().collect())
    }

    async fn get_container(&self, id: &ContainerId) -> Result<Container> {
        self.inner
            .lock()
            .containers
            .get(id)
            .cloned()
            .ok_or(DirectoryError::NotFound)
    }

    async fn create_container(&self, new: NewContainer) -> Result<Container> {
        let container = {
            let mut inner = self.inner.lock();
            inner.next_container += 1;
            let container = Container {
                id: ContainerId(format!("mem-container-{}", inner.next_container)),
                name: new.name,
                color: new.color,
                icon: new.icon,
            };
            inner
                .containers
                .insert(container.id.clone(), container.clone());
            container
        };
        self.emit(DirectoryEvent::ContainerCreated(container.clone()));
        Ok(container)
    }

    async fn update_container(&self, id: &ContainerId, patch: ContainerPatch) -> Result<Container> {
        let container = {
            let mut inner = self.inner.lock();
            let container = inner.containers.get_mut(id).ok_or(DirectoryError::NotFound)?;
            if let Some(name) = patch.name {
                container.name = name;
            }
            if let Some(color) = patch.color {
                container.color = color;
            }
            if let Some(icon) = patch.icon {
                container.icon = icon;
            }
            container.clone()
        };
        self.emit(DirectoryEvent::ContainerUpdated(container.clone()));
        Ok(container)
    }

    async fn remove_container(&self, id: &ContainerId) -> Result<()> {
        self.inner
            .lock()
            .containers
            .remove(id)
            .ok_or(DirectoryError::NotFound)?;
        self.emit(DirectoryEvent::ContainerRemoved { id: id.clone() });
        Ok(())
    }
}

#[async_trait]
impl TabDirectory for MemoryDirectory {
    async fn list_tabs(&self, query: TabQuery) -> Result<Vec<Tab>> {
        let _guard = self.list_entered().await;
        Ok(self
            .inner
            .lock()
            .tabs
            .values()
            .filter(|tab| query.matches(tab))
            .cloned()
            .collect())
    }

    async fn create_tab(&self, new: NewTab) -> Result<Tab> {
        let tab = {
            let mut inner = self.inner.lock();
            inner.next_tab += 1;
            let window = WindowId(1);
            let index = new.index.unwrap_or_else(|| {
                inner
                    .tabs
                    .values()
                    .filter(|tab| tab.window_id == window)
                    .count() as u32
            });
            let tab = Tab {
                id: TabId(inner.next_tab),
                container_id: new
                    .container_id
                    .unwrap_or_else(|| ContainerId::from("default")),
                window_id: window,
                index,
                active: new.active,
            };
            inner.tabs.insert(tab.id, tab.clone());
            tab
        };
        self.emit(DirectoryEvent::TabCreated(tab.clone()));
        Ok(tab)
    }

    async fn remove_tab(&self, id: TabId) -> Result<()> {
        {
            let mut inner = self.inner.lock();
            if !inner.tabs.contains_key(&id) || inner.lagging.contains(&id) {
                return Err(DirectoryError::NotFound);
            }
            if *self.lag_removed_tabs.lock() {
                inner.lagging.insert(id);
            } else {
                inner.tabs.remove(&id);
            }
        }
        self.emit(DirectoryEvent::TabRemoved { id });
        Ok(())
    }
}
