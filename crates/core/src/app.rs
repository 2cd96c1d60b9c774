//! The application object: owned-container tracking and reconciliation.
//!
//! One `App` is constructed per process and shared behind `Arc`. It holds
//! the directory handles, the volatile [`StateStore`], and the cleanup
//! counter; every handler and reconciliation surface is a method here.
//!
//! # Consistency model
//!
//! Handlers run on the async runtime and suspend at every directory call.
//! Interior state is guarded by a `parking_lot` mutex that is never held
//! across a suspension point, so any belief derived before an `.await`
//! must be re-validated after it. Reconciliation is idempotent and
//! self-correcting rather than atomic: a pass that races with concurrent
//! mutation leaves at worst a stale entry that the next pass corrects.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tmpc_directory::{
    Container, ContainerColor, ContainerDirectory, ContainerIcon, ContainerId, ContainerPatch,
    DirectoryError, NewContainer, Tab, TabDirectory, TabId, TabQuery,
};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::fingerprint::{generate_fingerprint, is_marked, is_owned};
use crate::neighbors;
use crate::palette::pick_color;
use crate::scheduler::CleanupCounter;
use crate::state::StateStore;

/// Placeholder name used between creating a container and learning its id.
/// The fingerprint needs the id, which only the create call reveals.
const PLACEHOLDER_NAME: &str = "Temp";

/// Lifecycle service over a pair of host directories.
pub struct App {
    containers: Arc<dyn ContainerDirectory>,
    tabs: Arc<dyn TabDirectory>,
    state: Mutex<StateStore>,
    cleanup: CleanupCounter,
    passes: AtomicU64,
}

impl App {
    pub fn new(containers: Arc<dyn ContainerDirectory>, tabs: Arc<dyn TabDirectory>) -> Self {
        Self {
            containers,
            tabs,
            state: Mutex::new(StateStore::new()),
            cleanup: CleanupCounter::new(),
            passes: AtomicU64::new(0),
        }
    }

    // Creation & adoption

    /// Create, track, and return a new temporary container.
    ///
    /// The container is created under a placeholder name, then renamed to
    /// its fingerprint once the directory has assigned an id.
    pub async fn create_container(&self, deny: &[ContainerColor]) -> Result<Container> {
        let color = pick_color(deny)?;
        let created = self
            .containers
            .create_container(NewContainer {
                name: PLACEHOLDER_NAME.to_string(),
                color,
                icon: ContainerIcon::Circle,
            })
            .await?;
        let name = generate_fingerprint(&created.id);
        let container = self
            .containers
            .update_container(
                &created.id,
                ContainerPatch {
                    name: Some(name),
                    ..Default::default()
                },
            )
            .await?;
        self.state.lock().record_container(container.id.clone());
        debug!(id = %container.id, "created temporary container");
        Ok(container)
    }

    /// Convert a marked container into a tracked temporary one.
    async fn adopt(&self, container: &Container, deny: &[ContainerColor]) -> Result<Container> {
        let name = generate_fingerprint(&container.id);
        let color = pick_color(deny)?;
        let adopted = self
            .containers
            .update_container(
                &container.id,
                ContainerPatch {
                    name: Some(name),
                    color: Some(color),
                    icon: Some(ContainerIcon::Circle),
                },
            )
            .await?;
        self.state.lock().record_container(adopted.id.clone());
        info!(id = %adopted.id, "adopted marked container");
        Ok(adopted)
    }

    // Reconciliation

    /// Full reconciliation from a fresh snapshot pair.
    ///
    /// After completion the state store holds exactly the classified,
    /// non-empty containers observed in this snapshot: every container is
    /// classified via its fingerprint (or adopted via the mark), tabs are
    /// attached to classified containers, and classified containers with
    /// no tabs are destroyed. Not atomic against concurrent mutation; a
    /// later pass corrects anything this one raced with.
    pub async fn rebuild(&self) -> Result<()> {
        let (containers, tabs) = tokio::join!(
            self.containers.list_containers(),
            self.tabs.list_tabs(TabQuery::default()),
        );
        let containers = containers?;
        let tabs = tabs?;

        let mut classified = Vec::new();
        for container in &containers {
            if is_owned(&container.name, &container.id) {
                classified.push(container.id.clone());
            } else if is_marked(&container.name) {
                match self.adopt(container, &[]).await {
                    Ok(adopted) => classified.push(adopted.id),
                    Err(error) => {
                        warn!(id = %container.id, %error, "failed to adopt marked container")
                    }
                }
            }
        }

        let empty: Vec<ContainerId> = {
            let mut state = self.state.lock();
            state.clear();
            for id in &classified {
                state.record_container(id.clone());
            }
            for tab in &tabs {
                state.record_tab(tab);
            }
            classified
                .iter()
                .filter(|id| state.is_empty_container(id))
                .cloned()
                .collect()
        };

        for id in &empty {
            self.destroy(id).await?;
        }

        let state = self.state.lock();
        info!(
            containers = state.container_count(),
            tabs = state.tab_count(),
            destroyed = empty.len(),
            "rebuilt container state"
        );
        Ok(())
    }

    /// Stateless reconciliation pass: destroy every owned, empty container
    /// visible in a fresh snapshot.
    ///
    /// `excluded` compensates for the directories' read-after-write lag:
    /// ids of tabs known to be closing that may still appear in the query.
    /// Containers are fetched strictly before tabs so a container created
    /// concurrently with this pass stays visible even when its first tab
    /// is not yet queryable; the reverse order could destroy a just-created,
    /// still-empty container.
    pub async fn remove_empty_temporary_containers(
        &self,
        excluded: &HashSet<TabId>,
    ) -> Result<()> {
        self.passes.fetch_add(1, Ordering::Relaxed);
        let containers = self.containers.list_containers().await?;
        let tabs = self.tabs.list_tabs(TabQuery::default()).await?;

        let mut live: HashMap<&ContainerId, usize> = HashMap::new();
        for tab in &tabs {
            if !excluded.contains(&tab.id) {
                *live.entry(&tab.container_id).or_default() += 1;
            }
        }

        for container in &containers {
            if !is_owned(&container.name, &container.id) {
                continue;
            }
            if live.get(&container.id).copied().unwrap_or(0) == 0 {
                self.destroy(&container.id).await?;
            }
        }
        Ok(())
    }

    /// Forget a container and remove it from the directory, in one step.
    /// Removal of an already-absent container is an already-satisfied goal.
    async fn destroy(&self, id: &ContainerId) -> Result<()> {
        self.state.lock().forget_container(id);
        match self.containers.remove_container(id).await {
            Ok(()) => {
                debug!(%id, "removed empty temporary container");
                Ok(())
            }
            Err(DirectoryError::NotFound) => {
                debug!(%id, "container already gone");
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }

    // Event handlers

    /// A tab opened. Record it when its container is tracked; adopt its
    /// container first when the container carries the mark.
    pub async fn handle_tab_created(&self, tab: Tab) -> Result<()> {
        if self.state.lock().record_tab(&tab) {
            debug!(tab = %tab.id, container = %tab.container_id, "recorded tab");
            return Ok(());
        }

        let container = match self.containers.get_container(&tab.container_id).await {
            Ok(container) => container,
            Err(DirectoryError::NotFound) => {
                debug!(container = %tab.container_id, "tab's container vanished before lookup");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        if !is_marked(&container.name) {
            return Ok(());
        }

        // The adopted container's color should differ from its neighbor:
        // the new tab lands rightmost, so avoid the tab before it.
        let mut deny = Vec::new();
        if let Some(prev) = neighbors::second_rightmost_tab(&*self.tabs, tab.window_id).await? {
            if let Some(color) = neighbors::tab_color(&*self.containers, &prev).await {
                deny.push(color);
            }
        }
        self.adopt(&container, &deny).await?;

        // Re-validated after the awaits above: adoption has tracked the
        // container, so recording succeeds unless it was forgotten again.
        self.state.lock().record_tab(&tab);
        Ok(())
    }

    /// A tab closed. Forget it, then coalesce a cleanup pass.
    ///
    /// The caller whose event finds the cleanup counter idle runs the
    /// passes for everyone; bursts of removals are bounded to a running
    /// pass plus one pending, regardless of burst size.
    pub async fn handle_tab_removed(&self, tab: TabId) -> Result<()> {
        if let Some(container) = self.state.lock().forget_tab(tab) {
            debug!(%tab, %container, "forgot closed tab");
        }

        if !self.cleanup.note_removed(tab) {
            return Ok(());
        }
        loop {
            let excluded = self.cleanup.excluded();
            if let Err(error) = self.remove_empty_temporary_containers(&excluded).await {
                self.cleanup.abandon();
                return Err(error);
            }
            if self.cleanup.finish_pass() {
                return Ok(());
            }
        }
    }

    /// A container changed. A tracked container renamed away from its
    /// fingerprint is released (forgotten, never destroyed); a marked
    /// container is adopted.
    pub async fn handle_container_updated(&self, container: Container) -> Result<()> {
        if is_marked(&container.name) {
            self.adopt(&container, &[]).await?;
            return Ok(());
        }
        let tracked = self.state.lock().is_tracked(&container.id);
        if tracked && !is_owned(&container.name, &container.id) {
            info!(id = %container.id, "container renamed, releasing it");
            self.state.lock().forget_container(&container.id);
        }
        Ok(())
    }

    /// A container appeared. Track it when fingerprinted, adopt when marked.
    pub async fn handle_container_created(&self, container: Container) -> Result<()> {
        if is_marked(&container.name) {
            self.adopt(&container, &[]).await?;
        } else if is_owned(&container.name, &container.id) {
            self.state.lock().record_container(container.id.clone());
            debug!(id = %container.id, "tracking fingerprinted container");
        }
        Ok(())
    }

    /// A container disappeared (possibly removed by the user or host).
    pub async fn handle_container_removed(&self, id: ContainerId) -> Result<()> {
        let tracked = self.state.lock().is_tracked(&id);
        if tracked {
            debug!(%id, "tracked container removed externally");
            self.state.lock().forget_container(&id);
        }
        Ok(())
    }

    // Observation

    /// Snapshot of the tracked container map.
    pub fn tracked(&self) -> HashMap<ContainerId, HashSet<TabId>> {
        self.state.lock().snapshot()
    }

    pub fn is_tracking(&self, id: &ContainerId) -> bool {
        self.state.lock().is_tracked(id)
    }

    /// Current cleanup queue depth (0 idle, 1 running, 2 running + pending).
    pub fn cleanup_depth(&self) -> u8 {
        self.cleanup.depth()
    }

    /// Total reconciliation passes run so far.
    pub fn passes_run(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }
}
