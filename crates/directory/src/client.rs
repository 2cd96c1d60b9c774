//! Async traits the host implements to expose its directories.
//!
//! Both directories are authoritative but only eventually consistent: a
//! record removed moments ago may still show up in a query. Callers are
//! expected to reconcile rather than trust any single snapshot.

use async_trait::async_trait;

use crate::types::{
    Container, ContainerId, ContainerPatch, NewContainer, NewTab, Tab, TabId, TabQuery,
};

/// Errors surfaced by directory operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    /// The referenced record does not exist (any more).
    #[error("record not found")]
    NotFound,
    /// Transient host failure; the operation may succeed later.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Directory of container records.
#[async_trait]
pub trait ContainerDirectory: Send + Sync {
    async fn list_containers(&self) -> Result<Vec<Container>>;

    async fn get_container(&self, id: &ContainerId) -> Result<Container>;

    async fn create_container(&self, new: NewContainer) -> Result<Container>;

    async fn update_container(&self, id: &ContainerId, patch: ContainerPatch) -> Result<Container>;

    /// Remove a container. Removing an absent container yields
    /// [`DirectoryError::NotFound`]; callers treat that as already done.
    async fn remove_container(&self, id: &ContainerId) -> Result<()>;
}

/// Directory of open tabs.
#[async_trait]
pub trait TabDirectory: Send + Sync {
    async fn list_tabs(&self, query: TabQuery) -> Result<Vec<Tab>>;

    async fn create_tab(&self, new: NewTab) -> Result<Tab>;

    async fn remove_tab(&self, id: TabId) -> Result<()>;
}
