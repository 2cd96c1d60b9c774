//! Window-order adjacency queries over the tab directory.
//!
//! New containers pick a color avoiding the containers of nearby tabs, so
//! a fresh temporary container is visually distinct from its neighbors.
//! These helpers answer "which tab sits next to this one" and "what color
//! is that tab's container" against the host directories.

use tmpc_directory::{
    Container, ContainerColor, ContainerDirectory, Tab, TabDirectory, TabQuery, WindowId,
};

use crate::error::Result;

/// Color of the given tab's container, or `None` when the container can't
/// be resolved (e.g. the tab lives in the host's default store).
pub async fn tab_color(containers: &dyn ContainerDirectory, tab: &Tab) -> Option<ContainerColor> {
    containers
        .get_container(&tab.container_id)
        .await
        .ok()
        .map(|container: Container| container.color)
}

/// Container colors of the given tabs, skipping tabs without one.
pub async fn tab_colors(containers: &dyn ContainerDirectory, tabs: &[Tab]) -> Vec<ContainerColor> {
    let mut colors = Vec::new();
    for tab in tabs {
        if let Some(color) = tab_color(containers, tab).await {
            colors.push(color);
        }
    }
    colors
}

/// The tab at the highest index in the given window.
pub async fn rightmost_tab(tabs: &dyn TabDirectory, window: WindowId) -> Result<Option<Tab>> {
    let mut in_window = window_tabs(tabs, window).await?;
    Ok(in_window.pop())
}

/// The tab at the second-highest index in the given window, if any.
pub async fn second_rightmost_tab(tabs: &dyn TabDirectory, window: WindowId) -> Result<Option<Tab>> {
    let mut in_window = window_tabs(tabs, window).await?;
    in_window.pop();
    Ok(in_window.pop())
}

/// The tab immediately to the right of the given one.
pub async fn next_tab(tabs: &dyn TabDirectory, tab: &Tab) -> Result<Option<Tab>> {
    let found = tabs
        .list_tabs(TabQuery {
            window_id: Some(tab.window_id),
            index: Some(tab.index + 1),
            ..Default::default()
        })
        .await?;
    Ok(found.into_iter().next())
}

async fn window_tabs(tabs: &dyn TabDirectory, window: WindowId) -> Result<Vec<Tab>> {
    let mut in_window = tabs
        .list_tabs(TabQuery {
            window_id: Some(window),
            ..Default::default()
        })
        .await?;
    in_window.sort_by_key(|tab| tab.index);
    Ok(in_window)
}
