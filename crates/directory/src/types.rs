//! Container and tab record shapes.
//!
//! Field sets match what the host directories return; hosts are free to
//! attach extra fields, which deserialization ignores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier of a container.
///
/// This is the only durable identity a container has; names, colors, and
/// icons are all mutable by the user at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Host-assigned tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Host-assigned window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

/// The host's fixed container color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerColor {
    Blue,
    Turquoise,
    Green,
    Yellow,
    Orange,
    Red,
    Pink,
    Purple,
}

/// The host's container icon set, reduced to the icons this service uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContainerIcon {
    #[default]
    Circle,
    Fingerprint,
    Briefcase,
}

/// An isolated browsing context hosting zero or more tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: ContainerId,
    /// User-visible name. For containers this service owns, the name doubles
    /// as the ownership fingerprint.
    pub name: String,
    pub color: ContainerColor,
    pub icon: ContainerIcon,
}

/// An open tab as reported by the tab directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    pub container_id: ContainerId,
    pub window_id: WindowId,
    /// Position of the tab within its window, leftmost first.
    pub index: u32,
    pub active: bool,
}

/// Payload for creating a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContainer {
    pub name: String,
    pub color: ContainerColor,
    pub icon: ContainerIcon,
}

/// Partial update of a container's mutable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ContainerColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<ContainerIcon>,
}

/// Payload for opening a tab.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTab {
    pub container_id: Option<ContainerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub active: bool,
}

/// Filter for tab directory queries. Empty filter matches every tab.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<ContainerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl TabQuery {
    /// Whether the given tab satisfies every set field of the filter.
    pub fn matches(&self, tab: &Tab) -> bool {
        self.window_id.is_none_or(|w| tab.window_id == w)
            && self
                .container_id
                .as_ref()
                .is_none_or(|c| &tab.container_id == c)
            && self.index.is_none_or(|i| tab.index == i)
    }
}
