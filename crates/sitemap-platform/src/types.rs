//! Shared channel and message types

use serde::{Deserialize, Serialize};

/// Kind of node in the channel tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// A container that holds child channels
    Category,
    /// A leaf channel that holds messages
    Text,
}

/// One node of the platform's channel tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Opaque stable identifier assigned by the platform
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-text description, if any
    pub topic: Option<String>,
    /// Parent container id; `None` for top-level nodes
    pub parent_id: Option<String>,
    /// Ordinal position among siblings; unique, not necessarily contiguous
    pub position: i64,
    /// Container or leaf
    pub kind: ChannelKind,
}

impl Channel {
    /// Whether this node can hold children.
    pub fn is_category(&self) -> bool {
        self.kind == ChannelKind::Category
    }
}

/// A message stored in a leaf channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Platform-assigned message id, ordered within the channel
    pub id: String,
    /// Message body
    pub content: String,
}
