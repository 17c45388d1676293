//! The serializable project document.

use serde::{Deserialize, Serialize};

use super::{Connection, Group, Node};

/// Everything that persists for a project, and the unit of a history
/// snapshot. Cloning a document is a deep copy: all fields are owned.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ProjectDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl ProjectDocument {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty() && self.groups.is_empty()
    }
}
