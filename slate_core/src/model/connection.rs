//! Directed connections between nodes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A directed edge from a producer node's output to a consumer node's input.
/// At most one connection exists per (from, to) pair.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    pub from: Uuid,
    pub to: Uuid,
}

impl Connection {
    pub fn new(from: Uuid, to: Uuid) -> Self {
        Self { from, to }
    }

    pub fn touches(&self, id: Uuid) -> bool {
        self.from == id || self.to == id
    }
}
