//! The graph store: the single owner of live nodes, connections and groups.
//!
//! Mutations here never touch history; the session decides which operations
//! are undoable and snapshots around them.

use log::debug;
use uuid::Uuid;

use crate::geometry::node_bounds;
use crate::model::{Connection, Group, Node, NodeUpdate, ProjectDocument};

#[derive(Debug, Default, Clone)]
pub struct GraphStore {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    groups: Vec<Group>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(doc: ProjectDocument) -> Self {
        Self {
            nodes: doc.nodes,
            connections: doc.connections,
            groups: doc.groups,
        }
    }

    /// Deep copy of the live state, for snapshots and persistence.
    pub fn to_document(&self) -> ProjectDocument {
        ProjectDocument {
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
            groups: self.groups.clone(),
        }
    }

    pub fn replace_with(&mut self, doc: ProjectDocument) {
        self.nodes = doc.nodes;
        self.connections = doc.connections;
        self.groups = doc.groups;
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty() && self.groups.is_empty()
    }

    pub fn node(&self, id: Uuid) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: Uuid) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn group(&self, id: Uuid) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: Uuid) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    pub fn add_node(&mut self, node: Node) -> Uuid {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    /// Merge a patch into a node. Unknown ids are a silent no-op.
    pub fn update_node(&mut self, id: Uuid, update: NodeUpdate) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                update.apply(node);
                true
            }
            None => false,
        }
    }

    /// In-place edit for payload fields the common patch does not cover.
    pub fn update_node_with(&mut self, id: Uuid, f: impl FnOnce(&mut Node)) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }

    /// Remove nodes and every reference to them: connections touching any
    /// deleted id and entries in surviving nodes' input lists.
    pub fn delete_nodes(&mut self, ids: &[Uuid]) {
        if ids.is_empty() {
            return;
        }
        self.nodes.retain(|n| !ids.contains(&n.id));
        self.connections.retain(|c| !ids.iter().any(|id| c.touches(*id)));
        for node in &mut self.nodes {
            node.inputs.retain(|input| !ids.contains(input));
        }
    }

    pub fn has_connection(&self, from: Uuid, to: Uuid) -> bool {
        self.connections.iter().any(|c| c.from == from && c.to == to)
    }

    /// Connect `from`'s output to `to`'s input. Rejects self-loops,
    /// duplicates and dangling endpoints; keeps `to.inputs` consistent.
    pub fn add_connection(&mut self, from: Uuid, to: Uuid) -> bool {
        if from == to || self.has_connection(from, to) {
            return false;
        }
        if self.node(from).is_none() {
            debug!("Rejecting connection from unknown node {from}");
            return false;
        }
        let Some(target) = self.node_mut(to) else {
            debug!("Rejecting connection to unknown node {to}");
            return false;
        };
        if !target.inputs.contains(&from) {
            target.inputs.push(from);
        }
        self.connections.push(Connection::new(from, to));
        true
    }

    /// Remove a connection, stripping `from` out of `to.inputs` while
    /// preserving the order of the remaining entries.
    pub fn remove_connection(&mut self, from: Uuid, to: Uuid) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| !(c.from == from && c.to == to));
        if self.connections.len() == before {
            return false;
        }
        if let Some(target) = self.node_mut(to) {
            target.inputs.retain(|input| *input != from);
        }
        true
    }

    pub fn add_group(&mut self, group: Group) -> Uuid {
        let id = group.id;
        self.groups.push(group);
        id
    }

    pub fn remove_group(&mut self, id: Uuid) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        self.groups.len() != before
    }

    /// Transient group membership: a node belongs to a group when its
    /// horizontal extent lies strictly inside the group's. The vertical
    /// axis is deliberately ignored.
    pub fn nodes_in_group(&self, group: &Group) -> Vec<Uuid> {
        self.nodes
            .iter()
            .filter(|n| {
                let b = node_bounds(n);
                b.x > group.x && b.right() < group.x + group.width
            })
            .map(|n| n.id)
            .collect()
    }

    /// Copy a node to an offset position with a fresh id and no upstream
    /// links. Media references and status are carried over.
    pub fn duplicate_node(&mut self, id: Uuid, offset: (f32, f32)) -> Option<Uuid> {
        let source = self.node(id)?;
        let mut copy = source.clone();
        copy.id = Uuid::new_v4();
        copy.x += offset.0;
        copy.y += offset.1;
        copy.inputs.clear();
        Some(self.add_node(copy))
    }

    pub fn clear_all(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.groups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeKind, NodePayload};

    fn setup_node(store: &mut GraphStore, x: f32) -> Uuid {
        store.add_node(Node::new(NodePayload::empty(NodeKind::ImageGenerator), x, 0.0))
    }

    #[test]
    fn test_add_connection_maintains_inputs() {
        let mut store = GraphStore::new();
        let a = setup_node(&mut store, 0.0);
        let b = setup_node(&mut store, 500.0);

        assert!(store.add_connection(a, b));
        assert_eq!(store.connections().len(), 1);
        assert_eq!(store.node(b).unwrap().inputs, vec![a]);

        // Duplicate and self-loop are rejected without side effects.
        assert!(!store.add_connection(a, b));
        assert!(!store.add_connection(a, a));
        assert_eq!(store.connections().len(), 1);
        assert_eq!(store.node(b).unwrap().inputs, vec![a]);
    }

    #[test]
    fn test_remove_connection_preserves_remaining_input_order() {
        let mut store = GraphStore::new();
        let a = setup_node(&mut store, 0.0);
        let b = setup_node(&mut store, 0.0);
        let c = setup_node(&mut store, 0.0);
        let sink = setup_node(&mut store, 600.0);
        store.add_connection(a, sink);
        store.add_connection(b, sink);
        store.add_connection(c, sink);

        assert!(store.remove_connection(b, sink));
        assert_eq!(store.node(sink).unwrap().inputs, vec![a, c]);
        assert!(!store.remove_connection(b, sink));
    }

    #[test]
    fn test_delete_nodes_prunes_all_references() {
        let mut store = GraphStore::new();
        let a = setup_node(&mut store, 0.0);
        let b = setup_node(&mut store, 500.0);
        let c = setup_node(&mut store, 1000.0);
        store.add_connection(a, b);
        store.add_connection(b, c);

        store.delete_nodes(&[b]);

        assert!(store.node(b).is_none());
        assert!(store.connections().is_empty());
        assert!(store.node(c).unwrap().inputs.is_empty());
        assert!(store.node(a).is_some());
    }

    #[test]
    fn test_update_unknown_node_is_noop() {
        let mut store = GraphStore::new();
        assert!(!store.update_node(Uuid::new_v4(), NodeUpdate::default()));
        assert!(!store.update_node_with(Uuid::new_v4(), |n| n.x = 99.0));
    }

    #[test]
    fn test_group_membership_is_horizontal_only() {
        let mut store = GraphStore::new();
        let group = Group::new(0.0, 0.0, 1000.0, 100.0);

        // Inside horizontally, far below vertically: still a member.
        let inside = store.add_node(Node::new(
            NodePayload::empty(NodeKind::TextPrompt),
            10.0,
            5000.0,
        ));
        // Overhangs the right edge.
        let overhang = setup_node(&mut store, 900.0);

        let members = store.nodes_in_group(&group);
        assert!(members.contains(&inside));
        assert!(!members.contains(&overhang));
    }

    #[test]
    fn test_duplicate_node_clears_inputs() {
        let mut store = GraphStore::new();
        let a = setup_node(&mut store, 0.0);
        let b = setup_node(&mut store, 500.0);
        store.add_connection(a, b);

        let copy = store.duplicate_node(b, (50.0, 50.0)).unwrap();
        let copied = store.node(copy).unwrap();
        assert!(copied.inputs.is_empty());
        assert_eq!(copied.x, 550.0);
        assert_ne!(copy, b);
        // Only the original remains wired.
        assert_eq!(store.connections().len(), 1);
    }
}
