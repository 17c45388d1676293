//! Selection state: an ordered, duplicate-free set of node ids plus an
//! optionally selected group.

use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    nodes: Vec<Uuid>,
    group: Option<Uuid>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_nodes(&self) -> &[Uuid] {
        &self.nodes
    }

    pub fn selected_group(&self) -> Option<Uuid> {
        self.group
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.nodes.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.group.is_none()
    }

    pub fn select_only(&mut self, id: Uuid) {
        self.nodes.clear();
        self.nodes.push(id);
        self.group = None;
    }

    /// Plain click on a node: a member of a multi-selection keeps the whole
    /// selection (so a drag can move it), anything else collapses to the
    /// clicked node.
    pub fn click(&mut self, id: Uuid) {
        if !(self.nodes.len() > 1 && self.nodes.contains(&id)) {
            self.nodes.clear();
            self.nodes.push(id);
        }
        self.group = None;
    }

    /// Shift-click toggle. Toggling the last remaining member off leaves the
    /// clicked node selected rather than emptying the selection.
    pub fn toggle(&mut self, id: Uuid) {
        if self.nodes.contains(&id) {
            self.nodes.retain(|n| *n != id);
            if self.nodes.is_empty() {
                self.nodes.push(id);
            }
        } else {
            self.nodes.push(id);
        }
        self.group = None;
    }

    /// Replace the node selection, deduplicating while preserving order.
    pub fn replace(&mut self, ids: Vec<Uuid>) {
        self.nodes.clear();
        for id in ids {
            if !self.nodes.contains(&id) {
                self.nodes.push(id);
            }
        }
        self.group = None;
    }

    /// Union-merge new ids into the selection (additive rubber band).
    pub fn merge(&mut self, ids: Vec<Uuid>) {
        for id in ids {
            if !self.nodes.contains(&id) {
                self.nodes.push(id);
            }
        }
        self.group = None;
    }

    pub fn select_group(&mut self, id: Option<Uuid>) {
        self.group = id;
        if id.is_some() {
            self.nodes.clear();
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.group = None;
    }

    /// Drop the node selection, leaving any group selection alone.
    pub fn clear_nodes(&mut self) {
        self.nodes.clear();
    }

    /// Drop selected ids that no longer resolve (after delete or restore).
    pub fn prune(&mut self, mut alive: impl FnMut(Uuid) -> bool) {
        self.nodes.retain(|id| alive(*id));
        if let Some(group) = self.group {
            if !alive(group) {
                self.group = None;
            }
        }
    }
}
