//! Linear undo/redo history over deep-copied project documents.

use crate::model::ProjectDocument;

/// Oldest steps are evicted beyond this many.
pub const MAX_HISTORY_STEPS: usize = 50;

/// A bounded stack of document snapshots with a cursor. The entry at the
/// cursor always equals the live document as of the last committed change,
/// so undo steps back to the state before it and redo replays it.
#[derive(Debug, Default)]
pub struct HistoryStack {
    steps: Vec<ProjectDocument>,
    index: usize,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.steps.is_empty() && self.index + 1 < self.steps.len()
    }

    /// Record a snapshot of the document. Any redo tail beyond the cursor is
    /// discarded first; the oldest step is evicted past capacity.
    pub fn push(&mut self, doc: &ProjectDocument) {
        if !self.steps.is_empty() {
            self.steps.truncate(self.index + 1);
        }
        self.steps.push(doc.clone());
        if self.steps.len() > MAX_HISTORY_STEPS {
            self.steps.remove(0);
        }
        self.index = self.steps.len() - 1;
    }

    /// Step back, returning a copy of the previous snapshot to restore.
    /// `None` at the floor (or before any snapshot exists).
    pub fn undo(&mut self) -> Option<ProjectDocument> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.steps[self.index].clone())
    }

    /// Step forward, returning a copy of the next snapshot to restore.
    pub fn redo(&mut self) -> Option<ProjectDocument> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.steps[self.index].clone())
    }

    pub fn clear(&mut self) {
        self.steps.clear();
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeKind, NodePayload};

    fn doc_with_nodes(count: usize) -> ProjectDocument {
        let mut doc = ProjectDocument::default();
        for i in 0..count {
            doc.nodes.push(Node::new(
                NodePayload::empty(NodeKind::TextPrompt),
                i as f32 * 10.0,
                0.0,
            ));
        }
        doc
    }

    #[test]
    fn test_undo_at_floor_returns_none() {
        let mut history = HistoryStack::new();
        assert!(history.undo().is_none());

        history.push(&doc_with_nodes(0));
        // The initial snapshot is the floor; it can never be undone past.
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_undo_then_redo_restores_exact_state() {
        let mut history = HistoryStack::new();
        let before = doc_with_nodes(1);
        let after = doc_with_nodes(2);
        history.push(&before);
        history.push(&after);

        assert_eq!(history.undo().unwrap(), before);
        assert_eq!(history.redo().unwrap(), after);
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_push_truncates_redo_tail() {
        let mut history = HistoryStack::new();
        history.push(&doc_with_nodes(0));
        history.push(&doc_with_nodes(1));
        history.push(&doc_with_nodes(2));

        history.undo();
        history.undo();
        assert!(history.can_redo());

        let branch = doc_with_nodes(5);
        history.push(&branch);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        // Only the floor remains beneath the new branch.
        assert_eq!(history.undo().unwrap().nodes.len(), 0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryStack::new();
        for i in 0..=MAX_HISTORY_STEPS {
            history.push(&doc_with_nodes(i));
        }
        assert_eq!(history.len(), MAX_HISTORY_STEPS);

        // Walk all the way back: the very first snapshot (0 nodes) is gone.
        let mut last = None;
        while let Some(doc) = history.undo() {
            last = Some(doc);
        }
        assert_eq!(last.unwrap().nodes.len(), 1);
    }

    #[test]
    fn test_snapshots_are_isolated_copies() {
        let mut history = HistoryStack::new();
        let mut doc = doc_with_nodes(1);
        history.push(&doc);
        history.push(&doc_with_nodes(2));

        // Mutating the caller's document must not affect stored steps.
        doc.nodes[0].x = 9999.0;
        let restored = history.undo().unwrap();
        assert_eq!(restored.nodes[0].x, 0.0);
    }
}
