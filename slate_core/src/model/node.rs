//! Canvas nodes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payload::{NodeKind, NodePayload};

/// Lifecycle state of a node's last generation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Idle,
    Working,
    Success,
    Error,
}

/// A node on the canvas. Position is in canvas space; `width`/`height` are
/// only set once the user (or a measurement) pins them, otherwise layout
/// falls back to the kind-specific estimate in [`crate::geometry`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Node {
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    pub title: String,
    #[serde(default)]
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Upstream producer ids, in connection order.
    #[serde(default)]
    pub inputs: Vec<Uuid>,
    #[serde(flatten)]
    pub payload: NodePayload,
}

impl Node {
    pub fn new(payload: NodePayload, x: f32, y: f32) -> Self {
        let title = payload.kind().display_name().to_string();
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            width: None,
            height: None,
            title,
            status: NodeStatus::Idle,
            error: None,
            inputs: Vec::new(),
            payload,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }
}

/// Field-merge patch for the common node fields. `error` uses a nested
/// `Option` so a patch can distinguish "leave alone" from "clear".
#[derive(Clone, Debug, Default)]
pub struct NodeUpdate {
    pub title: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub status: Option<NodeStatus>,
    pub error: Option<Option<String>>,
    pub prompt: Option<String>,
    pub model: Option<String>,
}

impl NodeUpdate {
    /// Apply the set fields onto `node`, leaving everything else untouched.
    pub fn apply(self, node: &mut Node) {
        if let Some(title) = self.title {
            node.title = title;
        }
        if let Some(x) = self.x {
            node.x = x;
        }
        if let Some(y) = self.y {
            node.y = y;
        }
        if let Some(width) = self.width {
            node.width = Some(width);
        }
        if let Some(height) = self.height {
            node.height = Some(height);
        }
        if let Some(status) = self.status {
            node.status = status;
        }
        if let Some(error) = self.error {
            node.error = error;
        }
        if let Some(prompt) = self.prompt {
            node.payload.set_prompt(Some(prompt));
        }
        if let Some(model) = self.model {
            node.payload.set_model(Some(model));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payload::{ImageGeneratorData, TextPromptData};

    #[test]
    fn test_node_serializes_payload_inline() {
        let mut node = Node::new(
            NodePayload::TextPrompt(TextPromptData {
                prompt: Some("dawn over water".to_string()),
                ..Default::default()
            }),
            10.0,
            20.0,
        );
        node.status = NodeStatus::Success;

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "text_prompt");
        assert_eq!(value["prompt"], "dawn over water");
        assert_eq!(value["status"], "success");

        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_update_merges_without_replacing_payload() {
        let mut node = Node::new(
            NodePayload::ImageGenerator(ImageGeneratorData {
                image: Some("out.png".to_string()),
                ..Default::default()
            }),
            0.0,
            0.0,
        );
        NodeUpdate {
            prompt: Some("blue door".to_string()),
            status: Some(NodeStatus::Working),
            ..Default::default()
        }
        .apply(&mut node);

        assert_eq!(node.payload.prompt(), Some("blue door"));
        assert_eq!(node.status, NodeStatus::Working);
        // Untouched payload fields survive the patch.
        assert_eq!(node.payload.image_ref(), Some("out.png"));
    }

    #[test]
    fn test_update_can_clear_error() {
        let mut node = Node::new(NodePayload::empty(NodeKind::AudioGenerator), 0.0, 0.0);
        node.error = Some("boom".to_string());
        NodeUpdate {
            error: Some(None),
            ..Default::default()
        }
        .apply(&mut node);
        assert!(node.error.is_none());
    }
}
