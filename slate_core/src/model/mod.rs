//! Data model for the canvas: nodes, connections, groups and the
//! serializable project document.

mod connection;
mod document;
mod group;
mod node;
mod payload;

pub use connection::Connection;
pub use document::ProjectDocument;
pub use group::Group;
pub use node::{Node, NodeStatus, NodeUpdate};
pub use payload::{
    AudioGeneratorData, ImageEditorData, ImageGeneratorData, NodeKind, NodePayload,
    TextPromptData, VideoAnalyzerData, VideoGenerationMode, VideoGeneratorData,
};
