//! Core engine for the Slate canvas editor: an interactive node-graph
//! surface for generative-media pipelines.
//!
//! The crate is pure data and logic. It owns the project graph
//! (nodes/connections/groups), the undo/redo history, selection, the
//! pan/zoom camera and the pointer-gesture state machine; rendering and
//! input live in an embedding widget crate. Asynchronous collaborators
//! (generation providers, persistence, asset indexing) plug in through the
//! traits in [`services`], and everything is threaded through an
//! [`session::EditorSession`] rather than global state.

pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod history;
pub mod interaction;
pub mod model;
pub mod selection;
pub mod services;
pub mod session;

pub use config::EditorConfig;
pub use error::SlateError;
pub use geometry::{Camera, MeasuredSizeProvider, NoMeasurements, Point};
pub use graph::GraphStore;
pub use history::HistoryStack;
pub use interaction::{
    ConnectionDraft, ConnectionMenu, ContextMenu, ContextMenuTarget, Gesture,
    InteractionController, Modifiers, PointerButton, PointerTarget, PortSide,
};
pub use model::{
    Connection, Group, Node, NodeKind, NodePayload, NodeStatus, NodeUpdate, ProjectDocument,
    VideoGenerationMode,
};
pub use selection::SelectionManager;
pub use services::{
    AssetKind, AssetSink, GenerationOutput, GenerationRequest, GenerationService, InputAsset,
    ServiceFuture, StorageBackend,
};
pub use session::{EditorContext, EditorSession, ServiceHandles};
