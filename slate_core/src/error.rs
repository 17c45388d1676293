//! Error types for the editor core.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SlateError {
    /// A generation provider reported a failure. Recorded on the node that
    /// requested it; never tears down the session.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// An operation needed an upstream input the graph does not provide.
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Node not found: {0}")]
    NodeNotFound(Uuid),

    /// Load/save failure from the storage backend.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
