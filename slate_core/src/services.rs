//! Collaborator traits the host supplies: generation providers, persistence
//! and asset notification. The core never talks to a network or disk itself;
//! it builds requests, hands futures to the host's runtime and applies
//! whatever comes back.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use uuid::Uuid;

use crate::error::SlateError;
use crate::model::{NodeKind, VideoGenerationMode};

/// Boxed future type used at every async seam.
pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Video,
    Audio,
}

/// A media reference collected from an upstream node.
#[derive(Clone, Debug)]
pub struct InputAsset {
    pub node_id: Uuid,
    pub kind: AssetKind,
    pub reference: String,
}

#[derive(Clone, Debug, Default)]
pub struct GenerationOptions {
    pub aspect_ratio: Option<String>,
    pub resolution: Option<String>,
    pub count: Option<u32>,
    pub video_mode: Option<VideoGenerationMode>,
}

/// Everything a provider needs to run one generation. `prompt` already has
/// upstream text contributions folded in, and `input_assets` is in the
/// node's deterministic input order.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub node_id: Uuid,
    pub kind: NodeKind,
    pub model: Option<String>,
    pub prompt: String,
    pub input_assets: Vec<InputAsset>,
    pub options: GenerationOptions,
}

/// One completed generation, shaped per node kind.
#[derive(Clone, Debug)]
pub enum GenerationOutput {
    /// All candidates; the first becomes the node's primary image.
    Images(Vec<String>),
    Video {
        uri: String,
        alternates: Vec<String>,
        metadata: Option<Value>,
        /// The provider degraded to a still preview instead of a video.
        fallback_image: bool,
    },
    Audio(String),
    Analysis(String),
}

pub trait GenerationService: Send + Sync {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> ServiceFuture<Result<GenerationOutput, SlateError>>;
}

/// Opaque key/value persistence for project documents. The backend owns the
/// actual format and location.
pub trait StorageBackend: Send + Sync {
    fn load(&self, key: &str) -> ServiceFuture<Result<Option<Value>, SlateError>>;
    fn save(&self, key: &str, value: Value) -> ServiceFuture<Result<(), SlateError>>;
}

/// Callback fired whenever a generation stores a new media reference on a
/// node, so the host can index assets as they appear.
pub trait AssetSink: Send + Sync {
    fn on_asset_generated(&self, kind: AssetKind, reference: &str, node_title: &str);
}
