//! The editor session: one object owning the live graph, history, selection
//! and camera, threaded through every operation instead of global state.
//!
//! Undoable operations go through [`EditorSession::commit`], which pushes a
//! snapshot of the mutated document so the history cursor always sits on the
//! live state. Generation and persistence are asynchronous at the seams:
//! the session builds futures for the host to spawn and applies completions
//! delivered back through an internal channel on [`EditorSession::pump_events`].

use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, warn};
use serde_json::Value;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::error::SlateError;
use crate::geometry::{Camera, Point};
use crate::graph::GraphStore;
use crate::history::HistoryStack;
use crate::model::{
    AudioGeneratorData, ImageEditorData, ImageGeneratorData, Node, NodeKind, NodePayload,
    NodeStatus, NodeUpdate, ProjectDocument, TextPromptData, VideoAnalyzerData,
    VideoGeneratorData,
};
use crate::selection::SelectionManager;
use crate::services::{
    AssetKind, AssetSink, GenerationOptions, GenerationOutput, GenerationRequest,
    GenerationService, InputAsset, ServiceFuture, StorageBackend,
};

/// Offset applied when positioning a new or pasted node so its body centers
/// roughly on the requested point.
const NODE_CENTER_OFFSET: (f32, f32) = (210.0, 180.0);
const DUPLICATE_OFFSET: (f32, f32) = (50.0, 50.0);

/// Handles to the host-provided collaborators.
#[derive(Clone)]
pub struct ServiceHandles {
    pub generation: Arc<dyn GenerationService>,
    pub storage: Arc<dyn StorageBackend>,
    pub assets: Option<Arc<dyn AssetSink>>,
}

/// Configuration plus services, passed down to everything that needs them.
#[derive(Clone)]
pub struct EditorContext {
    pub config: EditorConfig,
    pub services: ServiceHandles,
}

enum SessionEvent {
    Generation {
        node_id: Uuid,
        result: Result<GenerationOutput, SlateError>,
    },
    SaveFailed(String),
}

pub struct EditorSession {
    pub graph: GraphStore,
    pub history: HistoryStack,
    pub selection: SelectionManager,
    pub camera: Camera,
    context: EditorContext,
    clipboard: Option<Node>,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
    dirty: bool,
    last_change: Option<Instant>,
}

impl EditorSession {
    pub fn new(context: EditorContext) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        let mut session = Self {
            graph: GraphStore::new(),
            history: HistoryStack::new(),
            selection: SelectionManager::new(),
            camera: Camera::default(),
            context,
            clipboard: None,
            events_tx,
            events_rx,
            dirty: false,
            last_change: None,
        };
        session.history.push(&ProjectDocument::default());
        session
    }

    pub fn context(&self) -> &EditorContext {
        &self.context
    }

    pub fn config(&self) -> &EditorConfig {
        &self.context.config
    }

    pub fn document(&self) -> ProjectDocument {
        self.graph.to_document()
    }

    // --- history ---------------------------------------------------------

    /// Record the current document as an undo step and schedule an autosave.
    /// Call after every atomic, undoable change.
    pub fn commit(&mut self) {
        let doc = self.graph.to_document();
        self.history.push(&doc);
        self.mark_changed();
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        self.last_change = Some(Instant::now());
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(doc) => {
                self.restore(doc);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(doc) => {
                self.restore(doc);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, doc: ProjectDocument) {
        self.graph.replace_with(doc);
        let graph = &self.graph;
        self.selection
            .prune(|id| graph.node(id).is_some() || graph.group(id).is_some());
        self.mark_changed();
    }

    // --- node and group operations ---------------------------------------

    fn payload_for(&self, kind: NodeKind) -> NodePayload {
        let model = Some(self.context.config.default_model_for(kind).to_string());
        match kind {
            NodeKind::TextPrompt => NodePayload::TextPrompt(TextPromptData {
                model,
                ..Default::default()
            }),
            NodeKind::ImageGenerator => NodePayload::ImageGenerator(ImageGeneratorData {
                model,
                ..Default::default()
            }),
            NodeKind::VideoGenerator => NodePayload::VideoGenerator(VideoGeneratorData {
                model,
                ..Default::default()
            }),
            NodeKind::AudioGenerator => NodePayload::AudioGenerator(AudioGeneratorData {
                model,
                ..Default::default()
            }),
            NodeKind::VideoAnalyzer => NodePayload::VideoAnalyzer(VideoAnalyzerData {
                model,
                ..Default::default()
            }),
            NodeKind::ImageEditor => NodePayload::ImageEditor(ImageEditorData {
                model,
                ..Default::default()
            }),
        }
    }

    /// Create a node of the given kind centered on a canvas point.
    pub fn add_node_at(&mut self, kind: NodeKind, center: Point) -> Uuid {
        let node = Node::new(
            self.payload_for(kind),
            center.x - NODE_CENTER_OFFSET.0,
            center.y - NODE_CENTER_OFFSET.1,
        );
        let id = self.graph.add_node(node);
        self.selection.select_only(id);
        self.commit();
        id
    }

    /// Create a node at the center of the current viewport.
    pub fn add_node_at_view_center(&mut self, kind: NodeKind, viewport: (f32, f32)) -> Uuid {
        let center = self
            .camera
            .screen_to_canvas(Point::new(viewport.0 / 2.0, viewport.1 / 2.0));
        self.add_node_at(kind, center)
    }

    /// Patch a node without creating an undo step (prompt edits, status
    /// churn). Still schedules an autosave.
    pub fn update_node(&mut self, id: Uuid, update: NodeUpdate) -> bool {
        let updated = self.graph.update_node(id, update);
        if updated {
            self.mark_changed();
        }
        updated
    }

    /// Delete nodes and drop the whole node selection, not just the ids
    /// that vanished.
    pub fn delete_nodes(&mut self, ids: &[Uuid]) {
        if ids.is_empty() {
            return;
        }
        self.graph.delete_nodes(ids);
        self.selection.clear_nodes();
        self.commit();
    }

    pub fn delete_selected(&mut self) {
        let ids: Vec<Uuid> = self.selection.selected_nodes().to_vec();
        if !ids.is_empty() {
            self.delete_nodes(&ids);
            return;
        }
        if let Some(group) = self.selection.selected_group() {
            if self.graph.remove_group(group) {
                self.selection.select_group(None);
                self.commit();
            }
        }
    }

    pub fn clear_canvas(&mut self) {
        if self.graph.is_empty() {
            return;
        }
        self.graph.clear_all();
        self.selection.clear();
        self.commit();
    }

    pub fn add_connection(&mut self, from: Uuid, to: Uuid) -> bool {
        if self.graph.add_connection(from, to) {
            self.commit();
            true
        } else {
            false
        }
    }

    pub fn remove_connection(&mut self, from: Uuid, to: Uuid) -> bool {
        if self.graph.remove_connection(from, to) {
            self.commit();
            true
        } else {
            false
        }
    }

    // --- clipboard --------------------------------------------------------

    /// Copy the first selected node. Single-node clipboard.
    pub fn copy_selected(&mut self) -> bool {
        let Some(&id) = self.selection.selected_nodes().first() else {
            return false;
        };
        self.clipboard = self.graph.node(id).cloned();
        self.clipboard.is_some()
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }

    /// Paste the clipboard node centered on a canvas point. The copy gets a
    /// fresh id and no upstream links; media content carries over.
    pub fn paste_at(&mut self, center: Point) -> Option<Uuid> {
        let source = self.clipboard.clone()?;
        let mut copy = source;
        copy.id = Uuid::new_v4();
        copy.x = center.x - NODE_CENTER_OFFSET.0;
        copy.y = center.y - NODE_CENTER_OFFSET.1;
        copy.inputs.clear();
        let id = self.graph.add_node(copy);
        self.selection.select_only(id);
        self.commit();
        Some(id)
    }

    pub fn paste_at_view_center(&mut self, viewport: (f32, f32)) -> Option<Uuid> {
        let center = self
            .camera
            .screen_to_canvas(Point::new(viewport.0 / 2.0, viewport.1 / 2.0));
        self.paste_at(center)
    }

    /// Create a node of the given kind already wired to `from`'s output.
    /// Used by the connection-drop menu; node and edge land in one undo step.
    pub fn create_connected_node(
        &mut self,
        kind: NodeKind,
        from: Uuid,
        center: Point,
    ) -> Option<Uuid> {
        if self.graph.node(from).is_none() {
            return None;
        }
        let node = Node::new(
            self.payload_for(kind),
            center.x - NODE_CENTER_OFFSET.0,
            center.y - NODE_CENTER_OFFSET.1,
        );
        let id = self.graph.add_node(node);
        self.graph.add_connection(from, id);
        self.selection.select_only(id);
        self.commit();
        Some(id)
    }

    pub fn duplicate_node(&mut self, id: Uuid) -> Option<Uuid> {
        let copy = self.graph.duplicate_node(id, DUPLICATE_OFFSET)?;
        self.selection.select_only(copy);
        self.commit();
        Some(copy)
    }

    // --- generation -------------------------------------------------------

    fn input_nodes(&self, node: &Node) -> Vec<&Node> {
        node.inputs
            .iter()
            .filter_map(|id| self.graph.node(*id))
            .collect()
    }

    /// Media references from upstream nodes, ordered by the node's
    /// `sorted_input_ids` (unlisted producers keep their connection order
    /// at the end).
    pub fn input_assets(&self, node: &Node) -> Vec<InputAsset> {
        let mut assets: Vec<InputAsset> = self
            .input_nodes(node)
            .into_iter()
            .filter_map(|input| {
                if let Some(image) = input.payload.image_ref() {
                    Some(InputAsset {
                        node_id: input.id,
                        kind: AssetKind::Image,
                        reference: image.to_string(),
                    })
                } else if let Some(video) = input.payload.video_ref() {
                    Some(InputAsset {
                        node_id: input.id,
                        kind: AssetKind::Video,
                        reference: video.to_string(),
                    })
                } else if let Some(audio) = input.payload.audio_ref() {
                    Some(InputAsset {
                        node_id: input.id,
                        kind: AssetKind::Audio,
                        reference: audio.to_string(),
                    })
                } else {
                    None
                }
            })
            .collect();

        let order = node.payload.sorted_input_ids();
        if !order.is_empty() {
            assets.sort_by_key(|asset| {
                order
                    .iter()
                    .position(|id| *id == asset.node_id)
                    .unwrap_or(usize::MAX)
            });
        }
        assets
    }

    fn build_generation_request(
        &self,
        id: Uuid,
        prompt_override: Option<String>,
    ) -> Result<GenerationRequest, SlateError> {
        let node = self.graph.node(id).ok_or(SlateError::NodeNotFound(id))?;
        let inputs = self.input_nodes(node);

        let own_prompt = prompt_override
            .or_else(|| node.payload.prompt().map(str::to_string))
            .unwrap_or_default();
        let mut parts: Vec<String> = inputs
            .iter()
            .filter_map(|n| n.payload.text_contribution())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if !own_prompt.trim().is_empty() {
            parts.push(own_prompt);
        }
        let prompt = parts.join("\n");

        let input_assets = self.input_assets(node);

        if node.kind() == NodeKind::VideoAnalyzer
            && node.payload.video_ref().is_none()
            && !input_assets.iter().any(|a| a.kind == AssetKind::Video)
        {
            return Err(SlateError::MissingInput(
                "connect a video node to analyze".to_string(),
            ));
        }

        let options = match &node.payload {
            NodePayload::ImageGenerator(d) => GenerationOptions {
                aspect_ratio: d.aspect_ratio.clone(),
                resolution: d.resolution.clone(),
                count: d.image_count,
                video_mode: None,
            },
            NodePayload::VideoGenerator(d) => GenerationOptions {
                aspect_ratio: d.aspect_ratio.clone(),
                resolution: d.resolution.clone(),
                count: d.video_count,
                video_mode: Some(d.generation_mode),
            },
            _ => GenerationOptions::default(),
        };

        Ok(GenerationRequest {
            node_id: id,
            kind: node.kind(),
            model: node.payload.model().map(str::to_string),
            prompt,
            input_assets,
            options,
        })
    }

    /// Kick off a generation for a node. Marks it Working synchronously and
    /// returns a future for the host to spawn; the completion is routed back
    /// through the session's event channel. Request-assembly failures (such
    /// as an analyzer with no video) take the same completion path so the
    /// node ends up in the Error state either way.
    pub fn begin_generation(
        &mut self,
        id: Uuid,
        prompt_override: Option<String>,
    ) -> Result<ServiceFuture<()>, SlateError> {
        if self.graph.node(id).is_none() {
            return Err(SlateError::NodeNotFound(id));
        }
        self.graph.update_node(
            id,
            NodeUpdate {
                status: Some(NodeStatus::Working),
                error: Some(None),
                ..Default::default()
            },
        );
        self.mark_changed();

        let tx = self.events_tx.clone();
        match self.build_generation_request(id, prompt_override) {
            Ok(request) => {
                let fut = self.context.services.generation.generate(request);
                Ok(Box::pin(async move {
                    let result = fut.await;
                    let _ = tx.send(SessionEvent::Generation { node_id: id, result });
                }))
            }
            Err(err) => Ok(Box::pin(async move {
                let _ = tx.send(SessionEvent::Generation {
                    node_id: id,
                    result: Err(err),
                });
            })),
        }
    }

    /// Drain completed events. Call once per frame.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                SessionEvent::Generation { node_id, result } => {
                    self.apply_generation_result(node_id, result);
                }
                SessionEvent::SaveFailed(message) => {
                    warn!("Autosave failed, will retry: {message}");
                    self.mark_changed();
                }
            }
            handled += 1;
        }
        handled
    }

    fn apply_generation_result(
        &mut self,
        node_id: Uuid,
        result: Result<GenerationOutput, SlateError>,
    ) {
        if self.graph.node(node_id).is_none() {
            debug!("Discarding generation result for deleted node {node_id}");
            return;
        }

        match result {
            Ok(output) => self.apply_generation_output(node_id, output),
            Err(err) => {
                self.graph.update_node(
                    node_id,
                    NodeUpdate {
                        status: Some(NodeStatus::Error),
                        error: Some(Some(err.to_string())),
                        ..Default::default()
                    },
                );
            }
        }
        self.mark_changed();
    }

    fn apply_generation_output(&mut self, node_id: Uuid, output: GenerationOutput) {
        let mut asset: Option<(AssetKind, String)> = None;
        let mut mismatch = false;

        self.graph.update_node_with(node_id, |node| {
            node.status = NodeStatus::Success;
            node.error = None;
            match (&mut node.payload, output) {
                (NodePayload::ImageGenerator(d), GenerationOutput::Images(images)) => {
                    d.image = images.first().cloned();
                    if let Some(image) = &d.image {
                        asset = Some((AssetKind::Image, image.clone()));
                    }
                    d.images = images;
                }
                (NodePayload::ImageEditor(d), GenerationOutput::Images(images)) => {
                    d.image = images.into_iter().next();
                    if let Some(image) = &d.image {
                        asset = Some((AssetKind::Image, image.clone()));
                    }
                }
                (
                    NodePayload::VideoGenerator(d),
                    GenerationOutput::Video {
                        uri,
                        alternates,
                        metadata,
                        fallback_image,
                    },
                ) => {
                    if fallback_image {
                        // The provider degraded to a still; keep it visible
                        // but flag what happened.
                        asset = Some((AssetKind::Image, uri.clone()));
                        d.image = Some(uri);
                        node.error = Some("Preview image generated instead of video.".to_string());
                    } else {
                        asset = Some((AssetKind::Video, uri.clone()));
                        d.video_uri = Some(uri);
                        d.video_uris = alternates;
                        d.video_metadata = metadata;
                    }
                }
                (NodePayload::AudioGenerator(d), GenerationOutput::Audio(uri)) => {
                    asset = Some((AssetKind::Audio, uri.clone()));
                    d.audio_uri = Some(uri);
                }
                (NodePayload::VideoAnalyzer(d), GenerationOutput::Analysis(text)) => {
                    d.analysis = Some(text);
                }
                (NodePayload::TextPrompt(d), GenerationOutput::Analysis(text)) => {
                    d.prompt = Some(text);
                }
                _ => {
                    node.status = NodeStatus::Error;
                    node.error = Some("Unexpected generation output".to_string());
                    mismatch = true;
                }
            }
        });

        if mismatch {
            warn!("Generation output did not match node {node_id}");
        }
        if let Some((kind, reference)) = asset {
            if let (Some(sink), Some(node)) =
                (&self.context.services.assets, self.graph.node(node_id))
            {
                sink.on_asset_generated(kind, &reference, &node.title);
            }
        }
    }

    // --- persistence ------------------------------------------------------

    /// Future that loads the stored document value; pass the result to
    /// [`EditorSession::load_from_value`].
    pub fn load_request(&self) -> ServiceFuture<Result<Option<Value>, SlateError>> {
        self.context
            .services
            .storage
            .load(&self.context.config.storage_key)
    }

    /// Seed the session from a stored value (or start empty on `None`) and
    /// take the single initial history snapshot that becomes the undo floor.
    pub fn load_from_value(&mut self, value: Option<Value>) -> Result<(), SlateError> {
        let doc = match value {
            Some(value) => serde_json::from_value::<ProjectDocument>(value)?,
            None => ProjectDocument::default(),
        };
        self.graph.replace_with(doc);
        self.selection.clear();
        self.history.clear();
        self.history.push(&self.graph.to_document());
        self.dirty = false;
        self.last_change = None;
        Ok(())
    }

    pub fn save_value(&self) -> Result<Value, SlateError> {
        Ok(serde_json::to_value(self.graph.to_document())?)
    }

    /// Debounced autosave: once the quiet period after the last change has
    /// elapsed, returns a save future for the host to spawn. Failures come
    /// back through the event channel and re-arm the dirty flag.
    pub fn maybe_autosave(&mut self, now: Instant) -> Option<ServiceFuture<()>> {
        if !self.dirty {
            return None;
        }
        let last = self.last_change?;
        if now.duration_since(last) < self.context.config.autosave_debounce {
            return None;
        }
        let value = match self.save_value() {
            Ok(value) => value,
            Err(err) => {
                error!("Could not serialize project for autosave: {err}");
                // Stay dirty and push the debounce window forward so the
                // next quiet period retries instead of dropping the changes.
                self.last_change = Some(now);
                return None;
            }
        };
        self.dirty = false;
        let storage = Arc::clone(&self.context.services.storage);
        let key = self.context.config.storage_key.clone();
        let tx = self.events_tx.clone();
        Some(Box::pin(async move {
            if let Err(err) = storage.save(&key, value).await {
                let _ = tx.send(SessionEvent::SaveFailed(err.to_string()));
            }
        }))
    }

    pub fn fit_view(&mut self, viewport: (f32, f32)) {
        self.camera.fit_view(self.graph.nodes(), viewport);
    }
}
