//! Per-widget state kept between frames.

use std::collections::HashMap;

use egui::Rect;
use slate_core::MeasuredSizeProvider;
use uuid::Uuid;

/// Sizes the widget actually rendered last frame, in canvas units, plus the
/// rect of the open connection menu (for click-outside dismissal).
///
/// Implements [`MeasuredSizeProvider`] so port anchors and wire endpoints
/// follow the rendered node even when content stretched it past the
/// estimate. Hosts that embed custom node content can push their own sizes
/// through [`CanvasState::record_node_size`].
#[derive(Default)]
pub struct CanvasState {
    measured: HashMap<Uuid, (f32, f32)>,
    pub(crate) menu_rect: Option<Rect>,
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rendered size of a node, in canvas units.
    pub fn record_node_size(&mut self, id: Uuid, size: (f32, f32)) {
        self.measured.insert(id, size);
    }

    /// Drop measurements for nodes that no longer exist.
    pub fn retain_nodes(&mut self, mut alive: impl FnMut(Uuid) -> bool) {
        self.measured.retain(|id, _| alive(*id));
    }
}

impl MeasuredSizeProvider for CanvasState {
    fn measured_size(&self, id: Uuid) -> Option<(f32, f32)> {
        self.measured.get(&id).copied()
    }
}
