//! Theming for the canvas editor.

use egui::Color32;
use slate_core::{NodeKind, NodeStatus};

/// Theme configuration for the canvas editor.
pub struct CanvasTheme {
    /// Header color per node kind.
    pub header_color: Box<dyn Fn(NodeKind) -> Color32>,
    /// Port circle color per node kind.
    pub port_color: Box<dyn Fn(NodeKind) -> Color32>,
    /// Status dot color.
    pub status_color: Box<dyn Fn(NodeStatus) -> Color32>,
    pub background_color: Color32,
    pub grid_color: Color32,
    /// Grid spacing in canvas units.
    pub grid_spacing: f32,
    pub node_body_color: Color32,
    pub node_body_selected_color: Color32,
    pub selection_color: Color32,
    pub title_color: Color32,
    pub error_color: Color32,
    pub wire_color: Color32,
    pub pending_wire_color: Color32,
    pub rubber_band_fill: Color32,
    pub rubber_band_stroke: Color32,
    pub group_fill: Color32,
    pub group_stroke: Color32,
    pub group_selected_stroke: Color32,
    /// Header height in canvas units.
    pub header_height: f32,
    pub node_rounding: f32,
    pub port_radius: f32,
}

impl Default for CanvasTheme {
    fn default() -> Self {
        Self {
            header_color: Box::new(default_header_color),
            port_color: Box::new(default_port_color),
            status_color: Box::new(default_status_color),
            background_color: Color32::from_rgb(24, 24, 28),
            grid_color: Color32::from_rgb(38, 38, 44),
            grid_spacing: 32.0,
            node_body_color: Color32::from_rgb(45, 45, 50),
            node_body_selected_color: Color32::from_rgb(55, 55, 65),
            selection_color: Color32::from_rgb(100, 150, 255),
            title_color: Color32::WHITE,
            error_color: Color32::from_rgb(235, 100, 100),
            wire_color: Color32::from_rgb(180, 180, 180),
            pending_wire_color: Color32::from_rgb(140, 170, 240),
            rubber_band_fill: Color32::from_rgba_unmultiplied(100, 150, 255, 24),
            rubber_band_stroke: Color32::from_rgb(100, 150, 255),
            group_fill: Color32::from_rgba_unmultiplied(120, 120, 140, 16),
            group_stroke: Color32::from_rgb(90, 90, 110),
            group_selected_stroke: Color32::from_rgb(140, 160, 255),
            header_height: 36.0,
            node_rounding: 8.0,
            port_radius: 8.0,
        }
    }
}

fn default_header_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::TextPrompt => Color32::from_rgb(60, 100, 160),
        NodeKind::ImageGenerator => Color32::from_rgb(100, 60, 150),
        NodeKind::VideoGenerator => Color32::from_rgb(150, 80, 60),
        NodeKind::AudioGenerator => Color32::from_rgb(60, 120, 80),
        NodeKind::VideoAnalyzer => Color32::from_rgb(50, 110, 120),
        NodeKind::ImageEditor => Color32::from_rgb(130, 100, 50),
    }
}

fn default_port_color(kind: NodeKind) -> Color32 {
    match kind {
        NodeKind::TextPrompt => Color32::from_rgb(109, 170, 238),
        NodeKind::ImageGenerator => Color32::from_rgb(180, 109, 238),
        NodeKind::VideoGenerator => Color32::from_rgb(238, 130, 109),
        NodeKind::AudioGenerator => Color32::from_rgb(109, 238, 150),
        NodeKind::VideoAnalyzer => Color32::from_rgb(109, 222, 238),
        NodeKind::ImageEditor => Color32::from_rgb(238, 200, 150),
    }
}

fn default_status_color(status: NodeStatus) -> Color32 {
    match status {
        NodeStatus::Idle => Color32::from_rgb(120, 120, 120),
        NodeStatus::Working => Color32::from_rgb(240, 190, 80),
        NodeStatus::Success => Color32::from_rgb(110, 210, 130),
        NodeStatus::Error => Color32::from_rgb(235, 100, 100),
    }
}
