//! Canvas geometry: the camera transform, node bounds estimation, port
//! anchors and the rectangle math used by hit-testing and rubber-band
//! selection.
//!
//! All node layout here is an *estimate* derived from the data model. The
//! embedding UI usually knows the real rendered size of a node (content can
//! stretch it); it supplies those through [`MeasuredSizeProvider`] and the
//! anchor math falls back to the estimate only when no measurement exists.

use uuid::Uuid;

use crate::model::{Node, NodeKind, VideoGenerationMode};

pub const MIN_SCALE: f32 = 0.2;
pub const MAX_SCALE: f32 = 3.0;
/// Multiplier applied to wheel delta when zooming.
pub const ZOOM_WHEEL_FACTOR: f32 = 0.001;

pub const DEFAULT_NODE_WIDTH: f32 = 420.0;
/// Estimated height for text-centric nodes (prompt, analyzer, editor).
pub const TEXT_NODE_HEIGHT: f32 = 360.0;
pub const AUDIO_NODE_HEIGHT: f32 = 200.0;
/// Extra height for the crop controls of a video node in Cut mode.
pub const CUT_MODE_EXTRA_HEIGHT: f32 = 36.0;

/// Horizontal offset of a port anchor from the node edge.
pub const PORT_ANCHOR_OFFSET: f32 = 4.0;
pub const FIT_VIEW_PADDING: f32 = 100.0;
/// A rubber band narrower than this in either screen extent is a click,
/// not a selection.
pub const MIN_RUBBER_BAND_EXTENT: f32 = 10.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in canvas space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanning two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Partial-overlap test, used by rubber-band selection.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Source of live-rendered node sizes. The UI layer records what it actually
/// drew last frame; pure-logic callers can pass [`NoMeasurements`].
pub trait MeasuredSizeProvider {
    fn measured_size(&self, id: Uuid) -> Option<(f32, f32)>;
}

/// Provider with no measurements; everything falls back to estimates.
pub struct NoMeasurements;

impl MeasuredSizeProvider for NoMeasurements {
    fn measured_size(&self, _id: Uuid) -> Option<(f32, f32)> {
        None
    }
}

/// The pan/zoom transform between canvas space and screen space.
///
/// `canvas_to_screen(p) = p * scale + pan`; pan is in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub pan: Point,
    pub scale: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            scale: 1.0,
        }
    }
}

impl Camera {
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.pan.x, p.y * self.scale + self.pan.y)
    }

    pub fn screen_to_canvas(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.scale, (p.y - self.pan.y) / self.scale)
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Wheel zoom. Positive `delta_y` (scrolling down) zooms out.
    pub fn zoom_by_wheel(&mut self, delta_y: f32) {
        self.set_scale(self.scale - delta_y * ZOOM_WHEEL_FACTOR);
    }

    /// Wheel zoom keeping the canvas point under `screen_pos` fixed.
    pub fn zoom_at(&mut self, screen_pos: Point, delta_y: f32) {
        let anchor = self.screen_to_canvas(screen_pos);
        self.zoom_by_wheel(delta_y);
        let moved = self.canvas_to_screen(anchor);
        self.pan.x += screen_pos.x - moved.x;
        self.pan.y += screen_pos.y - moved.y;
    }

    /// Wheel scroll pans opposite the delta.
    pub fn scroll_by(&mut self, delta_x: f32, delta_y: f32) {
        self.pan.x -= delta_x;
        self.pan.y -= delta_y;
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Frame all nodes in the viewport with a fixed padding. Never zooms in
    /// past 1:1; an empty graph resets the transform.
    pub fn fit_view(&mut self, nodes: &[Node], viewport: (f32, f32)) {
        let Some(bounds) = union_node_bounds(nodes) else {
            self.pan = Point::default();
            self.scale = 1.0;
            return;
        };

        let content_w = bounds.width + FIT_VIEW_PADDING * 2.0;
        let content_h = bounds.height + FIT_VIEW_PADDING * 2.0;
        let scale = (viewport.0 / content_w)
            .min(viewport.1 / content_h)
            .min(1.0)
            .max(MIN_SCALE);

        let center_x = bounds.x + bounds.width / 2.0;
        let center_y = bounds.y + bounds.height / 2.0;
        self.scale = scale;
        self.pan = Point::new(
            viewport.0 / 2.0 - center_x * scale,
            viewport.1 / 2.0 - center_y * scale,
        );
    }
}

fn aspect_ratio_dims(spec: Option<&str>) -> (f32, f32) {
    let Some(spec) = spec else { return (16.0, 9.0) };
    let mut parts = spec.splitn(2, ':');
    match (
        parts.next().and_then(|s| s.trim().parse::<f32>().ok()),
        parts.next().and_then(|s| s.trim().parse::<f32>().ok()),
    ) {
        (Some(w), Some(h)) if w > 0.0 && h > 0.0 => (w, h),
        _ => (16.0, 9.0),
    }
}

pub fn node_width(node: &Node) -> f32 {
    node.width.unwrap_or(DEFAULT_NODE_WIDTH)
}

/// Estimated node height. Priority: explicit height, then a fixed height for
/// text-centric and audio kinds, then the aspect-ratio-derived media height.
pub fn node_height(node: &Node) -> f32 {
    if let Some(height) = node.height {
        return height;
    }
    match node.kind() {
        NodeKind::TextPrompt | NodeKind::VideoAnalyzer | NodeKind::ImageEditor => TEXT_NODE_HEIGHT,
        NodeKind::AudioGenerator => AUDIO_NODE_HEIGHT,
        NodeKind::ImageGenerator | NodeKind::VideoGenerator => {
            let (rw, rh) = aspect_ratio_dims(node.payload.aspect_ratio());
            let extra = if node.payload.generation_mode() == Some(VideoGenerationMode::Cut) {
                CUT_MODE_EXTRA_HEIGHT
            } else {
                0.0
            };
            node_width(node) * rh / rw + extra
        }
    }
}

pub fn node_bounds(node: &Node) -> Bounds {
    Bounds::new(node.x, node.y, node_width(node), node_height(node))
}

pub fn union_node_bounds(nodes: &[Node]) -> Option<Bounds> {
    let mut iter = nodes.iter().map(node_bounds);
    let first = iter.next()?;
    Some(iter.fold(first, |acc, b| acc.union(&b)))
}

fn rendered_size(node: &Node, measured: &dyn MeasuredSizeProvider) -> (f32, f32) {
    measured
        .measured_size(node.id)
        .unwrap_or_else(|| (node_width(node), node_height(node)))
}

/// Anchor of the input port: just left of the node, at mid rendered height.
pub fn input_port_anchor(node: &Node, measured: &dyn MeasuredSizeProvider) -> Point {
    let (_, h) = rendered_size(node, measured);
    Point::new(node.x - PORT_ANCHOR_OFFSET, node.y + h / 2.0)
}

/// Anchor of the output port: just right of the node, at mid rendered height.
pub fn output_port_anchor(node: &Node, measured: &dyn MeasuredSizeProvider) -> Point {
    let (w, h) = rendered_size(node, measured);
    Point::new(node.x + w + PORT_ANCHOR_OFFSET, node.y + h / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodePayload, VideoGeneratorData};

    fn node_at(kind: NodeKind, x: f32, y: f32) -> Node {
        Node::new(NodePayload::empty(kind), x, y)
    }

    #[test]
    fn test_transform_round_trip() {
        let camera = Camera {
            pan: Point::new(-120.0, 45.5),
            scale: 1.7,
        };
        let p = Point::new(333.25, -48.0);
        let back = camera.screen_to_canvas(camera.canvas_to_screen(p));
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);
    }

    #[test]
    fn test_scale_clamped_to_limits() {
        let mut camera = Camera::default();
        camera.zoom_by_wheel(10_000.0);
        assert_eq!(camera.scale, MIN_SCALE);
        camera.zoom_by_wheel(-100_000.0);
        assert_eq!(camera.scale, MAX_SCALE);
    }

    #[test]
    fn test_scroll_pans_opposite_the_delta() {
        let mut camera = Camera::default();
        camera.scroll_by(30.0, -10.0);
        assert_eq!((camera.pan.x, camera.pan.y), (-30.0, 10.0));
    }

    #[test]
    fn test_zoom_at_keeps_cursor_point_fixed() {
        let mut camera = Camera::default();
        let cursor = Point::new(250.0, 140.0);
        let before = camera.screen_to_canvas(cursor);
        camera.zoom_at(cursor, -400.0);
        let after = camera.screen_to_canvas(cursor);
        assert!((before.x - after.x).abs() < 1e-2);
        assert!((before.y - after.y).abs() < 1e-2);
    }

    #[test]
    fn test_node_height_priority() {
        let mut node = node_at(NodeKind::TextPrompt, 0.0, 0.0);
        assert_eq!(node_height(&node), TEXT_NODE_HEIGHT);
        node.height = Some(123.0);
        assert_eq!(node_height(&node), 123.0);

        let audio = node_at(NodeKind::AudioGenerator, 0.0, 0.0);
        assert_eq!(node_height(&audio), AUDIO_NODE_HEIGHT);

        // Media nodes derive height from the aspect ratio, default 16:9.
        let image = node_at(NodeKind::ImageGenerator, 0.0, 0.0);
        assert_eq!(node_height(&image), DEFAULT_NODE_WIDTH * 9.0 / 16.0);
    }

    #[test]
    fn test_cut_mode_adds_crop_controls_height() {
        let mut video = node_at(NodeKind::VideoGenerator, 0.0, 0.0);
        let base = node_height(&video);
        video.payload = NodePayload::VideoGenerator(VideoGeneratorData {
            generation_mode: VideoGenerationMode::Cut,
            ..Default::default()
        });
        assert_eq!(node_height(&video), base + CUT_MODE_EXTRA_HEIGHT);
    }

    #[test]
    fn test_malformed_aspect_ratio_falls_back() {
        let mut image = node_at(NodeKind::ImageGenerator, 0.0, 0.0);
        image.payload = NodePayload::ImageGenerator(crate::model::ImageGeneratorData {
            aspect_ratio: Some("banana".to_string()),
            ..Default::default()
        });
        assert_eq!(node_height(&image), DEFAULT_NODE_WIDTH * 9.0 / 16.0);

        image.payload = NodePayload::ImageGenerator(crate::model::ImageGeneratorData {
            aspect_ratio: Some("1:1".to_string()),
            ..Default::default()
        });
        assert_eq!(node_height(&image), DEFAULT_NODE_WIDTH);
    }

    #[test]
    fn test_port_anchors_prefer_measured_height() {
        struct Fixed;
        impl MeasuredSizeProvider for Fixed {
            fn measured_size(&self, _id: Uuid) -> Option<(f32, f32)> {
                Some((400.0, 100.0))
            }
        }

        let node = node_at(NodeKind::TextPrompt, 50.0, 60.0);
        let input = input_port_anchor(&node, &Fixed);
        assert_eq!(input.x, 50.0 - PORT_ANCHOR_OFFSET);
        assert_eq!(input.y, 60.0 + 50.0);

        let output = output_port_anchor(&node, &Fixed);
        assert_eq!(output.x, 50.0 + 400.0 + PORT_ANCHOR_OFFSET);

        // Without a measurement the estimate drives the anchor.
        let fallback = input_port_anchor(&node, &NoMeasurements);
        assert_eq!(fallback.y, 60.0 + TEXT_NODE_HEIGHT / 2.0);
    }

    #[test]
    fn test_overlap_is_not_containment() {
        let a = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let partially_inside = Bounds::new(90.0, 90.0, 100.0, 100.0);
        let outside = Bounds::new(200.0, 0.0, 50.0, 50.0);
        assert!(a.overlaps(&partially_inside));
        assert!(!a.overlaps(&outside));
    }

    #[test]
    fn test_fit_view_empty_graph_resets() {
        let mut camera = Camera {
            pan: Point::new(500.0, -300.0),
            scale: 2.5,
        };
        camera.fit_view(&[], (1920.0, 1080.0));
        assert_eq!(camera.scale, 1.0);
        assert_eq!(camera.pan, Point::default());
    }

    #[test]
    fn test_fit_view_centers_and_never_zooms_in() {
        let node = node_at(NodeKind::TextPrompt, 100.0, 100.0);
        let mut camera = Camera::default();
        camera.fit_view(std::slice::from_ref(&node), (1920.0, 1080.0));
        // Content plus padding fits comfortably, so scale caps at 1.
        assert_eq!(camera.scale, 1.0);
        let bounds = node_bounds(&node);
        let center = camera.canvas_to_screen(Point::new(
            bounds.x + bounds.width / 2.0,
            bounds.y + bounds.height / 2.0,
        ));
        assert!((center.x - 960.0).abs() < 1e-3);
        assert!((center.y - 540.0).abs() < 1e-3);
    }
}
