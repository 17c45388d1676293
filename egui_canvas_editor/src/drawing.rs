//! Drawing utilities for the canvas editor.

use egui::{Color32, Pos2, Rect, Shape, Stroke, Vec2};

/// Horizontal control-point offset for connection wires, in canvas units.
const WIRE_CONTROL_OFFSET: f32 = 80.0;
const WIRE_SEGMENTS: usize = 24;

/// Draw a background grid that scrolls with the pan and scales with zoom.
pub fn draw_grid(painter: &egui::Painter, rect: Rect, pan: Vec2, zoom: f32, color: Color32, spacing: f32) {
    let spacing = spacing * zoom;
    if spacing < 4.0 {
        return;
    }
    let start_x = rect.min.x + (pan.x % spacing);
    let start_y = rect.min.y + (pan.y % spacing);

    let mut x = start_x;
    while x < rect.max.x {
        painter.line_segment(
            [Pos2::new(x, rect.min.y), Pos2::new(x, rect.max.y)],
            Stroke::new(1.0, color),
        );
        x += spacing;
    }

    let mut y = start_y;
    while y < rect.max.y {
        painter.line_segment(
            [Pos2::new(rect.min.x, y), Pos2::new(rect.max.x, y)],
            Stroke::new(1.0, color),
        );
        y += spacing;
    }
}

/// Flattened cubic bezier between two wire endpoints, control points pushed
/// horizontally out of the ports.
pub fn wire_points(from: Pos2, to: Pos2, zoom: f32) -> Vec<Pos2> {
    let offset = WIRE_CONTROL_OFFSET * zoom;
    let cp1 = Pos2::new(from.x + offset, from.y);
    let cp2 = Pos2::new(to.x - offset, to.y);

    let mut points = Vec::with_capacity(WIRE_SEGMENTS + 1);
    for i in 0..=WIRE_SEGMENTS {
        let t = i as f32 / WIRE_SEGMENTS as f32;
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * from.x + 3.0 * mt2 * t * cp1.x + 3.0 * mt * t2 * cp2.x + t3 * to.x;
        let y = mt3 * from.y + 3.0 * mt2 * t * cp1.y + 3.0 * mt * t2 * cp2.y + t3 * to.y;
        points.push(Pos2::new(x, y));
    }
    points
}

pub fn draw_wire(painter: &egui::Painter, from: Pos2, to: Pos2, zoom: f32, color: Color32) {
    let points = wire_points(from, to, zoom);
    let stroke = Stroke::new(2.0 * zoom.max(0.5), color);
    for window in points.windows(2) {
        painter.line_segment([window[0], window[1]], stroke);
    }
}

/// Dashed variant used for the pending (not yet committed) wire.
pub fn draw_dashed_wire(painter: &egui::Painter, from: Pos2, to: Pos2, zoom: f32, color: Color32) {
    let points = wire_points(from, to, zoom);
    let stroke = Stroke::new(2.0 * zoom.max(0.5), color);
    painter.extend(Shape::dashed_line(&points, stroke, 5.0, 5.0));
}

/// Distance from a point to a wire, for double-click disconnection.
pub fn wire_distance(points: &[Pos2], p: Pos2) -> f32 {
    let mut best = f32::INFINITY;
    for window in points.windows(2) {
        best = best.min(segment_distance(window[0], window[1], p));
    }
    best
}

fn segment_distance(a: Pos2, b: Pos2, p: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).length()
}
