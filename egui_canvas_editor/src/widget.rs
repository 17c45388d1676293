//! The canvas editor widget: renders the graph and feeds egui input into
//! the core interaction controller.

use egui::{Color32, CornerRadius, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, Vec2};
use slate_core::geometry::{input_port_anchor, node_height, node_width, output_port_anchor};
use slate_core::{
    ContextMenuTarget, EditorSession, Gesture, InteractionController, MeasuredSizeProvider,
    Modifiers, Node, NodeKind, Point, PointerButton, PointerTarget, PortSide,
};
use uuid::Uuid;

use crate::drawing::{draw_dashed_wire, draw_grid, draw_wire, wire_distance, wire_points};
use crate::state::CanvasState;
use crate::theme::CanvasTheme;

/// Screen distance within which a double-click disconnects a wire.
const WIRE_HIT_DISTANCE: f32 = 8.0;

struct FrameInput {
    pointer: Option<Pos2>,
    primary_pressed: bool,
    middle_pressed: bool,
    secondary_pressed: bool,
    primary_released: bool,
    middle_released: bool,
    modifiers: egui::Modifiers,
    scroll: Vec2,
}

/// One-frame view over the session. Construct and [`show`](Self::show) it
/// every frame.
pub struct CanvasEditor<'a> {
    session: &'a mut EditorSession,
    controller: &'a mut InteractionController,
    state: &'a mut CanvasState,
    theme: &'a CanvasTheme,
}

impl<'a> CanvasEditor<'a> {
    pub fn new(
        session: &'a mut EditorSession,
        controller: &'a mut InteractionController,
        state: &'a mut CanvasState,
        theme: &'a CanvasTheme,
    ) -> Self {
        Self {
            session,
            controller,
            state,
            theme,
        }
    }

    pub fn show(self, ui: &mut Ui) -> egui::Response {
        let Self {
            session,
            controller,
            state,
            theme,
        } = self;

        let size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        let painter = ui.painter().with_clip_rect(rect);
        let viewport = (rect.width(), rect.height());

        session.pump_events();

        let input = ui.input(|i| FrameInput {
            pointer: i.pointer.interact_pos(),
            primary_pressed: i.pointer.button_pressed(egui::PointerButton::Primary),
            middle_pressed: i.pointer.button_pressed(egui::PointerButton::Middle),
            secondary_pressed: i.pointer.button_pressed(egui::PointerButton::Secondary),
            primary_released: i.pointer.button_released(egui::PointerButton::Primary),
            middle_released: i.pointer.button_released(egui::PointerButton::Middle),
            modifiers: i.modifiers,
            scroll: i.raw_scroll_delta,
        });
        let mods = Modifiers {
            shift: input.modifiers.shift,
            command: input.modifiers.command,
        };
        let local = input
            .pointer
            .map(|p| Point::new(p.x - rect.min.x, p.y - rect.min.y));

        if response.hovered() && input.scroll != Vec2::ZERO {
            if let Some(pos) = local {
                if mods.command {
                    session.camera.zoom_at(pos, -input.scroll.y);
                } else {
                    session.camera.scroll_by(-input.scroll.x, -input.scroll.y);
                }
            }
        }

        if ui.ctx().memory(|m| m.focused()).is_none() {
            handle_keys(ui, session, controller, viewport);
        }

        if let Some(pos) = local {
            let (target, port_under) = hit_test(session, state, theme, pos);

            let pressed = if input.primary_pressed {
                Some(PointerButton::Primary)
            } else if input.middle_pressed {
                Some(PointerButton::Middle)
            } else if input.secondary_pressed {
                Some(PointerButton::Secondary)
            } else {
                None
            };
            if let Some(button) = pressed {
                let over_menu = state
                    .menu_rect
                    .zip(input.pointer)
                    .is_some_and(|(menu, p)| menu.contains(p));
                // Presses over the open menu belong to its buttons.
                if !over_menu && response.hovered() {
                    controller.pointer_down(session, target, button, mods, pos);
                }
            }

            controller.pointer_move(session, pos, port_under, &*state);

            if input.primary_released || input.middle_released {
                controller.pointer_up(session, pos, mods, port_under);
            }

            if response.double_clicked() {
                disconnect_wire_at(session, state, pos);
            }
        }

        // --- painting ----------------------------------------------------

        let camera = session.camera;
        let scale = camera.scale;
        let to_screen = |p: Point| -> Pos2 {
            let s = camera.canvas_to_screen(p);
            rect.min + Vec2::new(s.x, s.y)
        };

        painter.rect_filled(rect, 0.0, theme.background_color);
        draw_grid(
            &painter,
            rect,
            Vec2::new(camera.pan.x, camera.pan.y),
            scale,
            theme.grid_color,
            theme.grid_spacing,
        );

        for group in session.graph.groups() {
            let grect = Rect::from_min_size(
                to_screen(Point::new(group.x, group.y)),
                Vec2::new(group.width, group.height) * scale,
            );
            painter.rect_filled(grect, 6.0, theme.group_fill);
            let stroke_color = if session.selection.selected_group() == Some(group.id) {
                theme.group_selected_stroke
            } else {
                theme.group_stroke
            };
            painter.rect_stroke(grect, 6.0, Stroke::new(1.5, stroke_color), StrokeKind::Inside);
        }

        for conn in session.graph.connections() {
            if let (Some(from), Some(to)) =
                (session.graph.node(conn.from), session.graph.node(conn.to))
            {
                draw_wire(
                    &painter,
                    to_screen(output_port_anchor(from, state)),
                    to_screen(input_port_anchor(to, state)),
                    scale,
                    theme.wire_color,
                );
            }
        }

        if let Some((from, to)) = controller.pending_wire(session, state) {
            draw_dashed_wire(
                &painter,
                to_screen(from),
                to_screen(to),
                scale,
                theme.pending_wire_color,
            );
        }

        let mut rendered: Vec<(Uuid, (f32, f32))> = Vec::with_capacity(session.graph.nodes().len());
        for node in session.graph.nodes() {
            let size = state
                .measured_size(node.id)
                .unwrap_or((node_width(node), node_height(node)));
            let selected = session.selection.is_selected(node.id);
            draw_node(&painter, theme, to_screen(Point::new(node.x, node.y)), scale, node, size, selected);
            rendered.push((node.id, size));
        }
        for (id, size) in rendered {
            state.record_node_size(id, size);
        }
        {
            let graph = &session.graph;
            state.retain_nodes(|id| graph.node(id).is_some());
        }

        if let Some((a, b)) = controller.rubber_band() {
            let band = Rect::from_two_pos(
                rect.min + Vec2::new(a.x, a.y),
                rect.min + Vec2::new(b.x, b.y),
            );
            painter.rect_filled(band, 0.0, theme.rubber_band_fill);
            painter.rect_stroke(band, 0.0, Stroke::new(1.0, theme.rubber_band_stroke), StrokeKind::Inside);
        }

        state.menu_rect = None;
        show_connection_menu(ui, rect, session, controller, state);
        show_context_menu(ui, rect, session, controller, state);

        if !matches!(controller.gesture(), Gesture::Idle) {
            ui.ctx().request_repaint();
        }

        response
    }
}

fn handle_keys(
    ui: &Ui,
    session: &mut EditorSession,
    controller: &mut InteractionController,
    viewport: (f32, f32),
) {
    let (escape, delete, undo, redo, copy, paste, duplicate, fit) = ui.input(|i| {
        (
            i.key_pressed(egui::Key::Escape),
            i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
            i.modifiers.command && !i.modifiers.shift && i.key_pressed(egui::Key::Z),
            i.modifiers.command
                && (i.key_pressed(egui::Key::Y)
                    || (i.modifiers.shift && i.key_pressed(egui::Key::Z))),
            i.modifiers.command && i.key_pressed(egui::Key::C),
            i.modifiers.command && i.key_pressed(egui::Key::V),
            i.modifiers.command && i.key_pressed(egui::Key::D),
            !i.modifiers.command && i.key_pressed(egui::Key::F),
        )
    });

    if escape {
        controller.escape();
    }
    if delete {
        session.delete_selected();
    }
    if undo {
        session.undo();
    }
    if redo {
        session.redo();
    }
    if copy {
        session.copy_selected();
    }
    if paste {
        session.paste_at_view_center(viewport);
    }
    if duplicate {
        if let Some(&id) = session.selection.selected_nodes().first() {
            session.duplicate_node(id);
        }
    }
    if fit {
        session.fit_view(viewport);
    }
}

/// Resolve a local pointer position to what it is over, topmost first.
fn hit_test(
    session: &EditorSession,
    state: &CanvasState,
    theme: &CanvasTheme,
    local: Point,
) -> (PointerTarget, Option<(Uuid, PortSide)>) {
    let camera = session.camera;
    let scale = camera.scale;
    let port_hit = (theme.port_radius * scale).max(6.0) + 4.0;

    for node in session.graph.nodes().iter().rev() {
        for (anchor, side) in [
            (input_port_anchor(node, state), PortSide::Input),
            (output_port_anchor(node, state), PortSide::Output),
        ] {
            let p = camera.canvas_to_screen(anchor);
            let d = ((p.x - local.x).powi(2) + (p.y - local.y).powi(2)).sqrt();
            if d <= port_hit {
                let port = (node.id, side);
                return (
                    PointerTarget::Port {
                        node: node.id,
                        side,
                    },
                    Some(port),
                );
            }
        }

        let (w, h) = state
            .measured_size(node.id)
            .unwrap_or((node_width(node), node_height(node)));
        let min = camera.canvas_to_screen(Point::new(node.x, node.y));
        if local.x >= min.x
            && local.x <= min.x + w * scale
            && local.y >= min.y
            && local.y <= min.y + h * scale
        {
            return (PointerTarget::Node(node.id), None);
        }
    }

    for group in session.graph.groups().iter().rev() {
        let min = camera.canvas_to_screen(Point::new(group.x, group.y));
        if local.x >= min.x
            && local.x <= min.x + group.width * scale
            && local.y >= min.y
            && local.y <= min.y + group.height * scale
        {
            return (PointerTarget::Group(group.id), None);
        }
    }

    (PointerTarget::Canvas, None)
}

fn disconnect_wire_at(session: &mut EditorSession, state: &CanvasState, local: Point) {
    let camera = session.camera;
    let mut hit: Option<(Uuid, Uuid)> = None;
    for conn in session.graph.connections() {
        let (Some(from), Some(to)) = (session.graph.node(conn.from), session.graph.node(conn.to))
        else {
            continue;
        };
        let a = camera.canvas_to_screen(output_port_anchor(from, state));
        let b = camera.canvas_to_screen(input_port_anchor(to, state));
        let points = wire_points(Pos2::new(a.x, a.y), Pos2::new(b.x, b.y), camera.scale);
        if wire_distance(&points, Pos2::new(local.x, local.y)) <= WIRE_HIT_DISTANCE {
            hit = Some((conn.from, conn.to));
            break;
        }
    }
    if let Some((from, to)) = hit {
        session.remove_connection(from, to);
    }
}

fn draw_node(
    painter: &egui::Painter,
    theme: &CanvasTheme,
    min: Pos2,
    scale: f32,
    node: &Node,
    size: (f32, f32),
    selected: bool,
) {
    let node_rect = Rect::from_min_size(min, Vec2::new(size.0, size.1) * scale);
    let rounding = theme.node_rounding * scale;

    let body = if selected {
        theme.node_body_selected_color
    } else {
        theme.node_body_color
    };
    painter.rect_filled(node_rect, rounding, body);
    if selected {
        painter.rect_stroke(
            node_rect,
            rounding,
            Stroke::new(2.0 * scale.max(0.5), theme.selection_color),
            StrokeKind::Outside,
        );
    }

    let header_h = (theme.header_height * scale).min(node_rect.height());
    let header_rect = Rect::from_min_size(min, Vec2::new(node_rect.width(), header_h));
    painter.rect_filled(
        header_rect,
        CornerRadius {
            nw: rounding as u8,
            ne: rounding as u8,
            sw: 0,
            se: 0,
        },
        (theme.header_color)(node.kind()),
    );
    painter.text(
        header_rect.center(),
        egui::Align2::CENTER_CENTER,
        &node.title,
        egui::FontId::proportional(13.0 * scale),
        theme.title_color,
    );

    // Status dot in the header's right corner.
    painter.circle_filled(
        Pos2::new(node_rect.max.x - 12.0 * scale, header_rect.center().y),
        4.0 * scale,
        (theme.status_color)(node.status),
    );

    if let Some(error) = &node.error {
        painter.text(
            Pos2::new(min.x + 10.0 * scale, header_rect.max.y + 8.0 * scale),
            egui::Align2::LEFT_TOP,
            error,
            egui::FontId::proportional(11.0 * scale),
            theme.error_color,
        );
    }

    let port_r = (theme.port_radius * scale).max(3.0);
    let port_color = (theme.port_color)(node.kind());
    let mid_y = min.y + node_rect.height() / 2.0;
    painter.circle_filled(
        Pos2::new(node_rect.min.x - 4.0 * scale, mid_y),
        port_r,
        port_color,
    );
    painter.circle_stroke(
        Pos2::new(node_rect.min.x - 4.0 * scale, mid_y),
        port_r,
        Stroke::new(1.0, Color32::BLACK),
    );
    painter.circle_filled(
        Pos2::new(node_rect.max.x + 4.0 * scale, mid_y),
        port_r,
        port_color,
    );
    painter.circle_stroke(
        Pos2::new(node_rect.max.x + 4.0 * scale, mid_y),
        port_r,
        Stroke::new(1.0, Color32::BLACK),
    );
}

fn show_connection_menu(
    ui: &Ui,
    rect: Rect,
    session: &mut EditorSession,
    controller: &mut InteractionController,
    state: &mut CanvasState,
) {
    let Some(menu) = controller.connection_menu() else {
        return;
    };

    let pos = rect.min + Vec2::new(menu.screen_pos.x, menu.screen_pos.y);
    let mut chosen: Option<NodeKind> = None;
    let area = egui::Area::new(ui.id().with("create_connected_node_menu"))
        .order(egui::Order::Foreground)
        .fixed_pos(pos)
        .show(ui.ctx(), |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label("Create connected node");
                ui.separator();
                for kind in NodeKind::ALL {
                    if ui.button(kind.display_name()).clicked() {
                        chosen = Some(kind);
                    }
                }
            });
        });
    state.menu_rect = Some(area.response.rect);

    if let Some(kind) = chosen {
        controller.commit_connection_menu(session, kind);
        state.menu_rect = None;
    }
}

/// The right-click menu: create/paste on empty canvas, duplicate/delete on
/// a node. Actions go straight through the session's undoable operations.
fn show_context_menu(
    ui: &Ui,
    rect: Rect,
    session: &mut EditorSession,
    controller: &mut InteractionController,
    state: &mut CanvasState,
) {
    let Some(menu) = controller.context_menu().cloned() else {
        return;
    };

    let pos = rect.min + Vec2::new(menu.screen_pos.x, menu.screen_pos.y);
    let canvas_pos = session.camera.screen_to_canvas(menu.screen_pos);
    let mut acted = false;
    let area = egui::Area::new(ui.id().with("canvas_context_menu"))
        .order(egui::Order::Foreground)
        .fixed_pos(pos)
        .show(ui.ctx(), |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| match menu.target {
                ContextMenuTarget::Canvas => {
                    ui.label("Add node");
                    ui.separator();
                    for kind in NodeKind::ALL {
                        if ui.button(kind.display_name()).clicked() {
                            session.add_node_at(kind, canvas_pos);
                            acted = true;
                        }
                    }
                    if session.has_clipboard() {
                        ui.separator();
                        if ui.button("Paste").clicked() {
                            session.paste_at(canvas_pos);
                            acted = true;
                        }
                    }
                }
                ContextMenuTarget::Node(id) => {
                    if ui.button("Duplicate").clicked() {
                        session.duplicate_node(id);
                        acted = true;
                    }
                    if ui.button("Delete").clicked() {
                        session.delete_nodes(&[id]);
                        acted = true;
                    }
                }
            });
        });
    state.menu_rect = Some(area.response.rect);

    if acted {
        controller.dismiss_context_menu();
        state.menu_rect = None;
    }
}
