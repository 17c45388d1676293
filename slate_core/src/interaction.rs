//! The pointer-driven interaction state machine.
//!
//! The controller is UI-toolkit agnostic: the embedding widget hit-tests the
//! pointer to a [`PointerTarget`], forwards down/move/up events in screen
//! coordinates and renders whatever the current [`Gesture`] implies (rubber
//! band, pending wire, open menu). Exactly one gesture is active per pointer
//! press; pointer-up always returns to `Idle` unless a connection drop just
//! opened the create-node menu, which keeps the pending wire alive until the
//! menu is committed or dismissed.

use uuid::Uuid;

use crate::geometry::{
    Bounds, MIN_RUBBER_BAND_EXTENT, MeasuredSizeProvider, Point, input_port_anchor, node_bounds,
    output_port_anchor,
};
use crate::model::NodeKind;
use crate::session::EditorSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl, or Cmd on macOS.
    pub command: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortSide {
    Input,
    Output,
}

impl PortSide {
    pub fn opposite(self) -> Self {
        match self {
            PortSide::Input => PortSide::Output,
            PortSide::Output => PortSide::Input,
        }
    }
}

/// What the pointer landed on, as resolved by the widget's hit-test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerTarget {
    Canvas,
    Node(Uuid),
    Group(Uuid),
    Port { node: Uuid, side: PortSide },
}

/// An in-progress connection drag.
#[derive(Clone, Debug)]
pub struct ConnectionDraft {
    pub origin: Uuid,
    pub side: PortSide,
    /// Canvas-space endpoint of the pending wire; snaps to a compatible
    /// hovered port.
    pub end: Point,
    pub hovered: Option<(Uuid, PortSide)>,
}

/// The create-connected-node menu opened by dropping an output wire on
/// empty canvas.
#[derive(Clone, Debug)]
pub struct ConnectionMenu {
    pub screen_pos: Point,
    pub from: Uuid,
}

/// What a right-click landed on, and therefore which actions the context
/// menu offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextMenuTarget {
    /// Empty canvas (or a group band): create a node here, paste.
    Canvas,
    /// A node (or one of its ports): duplicate, delete.
    Node(Uuid),
}

/// The right-click context menu. Only one menu is open at a time; opening
/// it dismisses the connection menu and vice versa.
#[derive(Clone, Debug)]
pub struct ContextMenu {
    pub screen_pos: Point,
    pub target: ContextMenuTarget,
}

#[derive(Clone, Debug, Default)]
pub enum Gesture {
    #[default]
    Idle,
    PanningCanvas {
        last: Point,
    },
    DraggingNode {
        start: Point,
        origins: Vec<(Uuid, Point)>,
        moved: bool,
    },
    DraggingGroup {
        id: Uuid,
        start: Point,
        origin: Point,
        members: Vec<(Uuid, Point)>,
        moved: bool,
    },
    RubberBand {
        start: Point,
        current: Point,
    },
    DrawingConnection(ConnectionDraft),
    /// Reserved: node resize handles are not wired up yet.
    ResizingNode {
        id: Uuid,
    },
}

#[derive(Debug, Default)]
pub struct InteractionController {
    gesture: Gesture,
    connection_menu: Option<ConnectionMenu>,
    context_menu: Option<ContextMenu>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn connection_menu(&self) -> Option<&ConnectionMenu> {
        self.connection_menu.as_ref()
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    /// Screen-space corners of the active rubber band, if any.
    pub fn rubber_band(&self) -> Option<(Point, Point)> {
        match &self.gesture {
            Gesture::RubberBand { start, current } => Some((*start, *current)),
            _ => None,
        }
    }

    /// Canvas-space endpoints of the pending wire, output end first.
    pub fn pending_wire(
        &self,
        session: &EditorSession,
        measured: &dyn MeasuredSizeProvider,
    ) -> Option<(Point, Point)> {
        let Gesture::DrawingConnection(draft) = &self.gesture else {
            return None;
        };
        let node = session.graph.node(draft.origin)?;
        let anchor = match draft.side {
            PortSide::Output => output_port_anchor(node, measured),
            PortSide::Input => input_port_anchor(node, measured),
        };
        match draft.side {
            PortSide::Output => Some((anchor, draft.end)),
            PortSide::Input => Some((draft.end, anchor)),
        }
    }

    pub fn pointer_down(
        &mut self,
        session: &mut EditorSession,
        target: PointerTarget,
        button: PointerButton,
        modifiers: Modifiers,
        screen: Point,
    ) {
        if self.connection_menu.take().is_some() {
            // Clicking away from the menu abandons the pending wire.
            self.gesture = Gesture::Idle;
        }
        self.context_menu = None;

        match button {
            PointerButton::Secondary => {
                let target = match target {
                    PointerTarget::Node(id) | PointerTarget::Port { node: id, .. } => {
                        ContextMenuTarget::Node(id)
                    }
                    PointerTarget::Canvas | PointerTarget::Group(_) => ContextMenuTarget::Canvas,
                };
                self.context_menu = Some(ContextMenu {
                    screen_pos: screen,
                    target,
                });
                return;
            }
            PointerButton::Middle => {
                self.gesture = Gesture::PanningCanvas { last: screen };
                return;
            }
            PointerButton::Primary => {}
        }

        match target {
            PointerTarget::Port { node, side } => {
                self.gesture = Gesture::DrawingConnection(ConnectionDraft {
                    origin: node,
                    side,
                    end: session.camera.screen_to_canvas(screen),
                    hovered: None,
                });
            }
            PointerTarget::Node(id) => {
                if modifiers.shift {
                    session.selection.toggle(id);
                } else {
                    session.selection.click(id);
                }
                if session.selection.is_selected(id) {
                    let origins = session
                        .selection
                        .selected_nodes()
                        .iter()
                        .filter_map(|nid| {
                            session.graph.node(*nid).map(|n| (*nid, Point::new(n.x, n.y)))
                        })
                        .collect();
                    self.gesture = Gesture::DraggingNode {
                        start: screen,
                        origins,
                        moved: false,
                    };
                }
            }
            PointerTarget::Group(id) => {
                session.selection.select_group(Some(id));
                if let Some(group) = session.graph.group(id).copied() {
                    let members = session
                        .graph
                        .nodes_in_group(&group)
                        .into_iter()
                        .filter_map(|nid| {
                            session.graph.node(nid).map(|n| (nid, Point::new(n.x, n.y)))
                        })
                        .collect();
                    self.gesture = Gesture::DraggingGroup {
                        id,
                        start: screen,
                        origin: Point::new(group.x, group.y),
                        members,
                        moved: false,
                    };
                }
            }
            PointerTarget::Canvas => {
                if modifiers.shift {
                    self.gesture = Gesture::PanningCanvas { last: screen };
                } else {
                    // Selection survives until release: an additive band
                    // merges into it, anything else replaces or clears it.
                    self.gesture = Gesture::RubberBand {
                        start: screen,
                        current: screen,
                    };
                }
            }
        }
    }

    pub fn pointer_move(
        &mut self,
        session: &mut EditorSession,
        screen: Point,
        port_under: Option<(Uuid, PortSide)>,
        measured: &dyn MeasuredSizeProvider,
    ) {
        match &mut self.gesture {
            Gesture::PanningCanvas { last } => {
                session.camera.pan_by(screen.x - last.x, screen.y - last.y);
                *last = screen;
            }
            Gesture::RubberBand { current, .. } => {
                *current = screen;
            }
            Gesture::DraggingNode {
                start,
                origins,
                moved,
            } => {
                let scale = session.camera.scale;
                let dx = (screen.x - start.x) / scale;
                let dy = (screen.y - start.y) / scale;
                if dx != 0.0 || dy != 0.0 {
                    *moved = true;
                }
                for (id, origin) in origins.iter() {
                    let (ox, oy) = (origin.x, origin.y);
                    session.graph.update_node_with(*id, |n| {
                        n.x = ox + dx;
                        n.y = oy + dy;
                    });
                }
            }
            Gesture::DraggingGroup {
                id,
                start,
                origin,
                members,
                moved,
            } => {
                let scale = session.camera.scale;
                let dx = (screen.x - start.x) / scale;
                let dy = (screen.y - start.y) / scale;
                if dx != 0.0 || dy != 0.0 {
                    *moved = true;
                }
                if let Some(group) = session.graph.group_mut(*id) {
                    group.x = origin.x + dx;
                    group.y = origin.y + dy;
                }
                for (nid, node_origin) in members.iter() {
                    let (ox, oy) = (node_origin.x, node_origin.y);
                    session.graph.update_node_with(*nid, |n| {
                        n.x = ox + dx;
                        n.y = oy + dy;
                    });
                }
            }
            Gesture::DrawingConnection(draft) => {
                let snapped = port_under
                    .filter(|(pid, pside)| *pid != draft.origin && *pside == draft.side.opposite());
                draft.hovered = snapped;
                draft.end = snapped
                    .and_then(|(pid, pside)| {
                        let node = session.graph.node(pid)?;
                        Some(match pside {
                            PortSide::Input => input_port_anchor(node, measured),
                            PortSide::Output => output_port_anchor(node, measured),
                        })
                    })
                    .unwrap_or_else(|| session.camera.screen_to_canvas(screen));
            }
            Gesture::Idle | Gesture::ResizingNode { .. } => {}
        }
    }

    pub fn pointer_up(
        &mut self,
        session: &mut EditorSession,
        screen: Point,
        modifiers: Modifiers,
        port_under: Option<(Uuid, PortSide)>,
    ) {
        let gesture = std::mem::take(&mut self.gesture);
        match gesture {
            Gesture::DrawingConnection(draft) => {
                let target = port_under
                    .filter(|(pid, pside)| *pid != draft.origin && *pside == draft.side.opposite());
                if let Some((pid, _)) = target {
                    // Direction always normalizes to output -> input.
                    let (from, to) = match draft.side {
                        PortSide::Output => (draft.origin, pid),
                        PortSide::Input => (pid, draft.origin),
                    };
                    session.add_connection(from, to);
                } else if port_under.is_none() && draft.side == PortSide::Output {
                    self.connection_menu = Some(ConnectionMenu {
                        screen_pos: screen,
                        from: draft.origin,
                    });
                    // Keep the pending wire visible under the open menu.
                    self.gesture = Gesture::DrawingConnection(draft);
                }
            }
            Gesture::RubberBand { start, .. } => {
                self.finish_rubber_band(session, start, screen, modifiers);
            }
            Gesture::DraggingNode { moved, .. } | Gesture::DraggingGroup { moved, .. } => {
                if moved {
                    session.commit();
                }
            }
            Gesture::PanningCanvas { .. } | Gesture::Idle | Gesture::ResizingNode { .. } => {}
        }
    }

    fn finish_rubber_band(
        &mut self,
        session: &mut EditorSession,
        start: Point,
        end: Point,
        modifiers: Modifiers,
    ) {
        let w = (end.x - start.x).abs();
        let h = (end.y - start.y).abs();
        if w > MIN_RUBBER_BAND_EXTENT && h > MIN_RUBBER_BAND_EXTENT {
            let rect = Bounds::from_corners(
                session.camera.screen_to_canvas(start),
                session.camera.screen_to_canvas(end),
            );
            let hits: Vec<Uuid> = session
                .graph
                .nodes()
                .iter()
                .filter(|n| rect.overlaps(&node_bounds(n)))
                .map(|n| n.id)
                .collect();
            if !hits.is_empty() {
                if modifiers.shift {
                    session.selection.merge(hits);
                } else {
                    session.selection.replace(hits);
                }
                return;
            }
        }
        // Degenerate or empty band: a plain release deselects, an additive
        // one leaves the selection alone.
        if !modifiers.shift {
            session.selection.clear();
        }
    }

    /// Cancel transient state: open menus, pending wire, rubber band. Never
    /// mutates the graph.
    pub fn escape(&mut self) {
        self.connection_menu = None;
        self.context_menu = None;
        if matches!(
            self.gesture,
            Gesture::RubberBand { .. } | Gesture::DrawingConnection(_)
        ) {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn dismiss_connection_menu(&mut self) {
        if self.connection_menu.take().is_some() {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn dismiss_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Commit the open connection menu by creating a node of `kind` wired to
    /// the dragged output, as one undo step.
    pub fn commit_connection_menu(
        &mut self,
        session: &mut EditorSession,
        kind: NodeKind,
    ) -> Option<Uuid> {
        let menu = self.connection_menu.take()?;
        self.gesture = Gesture::Idle;
        let center = session.camera.screen_to_canvas(menu.screen_pos);
        session.create_connected_node(kind, menu.from, center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::Value;

    use crate::config::EditorConfig;
    use crate::error::SlateError;
    use crate::geometry::NoMeasurements;
    use crate::model::{Group, Node, NodePayload};
    use crate::services::{
        GenerationOutput, GenerationRequest, GenerationService, ServiceFuture, StorageBackend,
    };
    use crate::session::{EditorContext, ServiceHandles};

    struct NullGeneration;

    impl GenerationService for NullGeneration {
        fn generate(
            &self,
            _request: GenerationRequest,
        ) -> ServiceFuture<Result<GenerationOutput, SlateError>> {
            Box::pin(async { Ok(GenerationOutput::Images(vec![])) })
        }
    }

    struct NullStorage;

    impl StorageBackend for NullStorage {
        fn load(&self, _key: &str) -> ServiceFuture<Result<Option<Value>, SlateError>> {
            Box::pin(async { Ok(None) })
        }

        fn save(&self, _key: &str, _value: Value) -> ServiceFuture<Result<(), SlateError>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn setup_session() -> EditorSession {
        EditorSession::new(EditorContext {
            config: EditorConfig::default(),
            services: ServiceHandles {
                generation: Arc::new(NullGeneration),
                storage: Arc::new(NullStorage),
                assets: None,
            },
        })
    }

    fn setup_node(session: &mut EditorSession, kind: NodeKind, x: f32, y: f32) -> Uuid {
        let id = session
            .graph
            .add_node(Node::new(NodePayload::empty(kind), x, y));
        session.commit();
        id
    }

    fn primary_down(
        controller: &mut InteractionController,
        session: &mut EditorSession,
        target: PointerTarget,
        at: Point,
    ) {
        controller.pointer_down(
            session,
            target,
            PointerButton::Primary,
            Modifiers::default(),
            at,
        );
    }

    #[test]
    fn test_drag_node_moves_and_commits_once() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let id = setup_node(&mut session, NodeKind::TextPrompt, 100.0, 100.0);
        let steps_before = session.history.len();

        primary_down(&mut controller, &mut session, PointerTarget::Node(id), Point::new(150.0, 150.0));
        controller.pointer_move(&mut session, Point::new(250.0, 200.0), None, &NoMeasurements);
        controller.pointer_up(&mut session, Point::new(250.0, 200.0), Modifiers::default(), None);

        let node = session.graph.node(id).unwrap();
        assert_eq!((node.x, node.y), (200.0, 150.0));
        assert_eq!(session.history.len(), steps_before + 1);

        // Undo restores the pre-drag position.
        assert!(session.undo());
        let node = session.graph.node(id).unwrap();
        assert_eq!((node.x, node.y), (100.0, 100.0));
    }

    #[test]
    fn test_drag_respects_zoom_level() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let id = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        session.camera.set_scale(2.0);

        primary_down(&mut controller, &mut session, PointerTarget::Node(id), Point::new(0.0, 0.0));
        controller.pointer_move(&mut session, Point::new(100.0, 0.0), None, &NoMeasurements);
        controller.pointer_up(&mut session, Point::new(100.0, 0.0), Modifiers::default(), None);

        // 100 screen px at 2x is 50 canvas units.
        assert_eq!(session.graph.node(id).unwrap().x, 50.0);
    }

    #[test]
    fn test_click_without_movement_commits_nothing() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let id = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let steps_before = session.history.len();

        primary_down(&mut controller, &mut session, PointerTarget::Node(id), Point::new(5.0, 5.0));
        controller.pointer_up(&mut session, Point::new(5.0, 5.0), Modifiers::default(), None);

        assert_eq!(session.history.len(), steps_before);
        assert_eq!(session.selection.selected_nodes(), &[id]);
    }

    #[test]
    fn test_multi_selection_drags_together() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let a = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let b = setup_node(&mut session, NodeKind::TextPrompt, 500.0, 0.0);
        session.selection.replace(vec![a, b]);

        primary_down(&mut controller, &mut session, PointerTarget::Node(a), Point::new(10.0, 10.0));
        controller.pointer_move(&mut session, Point::new(40.0, 30.0), None, &NoMeasurements);
        controller.pointer_up(&mut session, Point::new(40.0, 30.0), Modifiers::default(), None);

        assert_eq!(session.graph.node(a).unwrap().x, 30.0);
        assert_eq!(session.graph.node(b).unwrap().x, 530.0);
        assert_eq!(session.graph.node(b).unwrap().y, 20.0);
        // Clicking a member never collapsed the multi-selection.
        assert_eq!(session.selection.selected_nodes().len(), 2);
    }

    #[test]
    fn test_shift_click_toggles_membership() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let a = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let b = setup_node(&mut session, NodeKind::TextPrompt, 500.0, 0.0);
        session.selection.select_only(a);

        let shift = Modifiers {
            shift: true,
            command: false,
        };
        controller.pointer_down(
            &mut session,
            PointerTarget::Node(b),
            PointerButton::Primary,
            shift,
            Point::new(510.0, 10.0),
        );
        controller.pointer_up(&mut session, Point::new(510.0, 10.0), shift, None);
        assert_eq!(session.selection.selected_nodes(), &[a, b]);
    }

    #[test]
    fn test_rubber_band_overlap_selection() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        // 420x360 estimated bounds at (0, 0); a second node far away.
        let near = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let far = setup_node(&mut session, NodeKind::TextPrompt, 5000.0, 5000.0);

        primary_down(&mut controller, &mut session, PointerTarget::Canvas, Point::new(-20.0, -20.0));
        controller.pointer_move(&mut session, Point::new(50.0, 50.0), None, &NoMeasurements);
        controller.pointer_up(&mut session, Point::new(50.0, 50.0), Modifiers::default(), None);

        assert_eq!(session.selection.selected_nodes(), &[near]);
        assert!(!session.selection.is_selected(far));
    }

    #[test]
    fn test_additive_rubber_band_merges() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let a = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let b = setup_node(&mut session, NodeKind::TextPrompt, 2000.0, 0.0);
        session.selection.select_only(a);

        // The band starts without shift (shift+primary would pan) and shift
        // is held by release time, making it additive.
        let shift = Modifiers {
            shift: true,
            command: false,
        };
        primary_down(&mut controller, &mut session, PointerTarget::Canvas, Point::new(1990.0, -20.0));
        controller.pointer_move(&mut session, Point::new(2100.0, 50.0), None, &NoMeasurements);
        controller.pointer_up(&mut session, Point::new(2100.0, 50.0), shift, None);

        assert_eq!(session.selection.selected_nodes(), &[a, b]);
    }

    #[test]
    fn test_tiny_rubber_band_clears_unless_additive() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let a = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        session.selection.select_only(a);

        primary_down(&mut controller, &mut session, PointerTarget::Canvas, Point::new(900.0, 900.0));
        controller.pointer_move(&mut session, Point::new(905.0, 905.0), None, &NoMeasurements);
        controller.pointer_up(
            &mut session,
            Point::new(905.0, 905.0),
            Modifiers {
                shift: true,
                command: false,
            },
            None,
        );
        assert_eq!(session.selection.selected_nodes(), &[a]);

        primary_down(&mut controller, &mut session, PointerTarget::Canvas, Point::new(900.0, 900.0));
        controller.pointer_move(&mut session, Point::new(905.0, 905.0), None, &NoMeasurements);
        controller.pointer_up(&mut session, Point::new(905.0, 905.0), Modifiers::default(), None);
        assert!(session.selection.selected_nodes().is_empty());
    }

    #[test]
    fn test_middle_button_and_shift_primary_pan() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();

        controller.pointer_down(
            &mut session,
            PointerTarget::Canvas,
            PointerButton::Middle,
            Modifiers::default(),
            Point::new(0.0, 0.0),
        );
        controller.pointer_move(&mut session, Point::new(30.0, -10.0), None, &NoMeasurements);
        controller.pointer_up(&mut session, Point::new(30.0, -10.0), Modifiers::default(), None);
        assert_eq!((session.camera.pan.x, session.camera.pan.y), (30.0, -10.0));

        controller.pointer_down(
            &mut session,
            PointerTarget::Canvas,
            PointerButton::Primary,
            Modifiers {
                shift: true,
                command: false,
            },
            Point::new(0.0, 0.0),
        );
        controller.pointer_move(&mut session, Point::new(10.0, 10.0), None, &NoMeasurements);
        assert_eq!((session.camera.pan.x, session.camera.pan.y), (40.0, 0.0));
    }

    #[test]
    fn test_connection_drag_normalizes_direction() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let a = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let b = setup_node(&mut session, NodeKind::ImageGenerator, 800.0, 0.0);
        let steps_before = session.history.len();

        // Dragged from b's *input* port and dropped on a's output: the edge
        // still points a -> b.
        primary_down(
            &mut controller,
            &mut session,
            PointerTarget::Port {
                node: b,
                side: PortSide::Input,
            },
            Point::new(796.0, 180.0),
        );
        controller.pointer_move(
            &mut session,
            Point::new(430.0, 180.0),
            Some((a, PortSide::Output)),
            &NoMeasurements,
        );
        controller.pointer_up(
            &mut session,
            Point::new(430.0, 180.0),
            Modifiers::default(),
            Some((a, PortSide::Output)),
        );

        assert!(session.graph.has_connection(a, b));
        assert_eq!(session.graph.node(b).unwrap().inputs, vec![a]);
        assert_eq!(session.history.len(), steps_before + 1);
    }

    #[test]
    fn test_connection_to_same_side_port_is_rejected() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let a = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let b = setup_node(&mut session, NodeKind::ImageGenerator, 800.0, 0.0);

        primary_down(
            &mut controller,
            &mut session,
            PointerTarget::Port {
                node: a,
                side: PortSide::Output,
            },
            Point::new(424.0, 180.0),
        );
        controller.pointer_up(
            &mut session,
            Point::new(1228.0, 180.0),
            Modifiers::default(),
            Some((b, PortSide::Output)),
        );

        assert!(session.graph.connections().is_empty());
        assert!(controller.connection_menu().is_none());
    }

    #[test]
    fn test_output_drop_on_canvas_opens_menu() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let a = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let steps_before = session.history.len();

        primary_down(
            &mut controller,
            &mut session,
            PointerTarget::Port {
                node: a,
                side: PortSide::Output,
            },
            Point::new(424.0, 180.0),
        );
        controller.pointer_move(&mut session, Point::new(900.0, 300.0), None, &NoMeasurements);
        controller.pointer_up(&mut session, Point::new(900.0, 300.0), Modifiers::default(), None);

        let menu = controller.connection_menu().expect("menu should open");
        assert_eq!(menu.from, a);
        // The pending wire stays visible while the menu is up.
        assert!(
            controller
                .pending_wire(&session, &NoMeasurements)
                .is_some()
        );

        let created = controller
            .commit_connection_menu(&mut session, NodeKind::VideoGenerator)
            .expect("node should be created");
        assert!(session.graph.has_connection(a, created));
        assert_eq!(session.graph.node(created).unwrap().inputs, vec![a]);
        assert_eq!(session.graph.node(created).unwrap().kind(), NodeKind::VideoGenerator);
        // Node plus edge landed as a single undo step.
        assert_eq!(session.history.len(), steps_before + 1);
        assert!(controller.connection_menu().is_none());
    }

    #[test]
    fn test_input_drop_on_canvas_does_not_open_menu() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let a = setup_node(&mut session, NodeKind::ImageGenerator, 0.0, 0.0);

        primary_down(
            &mut controller,
            &mut session,
            PointerTarget::Port {
                node: a,
                side: PortSide::Input,
            },
            Point::new(-4.0, 120.0),
        );
        controller.pointer_up(&mut session, Point::new(-300.0, 120.0), Modifiers::default(), None);

        assert!(controller.connection_menu().is_none());
        assert!(matches!(controller.gesture(), Gesture::Idle));
    }

    #[test]
    fn test_escape_cancels_menu_without_mutation() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let a = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let doc_before = session.document();
        let steps_before = session.history.len();

        primary_down(
            &mut controller,
            &mut session,
            PointerTarget::Port {
                node: a,
                side: PortSide::Output,
            },
            Point::new(424.0, 180.0),
        );
        controller.pointer_up(&mut session, Point::new(900.0, 300.0), Modifiers::default(), None);
        assert!(controller.connection_menu().is_some());

        controller.escape();
        assert!(controller.connection_menu().is_none());
        assert!(matches!(controller.gesture(), Gesture::Idle));
        assert_eq!(session.document(), doc_before);
        assert_eq!(session.history.len(), steps_before);
    }

    #[test]
    fn test_right_click_opens_context_menu() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let id = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);

        controller.pointer_down(
            &mut session,
            PointerTarget::Node(id),
            PointerButton::Secondary,
            Modifiers::default(),
            Point::new(50.0, 60.0),
        );
        let menu = controller.context_menu().expect("menu should open");
        assert_eq!(menu.target, ContextMenuTarget::Node(id));
        assert!(matches!(controller.gesture(), Gesture::Idle));

        // Right-clicking empty canvas retargets the menu.
        controller.pointer_down(
            &mut session,
            PointerTarget::Canvas,
            PointerButton::Secondary,
            Modifiers::default(),
            Point::new(300.0, 200.0),
        );
        assert_eq!(
            controller.context_menu().unwrap().target,
            ContextMenuTarget::Canvas
        );

        // Any other press dismisses it.
        primary_down(&mut controller, &mut session, PointerTarget::Canvas, Point::new(10.0, 10.0));
        assert!(controller.context_menu().is_none());
    }

    #[test]
    fn test_escape_closes_context_menu_without_mutation() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let id = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let doc_before = session.document();

        controller.pointer_down(
            &mut session,
            PointerTarget::Port {
                node: id,
                side: PortSide::Output,
            },
            PointerButton::Secondary,
            Modifiers::default(),
            Point::new(424.0, 180.0),
        );
        assert_eq!(
            controller.context_menu().unwrap().target,
            ContextMenuTarget::Node(id)
        );

        controller.escape();
        assert!(controller.context_menu().is_none());
        assert_eq!(session.document(), doc_before);
    }

    #[test]
    fn test_pending_wire_snaps_to_hovered_port() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let a = setup_node(&mut session, NodeKind::TextPrompt, 0.0, 0.0);
        let b = setup_node(&mut session, NodeKind::ImageGenerator, 800.0, 0.0);

        primary_down(
            &mut controller,
            &mut session,
            PointerTarget::Port {
                node: a,
                side: PortSide::Output,
            },
            Point::new(424.0, 180.0),
        );
        controller.pointer_move(
            &mut session,
            Point::new(780.0, 100.0),
            Some((b, PortSide::Input)),
            &NoMeasurements,
        );

        let (_, end) = controller
            .pending_wire(&session, &NoMeasurements)
            .unwrap();
        let anchor = input_port_anchor(session.graph.node(b).unwrap(), &NoMeasurements);
        assert_eq!(end, anchor);
    }

    #[test]
    fn test_group_drag_carries_members() {
        let mut session = setup_session();
        let mut controller = InteractionController::new();
        let group_id = session.graph.add_group(Group::new(0.0, 0.0, 1000.0, 500.0));
        let inside = setup_node(&mut session, NodeKind::TextPrompt, 100.0, 100.0);
        let outside = setup_node(&mut session, NodeKind::TextPrompt, 2000.0, 100.0);
        session.commit();

        primary_down(
            &mut controller,
            &mut session,
            PointerTarget::Group(group_id),
            Point::new(500.0, 20.0),
        );
        controller.pointer_move(&mut session, Point::new(540.0, 50.0), None, &NoMeasurements);
        controller.pointer_up(&mut session, Point::new(540.0, 50.0), Modifiers::default(), None);

        let group = session.graph.group(group_id).unwrap();
        assert_eq!((group.x, group.y), (40.0, 30.0));
        let member = session.graph.node(inside).unwrap();
        assert_eq!((member.x, member.y), (140.0, 130.0));
        let untouched = session.graph.node(outside).unwrap();
        assert_eq!((untouched.x, untouched.y), (2000.0, 100.0));
        assert_eq!(session.selection.selected_group(), Some(group_id));
    }
}
