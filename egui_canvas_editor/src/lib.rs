//! A standalone egui widget for the Slate node canvas.
//!
//! The widget renders a [`slate_core::EditorSession`]'s graph (groups, wires,
//! nodes, rubber band, pending connection, create-node menu) and translates
//! egui pointer/keyboard input into the core's gesture vocabulary. All
//! editing semantics live in `slate_core`; this crate is presentation and
//! input plumbing only.
//!
//! ```no_run
//! # fn demo(
//! #     ui: &mut egui::Ui,
//! #     session: &mut slate_core::EditorSession,
//! #     controller: &mut slate_core::InteractionController,
//! #     state: &mut egui_canvas_editor::CanvasState,
//! #     theme: &egui_canvas_editor::CanvasTheme,
//! # ) {
//! egui_canvas_editor::CanvasEditor::new(session, controller, state, theme).show(ui);
//! # }
//! ```

pub mod drawing;
pub mod state;
pub mod theme;
pub mod widget;

pub use state::CanvasState;
pub use theme::CanvasTheme;
pub use widget::CanvasEditor;
