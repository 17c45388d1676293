//! Presentational group rectangles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A visual rectangle on the canvas. Groups carry no persisted membership;
/// which nodes belong to a group is recomputed from geometry on demand.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Group {
    pub id: Uuid,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Group {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            width,
            height,
        }
    }
}
