use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen coordinates (y grows downward).
/// Edges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ScreenRect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_origin_size(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn spans_x(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.spans_x(p.x) && p.y >= self.top && p.y <= self.bottom
    }

    /// Landing point a leap would aim for.
    pub fn top_center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) / 2.0, self.top)
    }

    pub fn translated(&self, by: Vec2) -> Self {
        Self::new(
            self.left + by.x,
            self.top + by.y,
            self.right + by.x,
            self.bottom + by.y,
        )
    }
}
