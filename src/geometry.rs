//! Screen-space geometry for drag-and-drop: points, offsets, rectangles and hit tests.
//!
//! Coordinates are whatever the rendering client measures (logical pixels, y down).
//! Rectangles use half-open intervals so two regions laid out edge to edge never
//! both claim the shared border.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  /// Displacement from `origin` to `self`.
  pub fn offset_from(self, origin: Point) -> Offset {
    Offset { dx: self.x - origin.x, dy: self.y - origin.y }
  }
}

/// Live displacement of a dragged token relative to where it was picked up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
  pub dx: f64,
  pub dy: f64,
}

/// Axis-aligned rectangle as reported by the renderer after layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
}

impl Rect {
  /// `x <= p.x < x + width` and `y <= p.y < y + height`.
  /// Empty, negative or NaN extents never contain anything.
  pub fn contains(&self, p: Point) -> bool {
    self.x <= p.x && p.x < self.x + self.width && self.y <= p.y && p.y < self.y + self.height
  }

  pub fn is_empty(&self) -> bool {
    !(self.width > 0.0 && self.height > 0.0)
  }
}

// Positions arrive deserialized from the client; only tests build them by hand.
#[cfg(test)]
impl Point {
  pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

#[cfg(test)]
impl Rect {
  pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
    Self { x, y, width, height }
  }
}
