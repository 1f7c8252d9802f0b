//! Drop-zone registry: region id -> most recent on-screen rectangle.
//!
//! Regions report their bounds asynchronously after layout (initial render,
//! rotation, scroll). The registry keeps only the last measurement per region
//! and answers "which region is under this point?".
//!
//! Overlap policy: regions are scanned in first-registration order and the first
//! containing region wins. Re-measuring a region never changes its position in
//! that order.

use crate::geometry::{Point, Rect};

#[derive(Clone, Debug)]
struct Slot {
  id: String,
  rect: Option<Rect>,
}

#[derive(Clone, Debug, Default)]
pub struct DropRegistry {
  slots: Vec<Slot>,
}

impl DropRegistry {
  pub fn new() -> Self { Self::default() }

  /// Register a region that has not been measured yet. Idempotent.
  pub fn declare(&mut self, region_id: &str) {
    if self.position(region_id).is_none() {
      self.slots.push(Slot { id: region_id.to_string(), rect: None });
    }
  }

  /// Overwrite the rectangle of a region (last write wins). Unknown ids are appended.
  pub fn register_or_update(&mut self, region_id: &str, rect: Rect) {
    match self.position(region_id) {
      Some(i) => self.slots[i].rect = Some(rect),
      None => self.slots.push(Slot { id: region_id.to_string(), rect: Some(rect) }),
    }
  }

  /// First registered region whose rectangle contains `point`.
  /// Regions that never reported a layout are skipped.
  pub fn find_region_at(&self, point: Point) -> Option<&str> {
    self
      .slots
      .iter()
      .find(|s| s.rect.map_or(false, |r| r.contains(point)))
      .map(|s| s.id.as_str())
  }

  pub fn rect_of(&self, region_id: &str) -> Option<Rect> {
    self.position(region_id).and_then(|i| self.slots[i].rect)
  }

  /// Forget every measurement but keep registration order.
  pub fn clear_measurements(&mut self) {
    for s in &mut self.slots {
      s.rect = None;
    }
  }

  pub fn measured_count(&self) -> usize {
    self.slots.iter().filter(|s| s.rect.is_some()).count()
  }

  fn position(&self, region_id: &str) -> Option<usize> {
    self.slots.iter().position(|s| s.id == region_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_unmeasured_region_never_matches() {
    let mut reg = DropRegistry::new();
    reg.declare("aquatic");
    assert_eq!(reg.find_region_at(Point::new(0.0, 0.0)), None);
    assert_eq!(reg.measured_count(), 0);
  }

  #[test]
  fn test_last_write_wins() {
    let mut reg = DropRegistry::new();
    reg.register_or_update("a", Rect::new(0.0, 0.0, 10.0, 10.0));
    reg.register_or_update("a", Rect::new(100.0, 100.0, 10.0, 10.0));
    assert_eq!(reg.find_region_at(Point::new(5.0, 5.0)), None);
    assert_eq!(reg.find_region_at(Point::new(105.0, 105.0)), Some("a"));
  }

  #[test]
  fn test_overlap_resolves_to_first_registered() {
    let mut reg = DropRegistry::new();
    reg.declare("first");
    reg.declare("second");
    // "second" is measured before "first"; declaration order still decides.
    reg.register_or_update("second", Rect::new(0.0, 0.0, 100.0, 100.0));
    reg.register_or_update("first", Rect::new(50.0, 50.0, 100.0, 100.0));
    reg.register_or_update("second", Rect::new(0.0, 0.0, 120.0, 120.0));
    for _ in 0..10 {
      assert_eq!(reg.find_region_at(Point::new(60.0, 60.0)), Some("first"));
    }
    assert_eq!(reg.find_region_at(Point::new(10.0, 10.0)), Some("second"));
  }

  #[test]
  fn test_clear_measurements_keeps_order() {
    let mut reg = DropRegistry::new();
    reg.register_or_update("x", Rect::new(0.0, 0.0, 10.0, 10.0));
    reg.register_or_update("y", Rect::new(0.0, 0.0, 10.0, 10.0));
    reg.clear_measurements();
    assert_eq!(reg.find_region_at(Point::new(1.0, 1.0)), None);
    reg.register_or_update("y", Rect::new(0.0, 0.0, 10.0, 10.0));
    reg.register_or_update("x", Rect::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(reg.find_region_at(Point::new(1.0, 1.0)), Some("x"));
    assert_eq!(reg.rect_of("y"), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
  }
}
