//! Single-pointer drag session and the placement side table.
//!
//! State machine: `Idle -> Dragging -> Idle`. Exactly one drag may be active.
//! A release either commits a placement (the point is inside a registered
//! region) or springs the token back to its origin. A cancelled gesture is
//! handled exactly like a miss.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::geometry::{Offset, Point};
use crate::registry::DropRegistry;

/// Committed item -> region assignments. Keyed by item, so an item can never
/// sit in two regions at once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Placements {
  by_item: BTreeMap<String, String>,
}

impl Placements {
  pub fn new() -> Self { Self::default() }

  /// Place `item_id` in `region_id`, returning the region it previously occupied.
  pub fn place(&mut self, item_id: &str, region_id: &str) -> Option<String> {
    self.by_item.insert(item_id.to_string(), region_id.to_string())
  }

  pub fn region_of(&self, item_id: &str) -> Option<&str> {
    self.by_item.get(item_id).map(String::as_str)
  }

  pub fn is_placed(&self, item_id: &str) -> bool {
    self.by_item.contains_key(item_id)
  }

  /// Items currently sitting in `region_id`, in item id order.
  pub fn items_in<'a>(&'a self, region_id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    self
      .by_item
      .iter()
      .filter(move |(_, r)| r.as_str() == region_id)
      .map(|(i, _)| i.as_str())
  }

  pub fn len(&self) -> usize { self.by_item.len() }

  pub fn is_empty(&self) -> bool { self.by_item.is_empty() }

  pub fn clear(&mut self) { self.by_item.clear(); }
}

impl FromIterator<(String, String)> for Placements {
  fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
    Self { by_item: iter.into_iter().collect() }
  }
}

/// The token currently held under the pointer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDrag {
  pub item_id: String,
  pub origin: Point,
  pub current: Point,
}

impl ActiveDrag {
  pub fn live_offset(&self) -> Offset {
    self.current.offset_from(self.origin)
  }
}

/// What happened when a drag ended.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
  /// Landed inside a region; `previous` is the region the item left, if any.
  Placed {
    #[serde(rename = "itemId")]
    item_id: String,
    #[serde(rename = "regionId")]
    region_id: String,
    previous: Option<String>,
  },
  /// Missed every region (or was cancelled); the token returns to `origin`.
  SprungBack {
    #[serde(rename = "itemId")]
    item_id: String,
    origin: Point,
  },
  /// Release/cancel arrived while no drag was active.
  NotDragging,
}

#[derive(Clone, Debug, Default)]
pub struct DragSession {
  active: Option<ActiveDrag>,
}

impl DragSession {
  pub fn new() -> Self { Self::default() }

  /// `Idle -> Dragging`. Refused (returns false) while another drag is active
  /// or when the item is already placed.
  pub fn start(&mut self, item_id: &str, origin: Point, placements: &Placements) -> bool {
    if self.active.is_some() || placements.is_placed(item_id) {
      return false;
    }
    self.active = Some(ActiveDrag { item_id: item_id.to_string(), origin, current: origin });
    true
  }

  /// Track the pointer. Returns the new live offset, or None when idle.
  pub fn move_to(&mut self, point: Point) -> Option<Offset> {
    let drag = self.active.as_mut()?;
    drag.current = point;
    Some(drag.live_offset())
  }

  /// `Dragging -> Idle`, committing a placement on a hit.
  pub fn release(&mut self, point: Point, registry: &DropRegistry, placements: &mut Placements) -> DropOutcome {
    let Some(drag) = self.active.take() else {
      return DropOutcome::NotDragging;
    };
    match registry.find_region_at(point) {
      Some(region_id) => {
        let previous = placements.place(&drag.item_id, region_id);
        DropOutcome::Placed { item_id: drag.item_id, region_id: region_id.to_string(), previous }
      }
      None => DropOutcome::SprungBack { item_id: drag.item_id, origin: drag.origin },
    }
  }

  /// Interrupted gesture: same as a miss.
  pub fn cancel(&mut self) -> DropOutcome {
    match self.active.take() {
      Some(drag) => DropOutcome::SprungBack { item_id: drag.item_id, origin: drag.origin },
      None => DropOutcome::NotDragging,
    }
  }

  pub fn active(&self) -> Option<&ActiveDrag> {
    self.active.as_ref()
  }

  pub fn is_dragging(&self) -> bool {
    self.active.is_some()
  }
}
