//! One mounted activity: drop registry + drag session + placements + score.
//!
//! This is the boundary the rendering layer drives. Every method is total:
//! unknown ids and out-of-phase requests are answered with a refusal value and a
//! warning log, never a panic or error.
//!
//! Attempt policy: the board locks after the first scored check (`Solved` when
//! everything was right, `Failed` otherwise). `reset` is the only way back to
//! `Active`. Revealing the solution locks it as `Revealed`.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::ActivityDef;
use crate::drag::{ActiveDrag, DragSession, DropOutcome, Placements};
use crate::geometry::{Offset, Point, Rect};
use crate::grading::{check_all, solution, CheckOutcome, ScoreState};
use crate::registry::DropRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Active,
  Solved,
  Failed,
  Revealed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragRefusal {
  UnknownItem,
  AlreadyPlaced,
  AlreadyDragging,
  Locked,
}

/// Sound cue the client should play after a check. Playback is the client's business.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCue {
  Success,
  Failure,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
  pub outcome: CheckOutcome,
  /// False when the board was locked or incomplete and the score was left alone.
  pub scored: bool,
  pub cue: Option<FeedbackCue>,
  pub score: ScoreState,
  pub phase: Phase,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionView {
  pub id: String,
  pub label: String,
  pub rect: Option<Rect>,
  pub items: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
  pub activity_id: String,
  pub title: String,
  pub instructions: String,
  /// Unplaced items in display order.
  pub tray: Vec<String>,
  pub regions: Vec<RegionView>,
  pub placements: Placements,
  pub drag: Option<ActiveDrag>,
  pub score: ScoreState,
  pub phase: Phase,
}

pub struct ActivityBoard {
  activity: Arc<ActivityDef>,
  registry: DropRegistry,
  session: DragSession,
  placements: Placements,
  score: ScoreState,
  phase: Phase,
  tray_order: Vec<String>,
}

impl ActivityBoard {
  /// Mount `activity`. Regions are declared in content order, which fixes the
  /// overlap tie-break before any layout arrives.
  pub fn new(activity: Arc<ActivityDef>, shuffle_items: bool) -> Self {
    let mut registry = DropRegistry::new();
    for r in &activity.regions {
      registry.declare(&r.id);
    }
    let mut tray_order: Vec<String> = activity.items.iter().map(|i| i.id.clone()).collect();
    if shuffle_items {
      tray_order.shuffle(&mut rand::thread_rng());
    }
    debug!(target: "activity", id = %activity.id, items = tray_order.len(), "Board mounted");
    Self {
      activity,
      registry,
      session: DragSession::new(),
      placements: Placements::new(),
      score: ScoreState::default(),
      phase: Phase::Active,
      tray_order,
    }
  }

  pub fn activity(&self) -> &ActivityDef { &self.activity }

  pub fn phase(&self) -> Phase { self.phase }

  pub fn score(&self) -> &ScoreState { &self.score }

  pub fn placements(&self) -> &Placements { &self.placements }

  /// Layout report from a drop zone. Unknown region ids are ignored.
  pub fn register_layout(&mut self, region_id: &str, rect: Rect) -> bool {
    if self.activity.region(region_id).is_none() {
      warn!(target: "activity", id = %self.activity.id, %region_id, "Layout for unknown region ignored");
      return false;
    }
    if rect.is_empty() {
      debug!(target: "activity", id = %self.activity.id, %region_id, "Region reported an empty rectangle");
    }
    self.registry.register_or_update(region_id, rect);
    debug!(target: "activity", id = %self.activity.id, %region_id, measured = self.registry.measured_count(), "Region layout updated");
    true
  }

  /// Forget every measured rectangle (full relayout, e.g. rotation). Drops
  /// spring back until regions report again.
  pub fn clear_layout(&mut self) {
    self.registry.clear_measurements();
  }

  pub fn start_drag(&mut self, item_id: &str, origin: Point) -> Result<(), DragRefusal> {
    if self.phase != Phase::Active {
      return Err(DragRefusal::Locked);
    }
    if self.activity.item(item_id).is_none() {
      warn!(target: "activity", id = %self.activity.id, %item_id, "Drag on unknown item ignored");
      return Err(DragRefusal::UnknownItem);
    }
    if self.session.is_dragging() {
      return Err(DragRefusal::AlreadyDragging);
    }
    if self.session.start(item_id, origin, &self.placements) {
      Ok(())
    } else {
      Err(DragRefusal::AlreadyPlaced)
    }
  }

  pub fn move_drag(&mut self, point: Point) -> Option<Offset> {
    self.session.move_to(point)
  }

  pub fn release_drag(&mut self, point: Point) -> DropOutcome {
    let outcome = self.session.release(point, &self.registry, &mut self.placements);
    debug!(target: "activity", id = %self.activity.id, ?outcome, "Drag released");
    outcome
  }

  pub fn cancel_drag(&mut self) -> DropOutcome {
    self.session.cancel()
  }

  /// Grade the board. Only a complete board in `Active` phase is scored.
  #[instrument(level = "info", skip(self), fields(id = %self.activity.id))]
  pub fn check(&mut self) -> CheckResponse {
    let outcome = check_all(&self.activity, &self.placements);
    let mut scored = false;
    let cue = match &outcome {
      CheckOutcome::Incomplete { missing } => {
        info!(target: "activity", missing = missing.len(), "Check blocked: incomplete board");
        None
      }
      CheckOutcome::Scored(report) => {
        if self.phase == Phase::Active {
          self.score.record(report);
          self.phase = if report.all_correct { Phase::Solved } else { Phase::Failed };
          scored = true;
          info!(target: "activity", correct = report.correct_count, total = report.total_count, phase = ?self.phase, "Board scored");
        }
        match self.phase {
          Phase::Revealed => None,
          _ if report.all_correct => Some(FeedbackCue::Success),
          _ => Some(FeedbackCue::Failure),
        }
      }
    };
    CheckResponse { outcome, scored, cue, score: self.score.clone(), phase: self.phase }
  }

  /// Put every item on its correct region. Idempotent.
  pub fn reveal_solution(&mut self) {
    self.session.cancel();
    self.placements = solution(&self.activity);
    if self.phase != Phase::Solved {
      self.phase = Phase::Revealed;
    }
  }

  /// Clear placements, score and any active drag. Idempotent.
  pub fn reset(&mut self) {
    if !self.placements.is_empty() {
      debug!(target: "activity", id = %self.activity.id, placed = self.placements.len(), "Clearing board");
    }
    self.session.cancel();
    self.placements.clear();
    self.score = ScoreState::default();
    self.phase = Phase::Active;
  }

  pub fn snapshot(&self) -> BoardSnapshot {
    let regions = self
      .activity
      .regions
      .iter()
      .map(|r| RegionView {
        id: r.id.clone(),
        label: r.label.clone(),
        rect: self.registry.rect_of(&r.id),
        items: self.placements.items_in(&r.id).map(str::to_string).collect(),
      })
      .collect();
    BoardSnapshot {
      activity_id: self.activity.id.clone(),
      title: self.activity.title.clone(),
      instructions: self.activity.instructions.clone(),
      tray: self.tray_order.iter().filter(|i| !self.placements.is_placed(i)).cloned().collect(),
      regions,
      placements: self.placements.clone(),
      drag: self.session.active().cloned(),
      score: self.score.clone(),
      phase: self.phase,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::respiration_activity;

  // gills-aquatic, lungs-aerial, lungs-both laid out side by side, 100px wide
  fn mounted() -> ActivityBoard {
    let mut b = ActivityBoard::new(Arc::new(respiration_activity()), false);
    for (i, r) in ["gills-aquatic", "lungs-aerial", "lungs-both"].iter().enumerate() {
      assert!(b.register_layout(r, Rect::new(i as f64 * 100.0, 0.0, 100.0, 100.0)));
    }
    b
  }

  fn center(region_index: usize) -> Point {
    Point::new(region_index as f64 * 100.0 + 50.0, 50.0)
  }

  fn drop_on(b: &mut ActivityBoard, item: &str, region_index: usize) -> DropOutcome {
    b.start_drag(item, Point::new(500.0, 500.0)).unwrap();
    b.move_drag(center(region_index));
    b.release_drag(center(region_index))
  }

  fn assert_at_most_one_region(b: &ActivityBoard) {
    for item in &b.activity().items {
      let hits = b.snapshot().regions.iter().filter(|r| r.items.contains(&item.id)).count();
      assert!(hits <= 1, "item {} in {} regions", item.id, hits);
    }
  }

  #[test]
  fn test_scenario_three_of_four() {
    let mut b = mounted();
    drop_on(&mut b, "trout", 0);
    drop_on(&mut b, "pigeon", 1);
    drop_on(&mut b, "frog", 0);
    drop_on(&mut b, "shark", 0);
    assert_at_most_one_region(&b);

    let resp = b.check();
    let CheckOutcome::Scored(report) = &resp.outcome else {
      panic!("expected scored");
    };
    assert_eq!(report.correct_count, 3);
    assert_eq!(report.total_count, 4);
    assert!(!report.all_correct);
    assert!(!report.per_item[2].is_correct);
    assert!(resp.scored);
    assert_eq!(resp.cue, Some(FeedbackCue::Failure));
    assert_eq!(resp.phase, Phase::Failed);
    assert_eq!(resp.score, ScoreState { correct_count: 3, total_attempts: 1 });
  }

  #[test]
  fn test_incomplete_check_leaves_score_alone() {
    let mut b = mounted();
    drop_on(&mut b, "trout", 0);
    let resp = b.check();
    assert!(matches!(resp.outcome, CheckOutcome::Incomplete { ref missing } if missing.len() == 3));
    assert!(!resp.scored);
    assert_eq!(resp.cue, None);
    assert_eq!(b.score(), &ScoreState::default());
    assert_eq!(b.phase(), Phase::Active);
  }

  #[test]
  fn test_locked_after_check() {
    let mut b = mounted();
    for (item, idx) in [("trout", 0), ("pigeon", 1), ("frog", 2), ("shark", 0)] {
      drop_on(&mut b, item, idx);
    }
    let first = b.check();
    assert_eq!(first.phase, Phase::Solved);
    assert_eq!(first.cue, Some(FeedbackCue::Success));
    let again = b.check();
    assert!(!again.scored);
    assert_eq!(again.score, first.score);
    assert_eq!(b.start_drag("trout", Point::default()), Err(DragRefusal::Locked));
  }

  #[test]
  fn test_miss_is_noop() {
    let mut b = mounted();
    drop_on(&mut b, "trout", 0);
    let before = b.placements().clone();
    b.start_drag("frog", Point::new(500.0, 500.0)).unwrap();
    let out = b.release_drag(Point::new(1000.0, 1000.0));
    assert!(matches!(out, DropOutcome::SprungBack { .. }));
    assert_eq!(b.placements(), &before);
    assert!(b.snapshot().tray.contains(&"frog".to_string()));
  }

  #[test]
  fn test_drop_before_layout_springs_back() {
    let mut b = ActivityBoard::new(Arc::new(respiration_activity()), false);
    b.start_drag("trout", Point::default()).unwrap();
    assert!(matches!(b.release_drag(Point::new(10.0, 10.0)), DropOutcome::SprungBack { .. }));
  }

  #[test]
  fn test_reset_idempotent() {
    let mut b = mounted();
    drop_on(&mut b, "trout", 0);
    b.start_drag("frog", Point::default()).unwrap();
    b.reset();
    let once = b.snapshot();
    b.reset();
    let twice = b.snapshot();
    assert!(once.placements.is_empty());
    assert_eq!(once.placements, twice.placements);
    assert_eq!(once.score, twice.score);
    assert!(twice.drag.is_none());
    assert_eq!(twice.phase, Phase::Active);
    assert_eq!(twice.tray.len(), 4);
  }

  #[test]
  fn test_reveal_is_fixpoint() {
    let mut b = mounted();
    drop_on(&mut b, "trout", 1);
    b.reveal_solution();
    let once = b.snapshot();
    b.reveal_solution();
    let twice = b.snapshot();
    assert_eq!(once.placements, twice.placements);
    assert_eq!(once.phase, Phase::Revealed);
    assert_eq!(twice.phase, Phase::Revealed);
    assert!(twice.tray.is_empty());
    let resp = b.check();
    assert!(!resp.scored);
    assert!(matches!(resp.outcome, CheckOutcome::Scored(ref r) if r.all_correct));
    assert_eq!(resp.cue, None);
  }

  #[test]
  fn test_unknown_ids_are_ignored() {
    let mut b = mounted();
    assert!(!b.register_layout("nowhere", Rect::new(0.0, 0.0, 10.0, 10.0)));
    assert_eq!(b.start_drag("dragon", Point::default()), Err(DragRefusal::UnknownItem));
    assert!(!b.snapshot().regions.iter().any(|r| r.id == "nowhere"));
  }

  #[test]
  fn test_second_drag_refused() {
    let mut b = mounted();
    b.start_drag("trout", Point::default()).unwrap();
    assert_eq!(b.start_drag("frog", Point::default()), Err(DragRefusal::AlreadyDragging));
    b.release_drag(center(0));
    assert_eq!(b.start_drag("trout", Point::default()), Err(DragRefusal::AlreadyPlaced));
  }

  #[test]
  fn test_cleared_layout_springs_back_until_remeasured() {
    let mut b = mounted();
    b.clear_layout();
    b.start_drag("trout", Point::default()).unwrap();
    assert!(matches!(b.release_drag(center(0)), DropOutcome::SprungBack { .. }));
    b.register_layout("gills-aquatic", Rect::new(0.0, 0.0, 100.0, 100.0));
    assert!(matches!(drop_on(&mut b, "trout", 0), DropOutcome::Placed { .. }));
  }

  #[test]
  fn test_shuffled_tray_is_permutation() {
    let b = ActivityBoard::new(Arc::new(respiration_activity()), true);
    let mut tray = b.snapshot().tray;
    tray.sort();
    let mut expected: Vec<String> = b.activity().items.iter().map(|i| i.id.clone()).collect();
    expected.sort();
    assert_eq!(tray, expected);
  }
}
