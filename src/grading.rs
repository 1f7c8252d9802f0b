//! Classification engine: grade a full set of placements against an activity's answer key.
//!
//! Scoring rule: every item earns one point per criterion it gets right. An item
//! placed in region R is right for criterion C when R answers C the same way
//! the item's correct region does. Single-criterion activities therefore score
//! one point per item, dual-classification activities two.

use serde::Serialize;

use crate::domain::ActivityDef;
use crate::drag::Placements;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreState {
  pub correct_count: u32,
  pub total_attempts: u32,
}

impl ScoreState {
  pub fn record(&mut self, report: &CheckReport) {
    self.correct_count += report.correct_count;
    self.total_attempts += 1;
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionResult {
  pub criterion: String,
  pub expected: String,
  pub given: Option<String>,
  pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
  pub id: String,
  pub is_correct: bool,
  pub criteria: Vec<CriterionResult>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
  pub all_correct: bool,
  pub correct_count: u32,
  pub total_count: u32,
  pub per_item: Vec<ItemResult>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
  /// Some items are still in the tray; nothing was scored.
  Incomplete { missing: Vec<String> },
  Scored(CheckReport),
}

/// Items of `activity` not placed on one of its regions, in content order.
pub fn missing_items(activity: &ActivityDef, placements: &Placements) -> Vec<String> {
  activity
    .items
    .iter()
    .filter(|i| placements.region_of(&i.id).and_then(|r| activity.region(r)).is_none())
    .map(|i| i.id.clone())
    .collect()
}

/// Grade every item of `activity`. Refuses to score a partial board.
pub fn check_all(activity: &ActivityDef, placements: &Placements) -> CheckOutcome {
  let missing = missing_items(activity, placements);
  if !missing.is_empty() {
    return CheckOutcome::Incomplete { missing };
  }

  let criteria = activity.criteria();
  let mut per_item = Vec::with_capacity(activity.items.len());
  let mut correct_count = 0u32;
  let mut total_count = 0u32;

  for item in &activity.items {
    let correct_region = activity.region(&item.correct_region);
    let placed_region = placements.region_of(&item.id).and_then(|r| activity.region(r));

    let mut results = Vec::with_capacity(criteria.len());
    for c in &criteria {
      let expected = correct_region.and_then(|r| activity.region_value(r, c)).unwrap_or_default();
      let given = placed_region.and_then(|r| activity.region_value(r, c));
      let is_correct = given == Some(expected);
      total_count += 1;
      if is_correct {
        correct_count += 1;
      }
      results.push(CriterionResult {
        criterion: c.clone(),
        expected: expected.to_string(),
        given: given.map(str::to_string),
        is_correct,
      });
    }
    per_item.push(ItemResult {
      id: item.id.clone(),
      is_correct: results.iter().all(|r| r.is_correct),
      criteria: results,
    });
  }

  CheckOutcome::Scored(CheckReport { all_correct: correct_count == total_count, correct_count, total_count, per_item })
}

/// Placements that put every item on its correct region.
pub fn solution(activity: &ActivityDef) -> Placements {
  activity.items.iter().map(|i| (i.id.clone(), i.correct_region.clone())).collect()
}
