//! Static content models: activities (regions + items), the lesson hierarchy and decision keys.
//!
//! Everything here is authored content and never mutated after load. Grading and
//! drag state live in side tables (`board`, `drag`) keyed by these ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Criterion name used when an activity does not list its own criteria.
pub const DEFAULT_CRITERION: &str = "region";

/// Where did we get this content from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
  LocalBank, // from the TOML content file
  Seed,      // built-in seeds
}

/// A drop zone as authored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RegionDef {
  pub id: String,
  pub label: String,
  /// Answer carried by this region for each classification criterion.
  /// Empty means "the region id is the answer" for the default criterion.
  #[serde(default)]
  pub values: BTreeMap<String, String>,
}

/// A token the learner drags onto a region.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ItemDef {
  pub id: String,
  pub label: String,
  #[serde(default)]
  pub image: Option<String>,
  pub correct_region: String,
}

/// One drag-and-drop classification activity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityDef {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub instructions: String,
  /// Independent sub-questions asked of every item (e.g. cellularity and nucleus type).
  #[serde(default)]
  pub criteria: Vec<String>,
  pub regions: Vec<RegionDef>,
  pub items: Vec<ItemDef>,
  #[serde(default = "default_source")]
  pub source: ContentSource,
}

fn default_source() -> ContentSource { ContentSource::LocalBank }

impl ActivityDef {
  /// Criteria this activity scores; never empty.
  pub fn criteria(&self) -> Vec<String> {
    if self.criteria.is_empty() { vec![DEFAULT_CRITERION.to_string()] } else { self.criteria.clone() }
  }

  pub fn region(&self, id: &str) -> Option<&RegionDef> {
    self.regions.iter().find(|r| r.id == id)
  }

  pub fn item(&self, id: &str) -> Option<&ItemDef> {
    self.items.iter().find(|i| i.id == id)
  }

  /// Answer of `region` for `criterion`. Regions without explicit values answer
  /// the default criterion with their own id.
  pub fn region_value<'a>(&self, region: &'a RegionDef, criterion: &str) -> Option<&'a str> {
    match region.values.get(criterion) {
      Some(v) => Some(v.as_str()),
      None if region.values.is_empty() && criterion == DEFAULT_CRITERION => Some(region.id.as_str()),
      None => None,
    }
  }

  /// Structural checks run at load; returns a reason on the first problem.
  pub fn validate(&self) -> Result<(), ContentError> {
    if self.regions.is_empty() {
      return Err(ContentError::NoRegions);
    }
    if self.items.is_empty() {
      return Err(ContentError::NoItems);
    }
    let mut seen = std::collections::HashSet::new();
    for r in &self.regions {
      if !seen.insert(r.id.as_str()) {
        return Err(ContentError::DuplicateRegion(r.id.clone()));
      }
    }
    let mut seen = std::collections::HashSet::new();
    for i in &self.items {
      if !seen.insert(i.id.as_str()) {
        return Err(ContentError::DuplicateItem(i.id.clone()));
      }
      if self.region(&i.correct_region).is_none() {
        return Err(ContentError::UnknownCorrectRegion { item: i.id.clone(), region: i.correct_region.clone() });
      }
    }
    for c in self.criteria() {
      for r in &self.regions {
        if self.region_value(r, &c).is_none() {
          return Err(ContentError::MissingCriterionValue { region: r.id.clone(), criterion: c });
        }
      }
    }
    Ok(())
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Seance {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub activities: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sequence {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub seances: Vec<Seance>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chapter {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub sequences: Vec<Sequence>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
  pub id: String,
  pub title: String,
  #[serde(default)]
  pub chapters: Vec<Chapter>,
}

impl Course {
  /// Every activity id reachable from this course, in lesson order.
  pub fn activity_ids(&self) -> Vec<&str> {
    self
      .chapters
      .iter()
      .flat_map(|c| &c.sequences)
      .flat_map(|s| &s.seances)
      .flat_map(|s| &s.activities)
      .map(String::as_str)
      .collect()
  }
}

/// Node of a branching decision key (e.g. "leaves needle-shaped?" -> ...).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionNode {
  Branch { id: String, label: String, children: Vec<DecisionNode> },
  Leaf { id: String, label: String, result: String },
}

impl DecisionNode {
  pub fn id(&self) -> &str {
    match self {
      DecisionNode::Branch { id, .. } | DecisionNode::Leaf { id, .. } => id,
    }
  }

  pub fn label(&self) -> &str {
    match self {
      DecisionNode::Branch { label, .. } | DecisionNode::Leaf { label, .. } => label,
    }
  }

  pub fn children(&self) -> &[DecisionNode] {
    match self {
      DecisionNode::Branch { children, .. } => children,
      DecisionNode::Leaf { .. } => &[],
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionKeyDef {
  pub id: String,
  pub title: String,
  pub root: DecisionNode,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn region(id: &str, values: &[(&str, &str)]) -> RegionDef {
    RegionDef {
      id: id.into(),
      label: id.into(),
      values: values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    }
  }

  fn item(id: &str, correct: &str) -> ItemDef {
    ItemDef { id: id.into(), label: id.into(), image: None, correct_region: correct.into() }
  }

  fn activity(criteria: &[&str], regions: Vec<RegionDef>, items: Vec<ItemDef>) -> ActivityDef {
    ActivityDef {
      id: "a".into(),
      title: "A".into(),
      instructions: String::new(),
      criteria: criteria.iter().map(|c| c.to_string()).collect(),
      regions,
      items,
      source: ContentSource::Seed,
    }
  }

  #[test]
  fn test_default_criterion_uses_region_id() {
    let a = activity(&[], vec![region("aquatic", &[])], vec![item("trout", "aquatic")]);
    assert_eq!(a.criteria(), vec![DEFAULT_CRITERION.to_string()]);
    let r = a.region("aquatic").unwrap();
    assert_eq!(a.region_value(r, DEFAULT_CRITERION), Some("aquatic"));
    assert!(a.validate().is_ok());
  }

  #[test]
  fn test_validate_rejects_dangling_correct_region() {
    let a = activity(&[], vec![region("aquatic", &[])], vec![item("trout", "aerial")]);
    assert_eq!(
      a.validate(),
      Err(ContentError::UnknownCorrectRegion { item: "trout".into(), region: "aerial".into() })
    );
  }

  #[test]
  fn test_validate_rejects_missing_criterion_value() {
    let a = activity(
      &["cells", "nucleus"],
      vec![region("uni-euk", &[("cells", "uni"), ("nucleus", "euk")]), region("uni", &[("cells", "uni")])],
      vec![item("yeast", "uni-euk")],
    );
    assert_eq!(
      a.validate(),
      Err(ContentError::MissingCriterionValue { region: "uni".into(), criterion: "nucleus".into() })
    );
  }

  #[test]
  fn test_validate_rejects_duplicates() {
    let a = activity(&[], vec![region("r", &[]), region("r", &[])], vec![item("i", "r")]);
    assert_eq!(a.validate(), Err(ContentError::DuplicateRegion("r".into())));
    let a = activity(&[], vec![region("r", &[])], vec![item("i", "r"), item("i", "r")]);
    assert_eq!(a.validate(), Err(ContentError::DuplicateItem("i".into())));
  }

  #[test]
  fn test_decision_node_deserializes_tagged() {
    let node: DecisionNode = serde_json::from_str(
      r#"{"kind":"branch","id":"q1","label":"Needles?","children":[{"kind":"leaf","id":"l1","label":"Yes","result":"Pine"}]}"#,
    )
    .unwrap();
    assert_eq!(node.children().len(), 1);
    assert_eq!(node.children()[0].label(), "Yes");
  }
}
