//! Built-in content so the app is usable without a content file.

use std::collections::BTreeMap;

use crate::domain::{
  ActivityDef, Chapter, ContentSource, Course, DecisionKeyDef, DecisionNode, ItemDef, RegionDef, Seance, Sequence,
};

fn region(id: &str, label: &str) -> RegionDef {
  RegionDef { id: id.into(), label: label.into(), values: BTreeMap::new() }
}

fn region_with(id: &str, label: &str, values: &[(&str, &str)]) -> RegionDef {
  RegionDef {
    id: id.into(),
    label: label.into(),
    values: values.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
  }
}

fn item(id: &str, label: &str, correct: &str) -> ItemDef {
  ItemDef { id: id.into(), label: label.into(), image: Some(format!("images/{}.png", id)), correct_region: correct.into() }
}

/// Match each animal with its breathing organ and environment.
pub fn respiration_activity() -> ActivityDef {
  ActivityDef {
    id: "respiration".into(),
    title: "How do animals breathe?".into(),
    instructions: "Drag each animal onto the way it breathes.".into(),
    criteria: vec![],
    regions: vec![
      region("gills-aquatic", "Gills, in water"),
      region("lungs-aerial", "Lungs, in air"),
      region("lungs-both", "Lungs, in water and air"),
    ],
    items: vec![
      item("trout", "Trout", "gills-aquatic"),
      item("pigeon", "Pigeon", "lungs-aerial"),
      item("frog", "Adult frog", "lungs-both"),
      item("shark", "Shark", "gills-aquatic"),
    ],
    source: ContentSource::Seed,
  }
}

/// Two questions per organism: how many cells, and is there a nucleus.
pub fn cells_activity() -> ActivityDef {
  ActivityDef {
    id: "cells".into(),
    title: "Sort the living things".into(),
    instructions: "Place each organism in the box that describes its cells.".into(),
    criteria: vec!["cells".into(), "nucleus".into()],
    regions: vec![
      region_with("uni-pro", "Unicellular, no nucleus", &[("cells", "unicellular"), ("nucleus", "prokaryote")]),
      region_with("uni-euk", "Unicellular, with nucleus", &[("cells", "unicellular"), ("nucleus", "eukaryote")]),
      region_with("multi-euk", "Multicellular, with nucleus", &[("cells", "multicellular"), ("nucleus", "eukaryote")]),
    ],
    items: vec![
      item("bacterium", "Bacterium", "uni-pro"),
      item("yeast", "Yeast", "uni-euk"),
      item("paramecium", "Paramecium", "uni-euk"),
      item("oak", "Oak", "multi-euk"),
      item("mushroom", "Field mushroom", "multi-euk"),
    ],
    source: ContentSource::Seed,
  }
}

pub fn leaves_activity() -> ActivityDef {
  ActivityDef {
    id: "leaves".into(),
    title: "Evergreen or deciduous?".into(),
    instructions: "Does the tree keep its leaves in winter?".into(),
    criteria: vec![],
    regions: vec![region("evergreen", "Keeps its leaves"), region("deciduous", "Loses its leaves")],
    items: vec![
      item("pine", "Scots pine", "evergreen"),
      item("holly", "Holly", "evergreen"),
      item("pedunculate-oak", "Pedunculate oak", "deciduous"),
      item("beech", "Beech", "deciduous"),
    ],
    source: ContentSource::Seed,
  }
}

pub fn seed_activities() -> Vec<ActivityDef> {
  vec![respiration_activity(), cells_activity(), leaves_activity()]
}

fn leaf(id: &str, label: &str, result: &str) -> DecisionNode {
  DecisionNode::Leaf { id: id.into(), label: label.into(), result: result.into() }
}

/// Identify a tree from its leaves.
pub fn tree_key() -> DecisionKeyDef {
  DecisionKeyDef {
    id: "trees".into(),
    title: "Which tree is it?".into(),
    root: DecisionNode::Branch {
      id: "leaves".into(),
      label: "What do the leaves look like?".into(),
      children: vec![
        leaf("pine", "Needles in pairs", "Pine"),
        DecisionNode::Branch {
          id: "broad".into(),
          label: "Broad, flat leaves".into(),
          children: vec![leaf("oak", "Deeply lobed edges", "Oak"), leaf("beech", "Smooth, wavy edges", "Beech")],
        },
      ],
    },
  }
}

pub fn seed_decision_keys() -> Vec<DecisionKeyDef> {
  vec![tree_key()]
}

pub fn seed_courses() -> Vec<Course> {
  vec![Course {
    id: "svt-6".into(),
    title: "Life and Earth Sciences, year 6".into(),
    chapters: vec![Chapter {
      id: "living-world".into(),
      title: "The living world".into(),
      sequences: vec![Sequence {
        id: "classify".into(),
        title: "Classifying living things".into(),
        seances: vec![
          Seance { id: "breathing".into(), title: "Breathing".into(), activities: vec!["respiration".into()] },
          Seance { id: "cells".into(), title: "Cells".into(), activities: vec!["cells".into()] },
          Seance { id: "trees".into(), title: "Trees through the seasons".into(), activities: vec!["leaves".into()] },
        ],
      }],
    }],
  }]
}
