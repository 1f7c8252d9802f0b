//! Decision keys: a branching question tree with an explicit expansion set.
//!
//! The tree itself is immutable content (`DecisionNode`); what the learner has
//! opened is a separate set of node ids. Rendering walks `visible_nodes()`.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::domain::{DecisionKeyDef, DecisionNode};
use crate::error::ContentError;

/// Flattened row of what is currently visible.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleNode {
  pub id: String,
  pub label: String,
  pub depth: usize,
  pub is_leaf: bool,
  pub expanded: bool,
  pub result: Option<String>,
}

/// Check ids are unique and branches are not empty.
pub fn validate(def: &DecisionKeyDef) -> Result<(), ContentError> {
  fn walk<'a>(node: &'a DecisionNode, seen: &mut HashSet<&'a str>) -> Result<(), ContentError> {
    if !seen.insert(node.id()) {
      return Err(ContentError::DuplicateNode(node.id().to_string()));
    }
    if let DecisionNode::Branch { id, children, .. } = node {
      if children.is_empty() {
        return Err(ContentError::EmptyBranch(id.clone()));
      }
      for c in children {
        walk(c, seen)?;
      }
    }
    Ok(())
  }
  walk(&def.root, &mut HashSet::new())
}

pub struct DecisionKey {
  def: Arc<DecisionKeyDef>,
  expanded: BTreeSet<String>,
}

impl DecisionKey {
  pub fn new(def: Arc<DecisionKeyDef>) -> Self {
    Self { def, expanded: BTreeSet::new() }
  }

  pub fn id(&self) -> &str { &self.def.id }

  pub fn title(&self) -> &str { &self.def.title }

  fn find(&self, id: &str) -> Option<&DecisionNode> {
    fn go<'a>(node: &'a DecisionNode, id: &str) -> Option<&'a DecisionNode> {
      if node.id() == id {
        return Some(node);
      }
      node.children().iter().find_map(|c| go(c, id))
    }
    go(&self.def.root, id)
  }

  /// Open a branch. Leaves and unknown ids are ignored.
  pub fn expand(&mut self, id: &str) -> bool {
    if !matches!(self.find(id), Some(DecisionNode::Branch { .. })) {
      return false;
    }
    self.expanded.insert(id.to_string())
  }

  /// Close a branch and everything below it.
  pub fn collapse(&mut self, id: &str) -> bool {
    let mut below = Vec::new();
    match self.find(id) {
      Some(node @ DecisionNode::Branch { .. }) => collect_ids(node, &mut below),
      _ => return false,
    }
    let was_open = self.expanded.contains(id);
    for b in below {
      self.expanded.remove(&b);
    }
    was_open
  }

  pub fn toggle(&mut self, id: &str) {
    if self.is_expanded(id) {
      self.collapse(id);
    } else {
      self.expand(id);
    }
  }

  pub fn collapse_all(&mut self) {
    self.expanded.clear();
  }

  pub fn is_expanded(&self, id: &str) -> bool {
    self.expanded.contains(id)
  }

  /// Depth-first rows: the root, then children of every expanded branch.
  pub fn visible_nodes(&self) -> Vec<VisibleNode> {
    let mut out = Vec::new();
    self.push_visible(&self.def.root, 0, &mut out);
    out
  }

  fn push_visible(&self, node: &DecisionNode, depth: usize, out: &mut Vec<VisibleNode>) {
    let expanded = self.is_expanded(node.id());
    out.push(VisibleNode {
      id: node.id().to_string(),
      label: node.label().to_string(),
      depth,
      is_leaf: matches!(node, DecisionNode::Leaf { .. }),
      expanded,
      result: match node {
        DecisionNode::Leaf { result, .. } => Some(result.clone()),
        DecisionNode::Branch { .. } => None,
      },
    });
    if expanded {
      for c in node.children() {
        self.push_visible(c, depth + 1, out);
      }
    }
  }

  /// Labels from the root down to `id` (breadcrumb).
  pub fn path_to(&self, id: &str) -> Option<Vec<String>> {
    fn go(node: &DecisionNode, id: &str, path: &mut Vec<String>) -> bool {
      path.push(node.label().to_string());
      if node.id() == id {
        return true;
      }
      for c in node.children() {
        if go(c, id, path) {
          return true;
        }
      }
      path.pop();
      false
    }
    let mut path = Vec::new();
    go(&self.def.root, id, &mut path).then_some(path)
  }
}

fn collect_ids(node: &DecisionNode, out: &mut Vec<String>) {
  out.push(node.id().to_string());
  for c in node.children() {
    collect_ids(c, out);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::tree_key;

  fn key() -> DecisionKey {
    DecisionKey::new(Arc::new(tree_key()))
  }

  #[test]
  fn test_seed_key_is_valid() {
    assert!(validate(&tree_key()).is_ok());
  }

  #[test]
  fn test_only_root_visible_initially() {
    let k = key();
    let rows = k.visible_nodes();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].depth, 0);
    assert!(!rows[0].expanded);
  }

  #[test]
  fn test_expand_shows_children() {
    let mut k = key();
    assert!(k.expand("leaves"));
    let rows = k.visible_nodes();
    assert_eq!(rows.len(), 3);
    assert!(rows[1..].iter().all(|r| r.depth == 1));
  }

  #[test]
  fn test_collapse_closes_descendants() {
    let mut k = key();
    k.expand("leaves");
    k.expand("broad");
    assert!(k.is_expanded("broad"));
    k.toggle("leaves");
    assert!(!k.is_expanded("leaves"));
    assert!(!k.is_expanded("broad"));
    k.expand("leaves");
    // reopening the root does not resurrect the nested branch
    assert_eq!(k.visible_nodes().len(), 3);
  }

  #[test]
  fn test_leaves_and_unknown_ids_are_ignored() {
    let mut k = key();
    k.expand("leaves");
    assert!(!k.expand("pine"));
    assert!(!k.expand("nope"));
    assert!(!k.collapse("nope"));
    let leaf = k.visible_nodes().into_iter().find(|r| r.id == "pine").unwrap();
    assert!(leaf.is_leaf);
    assert_eq!(leaf.result.as_deref(), Some("Pine"));
  }

  #[test]
  fn test_path_to() {
    let k = key();
    let path = k.path_to("oak").unwrap();
    assert_eq!(path.first().map(String::as_str), Some("What do the leaves look like?"));
    assert_eq!(path.len(), 3);
    assert!(k.path_to("nope").is_none());
  }

  #[test]
  fn test_validate_rejects_duplicates_and_empty_branches() {
    let def = DecisionKeyDef {
      id: "k".into(),
      title: "k".into(),
      root: DecisionNode::Branch {
        id: "a".into(),
        label: "a".into(),
        children: vec![DecisionNode::Leaf { id: "a".into(), label: "b".into(), result: "x".into() }],
      },
    };
    assert_eq!(validate(&def), Err(ContentError::DuplicateNode("a".into())));
    let def = DecisionKeyDef {
      id: "k".into(),
      title: "k".into(),
      root: DecisionNode::Branch { id: "a".into(), label: "a".into(), children: vec![] },
    };
    assert_eq!(validate(&def), Err(ContentError::EmptyBranch("a".into())));
  }
}
