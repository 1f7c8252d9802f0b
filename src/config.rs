//! Loading content configuration (activities, courses, decision keys, policy) from TOML.
//!
//! See `ContentConfig` for the expected schema. Anything missing falls back to
//! built-in seeds; a broken file is logged and ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::domain::{ActivityDef, Course, DecisionKeyDef};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ContentConfig {
  #[serde(default)]
  pub policy: Policy,
  #[serde(default)]
  pub feedback: Feedback,
  #[serde(default)]
  pub courses: Vec<Course>,
  #[serde(default)]
  pub activities: Vec<ActivityDef>,
  #[serde(default)]
  pub decision_keys: Vec<DecisionKeyDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Policy {
  /// Shuffle the item tray each time an activity is opened.
  #[serde(default = "default_true")]
  pub shuffle_items: bool,
}

impl Default for Policy {
  fn default() -> Self { Self { shuffle_items: true } }
}

fn default_true() -> bool { true }

/// Sound assets the client plays after a check, relative to the static root.
#[derive(Clone, Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct Feedback {
  #[serde(default)] pub success_sound: Option<String>,
  #[serde(default)] pub failure_sound: Option<String>,
}

impl Feedback {
  /// Drop any sound that does not exist under `static_root`. Missing audio must
  /// never block grading, so this only warns.
  pub fn existing_under(self, static_root: &Path) -> Feedback {
    let keep = |name: &str, p: Option<String>| {
      p.filter(|rel| {
        let ok = static_root.join(rel).is_file();
        if !ok {
          warn!(target: "content", sound = name, path = %rel, "Feedback sound not found; clients will stay silent");
        }
        ok
      })
    };
    Feedback {
      success_sound: keep("success", self.success_sound),
      failure_sound: keep("failure", self.failure_sound),
    }
  }
}

pub fn parse_content_config(s: &str) -> Result<ContentConfig, toml::de::Error> {
  toml::from_str::<ContentConfig>(s)
}

/// Attempt to load `ContentConfig` from CONTENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_content_config_from_env() -> Option<ContentConfig> {
  let path = std::env::var("CONTENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_content_config(&s) {
      Ok(cfg) => {
        info!(target: "sciquest_backend", %path, activities = cfg.activities.len(), courses = cfg.courses.len(), "Loaded content config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "sciquest_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "sciquest_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = r#"
[policy]
shuffle_items = false

[feedback]
success_sound = "sounds/ok.mp3"

[[courses]]
id = "bio"
title = "Biology"

[[courses.chapters]]
id = "ch1"
title = "Birds"

[[activities]]
id = "beaks"
title = "Beaks and diets"
criteria = ["diet"]

[[activities.regions]]
id = "seeds"
label = "Seed eaters"
values = { diet = "granivore" }

[[activities.regions]]
id = "insects"
label = "Insect eaters"
values = { diet = "insectivore" }

[[activities.items]]
id = "finch"
label = "Finch"
correct_region = "seeds"

[[decision_keys]]
id = "birds"
title = "Bird key"

[decision_keys.root]
kind = "leaf"
id = "only"
label = "Only one"
result = "Robin"
"#;

  #[test]
  fn test_parse_sample() {
    let cfg = parse_content_config(SAMPLE).unwrap();
    assert!(!cfg.policy.shuffle_items);
    assert_eq!(cfg.feedback.success_sound.as_deref(), Some("sounds/ok.mp3"));
    assert_eq!(cfg.courses[0].chapters[0].id, "ch1");
    let a = &cfg.activities[0];
    assert_eq!(a.criteria, vec!["diet".to_string()]);
    assert_eq!(a.regions[1].values.get("diet").map(String::as_str), Some("insectivore"));
    assert!(a.validate().is_ok());
    assert_eq!(cfg.decision_keys[0].root.id(), "only");
  }

  #[test]
  fn test_defaults_when_empty() {
    let cfg = parse_content_config("").unwrap();
    assert!(cfg.policy.shuffle_items);
    assert!(cfg.activities.is_empty());
    assert_eq!(cfg.feedback, Feedback::default());
  }

  #[test]
  fn test_missing_sounds_are_dropped() {
    let fb = Feedback { success_sound: Some("does/not/exist.mp3".into()), failure_sound: None };
    let checked = fb.existing_under(Path::new("/definitely/not/here"));
    assert_eq!(checked, Feedback::default());
  }

  #[test]
  fn test_bad_toml_is_error() {
    assert!(parse_content_config("[[activities]]\nid = 3").is_err());
  }
}
