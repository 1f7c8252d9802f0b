//! Application state: read-only content catalog, content policy and the progress store.
//!
//! This module owns:
//!   - activities and decision keys by id (TOML bank overriding built-in seeds)
//!   - the lesson hierarchy
//!   - the shuffle policy and feedback sounds
//!   - the progress store shared by every connection
//!
//! Content is immutable after startup. Per-activity drag and grading state is
//! owned by each connection, never by `AppState`.

use std::{collections::HashMap, path::Path, sync::Arc};
use tracing::{error, info, instrument, warn};

use crate::config::{load_content_config_from_env, ContentConfig, Feedback, Policy};
use crate::curriculum::Curriculum;
use crate::decision;
use crate::domain::{ActivityDef, ContentSource, DecisionKeyDef};
use crate::progress::{MemoryProgressStore, ProgressStore};
use crate::seeds::{seed_activities, seed_courses, seed_decision_keys};

#[derive(Clone)]
pub struct AppState {
    pub activities: HashMap<String, Arc<ActivityDef>>,
    pub decision_keys: HashMap<String, Arc<DecisionKeyDef>>,
    pub curriculum: Curriculum,
    pub policy: Policy,
    pub feedback: Feedback,
    pub progress: Arc<dyn ProgressStore>,
}

impl AppState {
    /// Build state from env: load config, merge with seeds, validate.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_content_config_from_env();
        Self::from_config(cfg, Path::new("./static"), Arc::new(MemoryProgressStore::new()))
    }

    pub fn from_config(cfg: Option<ContentConfig>, static_root: &Path, progress: Arc<dyn ProgressStore>) -> Self {
        let cfg = cfg.unwrap_or_default();

        let mut activities = HashMap::<String, Arc<ActivityDef>>::new();
        for a in seed_activities() {
            activities.insert(a.id.clone(), Arc::new(a));
        }
        // Bank entries replace seeds with the same id.
        for mut a in cfg.activities {
            if let Err(reason) = a.validate() {
                error!(target: "content", id = %a.id, %reason, "Skipping bank activity");
                continue;
            }
            a.source = ContentSource::LocalBank;
            activities.insert(a.id.clone(), Arc::new(a));
        }

        let mut decision_keys = HashMap::<String, Arc<DecisionKeyDef>>::new();
        for k in seed_decision_keys().into_iter().chain(cfg.decision_keys) {
            if let Err(reason) = decision::validate(&k) {
                error!(target: "content", id = %k.id, %reason, "Skipping decision key");
                continue;
            }
            decision_keys.insert(k.id.clone(), Arc::new(k));
        }

        let mut courses = cfg.courses;
        for seed in seed_courses() {
            if !courses.iter().any(|c| c.id == seed.id) {
                courses.push(seed);
            }
        }
        for c in &courses {
            for a in c.activity_ids() {
                if !activities.contains_key(a) {
                    warn!(target: "content", course = %c.id, activity = %a, "Course lists an unknown activity");
                }
            }
        }

        // Inventory summary by source.
        let bank = activities.values().filter(|a| a.source == ContentSource::LocalBank).count();
        let seed = activities.len() - bank;
        info!(target: "content", local_bank = bank, seed = seed, courses = courses.len(), decision_keys = decision_keys.len(), "Startup content inventory");

        Self {
            activities,
            decision_keys,
            curriculum: Curriculum::new(courses),
            policy: cfg.policy,
            feedback: cfg.feedback.existing_under(static_root),
            progress,
        }
    }

    pub fn activity(&self, id: &str) -> Option<Arc<ActivityDef>> {
        self.activities.get(id).cloned()
    }

    pub fn decision_key(&self, id: &str) -> Option<Arc<DecisionKeyDef>> {
        self.decision_keys.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_content_config;

    fn state(toml: &str) -> AppState {
        let cfg = parse_content_config(toml).unwrap();
        AppState::from_config(Some(cfg), Path::new("/nonexistent"), Arc::new(MemoryProgressStore::new()))
    }

    #[test]
    fn test_seeds_without_config() {
        let s = AppState::from_config(None, Path::new("/nonexistent"), Arc::new(MemoryProgressStore::new()));
        assert!(s.activity("respiration").is_some());
        assert!(s.decision_key("trees").is_some());
        assert!(s.curriculum.course("svt-6").is_some());
        assert!(s.policy.shuffle_items);
    }

    #[test]
    fn test_bank_overrides_seed_and_invalid_is_skipped() {
        let s = state(
            r#"
[[activities]]
id = "respiration"
title = "Custom"
regions = [{ id = "r", label = "R" }]
items = [{ id = "i", label = "I", correct_region = "r" }]

[[activities]]
id = "broken"
title = "Broken"
regions = [{ id = "r", label = "R" }]
items = [{ id = "i", label = "I", correct_region = "missing" }]
"#,
        );
        let a = s.activity("respiration").unwrap();
        assert_eq!(a.title, "Custom");
        assert_eq!(a.source, ContentSource::LocalBank);
        assert!(s.activity("broken").is_none());
        assert!(s.activity("cells").is_some());
    }
}
