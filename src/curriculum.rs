//! Lesson hierarchy (course -> chapter -> sequence -> séance -> activity) and navigation.
//!
//! `Navigator` is the four-level "selected X" state of one client. Selecting a
//! level clears everything below it; a selection that is not a child of the
//! current parent is ignored.

use serde::Serialize;

use crate::domain::{Chapter, Course, Seance, Sequence};

#[derive(Clone, Debug, Default)]
pub struct Curriculum {
  courses: Vec<Course>,
}

impl Curriculum {
  pub fn new(courses: Vec<Course>) -> Self { Self { courses } }

  pub fn courses(&self) -> &[Course] { &self.courses }

  pub fn course(&self, id: &str) -> Option<&Course> {
    self.courses.iter().find(|c| c.id == id)
  }

  /// Course an activity belongs to (first match in lesson order).
  pub fn course_of_activity(&self, activity_id: &str) -> Option<&Course> {
    self.courses.iter().find(|c| c.activity_ids().contains(&activity_id))
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
  pub course_id: Option<String>,
  pub chapter_id: Option<String>,
  pub sequence_id: Option<String>,
  pub seance_id: Option<String>,
  pub breadcrumb: Vec<String>,
  /// Children of the deepest selection (what the screen lists next).
  pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Choice {
  pub id: String,
  pub title: String,
}

#[derive(Clone, Debug, Default)]
pub struct Navigator {
  course: Option<String>,
  chapter: Option<String>,
  sequence: Option<String>,
  seance: Option<String>,
}

impl Navigator {
  pub fn new() -> Self { Self::default() }

  pub fn select_course(&mut self, cur: &Curriculum, id: &str) -> bool {
    if cur.course(id).is_none() {
      return false;
    }
    *self = Self { course: Some(id.to_string()), ..Self::default() };
    true
  }

  pub fn select_chapter(&mut self, cur: &Curriculum, id: &str) -> bool {
    let ok = self.current_course(cur).map_or(false, |c| c.chapters.iter().any(|ch| ch.id == id));
    if ok {
      self.chapter = Some(id.to_string());
      self.sequence = None;
      self.seance = None;
    }
    ok
  }

  pub fn select_sequence(&mut self, cur: &Curriculum, id: &str) -> bool {
    let ok = self.current_chapter(cur).map_or(false, |c| c.sequences.iter().any(|s| s.id == id));
    if ok {
      self.sequence = Some(id.to_string());
      self.seance = None;
    }
    ok
  }

  pub fn select_seance(&mut self, cur: &Curriculum, id: &str) -> bool {
    let ok = self.current_sequence(cur).map_or(false, |s| s.seances.iter().any(|se| se.id == id));
    if ok {
      self.seance = Some(id.to_string());
    }
    ok
  }

  /// Clear the deepest selection. Returns false when nothing was selected.
  pub fn back(&mut self) -> bool {
    if self.seance.take().is_some() {
      return true;
    }
    if self.sequence.take().is_some() {
      return true;
    }
    if self.chapter.take().is_some() {
      return true;
    }
    self.course.take().is_some()
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }

  /// True if `activity_id` is listed in the selected séance.
  pub fn offers_activity(&self, cur: &Curriculum, activity_id: &str) -> bool {
    self.current_seance(cur).map_or(false, |s| s.activities.iter().any(|a| a == activity_id))
  }

  fn current_course<'a>(&self, cur: &'a Curriculum) -> Option<&'a Course> {
    cur.course(self.course.as_deref()?)
  }

  fn current_chapter<'a>(&self, cur: &'a Curriculum) -> Option<&'a Chapter> {
    let id = self.chapter.as_deref()?;
    self.current_course(cur)?.chapters.iter().find(|c| c.id == id)
  }

  fn current_sequence<'a>(&self, cur: &'a Curriculum) -> Option<&'a Sequence> {
    let id = self.sequence.as_deref()?;
    self.current_chapter(cur)?.sequences.iter().find(|s| s.id == id)
  }

  fn current_seance<'a>(&self, cur: &'a Curriculum) -> Option<&'a Seance> {
    let id = self.seance.as_deref()?;
    self.current_sequence(cur)?.seances.iter().find(|s| s.id == id)
  }

  pub fn state(&self, cur: &Curriculum) -> NavigationState {
    let course = self.current_course(cur);
    let chapter = self.current_chapter(cur);
    let sequence = self.current_sequence(cur);
    let seance = self.current_seance(cur);

    let mut breadcrumb = Vec::new();
    for title in [course.map(|c| &c.title), chapter.map(|c| &c.title), sequence.map(|s| &s.title), seance.map(|s| &s.title)]
      .into_iter()
      .flatten()
    {
      breadcrumb.push(title.clone());
    }

    let choices = match (course, chapter, sequence, seance) {
      (_, _, _, Some(se)) => se.activities.iter().map(|a| Choice { id: a.clone(), title: a.clone() }).collect(),
      (_, _, Some(s), None) => s.seances.iter().map(|x| Choice { id: x.id.clone(), title: x.title.clone() }).collect(),
      (_, Some(ch), None, None) => ch.sequences.iter().map(|x| Choice { id: x.id.clone(), title: x.title.clone() }).collect(),
      (Some(c), None, None, None) => c.chapters.iter().map(|x| Choice { id: x.id.clone(), title: x.title.clone() }).collect(),
      _ => cur.courses.iter().map(|x| Choice { id: x.id.clone(), title: x.title.clone() }).collect(),
    };

    NavigationState {
      course_id: self.course.clone(),
      chapter_id: self.chapter.clone(),
      sequence_id: self.sequence.clone(),
      seance_id: self.seance.clone(),
      breadcrumb,
      choices,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_courses;

  fn cur() -> Curriculum {
    Curriculum::new(seed_courses())
  }

  #[test]
  fn test_drill_down_and_back() {
    let cur = cur();
    let mut nav = Navigator::new();
    assert_eq!(nav.state(&cur).choices.len(), cur.courses().len());

    assert!(nav.select_course(&cur, "svt-6"));
    assert!(nav.select_chapter(&cur, "living-world"));
    assert!(nav.select_sequence(&cur, "classify"));
    assert!(nav.select_seance(&cur, "breathing"));
    let st = nav.state(&cur);
    assert_eq!(st.breadcrumb.len(), 4);
    assert!(st.choices.iter().any(|c| c.id == "respiration"));
    assert!(nav.offers_activity(&cur, "respiration"));

    assert!(nav.back());
    assert_eq!(nav.state(&cur).seance_id, None);
    assert_eq!(nav.state(&cur).sequence_id.as_deref(), Some("classify"));
    nav.back();
    nav.back();
    nav.back();
    assert!(!nav.back());
    assert_eq!(nav.state(&cur), Navigator::new().state(&cur));
  }

  #[test]
  fn test_invalid_selection_is_ignored() {
    let cur = cur();
    let mut nav = Navigator::new();
    assert!(!nav.select_chapter(&cur, "living-world"));
    assert!(!nav.select_course(&cur, "nope"));
    nav.select_course(&cur, "svt-6");
    assert!(!nav.select_sequence(&cur, "classify"));
    assert!(!nav.select_chapter(&cur, "nope"));
    assert_eq!(nav.state(&cur).course_id.as_deref(), Some("svt-6"));
  }

  #[test]
  fn test_reselecting_course_clears_deeper_levels() {
    let cur = cur();
    let mut nav = Navigator::new();
    nav.select_course(&cur, "svt-6");
    nav.select_chapter(&cur, "living-world");
    nav.select_course(&cur, "svt-6");
    assert_eq!(nav.state(&cur).chapter_id, None);
    nav.select_chapter(&cur, "living-world");
    nav.reset();
    assert_eq!(nav.state(&cur).course_id, None);
  }

  #[test]
  fn test_course_of_activity() {
    let cur = cur();
    assert_eq!(cur.course_of_activity("cells").map(|c| c.id.as_str()), Some("svt-6"));
    assert!(cur.course_of_activity("nope").is_none());
  }
}
