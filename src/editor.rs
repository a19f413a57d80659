//! Edit-mode drafting: copy-on-edit mission mutation.
//!
//! While edit mode is active every editable field writes into a `MissionDraft`
//! (a full copy of the authoritative mission). The shared collection is only
//! touched by an explicit save, which swaps the mission with the matching id.
//! Dropping the draft (toggle-off, navigation, authoritative update) discards
//! all pending edits.

use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{Mission, MissionCategory, MissionStatus, Stage};
use crate::util::is_filled;

/// One in-place edit against a mission draft. Stage and item ids name the
/// target; edits addressing an unknown id are rejected.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldEdit {
  Title { value: String },
  Objective { value: String },
  Briefing { value: String },
  StageTitle { stage_id: String, value: String },
  LearningBlock { stage_id: String, index: usize, title: String, text: String },
  MatchingPrompt { stage_id: String, item_id: String, value: String },
  WritingPrompt { stage_id: String, value: String },
}

/// Draft copy of one mission. Lives only while edit mode is on.
#[derive(Clone, Debug)]
pub struct MissionDraft {
  mission: Mission,
}

impl MissionDraft {
  /// Initialize from the authoritative copy. Re-done whenever the
  /// authoritative mission or the edit-mode flag changes.
  pub fn new(mission: Mission) -> Self {
    Self { mission }
  }

  pub fn mission(&self) -> &Mission {
    &self.mission
  }

  /// Apply a single field edit to the draft. Returns false (and leaves the
  /// draft untouched) when the addressed stage/item/block does not exist.
  pub fn apply(&mut self, edit: FieldEdit) -> bool {
    match edit {
      FieldEdit::Title { value } => {
        self.mission.title = value;
        true
      }
      FieldEdit::Objective { value } => {
        self.mission.objective = value;
        true
      }
      FieldEdit::Briefing { value } => {
        self.mission.briefing = value;
        true
      }
      FieldEdit::StageTitle { stage_id, value } => {
        match self.stage_mut(&stage_id) {
          Some(Stage::Learning { title, .. })
          | Some(Stage::Matching { title, .. })
          | Some(Stage::Writing { title, .. }) => {
            *title = value;
            true
          }
          None => false,
        }
      }
      FieldEdit::LearningBlock { stage_id, index, title, text } => {
        if let Some(Stage::Learning { content, .. }) = self.stage_mut(&stage_id) {
          if let Some(block) = content.get_mut(index) {
            block.title = title;
            block.text = text;
            return true;
          }
        }
        false
      }
      FieldEdit::MatchingPrompt { stage_id, item_id, value } => {
        if let Some(Stage::Matching { items, .. }) = self.stage_mut(&stage_id) {
          if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
            item.image_prompt = value;
            return true;
          }
        }
        false
      }
      FieldEdit::WritingPrompt { stage_id, value } => {
        if let Some(Stage::Writing { prompt, .. }) = self.stage_mut(&stage_id) {
          *prompt = value;
          return true;
        }
        false
      }
    }
  }

  fn stage_mut(&mut self, stage_id: &str) -> Option<&mut Stage> {
    self.mission.stages.iter_mut().find(|s| s.id() == stage_id)
  }
}

/// Commit a draft: replace the mission with the same id in the shared
/// collection. Returns false when no mission carries that id (the collection
/// is left unchanged).
pub fn save_mission(categories: &mut [MissionCategory], draft: &MissionDraft) -> bool {
  for cat in categories.iter_mut() {
    if let Some(slot) = cat.missions.iter_mut().find(|m| m.id == draft.mission.id) {
      *slot = draft.mission.clone();
      debug!(target: "mission", id = %draft.mission.id, "draft committed");
      return true;
    }
  }
  warn!(target: "mission", id = %draft.mission.id, "draft save target not found");
  false
}

/// Add a new empty category. A missing or blank name aborts the addition with
/// no state change (treated as user cancellation, not a failure).
pub fn add_category(categories: &mut Vec<MissionCategory>, name: &str) -> Option<String> {
  if !is_filled(name) {
    return None;
  }
  let id = format!("cat-{}", Uuid::new_v4());
  categories.push(MissionCategory {
    id: id.clone(),
    name: name.trim().to_string(),
    missions: Vec::new(),
  });
  Some(id)
}

/// Add a skeleton mission to one category. Blank titles abort; an unknown
/// category id leaves the collection unchanged.
pub fn add_mission(
  categories: &mut [MissionCategory],
  category_id: &str,
  title: &str,
) -> Option<String> {
  if !is_filled(title) {
    return None;
  }
  let cat = categories.iter_mut().find(|c| c.id == category_id)?;
  let id = format!("m-{}", Uuid::new_v4());
  cat.missions.push(Mission {
    id: id.clone(),
    title: title.trim().to_string(),
    objective: "New mission objective.".into(),
    briefing: "New mission briefing.".into(),
    stages: vec![Stage::Writing {
      id: format!("s-{}", Uuid::new_v4()),
      title: "First stage.".into(),
      image_prompt: String::new(),
      prompt: "Describe your findings.".into(),
    }],
    points: 100,
    status: MissionStatus::Pending,
  });
  Some(id)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::seed_categories;

  fn first_mission(categories: &[MissionCategory]) -> &Mission {
    &categories[0].missions[0]
  }

  #[test]
  fn draft_edits_do_not_touch_the_source() {
    let categories = seed_categories();
    let original = first_mission(&categories).clone();
    let mut draft = MissionDraft::new(original.clone());
    assert!(draft.apply(FieldEdit::Title { value: "Renamed".into() }));
    assert!(draft.apply(FieldEdit::Briefing { value: "New briefing.".into() }));
    assert_eq!(draft.mission().title, "Renamed");
    // The authoritative copy is untouched until save.
    assert_eq!(first_mission(&categories), &original);
  }

  #[test]
  fn save_replaces_only_the_matching_mission() {
    let mut categories = seed_categories();
    let untouched = categories[1].clone();
    let mut draft = MissionDraft::new(first_mission(&categories).clone());
    draft.apply(FieldEdit::Objective { value: "Updated objective.".into() });
    assert!(save_mission(&mut categories, &draft));
    assert_eq!(first_mission(&categories).objective, "Updated objective.");
    assert_eq!(categories[1], untouched);
  }

  #[test]
  fn save_of_unknown_mission_changes_nothing() {
    let mut categories = seed_categories();
    let before = categories.clone();
    let mut ghost = first_mission(&categories).clone();
    ghost.id = "no-such-mission".into();
    let draft = MissionDraft::new(ghost);
    assert!(!save_mission(&mut categories, &draft));
    assert_eq!(categories, before);
  }

  #[test]
  fn stage_edits_address_by_id() {
    let mut draft = MissionDraft::new(first_mission(&seed_categories()).clone());
    assert!(draft.apply(FieldEdit::StageTitle {
      stage_id: "s2".into(),
      value: "Stage 2: Recognition Drill".into(),
    }));
    assert!(draft.apply(FieldEdit::LearningBlock {
      stage_id: "s1".into(),
      index: 0,
      title: "Looks".into(),
      text: "Appearance words.".into(),
    }));
    assert!(draft.apply(FieldEdit::MatchingPrompt {
      stage_id: "s2".into(),
      item_id: "m-i1".into(),
      value: "A tall man.".into(),
    }));
    assert!(draft.apply(FieldEdit::WritingPrompt {
      stage_id: "s3".into(),
      value: "Write two paragraphs.".into(),
    }));

    assert!(!draft.apply(FieldEdit::StageTitle { stage_id: "nope".into(), value: "x".into() }));
    assert!(!draft.apply(FieldEdit::LearningBlock {
      stage_id: "s1".into(),
      index: 99,
      title: "x".into(),
      text: "y".into(),
    }));
    // Wrong variant for the addressed stage.
    assert!(!draft.apply(FieldEdit::WritingPrompt { stage_id: "s1".into(), value: "x".into() }));
  }

  #[test]
  fn blank_names_abort_structure_edits() {
    let mut categories = seed_categories();
    let before = categories.clone();
    assert!(add_category(&mut categories, "   ").is_none());
    assert!(add_mission(&mut categories, "cat1", "").is_none());
    assert_eq!(categories, before);
  }

  #[test]
  fn added_ids_are_distinct() {
    let mut categories = seed_categories();
    let a = add_category(&mut categories, "Drills").expect("added");
    let b = add_category(&mut categories, "Drills").expect("added");
    assert_ne!(a, b);

    let m1 = add_mission(&mut categories, "cat1", "Op One").expect("added");
    let m2 = add_mission(&mut categories, "cat1", "Op Two").expect("added");
    assert_ne!(m1, m2);
    assert!(add_mission(&mut categories, "no-such-cat", "Op Three").is_none());

    let new_mission = categories[0].missions.iter().find(|m| m.id == m1).expect("present");
    assert_eq!(new_mission.status, MissionStatus::Pending);
    assert_eq!(new_mission.stages.len(), 1);
  }
}
