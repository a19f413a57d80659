//! Mission progression: one learner's run through a mission's stages.
//!
//! A `MissionRun` owns a cloned mission for the duration of the session, the
//! current 0-based stage index, and the per-stage pass results recorded so
//! far. Forward navigation is gated per stage kind; completing the mission is
//! a separate action gated on a non-empty report.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{Mission, Stage};
use crate::util::is_filled;

/// Ephemeral progression state for one mission-in-progress. Dropped when the
/// learner leaves the mission; nothing here is persisted.
#[derive(Clone, Debug)]
pub struct MissionRun {
  mission: Mission,
  stage_index: usize,
  /// Lazily populated as stages are attempted. Matching stages gate on this.
  passed: HashMap<usize, bool>,
  report: String,
}

impl MissionRun {
  pub fn new(mission: Mission) -> Self {
    Self {
      mission,
      stage_index: 0,
      passed: HashMap::new(),
      report: String::new(),
    }
  }

  pub fn mission(&self) -> &Mission {
    &self.mission
  }

  pub fn stage_index(&self) -> usize {
    self.stage_index
  }

  pub fn stage_count(&self) -> usize {
    self.mission.stages.len()
  }

  /// The stage the learner is currently on. `None` only for a mission with no
  /// stages, which the catalog validation rejects.
  pub fn current_stage(&self) -> Option<&Stage> {
    self.mission.stages.get(self.stage_index)
  }

  #[allow(dead_code)]
  pub fn report(&self) -> &str {
    &self.report
  }

  pub fn set_report(&mut self, text: String) {
    self.report = text;
  }

  pub fn stage_result(&self, index: usize) -> Option<bool> {
    self.passed.get(&index).copied()
  }

  /// Record a pass/fail result for a stage, normally the current one after a
  /// matching submission.
  pub fn record_stage_result(&mut self, index: usize, passed: bool) {
    self.passed.insert(index, passed);
  }

  /// Gating predicate for forward navigation from the current stage:
  /// learning and writing stages always allow it; a matching stage requires a
  /// recorded passing result for the current index.
  pub fn can_advance(&self) -> bool {
    match self.current_stage() {
      Some(Stage::Learning { .. }) | Some(Stage::Writing { .. }) => true,
      Some(Stage::Matching { .. }) => self.stage_result(self.stage_index) == Some(true),
      None => false,
    }
  }

  /// Step forward one stage. No-op at the last stage or when the gating
  /// predicate holds the learner back. Returns whether the index moved.
  pub fn advance(&mut self) -> bool {
    if self.stage_index + 1 >= self.stage_count() || !self.can_advance() {
      debug!(target: "mission", index = self.stage_index, "advance blocked");
      return false;
    }
    self.stage_index += 1;
    true
  }

  /// Step back one stage. No-op at index 0. Returns whether the index moved.
  pub fn retreat(&mut self) -> bool {
    if self.stage_index == 0 {
      return false;
    }
    self.stage_index -= 1;
    true
  }

  /// Whether the learner is on the final stage of the mission.
  pub fn on_final_stage(&self) -> bool {
    self.stage_count() > 0 && self.stage_index == self.stage_count() - 1
  }

  /// Completing the mission is distinct from advancing: it only requires a
  /// non-empty report, independent of per-stage gating.
  pub fn can_complete(&self) -> bool {
    is_filled(&self.report)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ContentBlock, MatchingItem, MissionStatus};

  fn staged_mission() -> Mission {
    Mission {
      id: "m1".into(),
      title: "Test".into(),
      objective: "obj".into(),
      briefing: "brief".into(),
      stages: vec![
        Stage::Learning {
          id: "s1".into(),
          title: "Learn".into(),
          content: vec![ContentBlock { title: "A".into(), text: "B".into() }],
        },
        Stage::Matching {
          id: "s2".into(),
          title: "Match".into(),
          items: vec![MatchingItem {
            id: "i1".into(),
            image_prompt: "p".into(),
            description: "d".into(),
          }],
          options: vec!["d".into(), "x".into()],
        },
        Stage::Writing {
          id: "s3".into(),
          title: "Write".into(),
          image_prompt: "p".into(),
          prompt: "q".into(),
        },
      ],
      points: 100,
      status: MissionStatus::Pending,
    }
  }

  #[test]
  fn learning_stage_always_advances() {
    let mut run = MissionRun::new(staged_mission());
    assert!(run.can_advance());
    assert!(run.advance());
    assert_eq!(run.stage_index(), 1);
  }

  #[test]
  fn matching_stage_blocks_until_passed() {
    let mut run = MissionRun::new(staged_mission());
    run.advance();
    assert!(!run.can_advance());
    assert!(!run.advance());
    assert_eq!(run.stage_index(), 1);

    run.record_stage_result(1, false);
    assert!(!run.advance());

    run.record_stage_result(1, true);
    assert!(run.advance());
    assert_eq!(run.stage_index(), 2);
  }

  #[test]
  fn advance_is_noop_past_the_last_stage() {
    let mut run = MissionRun::new(staged_mission());
    run.advance();
    run.record_stage_result(1, true);
    run.advance();
    assert!(run.on_final_stage());
    // Writing stage gate is open, but there is nowhere to go.
    assert!(run.can_advance());
    assert!(!run.advance());
    assert_eq!(run.stage_index(), 2);
  }

  #[test]
  fn retreat_stops_at_zero() {
    let mut run = MissionRun::new(staged_mission());
    assert!(!run.retreat());
    run.advance();
    assert!(run.retreat());
    assert_eq!(run.stage_index(), 0);
  }

  #[test]
  fn completion_requires_nonempty_report() {
    let mut run = MissionRun::new(staged_mission());
    assert!(!run.can_complete());
    run.set_report("   ".into());
    assert!(!run.can_complete());
    run.set_report("Asset identified. Report follows.".into());
    assert!(run.can_complete());
  }
}
