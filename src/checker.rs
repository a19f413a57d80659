//! Matching exercise checking.
//!
//! A `MatchingAttempt` is ephemeral per stage-visit: it holds the learner's
//! current selections and, once submitted, the per-item results. Submission
//! is final for the visit; selectors lock and a fresh attempt requires
//! re-entering the stage.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::MatchingItem;

/// Outcome of evaluating a full attempt against a matching stage.
#[derive(Clone, Debug, Serialize)]
pub struct MatchingOutcome {
  /// Item id -> correctness of the selected description.
  pub per_item: HashMap<String, bool>,
  /// True only when every item was answered and every answer was correct.
  pub passed: bool,
}

/// Evaluate selections against the items' designated correct descriptions.
///
/// The submit control upstream is disabled until every item has a selection,
/// but that is a UI-level guard: a partial mapping is tolerated here and
/// missing entries count as incorrect. The attempt-count guard keeps an empty
/// attempt from trivially passing.
pub fn evaluate(items: &[MatchingItem], selections: &HashMap<String, String>) -> MatchingOutcome {
  let mut per_item = HashMap::with_capacity(items.len());
  let mut all_correct = true;
  for item in items {
    let correct = selections
      .get(&item.id)
      .map(|sel| *sel == item.description)
      .unwrap_or(false);
    all_correct &= correct;
    per_item.insert(item.id.clone(), correct);
  }
  let passed = all_correct && selections.len() == items.len();
  MatchingOutcome { per_item, passed }
}

/// Ephemeral per-stage-visit attempt state. Not persisted past the visit.
#[derive(Clone, Debug, Default)]
pub struct MatchingAttempt {
  selections: HashMap<String, String>,
  outcome: Option<MatchingOutcome>,
}

impl MatchingAttempt {
  pub fn new() -> Self {
    Self::default()
  }

  /// Change the selection for one item. Ignored once the attempt was
  /// submitted (all selectors lock on submission).
  pub fn select(&mut self, item_id: &str, description: &str) -> bool {
    if self.is_locked() {
      return false;
    }
    self.selections.insert(item_id.to_string(), description.to_string());
    true
  }

  #[allow(dead_code)]
  pub fn selection(&self, item_id: &str) -> Option<&str> {
    self.selections.get(item_id).map(String::as_str)
  }

  pub fn selections(&self) -> &HashMap<String, String> {
    &self.selections
  }

  /// Whether every item of the stage has a non-empty selection; the submit
  /// control is enabled only when this holds.
  pub fn is_complete(&self, items: &[MatchingItem]) -> bool {
    items.iter().all(|i| {
      self
        .selections
        .get(&i.id)
        .map(|s| !s.is_empty())
        .unwrap_or(false)
    })
  }

  pub fn is_locked(&self) -> bool {
    self.outcome.is_some()
  }

  #[allow(dead_code)]
  pub fn outcome(&self) -> Option<&MatchingOutcome> {
    self.outcome.as_ref()
  }

  /// Evaluate and lock. A second submission returns the recorded outcome
  /// unchanged; the result is final for this stage visit.
  pub fn submit(&mut self, items: &[MatchingItem]) -> &MatchingOutcome {
    let selections = &self.selections;
    self.outcome.get_or_insert_with(|| evaluate(items, selections))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn items() -> Vec<MatchingItem> {
    vec![
      MatchingItem { id: "i1".into(), image_prompt: "a".into(), description: "alpha".into() },
      MatchingItem { id: "i2".into(), image_prompt: "b".into(), description: "beta".into() },
      MatchingItem { id: "i3".into(), image_prompt: "c".into(), description: "gamma".into() },
    ]
  }

  fn all_correct() -> HashMap<String, String> {
    [("i1", "alpha"), ("i2", "beta"), ("i3", "gamma")]
      .into_iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn exact_mapping_passes_every_item() {
    let out = evaluate(&items(), &all_correct());
    assert!(out.passed);
    assert!(out.per_item.values().all(|&v| v));
  }

  #[test]
  fn missing_item_fails_overall() {
    let mut sel = all_correct();
    sel.remove("i2");
    let out = evaluate(&items(), &sel);
    assert!(!out.passed);
    assert_eq!(out.per_item["i2"], false);
    assert_eq!(out.per_item["i1"], true);
  }

  #[test]
  fn swapped_valid_option_fails_that_item() {
    let mut sel = all_correct();
    // "beta" is a valid option overall, just not for i1.
    sel.insert("i1".into(), "beta".into());
    let out = evaluate(&items(), &sel);
    assert!(!out.passed);
    assert_eq!(out.per_item["i1"], false);
    assert_eq!(out.per_item["i2"], true);
  }

  #[test]
  fn empty_attempt_never_passes() {
    let out = evaluate(&items(), &HashMap::new());
    assert!(!out.passed);
    assert!(out.per_item.values().all(|&v| !v));
  }

  #[test]
  fn empty_stage_with_empty_attempt_passes_vacuously() {
    let out = evaluate(&[], &HashMap::new());
    assert!(out.passed);
  }

  #[test]
  fn extra_selection_for_unknown_item_fails_count_guard() {
    let mut sel = all_correct();
    sel.insert("ghost".into(), "alpha".into());
    let out = evaluate(&items(), &sel);
    assert!(!out.passed);
  }

  #[test]
  fn attempt_locks_after_submit() {
    let items = items();
    let mut attempt = MatchingAttempt::new();
    for (k, v) in all_correct() {
      attempt.select(&k, &v);
    }
    assert!(attempt.is_complete(&items));
    assert!(attempt.submit(&items).passed);
    assert!(attempt.is_locked());

    // Selections are frozen; resubmitting returns the recorded outcome.
    assert!(!attempt.select("i1", "beta"));
    assert_eq!(attempt.selection("i1"), Some("alpha"));
    assert!(attempt.submit(&items).passed);
  }

  #[test]
  fn incomplete_attempt_reports_not_complete() {
    let items = items();
    let mut attempt = MatchingAttempt::new();
    attempt.select("i1", "alpha");
    attempt.select("i2", "");
    assert!(!attempt.is_complete(&items));
  }
}
