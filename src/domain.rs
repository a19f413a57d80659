//! Domain models: agents, mission categories, missions, and stages.
//!
//! These are pure data; behavior lives in `progress`, `checker`, `editor`
//! and `session`. Wire names stay camelCase where the SPA expects them.

use serde::{Deserialize, Serialize};

/// A ranked agent on the leaderboard.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Agent {
  pub id: String,
  pub codename: String,
  pub score: i64,
  /// 1-based position; always recomputed after a score change, never stale.
  pub rank: u32,
}

/// Mission lifecycle. Completion is one-way; there is no reversal path.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
  Pending,
  Completed,
}
impl Default for MissionStatus {
  fn default() -> Self { MissionStatus::Pending }
}

/// A named, ordered group of missions. Insertion order is display order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MissionCategory {
  pub id: String,
  pub name: String,
  pub missions: Vec<Mission>,
}

/// A unit of learning content: objective, narrative briefing, ordered stages,
/// and a point reward. Stages are owned exclusively by their mission.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Mission {
  pub id: String,
  pub title: String,
  pub objective: String,
  pub briefing: String,
  pub stages: Vec<Stage>,
  pub points: i64,
  #[serde(default)]
  pub status: MissionStatus,
}

/// One exposition block inside a learning stage.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContentBlock {
  pub title: String,
  pub text: String,
}

/// One item of a matching exercise. `description` is the designated correct
/// answer and must also appear in the stage's shared options pool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchingItem {
  pub id: String,
  pub image_prompt: String,
  pub description: String,
}

/// One step within a mission. A proper sum type: adding a stage kind forces
/// both the gating predicate and the checker to be revisited.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stage {
  /// Exposition only. Always traversable.
  Learning {
    id: String,
    title: String,
    content: Vec<ContentBlock>,
  },
  /// Structured exercise with automatic checking. Blocks progression until a
  /// passing result is recorded for it.
  Matching {
    id: String,
    title: String,
    items: Vec<MatchingItem>,
    /// Shared selector pool: every item's correct description + distractors.
    options: Vec<String>,
  },
  /// Free-text submission. Never blocks progression; the report itself is
  /// checked only at the whole-mission completion action.
  Writing {
    id: String,
    title: String,
    #[serde(rename = "imagePrompt")]
    image_prompt: String,
    prompt: String,
  },
}

impl Stage {
  pub fn id(&self) -> &str {
    match self {
      Stage::Learning { id, .. } | Stage::Matching { id, .. } | Stage::Writing { id, .. } => id,
    }
  }

  pub fn title(&self) -> &str {
    match self {
      Stage::Learning { title, .. }
      | Stage::Matching { title, .. }
      | Stage::Writing { title, .. } => title,
    }
  }
}
