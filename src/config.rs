//! Loading HQ configuration (tip prompts + optional mission bank) from TOML.
//!
//! See `HqConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{info, error};

use crate::domain::MissionCategory;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct HqConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Optional mission bank, listed ahead of the built-in seed catalog.
  #[serde(default)]
  pub categories: Vec<MissionCategory>,
}

/// Prompts used for the HQ tip transmission. Defaults match the in-universe
/// framing the frontend was written against; override them in TOML to tune
/// tone or reading level.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub tip_system: String,
  pub tip_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      tip_system: "You are an AI assistant for \"Mission: Possible\", a secret agent-themed \
                   English learning app for junior high students. Your callsign is \"HQ\". \
                   Provide a concise, helpful, and encouraging tip related to the CURRENT \
                   STAGE GOAL. Frame your response as a transmission from HQ to an agent. \
                   Start your response with \"HQ to Agent,\". Keep the language simple and \
                   clear for a 7-9th grade English learner. You can provide a clear example \
                   sentence if it helps."
        .into(),
      tip_user_template: "A student agent has requested a tip for a mission.\nTheir overall \
                          mission objective is: \"{objective}\".\nThey are currently on a \
                          stage with this goal: \"{stage}\"."
        .into(),
    }
  }
}

/// Attempt to load `HqConfig` from HQ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_hq_config_from_env() -> Option<HqConfig> {
  let path = std::env::var("HQ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<HqConfig>(&s) {
      Ok(cfg) => {
        info!(target: "missionhq_backend", %path, "Loaded HQ config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "missionhq_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "missionhq_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bank_toml_parses_into_categories() {
    let toml_src = r#"
      [[categories]]
      id = "cat9"
      name = "Extra Drills"

      [[categories.missions]]
      id = "m901"
      title = "Night Watch"
      objective = "Practice past tense."
      briefing = "Report what you observed."
      points = 80

      [[categories.missions.stages]]
      type = "writing"
      id = "s1"
      title = "Observation Log"
      imagePrompt = "A dark street."
      prompt = "Write five sentences in the past tense."
    "#;
    let cfg: HqConfig = toml::from_str(toml_src).expect("config parses");
    assert_eq!(cfg.categories.len(), 1);
    let m = &cfg.categories[0].missions[0];
    assert_eq!(m.id, "m901");
    assert_eq!(m.stages.len(), 1);
    // status is not part of the bank schema; it defaults to pending.
    assert_eq!(m.status, crate::domain::MissionStatus::Pending);
  }

  #[test]
  fn default_prompts_carry_the_hq_framing() {
    let p = Prompts::default();
    assert!(p.tip_system.contains("HQ to Agent,"));
    assert!(p.tip_user_template.contains("{objective}"));
    assert!(p.tip_user_template.contains("{stage}"));
  }
}
