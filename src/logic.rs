//! Behaviors shared by both HTTP and WebSocket handlers.
//!
//! Mostly the HQ tip provider: a single best-effort request to the model
//! with a fixed in-universe fallback on any failure. Session mutations live
//! on `AppState` itself; handlers call those directly.

use tracing::{error, info, instrument};

use crate::session::AppState;

/// The canned transmission shown whenever a tip cannot be produced, for any
/// reason (disabled client, network, auth, quota, empty reply). Callers never
/// see a hard failure.
pub const FALLBACK_TIP: &str = "HQ to Agent, our comms are scrambled. We couldn't get a tip \
                                through. Rely on your training. Over.";

/// Fetch one tip for a mission, optionally scoped to a stage. Unknown ids get
/// an explicit in-universe notice instead of a model call.
#[instrument(level = "info", skip(state), fields(%mission_id, ?stage_id))]
pub async fn get_tip_text(state: &AppState, mission_id: &str, stage_id: Option<&str>) -> String {
  let Some(mission) = state.find_mission(mission_id).await else {
    return "No tip: unknown mission.".into();
  };

  let stage_title = stage_id
    .and_then(|sid| mission.stages.iter().find(|s| s.id() == sid))
    .map(|s| s.title().to_string());

  if let Some(oa) = &state.openai {
    match oa
      .mission_tip(&state.prompts, &mission.objective, stage_title.as_deref())
      .await
    {
      Ok(t) => {
        info!(target: "mission", id = %mission.id, "Tip served from HQ");
        t
      }
      Err(e) => {
        error!(target: "mission", id = %mission.id, error = %e, "Tip fetch failed; using canned transmission.");
        FALLBACK_TIP.into()
      }
    }
  } else {
    FALLBACK_TIP.into()
  }
}

/// Tip for whatever the active run is currently looking at. Falls back to the
/// whole-mission tip when nothing is selected.
#[instrument(level = "info", skip(state))]
pub async fn get_tip_for_current_stage(state: &AppState) -> Option<String> {
  let (mission_id, stage_id) = {
    let session = state.session.read().await;
    let run = session.run.as_ref()?;
    (
      run.mission().id.clone(),
      run.current_stage().map(|s| s.id().to_string()),
    )
  };
  Some(get_tip_text(state, &mission_id, stage_id.as_deref()).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Prompts;
  use crate::seeds::{seed_categories, seed_leaderboard};
  use crate::session::Session;
  use std::sync::Arc;
  use tokio::sync::RwLock;

  fn offline_state() -> AppState {
    AppState {
      categories: Arc::new(RwLock::new(seed_categories())),
      leaderboard: Arc::new(RwLock::new(seed_leaderboard())),
      session: Arc::new(RwLock::new(Session::default())),
      openai: None,
      prompts: Prompts::default(),
    }
  }

  #[tokio::test]
  async fn tip_degrades_to_the_canned_transmission() {
    let state = offline_state();
    let tip = get_tip_text(&state, "m101", Some("s3")).await;
    assert_eq!(tip, FALLBACK_TIP);
  }

  #[tokio::test]
  async fn unknown_mission_gets_a_notice_not_a_tip() {
    let state = offline_state();
    let tip = get_tip_text(&state, "m999", None).await;
    assert_eq!(tip, "No tip: unknown mission.");
  }

  #[tokio::test]
  async fn current_stage_tip_requires_an_active_run() {
    let state = offline_state();
    assert!(get_tip_for_current_stage(&state).await.is_none());
    state.select_mission("m101").await.expect("selected");
    assert_eq!(
      get_tip_for_current_stage(&state).await.as_deref(),
      Some(FALLBACK_TIP)
    );
  }
}
