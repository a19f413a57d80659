//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to the session surface. We reply with a single JSON message per
//! request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic::{get_tip_for_current_stage, get_tip_text};
use crate::protocol::{
  matching_result_out, mission_complete_out, stage_out, ClientWsMessage, ServerWsMessage,
};
use crate::session::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "missionhq_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "missionhq_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "missionhq_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "missionhq_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "missionhq_backend", "WebSocket disconnected");
}

/// Snapshot of the active stage or an error when nothing is selected.
async fn stage_reply(state: &AppState) -> ServerWsMessage {
  let session = state.session.read().await;
  match session.run.as_ref() {
    Some(run) => ServerWsMessage::Stage { stage: stage_out(run) },
    None => ServerWsMessage::Error { message: "no mission is currently selected".into() },
  }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListMissions => ServerWsMessage::Missions {
      categories: state.categories_snapshot().await,
    },

    ClientWsMessage::Leaderboard => ServerWsMessage::Leaderboard {
      agents: state.leaderboard_snapshot().await,
    },

    ClientWsMessage::Navigate { view } => {
      state.navigate(view).await;
      ServerWsMessage::Navigated { view }
    }

    ClientWsMessage::StartMission { mission_id } => {
      match state.select_mission(&mission_id).await {
        Ok(mission) => {
          tracing::info!(target: "mission", id = %mission.id, "WS mission started");
          match state.session.read().await.run.as_ref() {
            Some(run) => ServerWsMessage::MissionStarted { mission, stage: stage_out(run) },
            None => ServerWsMessage::Error { message: "mission run vanished".into() },
          }
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::AdvanceStage => match state.advance_stage().await {
      Ok(_) => stage_reply(state).await,
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::RetreatStage => match state.retreat_stage().await {
      Ok(_) => stage_reply(state).await,
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::SelectMatch { item_id, description } => {
      match state.select_matching(&item_id, &description).await {
        Ok(applied) => ServerWsMessage::FieldEdited { applied },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::SubmitMatching => match state.submit_matching().await {
      Ok(outcome) => {
        tracing::info!(target: "mission", passed = outcome.passed, "WS matching submitted");
        matching_result_out(outcome)
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::SetReport { text } => match state.set_report(text).await {
      Ok(()) => ServerWsMessage::ReportSet,
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::SubmitReport => match state.submit_report().await {
      Ok(outcome) => mission_complete_out(outcome),
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::CompleteMission { mission_id, points } => {
      match state.complete_mission(&mission_id, points).await {
        Ok(outcome) => {
          tracing::info!(target: "mission", id = %outcome.mission_id, awarded = outcome.awarded, "WS mission completed");
          mission_complete_out(outcome)
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::Tip { mission_id, stage_id } => {
      let text = get_tip_text(state, &mission_id, stage_id.as_deref()).await;
      tracing::info!(target: "mission", id = %mission_id, "WS tip served");
      ServerWsMessage::Tip { text }
    }

    ClientWsMessage::TipCurrent => match get_tip_for_current_stage(state).await {
      Some(text) => ServerWsMessage::Tip { text },
      None => ServerWsMessage::Error { message: "no mission is currently selected".into() },
    },

    ClientWsMessage::UpdateMissions { categories } => {
      state.update_mission_collection(categories).await;
      ServerWsMessage::Missions { categories: state.categories_snapshot().await }
    }

    ClientWsMessage::ToggleEditMode => ServerWsMessage::EditMode {
      enabled: state.toggle_edit_mode().await,
    },

    ClientWsMessage::EditField { edit } => match state.edit_draft(edit).await {
      Ok(applied) => ServerWsMessage::FieldEdited { applied },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::SaveMission => match state.save_draft().await {
      Ok(mission) => ServerWsMessage::MissionSaved { mission },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::AddCategory { name } => match state.add_category(&name).await {
      Ok(id) => ServerWsMessage::CategoryAdded { id },
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::AddMission { category_id, title } => {
      match state.add_mission(&category_id, &title).await {
        Ok(id) => ServerWsMessage::MissionAdded { id },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }
  }
}
