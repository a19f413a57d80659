//! HTTP endpoint handlers. These are thin wrappers that forward to the
//! session surface. Each handler is instrumented and logs parameters and
//! basic result info.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::logic::{get_tip_for_current_stage, get_tip_text};
use crate::protocol::*;
use crate::session::{AppState, SessionError};

fn error_response(e: SessionError) -> (StatusCode, Json<ErrorOut>) {
  let status = match e {
    SessionError::MissionNotFound(_) => StatusCode::NOT_FOUND,
    SessionError::NoActiveMission
    | SessionError::NotMatchingStage
    | SessionError::ReportEmpty
    | SessionError::EditModeOff
    | SessionError::NoDraft => StatusCode::CONFLICT,
  };
  (status, Json(ErrorOut { message: e.to_string() }))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_missions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.categories_snapshot().await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_leaderboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.leaderboard_snapshot().await)
}

#[instrument(level = "info", skip(state), fields(view = ?body.view))]
pub async fn http_post_navigate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<NavigateIn>,
) -> impl IntoResponse {
  state.navigate(body.view).await;
  StatusCode::NO_CONTENT
}

#[instrument(level = "info", skip(state), fields(%body.mission_id))]
pub async fn http_post_start_mission(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartMissionIn>,
) -> impl IntoResponse {
  match state.select_mission(&body.mission_id).await {
    Ok(mission) => {
      info!(target: "mission", id = %mission.id, "HTTP mission started");
      Ok(Json(mission))
    }
    Err(e) => Err(error_response(e)),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stage(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session = state.session.read().await;
  match session.run.as_ref() {
    Some(run) => Ok(Json(stage_out(run))),
    None => Err(error_response(SessionError::NoActiveMission)),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_advance(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match state.advance_stage().await {
    Ok(_) => stage_snapshot(&state).await,
    Err(e) => Err(error_response(e)),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_retreat(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match state.retreat_stage().await {
    Ok(_) => stage_snapshot(&state).await,
    Err(e) => Err(error_response(e)),
  }
}

async fn stage_snapshot(
  state: &AppState,
) -> Result<Json<StageOut>, (StatusCode, Json<ErrorOut>)> {
  let session = state.session.read().await;
  match session.run.as_ref() {
    Some(run) => Ok(Json(stage_out(run))),
    None => Err(error_response(SessionError::NoActiveMission)),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.item_id))]
pub async fn http_post_select_match(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SelectMatchIn>,
) -> impl IntoResponse {
  match state.select_matching(&body.item_id, &body.description).await {
    Ok(applied) => Ok(Json(AppliedOut { applied })),
    Err(e) => Err(error_response(e)),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_submit_matching(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match state.submit_matching().await {
    Ok(outcome) => {
      info!(target: "mission", passed = outcome.passed, "HTTP matching submitted");
      Ok(Json(outcome))
    }
    Err(e) => Err(error_response(e)),
  }
}

#[instrument(level = "info", skip(state, body), fields(report_len = body.text.len()))]
pub async fn http_post_report(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ReportIn>,
) -> impl IntoResponse {
  match state.set_report(body.text).await {
    Ok(()) => Ok(StatusCode::NO_CONTENT),
    Err(e) => Err(error_response(e)),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_submit_report(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match state.submit_report().await {
    Ok(outcome) => Ok(Json(outcome)),
    Err(e) => Err(error_response(e)),
  }
}

#[instrument(level = "info", skip(state), fields(%body.mission_id, points = body.points))]
pub async fn http_post_complete(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CompleteIn>,
) -> impl IntoResponse {
  match state.complete_mission(&body.mission_id, body.points).await {
    Ok(outcome) => {
      info!(target: "mission", id = %outcome.mission_id, awarded = outcome.awarded, "HTTP mission completed");
      Ok(Json(outcome))
    }
    Err(e) => Err(error_response(e)),
  }
}

#[instrument(level = "info", skip(state), fields(%q.mission_id))]
pub async fn http_get_tip(
  State(state): State<Arc<AppState>>,
  Query(q): Query<TipQuery>,
) -> impl IntoResponse {
  let text = get_tip_text(&state, &q.mission_id, q.stage_id.as_deref()).await;
  info!(target: "mission", id = %q.mission_id, "HTTP tip served");
  Json(TipOut { text })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_tip_current(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match get_tip_for_current_stage(&state).await {
    Some(text) => Ok(Json(TipOut { text })),
    None => Err(error_response(SessionError::NoActiveMission)),
  }
}

#[instrument(level = "info", skip(state, body), fields(categories = body.len()))]
pub async fn http_put_missions(
  State(state): State<Arc<AppState>>,
  Json(body): Json<Vec<crate::domain::MissionCategory>>,
) -> impl IntoResponse {
  state.update_mission_collection(body).await;
  Json(state.categories_snapshot().await)
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_toggle_edit(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let enabled = state.toggle_edit_mode().await;
  Json(EditModeOut { enabled })
}

#[instrument(level = "info", skip(state, edit))]
pub async fn http_post_edit_field(
  State(state): State<Arc<AppState>>,
  Json(edit): Json<crate::editor::FieldEdit>,
) -> impl IntoResponse {
  match state.edit_draft(edit).await {
    Ok(applied) => Ok(Json(AppliedOut { applied })),
    Err(e) => Err(error_response(e)),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_save_mission(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match state.save_draft().await {
    Ok(mission) => {
      info!(target: "mission", id = %mission.id, "HTTP draft saved");
      Ok(Json(mission))
    }
    Err(e) => Err(error_response(e)),
  }
}

#[instrument(level = "info", skip(state, body), fields(name_len = body.name.len()))]
pub async fn http_post_add_category(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AddCategoryIn>,
) -> impl IntoResponse {
  match state.add_category(&body.name).await {
    Ok(id) => Ok(Json(AddedOut { id })),
    Err(e) => Err(error_response(e)),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.category_id, title_len = body.title.len()))]
pub async fn http_post_add_mission(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AddMissionIn>,
) -> impl IntoResponse {
  match state.add_mission(&body.category_id, &body.title).await {
    Ok(id) => Ok(Json(AddedOut { id })),
    Err(e) => Err(error_response(e)),
  }
}
