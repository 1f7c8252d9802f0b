//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::grading::CheckOutcome;
use crate::logic::check_placements;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_courses(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(CoursesOut { courses: state.curriculum.courses().to_vec() })
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_activity(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<ActivityOut>, ApiError> {
  let activity = state.activity(&id).ok_or_else(|| ApiError::UnknownActivity(id.clone()))?;
  info!(target: "activity", %id, source = ?activity.source, "HTTP activity served");
  Ok(Json(to_out(&activity)))
}

#[instrument(level = "info", skip(state, body), fields(%id, placed = body.placements.len()))]
pub async fn http_post_check(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<CheckIn>,
) -> Result<Json<CheckOut>, ApiError> {
  let result = check_placements(&state, &id, body.placements)?;
  match &result {
    CheckOutcome::Scored(r) => {
      info!(target: "activity", %id, correct = r.correct_count, total = r.total_count, "HTTP check evaluated")
    }
    CheckOutcome::Incomplete { missing } => info!(target: "activity", %id, missing = missing.len(), "HTTP check incomplete"),
  }
  Ok(Json(CheckOut { result }))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_decision_key(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<DecisionKeyOut>, ApiError> {
  let key = state.decision_key(&id).ok_or_else(|| ApiError::UnknownDecisionKey(id.clone()))?;
  Ok(Json(DecisionKeyOut { id: key.id.clone(), title: key.title.clone(), root: key.root.clone() }))
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProgressQuery>,
) -> Result<Json<ProgressOut>, ApiError> {
  let user = state.progress.find_by_email(&q.email).await.map_err(|_| ApiError::UnknownUser(q.email.clone()))?;
  Ok(Json(ProgressOut { email: user.email, progress: user.progress }))
}
