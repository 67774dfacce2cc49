//! Handlers for the match workflow.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/matches` | Runs the scorer, persists the top candidates |
//! | `GET`  | `/matches/:id` | 404 if not found |
//! | `GET`  | `/students/:id/matches` | Newest first |
//! | `GET`  | `/scribes/:id/matches` | Newest first |
//! | `POST` | `/matches/:id/confirm` | `matched → confirmed` |
//! | `POST` | `/matches/:id/complete` | `confirmed → completed` |
//! | `POST` | `/matches/:id/cancel` | Body: `{"reason":"..."}`, optional |
//!
//! Rejected transitions surface as 409.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use sahaya_core::{matching::Match, profile::ExamDetails, store::PlatformStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Propose ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProposeBody {
  pub student_id:   String,
  pub exam_details: ExamDetails,
  /// Exact-location pre-filter for candidates; independent of the scoring
  /// term, which uses `exam_details.location`.
  pub location:     Option<String>,
}

/// `POST /matches`
pub async fn propose<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<ProposeBody>,
) -> Result<impl IntoResponse, ApiError> {
  let matches = state
    .store
    .propose_matches(
      &body.student_id,
      body.exam_details,
      body.location.as_deref(),
      &state.policy,
    )
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(matches)))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /matches/:id`
pub async fn get_one<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Match>, ApiError> {
  let m = state
    .store
    .get_match(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("match {id} not found")))?;
  Ok(Json(m))
}

/// `GET /students/:id/matches`
pub async fn for_student<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Match>>, ApiError> {
  let matches = state
    .store
    .matches_for_student(&id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(matches))
}

/// `GET /scribes/:id/matches`
pub async fn for_scribe<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<Match>>, ApiError> {
  let matches = state
    .store
    .matches_for_scribe(&id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(matches))
}

// ─── Transitions ──────────────────────────────────────────────────────────────

/// `POST /matches/:id/confirm`
pub async fn confirm<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Match>, ApiError> {
  let m = state
    .store
    .confirm_match(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(m))
}

/// `POST /matches/:id/complete`
pub async fn complete<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Match>, ApiError> {
  let m = state
    .store
    .complete_match(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(m))
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelBody {
  pub reason: Option<String>,
}

/// `POST /matches/:id/cancel` — body: `{"reason":"..."}`, reason optional
pub async fn cancel<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CancelBody>,
) -> Result<Json<Match>, ApiError> {
  let m = state
    .store
    .cancel_match(id, body.reason)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(m))
}
