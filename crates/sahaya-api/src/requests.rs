//! Handlers for the scribe-request approval workflow.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/scribe-requests` | Score is computed server-side |
//! | `GET`  | `/scribe-requests/pending` | Newest first |
//! | `GET`  | `/scribe-requests/:id` | 404 if not found |
//! | `GET`  | `/admins/:id/scribe-requests` | Requests assigned to an admin |
//! | `POST` | `/scribe-requests/:id/approve` | Body: `{"approved_by":"..."}` |
//! | `POST` | `/scribe-requests/:id/reject` | Reason must be non-blank |
//! | `POST` | `/scribe-requests/:id/complete` | `approved → completed` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use sahaya_core::{
  request::{NewScribeRequest, ScribeRequest},
  store::PlatformStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// `POST /scribe-requests`
pub async fn create<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewScribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let request = state
    .store
    .create_scribe_request(body, &state.policy)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(request)))
}

/// `GET /scribe-requests/:id`
pub async fn get_one<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ScribeRequest>, ApiError> {
  let request = state
    .store
    .get_scribe_request(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("request {id} not found")))?;
  Ok(Json(request))
}

/// `GET /scribe-requests/pending`
pub async fn pending<S: PlatformStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<ScribeRequest>>, ApiError> {
  let requests = state
    .store
    .pending_scribe_requests()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(requests))
}

/// `GET /admins/:id/scribe-requests`
pub async fn for_admin<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<ScribeRequest>>, ApiError> {
  let requests = state
    .store
    .scribe_requests_for_admin(&id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(requests))
}

#[derive(Debug, Deserialize)]
pub struct ApproveBody {
  pub approved_by: String,
}

/// `POST /scribe-requests/:id/approve`
pub async fn approve<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ApproveBody>,
) -> Result<Json<ScribeRequest>, ApiError> {
  let request = state
    .store
    .approve_scribe_request(id, &body.approved_by)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(request))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
  pub rejected_by: String,
  pub reason:      String,
}

/// `POST /scribe-requests/:id/reject`
pub async fn reject<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RejectBody>,
) -> Result<Json<ScribeRequest>, ApiError> {
  let request = state
    .store
    .reject_scribe_request(id, &body.rejected_by, &body.reason)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(request))
}

/// `POST /scribe-requests/:id/complete`
pub async fn complete<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ScribeRequest>, ApiError> {
  let request = state
    .store
    .complete_scribe_request(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(request))
}
