//! Handlers for the admin-access approval workflow.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admin-requests` | |
//! | `GET`  | `/admin-requests/pending` | Newest first |
//! | `GET`  | `/admin-requests/:id` | 404 if not found |
//! | `POST` | `/admin-requests/:id/approve` | Cascades onto the Admin profile |
//! | `POST` | `/admin-requests/:id/reject` | Reason must be non-blank |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use sahaya_core::{
  request::{AdminRequest, NewAdminRequest},
  store::PlatformStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// `POST /admin-requests`
pub async fn create<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewAdminRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let request = state
    .store
    .create_admin_request(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(request)))
}

/// `GET /admin-requests/:id`
pub async fn get_one<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<AdminRequest>, ApiError> {
  let request = state
    .store
    .get_admin_request(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("request {id} not found")))?;
  Ok(Json(request))
}

/// `GET /admin-requests/pending`
pub async fn pending<S: PlatformStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<AdminRequest>>, ApiError> {
  let requests = state
    .store
    .pending_admin_requests()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(requests))
}

#[derive(Debug, Deserialize)]
pub struct ApproveBody {
  pub super_admin_id: String,
}

/// `POST /admin-requests/:id/approve`
pub async fn approve<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ApproveBody>,
) -> Result<Json<AdminRequest>, ApiError> {
  let request = state
    .store
    .approve_admin_request(id, &body.super_admin_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(request))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
  pub rejected_by: String,
  pub reason:      String,
}

/// `POST /admin-requests/:id/reject`
pub async fn reject<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RejectBody>,
) -> Result<Json<AdminRequest>, ApiError> {
  let request = state
    .store
    .reject_admin_request(id, &body.rejected_by, &body.reason)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(request))
}
