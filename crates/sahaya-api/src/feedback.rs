//! Handlers for feedback endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/feedback` | Match must be completed; rating 1–5 |
//! | `GET`  | `/scribes/:id/feedback` | Newest first |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use sahaya_core::{rating::NewFeedback, store::PlatformStore};

use crate::{ApiState, error::ApiError};

/// `POST /feedback`
pub async fn create<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewFeedback>,
) -> Result<impl IntoResponse, ApiError> {
  let feedback = state
    .store
    .add_feedback(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(feedback)))
}

/// `GET /scribes/:id/feedback`
pub async fn for_scribe<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
  let feedback = state
    .store
    .feedback_for_scribe(&id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(feedback))
}
