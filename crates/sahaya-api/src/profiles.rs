//! Handlers for profile endpoints: users, students, scribes, admins.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Roleless base account (super-admins) |
//! | `GET`  | `/users/:id` | 404 if not found |
//! | `PUT`  | `/users/:id/active` | Body: `{"is_active":false}` |
//! | `POST` | `/students` | Creates base user + student together |
//! | `GET`  | `/students/:id` | |
//! | `PUT`  | `/students/:id/exam` | Body: `ExamDetails` |
//! | `POST` | `/scribes` | Rating starts zeroed |
//! | `GET`  | `/scribes/:id` | |
//! | `PUT`  | `/scribes/:id/availability` | Body: `{"availability":"busy"}` |
//! | `GET`  | `/scribes/available` | `?subjects=math,science&location=Delhi` |
//! | `POST` | `/admins` | Starts unapproved |
//! | `GET`  | `/admins/:id` | |
//! | `GET`  | `/admins/:id/status` | Profile flag + newest access request |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use sahaya_core::{
  profile::{
    Admin, Availability, ExamDetails, NewAdmin, NewScribe, NewStudent,
    NewUser, Scribe, Student, User,
  },
  request::AdminRequestStatus,
  store::PlatformStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Users ────────────────────────────────────────────────────────────────────

/// `POST /users`
pub async fn create_user<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
  let user = state
    .store
    .add_user(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/:id`
pub async fn get_user<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
  let user = state
    .store
    .get_user(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct SetActiveBody {
  pub is_active: bool,
}

/// `PUT /users/:id/active` — body: `{"is_active":false}`
pub async fn set_user_active<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  Json(body): Json<SetActiveBody>,
) -> Result<Json<User>, ApiError> {
  let user = state
    .store
    .set_user_active(&id, body.is_active)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(user))
}

// ─── Students ─────────────────────────────────────────────────────────────────

/// `POST /students`
pub async fn create_student<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewStudent>,
) -> Result<impl IntoResponse, ApiError> {
  let student = state
    .store
    .add_student(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /students/:id`
pub async fn get_student<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Student>, ApiError> {
  let student = state
    .store
    .get_student(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("student {id} not found")))?;
  Ok(Json(student))
}

/// `PUT /students/:id/exam` — body: `ExamDetails`
pub async fn update_student_exam<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  Json(body): Json<ExamDetails>,
) -> Result<Json<Student>, ApiError> {
  let student = state
    .store
    .update_student_exam(&id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(student))
}

// ─── Scribes ──────────────────────────────────────────────────────────────────

/// `POST /scribes`
pub async fn create_scribe<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewScribe>,
) -> Result<impl IntoResponse, ApiError> {
  let scribe = state
    .store
    .add_scribe(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(scribe)))
}

/// `GET /scribes/:id`
pub async fn get_scribe<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Scribe>, ApiError> {
  let scribe = state
    .store
    .get_scribe(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("scribe {id} not found")))?;
  Ok(Json(scribe))
}

#[derive(Debug, Deserialize)]
pub struct SetAvailabilityBody {
  pub availability: Availability,
}

/// `PUT /scribes/:id/availability` — body: `{"availability":"busy"}`
pub async fn set_scribe_availability<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  Json(body): Json<SetAvailabilityBody>,
) -> Result<Json<Scribe>, ApiError> {
  let scribe = state
    .store
    .set_scribe_availability(&id, body.availability)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(scribe))
}

#[derive(Debug, Deserialize)]
pub struct AvailableParams {
  /// Comma-separated subject list.
  pub subjects: Option<String>,
  pub location: Option<String>,
}

/// `GET /scribes/available[?subjects=a,b&location=l]`
pub async fn available_scribes<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<AvailableParams>,
) -> Result<Json<Vec<Scribe>>, ApiError> {
  let subjects: Vec<String> = params
    .subjects
    .as_deref()
    .map(|s| {
      s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
    })
    .unwrap_or_default();

  let scribes = state
    .store
    .find_available_scribes(&subjects, params.location.as_deref())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(scribes))
}

// ─── Admins ───────────────────────────────────────────────────────────────────

/// `POST /admins`
pub async fn create_admin<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewAdmin>,
) -> Result<impl IntoResponse, ApiError> {
  let admin = state
    .store
    .add_admin(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(admin)))
}

/// `GET /admins/:id`
pub async fn get_admin<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Admin>, ApiError> {
  let admin = state
    .store
    .get_admin(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("admin {id} not found")))?;
  Ok(Json(admin))
}

/// Approval state of an admin, combining the profile flag with the newest
/// access request's audit trail.
#[derive(Debug, Serialize)]
pub struct AdminStatus {
  pub user_id:          String,
  pub is_approved:      bool,
  pub request_status:   Option<AdminRequestStatus>,
  pub requested_at:     Option<DateTime<Utc>>,
  pub rejection_reason: Option<String>,
}

/// `GET /admins/:id/status`
pub async fn admin_status<S: PlatformStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<AdminStatus>, ApiError> {
  let admin = state
    .store
    .get_admin(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("admin {id} not found")))?;
  let request = state
    .store
    .admin_request_for_user(&id)
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(AdminStatus {
    user_id:          admin.user_id,
    is_approved:      admin.is_approved,
    request_status:   request.as_ref().map(|r| r.status),
    requested_at:     request.as_ref().map(|r| r.requested_at),
    rejection_reason: request.and_then(|r| r.rejection_reason),
  }))
}
