//! JSON REST API for Sahaya.
//!
//! Exposes an axum [`Router`] backed by any
//! [`sahaya_core::store::PlatformStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sahaya_api::api_router(state))
//! ```

pub mod admin_requests;
pub mod error;
pub mod feedback;
pub mod matches;
pub mod profiles;
pub mod requests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use sahaya_core::{matching::MatchPolicy, store::PlatformStore};

pub use error::ApiError;

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct ApiState<S: PlatformStore> {
  pub store:  Arc<S>,
  pub policy: Arc<MatchPolicy>,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: PlatformStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Users
    .route("/users", post(profiles::create_user::<S>))
    .route("/users/{id}", get(profiles::get_user::<S>))
    .route("/users/{id}/active", put(profiles::set_user_active::<S>))
    // Students
    .route("/students", post(profiles::create_student::<S>))
    .route("/students/{id}", get(profiles::get_student::<S>))
    .route("/students/{id}/exam", put(profiles::update_student_exam::<S>))
    .route("/students/{id}/matches", get(matches::for_student::<S>))
    // Scribes
    .route("/scribes", post(profiles::create_scribe::<S>))
    .route("/scribes/available", get(profiles::available_scribes::<S>))
    .route("/scribes/{id}", get(profiles::get_scribe::<S>))
    .route(
      "/scribes/{id}/availability",
      put(profiles::set_scribe_availability::<S>),
    )
    .route("/scribes/{id}/matches", get(matches::for_scribe::<S>))
    .route("/scribes/{id}/feedback", get(feedback::for_scribe::<S>))
    // Admins
    .route("/admins", post(profiles::create_admin::<S>))
    .route("/admins/{id}", get(profiles::get_admin::<S>))
    .route("/admins/{id}/status", get(profiles::admin_status::<S>))
    .route(
      "/admins/{id}/scribe-requests",
      get(requests::for_admin::<S>),
    )
    // Matches
    .route("/matches", post(matches::propose::<S>))
    .route("/matches/{id}", get(matches::get_one::<S>))
    .route("/matches/{id}/confirm", post(matches::confirm::<S>))
    .route("/matches/{id}/complete", post(matches::complete::<S>))
    .route("/matches/{id}/cancel", post(matches::cancel::<S>))
    // Scribe requests
    .route("/scribe-requests", post(requests::create::<S>))
    .route("/scribe-requests/pending", get(requests::pending::<S>))
    .route("/scribe-requests/{id}", get(requests::get_one::<S>))
    .route("/scribe-requests/{id}/approve", post(requests::approve::<S>))
    .route("/scribe-requests/{id}/reject", post(requests::reject::<S>))
    .route(
      "/scribe-requests/{id}/complete",
      post(requests::complete::<S>),
    )
    // Admin requests
    .route("/admin-requests", post(admin_requests::create::<S>))
    .route(
      "/admin-requests/pending",
      get(admin_requests::pending::<S>),
    )
    .route("/admin-requests/{id}", get(admin_requests::get_one::<S>))
    .route(
      "/admin-requests/{id}/approve",
      post(admin_requests::approve::<S>),
    )
    .route(
      "/admin-requests/{id}/reject",
      post(admin_requests::reject::<S>),
    )
    // Feedback
    .route("/feedback", post(feedback::create::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use sahaya_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn make_state() -> ApiState<SqliteStore> {
    ApiState {
      store:  Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      policy: Arc::new(MatchPolicy::default()),
    }
  }

  async fn send(
    state:  ApiState<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    api_router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn json_of(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn student_body(id: &str) -> Value {
    json!({
      "user_id": id,
      "name": "Student",
      "email": null,
      "class": "12",
      "subjects": ["math", "science"],
      "exam_details": null,
      "disability": { "kind": "visual impairment", "description": null },
      "school_id": null,
    })
  }

  fn scribe_body(id: &str, location: &str, languages: Value) -> Value {
    json!({
      "user_id": id,
      "name": "Scribe",
      "email": null,
      "subjects": ["math", "science"],
      "experience": "2 years",
      "exam_types": ["board"],
      "location": location,
      "languages": languages,
      "availability": "available",
      "gender": "female",
      "age": 30,
    })
  }

  fn exam_body() -> Value {
    json!({
      "exam_name": "Board Exam",
      "exam_type": "board",
      "exam_date": "2026-03-14",
      "exam_time": "10:00",
      "location": "Exam Centre, Delhi",
      "language": "Hindi",
      "gender_preference": null,
      "subjects": ["math", "science"],
    })
  }

  // ── Profiles ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unknown_student_returns_404() {
    let state = make_state().await;
    let resp = send(state, "GET", "/students/missing", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn student_create_then_fetch() {
    let state = make_state().await;
    let resp = send(
      state.clone(),
      "POST",
      "/students",
      Some(student_body("st-1")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(state, "GET", "/students/st-1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_of(resp).await;
    assert_eq!(body["subjects"], json!(["math", "science"]));
  }

  #[tokio::test]
  async fn duplicate_profile_returns_409() {
    let state = make_state().await;
    send(
      state.clone(),
      "POST",
      "/students",
      Some(student_body("u-1")),
    )
    .await;
    let resp =
      send(state, "POST", "/students", Some(student_body("u-1"))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn availability_filter_is_queryable() {
    let state = make_state().await;
    send(
      state.clone(),
      "POST",
      "/scribes",
      Some(scribe_body("sc-1", "Delhi", json!(["Hindi"]))),
    )
    .await;
    send(
      state.clone(),
      "POST",
      "/scribes",
      Some(scribe_body("sc-2", "Mumbai", json!(["Hindi"]))),
    )
    .await;

    let resp = send(
      state,
      "GET",
      "/scribes/available?subjects=math&location=Delhi",
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_of(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["user_id"], "sc-1");
  }

  // ── Matches ─────────────────────────────────────────────────────────────────

  async fn propose(state: &ApiState<SqliteStore>) -> Value {
    send(
      state.clone(),
      "POST",
      "/students",
      Some(student_body("st-1")),
    )
    .await;
    send(
      state.clone(),
      "POST",
      "/scribes",
      Some(scribe_body("sc-1", "Delhi", json!(["Hindi"]))),
    )
    .await;

    let resp = send(
      state.clone(),
      "POST",
      "/matches",
      Some(json!({
        "student_id": "st-1",
        "exam_details": exam_body(),
        "location": null,
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_of(resp).await
  }

  #[tokio::test]
  async fn propose_returns_scored_matches() {
    let state = make_state().await;
    let matches = propose(&state).await;
    assert_eq!(matches.as_array().unwrap().len(), 1);
    // Full subject overlap + Delhi + Hindi, zero rating.
    assert_eq!(matches[0]["match_score"], 90);
    assert_eq!(matches[0]["status"], "matched");
  }

  #[tokio::test]
  async fn propose_without_candidates_returns_404() {
    let state = make_state().await;
    send(
      state.clone(),
      "POST",
      "/students",
      Some(student_body("st-1")),
    )
    .await;
    let resp = send(
      state,
      "POST",
      "/matches",
      Some(json!({
        "student_id": "st-1",
        "exam_details": exam_body(),
        "location": null,
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn match_lifecycle_over_http() {
    let state = make_state().await;
    let matches = propose(&state).await;
    let id = matches[0]["match_id"].as_str().unwrap().to_owned();

    let resp = send(
      state.clone(),
      "POST",
      &format!("/matches/{id}/confirm"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_of(resp).await["status"], "confirmed");

    let resp = send(
      state.clone(),
      "POST",
      &format!("/matches/{id}/complete"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // A completed match cannot be cancelled.
    let resp = send(
      state,
      "POST",
      &format!("/matches/{id}/cancel"),
      Some(json!({})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn skipping_confirmation_returns_409() {
    let state = make_state().await;
    let matches = propose(&state).await;
    let id = matches[0]["match_id"].as_str().unwrap().to_owned();

    let resp =
      send(state, "POST", &format!("/matches/{id}/complete"), None).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  // ── Scribe requests ─────────────────────────────────────────────────────────

  async fn one_request(state: &ApiState<SqliteStore>) -> String {
    send(
      state.clone(),
      "POST",
      "/students",
      Some(student_body("st-1")),
    )
    .await;
    send(
      state.clone(),
      "POST",
      "/scribes",
      Some(scribe_body("sc-1", "Delhi", json!(["Hindi"]))),
    )
    .await;
    let resp = send(
      state.clone(),
      "POST",
      "/scribe-requests",
      Some(json!({
        "student_id": "st-1",
        "scribe_id": "sc-1",
        "exam_details": exam_body(),
        "admin_id": "ad-1",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_of(resp).await["request_id"]
      .as_str()
      .unwrap()
      .to_owned()
  }

  #[tokio::test]
  async fn blank_rejection_reason_returns_400() {
    let state = make_state().await;
    let id = one_request(&state).await;

    let resp = send(
      state.clone(),
      "POST",
      &format!("/scribe-requests/{id}/reject"),
      Some(json!({ "rejected_by": "ad-1", "reason": "  " })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Still pending and listed.
    let resp =
      send(state, "GET", "/scribe-requests/pending", None).await;
    assert_eq!(json_of(resp).await.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn approved_request_shows_audit_fields() {
    let state = make_state().await;
    let id = one_request(&state).await;

    let resp = send(
      state,
      "POST",
      &format!("/scribe-requests/{id}/approve"),
      Some(json!({ "approved_by": "ad-1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_of(resp).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["approved_by"], "ad-1");
  }

  // ── Admin requests ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_approval_cascades_to_status_endpoint() {
    let state = make_state().await;
    send(
      state.clone(),
      "POST",
      "/admins",
      Some(json!({
        "user_id": "ad-1",
        "name": "Admin",
        "email": null,
        "school_name": "Green Valley School",
        "school_id": "school-1",
      })),
    )
    .await;
    let resp = send(
      state.clone(),
      "POST",
      "/admin-requests",
      Some(json!({
        "user_id": "ad-1",
        "school_name": "Green Valley School",
        "school_id": "school-1",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = json_of(resp).await["request_id"]
      .as_str()
      .unwrap()
      .to_owned();

    let resp = send(
      state.clone(),
      "POST",
      &format!("/admin-requests/{id}/approve"),
      Some(json!({ "super_admin_id": "root-1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(state, "GET", "/admins/ad-1/status", None).await;
    let body = json_of(resp).await;
    assert_eq!(body["is_approved"], true);
    assert_eq!(body["request_status"], "approved");
  }

  // ── Feedback ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn feedback_updates_the_scribe_rating() {
    let state = make_state().await;
    let matches = propose(&state).await;
    let id = matches[0]["match_id"].as_str().unwrap().to_owned();
    send(
      state.clone(),
      "POST",
      &format!("/matches/{id}/confirm"),
      None,
    )
    .await;
    send(
      state.clone(),
      "POST",
      &format!("/matches/{id}/complete"),
      None,
    )
    .await;

    let resp = send(
      state.clone(),
      "POST",
      "/feedback",
      Some(json!({
        "match_id": id,
        "student_id": "st-1",
        "scribe_id": "sc-1",
        "rating": 4,
        "comment": "very helpful",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(state, "GET", "/scribes/sc-1", None).await;
    let body = json_of(resp).await;
    assert_eq!(body["rating"], 4.0);
    assert_eq!(body["total_ratings"], 1);
  }

  #[tokio::test]
  async fn out_of_scale_rating_returns_400() {
    let state = make_state().await;
    let matches = propose(&state).await;
    let id = matches[0]["match_id"].as_str().unwrap().to_owned();

    let resp = send(
      state,
      "POST",
      "/feedback",
      Some(json!({
        "match_id": id,
        "student_id": "st-1",
        "scribe_id": "sc-1",
        "rating": 9,
        "comment": "",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
