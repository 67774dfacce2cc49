//! Integration tests against an in-memory store.

use sahaya_core::{
  Error as CoreError,
  matching::{MatchPolicy, MatchStatus},
  profile::{
    Availability, Disability, ExamDetails, NewAdmin, NewScribe, NewStudent,
    NewUser, Role,
  },
  rating::NewFeedback,
  request::{
    AdminRequestStatus, NewAdminRequest, NewScribeRequest,
    ScribeRequestStatus,
  },
  store::PlatformStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn exam(subjects: &[&str]) -> ExamDetails {
  ExamDetails {
    exam_name:         "Class 12 Board Exam".into(),
    exam_type:         "board".into(),
    exam_date:         "2026-03-14".into(),
    exam_time:         "10:00".into(),
    location:          "Exam Centre, Delhi".into(),
    language:          "Hindi".into(),
    gender_preference: None,
    subjects:          subjects.iter().map(|s| s.to_string()).collect(),
  }
}

fn new_student(id: &str, subjects: &[&str]) -> NewStudent {
  NewStudent {
    user_id:      id.into(),
    name:         format!("Student {id}"),
    email:        Some(format!("{id}@example.org")),
    class:        "12".into(),
    subjects:     subjects.iter().map(|s| s.to_string()).collect(),
    exam_details: None,
    disability:   Disability {
      kind:        "visual impairment".into(),
      description: None,
    },
    school_id:    Some("school-1".into()),
  }
}

fn new_scribe(
  id:        &str,
  subjects:  &[&str],
  location:  &str,
  languages: &[&str],
) -> NewScribe {
  NewScribe {
    user_id:      id.into(),
    name:         format!("Scribe {id}"),
    email:        None,
    subjects:     subjects.iter().map(|s| s.to_string()).collect(),
    experience:   "3 years".into(),
    exam_types:   vec!["board".into()],
    location:     location.into(),
    languages:    languages.iter().map(|s| s.to_string()).collect(),
    availability: Availability::Available,
    gender:       "female".into(),
    age:          28,
  }
}

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.unwrap()
}

async fn seed_student(store: &SqliteStore, id: &str, subjects: &[&str]) {
  store.add_student(new_student(id, subjects)).await.unwrap();
}

async fn seed_scribe(
  store:     &SqliteStore,
  id:        &str,
  subjects:  &[&str],
  location:  &str,
  languages: &[&str],
) {
  store
    .add_scribe(new_scribe(id, subjects, location, languages))
    .await
    .unwrap();
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn student_roundtrips_with_base_user() {
  let store = store().await;
  seed_student(&store, "st-1", &["math", "science"]).await;

  let student = store.get_student("st-1").await.unwrap().unwrap();
  assert_eq!(student.user_id, "st-1");
  assert_eq!(student.subjects, vec!["math", "science"]);
  assert_eq!(student.disability.kind, "visual impairment");

  let user = store.get_user("st-1").await.unwrap().unwrap();
  assert_eq!(user.role, Role::Student);
  assert!(user.is_active);
}

#[tokio::test]
async fn scribe_starts_with_zeroed_rating() {
  let store = store().await;
  seed_scribe(&store, "sc-1", &["math"], "Delhi", &["Hindi"]).await;

  let scribe = store.get_scribe("sc-1").await.unwrap().unwrap();
  assert_eq!(scribe.rating, 0.0);
  assert_eq!(scribe.total_ratings, 0);
  assert_eq!(scribe.availability, Availability::Available);
}

#[tokio::test]
async fn duplicate_user_id_is_rejected_across_roles() {
  let store = store().await;
  seed_student(&store, "u-1", &["math"]).await;

  let err = store
    .add_scribe(new_scribe("u-1", &["math"], "Delhi", &["Hindi"]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UserAlreadyExists(_))));

  // The failed insert must not leave a partial scribe row behind.
  assert!(store.get_scribe("u-1").await.unwrap().is_none());
}

#[tokio::test]
async fn add_user_covers_roleless_accounts() {
  let store = store().await;
  let user = store
    .add_user(NewUser {
      user_id: "root-1".into(),
      name:    "Platform Root".into(),
      email:   None,
      role:    Role::SuperAdmin,
    })
    .await
    .unwrap();
  assert_eq!(user.role, Role::SuperAdmin);

  let err = store.set_user_active("missing", false).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UserNotFound(_))));
}

#[tokio::test]
async fn deactivation_is_soft() {
  let store = store().await;
  seed_student(&store, "st-1", &["math"]).await;

  let user = store.set_user_active("st-1", false).await.unwrap();
  assert!(!user.is_active);
  // The student record survives deactivation.
  assert!(store.get_student("st-1").await.unwrap().is_some());
}

#[tokio::test]
async fn exam_details_can_be_replaced() {
  let store = store().await;
  seed_student(&store, "st-1", &["math"]).await;

  let updated = store
    .update_student_exam("st-1", exam(&["math"]))
    .await
    .unwrap();
  assert_eq!(
    updated.exam_details.unwrap().exam_name,
    "Class 12 Board Exam"
  );

  let err = store
    .update_student_exam("missing", exam(&["math"]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::StudentNotFound(_))));
}

// ─── Availability filter ─────────────────────────────────────────────────────

#[tokio::test]
async fn filter_excludes_busy_inactive_and_deactivated() {
  let store = store().await;
  seed_scribe(&store, "sc-ok", &["math"], "Delhi", &["Hindi"]).await;
  seed_scribe(&store, "sc-busy", &["math"], "Delhi", &["Hindi"]).await;
  seed_scribe(&store, "sc-off", &["math"], "Delhi", &["Hindi"]).await;
  store
    .set_scribe_availability("sc-busy", Availability::Busy)
    .await
    .unwrap();
  store.set_user_active("sc-off", false).await.unwrap();

  let found = store.find_available_scribes(&[], None).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].user_id, "sc-ok");
}

#[tokio::test]
async fn filter_applies_subject_overlap_and_exact_location() {
  let store = store().await;
  seed_scribe(&store, "sc-1", &["math"], "Delhi", &["Hindi"]).await;
  seed_scribe(&store, "sc-2", &["history"], "Delhi", &["Hindi"]).await;
  seed_scribe(&store, "sc-3", &["math"], "Mumbai", &["Hindi"]).await;

  let subjects = vec!["math".to_string(), "science".to_string()];
  let found = store
    .find_available_scribes(&subjects, Some("Delhi"))
    .await
    .unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].user_id, "sc-1");

  // No filters at all returns everyone available.
  let all = store.find_available_scribes(&[], None).await.unwrap();
  assert_eq!(all.len(), 3);
}

// ─── Matches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn propose_keeps_the_top_three_ranked() {
  let store = store().await;
  let policy = MatchPolicy::default();
  seed_student(&store, "st-1", &["math", "science"]).await;
  // Scores with a fresh (zero) rating: 90, 70, 60, 20.
  seed_scribe(&store, "sc-a", &["math", "science"], "Delhi", &["Hindi"])
    .await;
  seed_scribe(&store, "sc-b", &["math", "science"], "Delhi", &["English"])
    .await;
  seed_scribe(&store, "sc-c", &["math", "science"], "Mumbai", &["Hindi"])
    .await;
  seed_scribe(&store, "sc-d", &["math"], "Mumbai", &[]).await;

  let matches = store
    .propose_matches("st-1", exam(&["math", "science"]), None, &policy)
    .await
    .unwrap();

  assert_eq!(matches.len(), 3);
  let ids: Vec<&str> = matches.iter().map(|m| m.scribe_id.as_str()).collect();
  assert_eq!(ids, ["sc-a", "sc-b", "sc-c"]);
  assert_eq!(matches[0].match_score, 90);
  assert!(matches.iter().all(|m| m.status == MatchStatus::Matched));

  // All three were persisted.
  let stored = store.matches_for_student("st-1").await.unwrap();
  assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn propose_distinguishes_missing_student_from_no_candidates() {
  let store = store().await;
  let policy = MatchPolicy::default();

  let err = store
    .propose_matches("missing", exam(&["math"]), None, &policy)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::StudentNotFound(_))));

  seed_student(&store, "st-1", &["math"]).await;
  let err = store
    .propose_matches("st-1", exam(&["math"]), None, &policy)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NoCandidates)));
}

async fn one_match(store: &SqliteStore) -> Uuid {
  seed_student(store, "st-1", &["math"]).await;
  seed_scribe(store, "sc-1", &["math"], "Delhi", &["Hindi"]).await;
  let matches = store
    .propose_matches("st-1", exam(&["math"]), None, &MatchPolicy::default())
    .await
    .unwrap();
  matches[0].match_id
}

#[tokio::test]
async fn match_walks_matched_confirmed_completed() {
  let store = store().await;
  let id = one_match(&store).await;

  let confirmed = store.confirm_match(id).await.unwrap();
  assert_eq!(confirmed.status, MatchStatus::Confirmed);
  assert!(confirmed.confirmed_at.is_some());

  let completed = store.complete_match(id).await.unwrap();
  assert_eq!(completed.status, MatchStatus::Completed);
  assert!(completed.completed_at.is_some());
}

#[tokio::test]
async fn match_cannot_skip_confirmation() {
  let store = store().await;
  let id = one_match(&store).await;

  let err = store.complete_match(id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::InvalidMatchTransition {
      from: MatchStatus::Matched,
      to:   MatchStatus::Completed,
    })
  ));
  // The failed transition left the row untouched.
  let m = store.get_match(id).await.unwrap().unwrap();
  assert_eq!(m.status, MatchStatus::Matched);
}

#[tokio::test]
async fn cancellation_is_terminal_and_keeps_the_reason() {
  let store = store().await;
  let id = one_match(&store).await;

  let cancelled = store
    .cancel_match(id, Some("scribe fell ill".into()))
    .await
    .unwrap();
  assert_eq!(cancelled.status, MatchStatus::Cancelled);
  assert_eq!(cancelled.cancel_reason.as_deref(), Some("scribe fell ill"));

  let err = store.confirm_match(id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::InvalidMatchTransition { .. })
  ));
}

#[tokio::test]
async fn unknown_match_id_reports_not_found() {
  let store = store().await;
  let err = store.confirm_match(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::MatchNotFound(_))));
}

// ─── Scribe requests ─────────────────────────────────────────────────────────

async fn one_request(store: &SqliteStore) -> Uuid {
  seed_student(store, "st-1", &["math"]).await;
  seed_scribe(store, "sc-1", &["math"], "Delhi", &["Hindi"]).await;
  let request = store
    .create_scribe_request(
      NewScribeRequest {
        student_id:   "st-1".into(),
        scribe_id:    "sc-1".into(),
        exam_details: exam(&["math"]),
        admin_id:     Some("ad-1".into()),
      },
      &MatchPolicy::default(),
    )
    .await
    .unwrap();
  request.request_id
}

#[tokio::test]
async fn request_is_created_pending_with_a_computed_score() {
  let store = store().await;
  let id = one_request(&store).await;

  let request = store.get_scribe_request(id).await.unwrap().unwrap();
  assert_eq!(request.status, ScribeRequestStatus::Pending);
  // Full subject overlap + Delhi + Hindi, zero rating.
  assert_eq!(request.match_score, 90);

  assert_eq!(store.pending_scribe_requests().await.unwrap().len(), 1);
  assert_eq!(
    store.scribe_requests_for_admin("ad-1").await.unwrap().len(),
    1
  );
}

#[tokio::test]
async fn request_requires_both_profiles() {
  let store = store().await;
  seed_student(&store, "st-1", &["math"]).await;

  let err = store
    .create_scribe_request(
      NewScribeRequest {
        student_id:   "st-1".into(),
        scribe_id:    "missing".into(),
        exam_details: exam(&["math"]),
        admin_id:     None,
      },
      &MatchPolicy::default(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ScribeNotFound(_))));
}

#[tokio::test]
async fn approved_request_can_complete() {
  let store = store().await;
  let id = one_request(&store).await;

  let approved = store.approve_scribe_request(id, "ad-1").await.unwrap();
  assert_eq!(approved.status, ScribeRequestStatus::Approved);
  assert_eq!(approved.approved_by.as_deref(), Some("ad-1"));
  assert!(approved.approved_at.is_some());

  let completed = store.complete_scribe_request(id).await.unwrap();
  assert_eq!(completed.status, ScribeRequestStatus::Completed);

  // Completed is terminal.
  let err = store.approve_scribe_request(id, "ad-1").await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::InvalidScribeRequestTransition { .. })
  ));
}

#[tokio::test]
async fn rejection_requires_a_reason_and_is_terminal() {
  let store = store().await;
  let id = one_request(&store).await;

  let err = store
    .reject_scribe_request(id, "ad-1", "   ")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::EmptyRejectionReason)));
  // The blank-reason attempt must not have touched the row.
  let request = store.get_scribe_request(id).await.unwrap().unwrap();
  assert_eq!(request.status, ScribeRequestStatus::Pending);

  let rejected = store
    .reject_scribe_request(id, "ad-1", "document mismatch")
    .await
    .unwrap();
  assert_eq!(rejected.status, ScribeRequestStatus::Rejected);
  assert_eq!(
    rejected.rejection_reason.as_deref(),
    Some("document mismatch")
  );

  let err = store.approve_scribe_request(id, "ad-1").await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::InvalidScribeRequestTransition {
      from: ScribeRequestStatus::Rejected,
      to:   ScribeRequestStatus::Approved,
    })
  ));
}

// ─── Admin requests ──────────────────────────────────────────────────────────

async fn admin_with_request(store: &SqliteStore) -> Uuid {
  store
    .add_admin(NewAdmin {
      user_id:     "ad-1".into(),
      name:        "Admin One".into(),
      email:       None,
      school_name: "Green Valley School".into(),
      school_id:   "school-1".into(),
    })
    .await
    .unwrap();
  let request = store
    .create_admin_request(NewAdminRequest {
      user_id:     "ad-1".into(),
      school_name: "Green Valley School".into(),
      school_id:   "school-1".into(),
      documents:   Default::default(),
    })
    .await
    .unwrap();
  request.request_id
}

#[tokio::test]
async fn approval_cascades_onto_the_admin_profile() {
  let store = store().await;
  let id = admin_with_request(&store).await;
  assert!(!store.get_admin("ad-1").await.unwrap().unwrap().is_approved);

  let approved = store.approve_admin_request(id, "root-1").await.unwrap();
  assert_eq!(approved.status, AdminRequestStatus::Approved);
  assert_eq!(approved.approved_by.as_deref(), Some("root-1"));

  let admin = store.get_admin("ad-1").await.unwrap().unwrap();
  assert!(admin.is_approved);
  assert_eq!(admin.approved_by.as_deref(), Some("root-1"));
  assert!(admin.approved_at.is_some());
}

#[tokio::test]
async fn approval_rolls_back_when_the_admin_profile_is_missing() {
  let store = store().await;
  // A request filed before (or without) the Admin profile.
  let request = store
    .create_admin_request(NewAdminRequest {
      user_id:     "ghost".into(),
      school_name: "Nowhere School".into(),
      school_id:   "school-x".into(),
      documents:   Default::default(),
    })
    .await
    .unwrap();

  let err = store
    .approve_admin_request(request.request_id, "root-1")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AdminNotFound(_))));

  // The request update was rolled back with the cascade.
  let stored = store
    .get_admin_request(request.request_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.status, AdminRequestStatus::Pending);
}

#[tokio::test]
async fn admin_request_outcomes_are_terminal() {
  let store = store().await;
  let id = admin_with_request(&store).await;

  store.approve_admin_request(id, "root-1").await.unwrap();
  let err = store
    .reject_admin_request(id, "root-1", "changed my mind")
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::InvalidAdminRequestTransition {
      from: AdminRequestStatus::Approved,
      to:   AdminRequestStatus::Rejected,
    })
  ));
}

#[tokio::test]
async fn rejection_leaves_the_admin_profile_untouched() {
  let store = store().await;
  let id = admin_with_request(&store).await;

  let rejected = store
    .reject_admin_request(id, "root-1", "certificate expired")
    .await
    .unwrap();
  assert_eq!(rejected.status, AdminRequestStatus::Rejected);
  assert_eq!(
    rejected.rejection_reason.as_deref(),
    Some("certificate expired")
  );

  assert!(!store.get_admin("ad-1").await.unwrap().unwrap().is_approved);
}

#[tokio::test]
async fn newest_request_wins_for_a_user() {
  let store = store().await;
  admin_with_request(&store).await;

  assert_eq!(store.pending_admin_requests().await.unwrap().len(), 1);
  let latest = store.admin_request_for_user("ad-1").await.unwrap().unwrap();
  assert_eq!(latest.user_id, "ad-1");
  assert!(
    store
      .admin_request_for_user("missing")
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Feedback ────────────────────────────────────────────────────────────────

async fn finished_match(store: &SqliteStore) -> Uuid {
  let id = one_match(store).await;
  store.confirm_match(id).await.unwrap();
  store.complete_match(id).await.unwrap();
  id
}

#[tokio::test]
async fn feedback_folds_into_the_running_mean() {
  let store = store().await;
  let match_id = finished_match(&store).await;

  store
    .add_feedback(NewFeedback {
      match_id,
      student_id: "st-1".into(),
      scribe_id: "sc-1".into(),
      rating: 4,
      comment: "patient and clear".into(),
      is_anonymous: false,
    })
    .await
    .unwrap();
  let scribe = store.get_scribe("sc-1").await.unwrap().unwrap();
  assert_eq!(scribe.rating, 4.0);
  assert_eq!(scribe.total_ratings, 1);

  store
    .add_feedback(NewFeedback {
      match_id,
      student_id: "st-1".into(),
      scribe_id: "sc-1".into(),
      rating: 5,
      comment: "".into(),
      is_anonymous: true,
    })
    .await
    .unwrap();
  let scribe = store.get_scribe("sc-1").await.unwrap().unwrap();
  assert_eq!(scribe.rating, 4.5);
  assert_eq!(scribe.total_ratings, 2);

  assert_eq!(store.feedback_for_scribe("sc-1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn feedback_requires_a_completed_match() {
  let store = store().await;
  let match_id = one_match(&store).await;

  let err = store
    .add_feedback(NewFeedback {
      match_id,
      student_id: "st-1".into(),
      scribe_id: "sc-1".into(),
      rating: 5,
      comment: "".into(),
      is_anonymous: false,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::MatchNotCompleted(_))));

  // Nothing was written: the scribe's counters are untouched.
  let scribe = store.get_scribe("sc-1").await.unwrap().unwrap();
  assert_eq!(scribe.total_ratings, 0);
}

#[tokio::test]
async fn feedback_rejects_out_of_scale_ratings() {
  let store = store().await;
  let match_id = finished_match(&store).await;

  let err = store
    .add_feedback(NewFeedback {
      match_id,
      student_id: "st-1".into(),
      scribe_id: "sc-1".into(),
      rating: 6,
      comment: "".into(),
      is_anonymous: false,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::RatingOutOfRange(6))));
}
