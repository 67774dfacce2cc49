//! The `PlatformStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `sahaya-store-sqlite`).
//! Higher layers (`sahaya-api`, `sahaya-server`) depend on this abstraction,
//! not on any concrete backend.
//!
//! Two fields are mutated by a component other than their natural workflow:
//! `Scribe::rating`/`total_ratings` (written only through [`add_feedback`])
//! and `Admin::is_approved` (written only through [`approve_admin_request`]).
//! Implementations must make both updates atomic — a transaction or
//! conditional update, not convention.
//!
//! [`add_feedback`]: PlatformStore::add_feedback
//! [`approve_admin_request`]: PlatformStore::approve_admin_request

use std::future::Future;

use uuid::Uuid;

use crate::{
  error::DomainError,
  matching::{Match, MatchPolicy},
  profile::{
    Admin, Availability, ExamDetails, NewAdmin, NewScribe, NewStudent,
    NewUser, Scribe, Student, User,
  },
  rating::{Feedback, NewFeedback},
  request::{AdminRequest, NewAdminRequest, NewScribeRequest, ScribeRequest},
};

/// Abstraction over a Sahaya storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). Timestamps are
/// always assigned by the store; generated ids are UUIDv4, profile ids come
/// from the identity provider.
pub trait PlatformStore: Send + Sync {
  type Error: DomainError + std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a base user with no role-specialised record (super-admins).
  /// Fails if the id is already registered.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a base user by id. Returns `None` if not found.
  fn get_user<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Soft-activate or deactivate a user. Profiles are never deleted.
  fn set_user_active<'a>(
    &'a self,
    user_id: &'a str,
    is_active: bool,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  // ── Students ──────────────────────────────────────────────────────────

  /// Create the base user (role `student`) and the student record in one
  /// transaction. Fails if the id is already registered.
  fn add_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  fn get_student<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + 'a;

  /// Replace the student's exam details.
  fn update_student_exam<'a>(
    &'a self,
    user_id: &'a str,
    exam: ExamDetails,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + 'a;

  // ── Scribes ───────────────────────────────────────────────────────────

  /// Create the base user (role `scribe`) and the scribe record in one
  /// transaction, with a zeroed rating.
  fn add_scribe(
    &self,
    input: NewScribe,
  ) -> impl Future<Output = Result<Scribe, Self::Error>> + Send + '_;

  fn get_scribe<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<Scribe>, Self::Error>> + Send + 'a;

  fn set_scribe_availability<'a>(
    &'a self,
    user_id: &'a str,
    availability: Availability,
  ) -> impl Future<Output = Result<Scribe, Self::Error>> + Send + 'a;

  /// The availability filter: active scribes with `availability ==
  /// available`, restricted to an exact location match when `location` is
  /// given, then post-filtered to any subject overlap when `subjects` is
  /// non-empty. An empty result is not an error.
  fn find_available_scribes<'a>(
    &'a self,
    subjects: &'a [String],
    location: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Scribe>, Self::Error>> + Send + 'a;

  // ── Admins ────────────────────────────────────────────────────────────

  /// Create the base user (role `admin`) and the admin record in one
  /// transaction, unapproved.
  fn add_admin(
    &self,
    input: NewAdmin,
  ) -> impl Future<Output = Result<Admin, Self::Error>> + Send + '_;

  fn get_admin<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<Admin>, Self::Error>> + Send + 'a;

  // ── Matches ───────────────────────────────────────────────────────────

  /// Create ranked matches for a student: filter candidates, score them
  /// against the supplied exam (not the profile's stored copy), keep the
  /// top [`MatchPolicy::top_n`], persist all of them atomically in state
  /// `matched`.
  ///
  /// Fails with StudentNotFound if the student does not exist and
  /// NoCandidates if the filter returns empty.
  fn propose_matches<'a>(
    &'a self,
    student_id: &'a str,
    exam: ExamDetails,
    location: Option<&'a str>,
    policy: &'a MatchPolicy,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + 'a;

  fn get_match(
    &self,
    match_id: Uuid,
  ) -> impl Future<Output = Result<Option<Match>, Self::Error>> + Send + '_;

  /// All matches for a student, newest first.
  fn matches_for_student<'a>(
    &'a self,
    student_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + 'a;

  /// All matches for a scribe, newest first.
  fn matches_for_scribe<'a>(
    &'a self,
    scribe_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Match>, Self::Error>> + Send + 'a;

  /// `matched → confirmed`, stamping the confirmation timestamp. Rejects
  /// any other starting state.
  fn confirm_match(
    &self,
    match_id: Uuid,
  ) -> impl Future<Output = Result<Match, Self::Error>> + Send + '_;

  /// `confirmed → completed`, stamping the completion timestamp. Feedback
  /// becomes admissible afterwards.
  fn complete_match(
    &self,
    match_id: Uuid,
  ) -> impl Future<Output = Result<Match, Self::Error>> + Send + '_;

  /// Terminal escape hatch from `matched` or `confirmed`.
  fn cancel_match(
    &self,
    match_id: Uuid,
    reason: Option<String>,
  ) -> impl Future<Output = Result<Match, Self::Error>> + Send + '_;

  // ── Scribe requests ───────────────────────────────────────────────────

  /// Create a pending pairing request. Both profiles must exist; the match
  /// score is computed here via the scorer, against the exam in the input.
  fn create_scribe_request<'a>(
    &'a self,
    input: NewScribeRequest,
    policy: &'a MatchPolicy,
  ) -> impl Future<Output = Result<ScribeRequest, Self::Error>> + Send + 'a;

  fn get_scribe_request(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<Option<ScribeRequest>, Self::Error>> + Send + '_;

  /// All pending requests, newest first.
  fn pending_scribe_requests(
    &self,
  ) -> impl Future<Output = Result<Vec<ScribeRequest>, Self::Error>> + Send + '_;

  /// Requests assigned to an approving admin, newest first.
  fn scribe_requests_for_admin<'a>(
    &'a self,
    admin_id: &'a str,
  ) -> impl Future<Output = Result<Vec<ScribeRequest>, Self::Error>> + Send + 'a;

  /// `pending → approved`, recording approver and timestamp. Rejects
  /// terminal requests.
  fn approve_scribe_request<'a>(
    &'a self,
    request_id: Uuid,
    approved_by: &'a str,
  ) -> impl Future<Output = Result<ScribeRequest, Self::Error>> + Send + 'a;

  /// `pending → rejected` with an audit trail. The reason must be
  /// non-blank.
  fn reject_scribe_request<'a>(
    &'a self,
    request_id: Uuid,
    rejected_by: &'a str,
    reason: &'a str,
  ) -> impl Future<Output = Result<ScribeRequest, Self::Error>> + Send + 'a;

  /// `approved → completed` once the session has finished.
  fn complete_scribe_request(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<ScribeRequest, Self::Error>> + Send + '_;

  // ── Admin requests ────────────────────────────────────────────────────

  /// Persist a pending access request. Duplicate requests for the same
  /// user are structurally possible.
  fn create_admin_request(
    &self,
    input: NewAdminRequest,
  ) -> impl Future<Output = Result<AdminRequest, Self::Error>> + Send + '_;

  fn get_admin_request(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<Option<AdminRequest>, Self::Error>> + Send + '_;

  /// The newest request filed by a user, if any.
  fn admin_request_for_user<'a>(
    &'a self,
    user_id: &'a str,
  ) -> impl Future<Output = Result<Option<AdminRequest>, Self::Error>> + Send + 'a;

  /// All pending requests, newest first.
  fn pending_admin_requests(
    &self,
  ) -> impl Future<Output = Result<Vec<AdminRequest>, Self::Error>> + Send + '_;

  /// `pending → approved` AND `Admin::is_approved = true`, as one atomic
  /// step. If the Admin profile is missing, nothing is written and
  /// AdminNotFound is returned — the request is never left approved with an
  /// unapproved admin.
  fn approve_admin_request<'a>(
    &'a self,
    request_id: Uuid,
    super_admin_id: &'a str,
  ) -> impl Future<Output = Result<AdminRequest, Self::Error>> + Send + 'a;

  /// `pending → rejected` with an audit trail; the Admin profile is left
  /// untouched. The reason must be non-blank.
  fn reject_admin_request<'a>(
    &'a self,
    request_id: Uuid,
    rejected_by: &'a str,
    reason: &'a str,
  ) -> impl Future<Output = Result<AdminRequest, Self::Error>> + Send + 'a;

  // ── Feedback ──────────────────────────────────────────────────────────

  /// Record feedback for a completed match and fold the rating into the
  /// scribe's running mean, atomically.
  fn add_feedback(
    &self,
    input: NewFeedback,
  ) -> impl Future<Output = Result<Feedback, Self::Error>> + Send + '_;

  /// All feedback left for a scribe, newest first.
  fn feedback_for_scribe<'a>(
    &'a self,
    scribe_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Feedback>, Self::Error>> + Send + 'a;
}
