//! Profile types — the role-specialised records the platform matches over.
//!
//! Profile ids are opaque strings minted by the external identity provider;
//! the core trusts them verbatim. Each user has exactly one base [`User`]
//! record and at most one role-specialised record, created together. Role is
//! immutable after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Role ────────────────────────────────────────────────────────────────────

/// The role tag fixed at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Student,
  Scribe,
  Admin,
  SuperAdmin,
}

// ─── User ────────────────────────────────────────────────────────────────────

/// Base identity record shared by all roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  /// Identity-provider id; also the key of the role-specialised record.
  pub user_id:    String,
  pub name:       String,
  pub email:      Option<String>,
  pub role:       Role,
  /// Profiles are never deleted, only deactivated.
  pub is_active:  bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::PlatformStore::add_user`]. Timestamps are always
/// set by the store; they are not accepted from callers.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
  pub user_id: String,
  pub name:    String,
  pub email:   Option<String>,
  pub role:    Role,
}

// ─── Exam details ────────────────────────────────────────────────────────────

/// What a student needs a scribe for. Shared verbatim by student profiles,
/// matches, and scribe requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamDetails {
  pub exam_name:         String,
  pub exam_type:         String,
  /// Free-form date/time strings as entered by the student; the core never
  /// schedules anything off them.
  pub exam_date:         String,
  pub exam_time:         String,
  pub location:          String,
  pub language:          String,
  pub gender_preference: Option<String>,
  #[serde(default)]
  pub subjects:          Vec<String>,
}

/// Disability descriptor carried on the student profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disability {
  pub kind:        String,
  pub description: Option<String>,
}

// ─── Student ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
  pub user_id:      String,
  pub class:        String,
  pub subjects:     Vec<String>,
  pub exam_details: Option<ExamDetails>,
  pub disability:   Disability,
  pub school_id:    Option<String>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Input to [`crate::store::PlatformStore::add_student`]. Creates the base
/// [`User`] (role `student`) and the student record together.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
  pub user_id:      String,
  pub name:         String,
  pub email:        Option<String>,
  pub class:        String,
  #[serde(default)]
  pub subjects:     Vec<String>,
  pub exam_details: Option<ExamDetails>,
  pub disability:   Disability,
  pub school_id:    Option<String>,
}

// ─── Scribe ──────────────────────────────────────────────────────────────────

/// Whether a scribe can currently take on exams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
  Available,
  Busy,
  Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scribe {
  pub user_id:       String,
  pub subjects:      Vec<String>,
  pub experience:    String,
  /// Running mean of feedback ratings, one decimal. Written only by the
  /// rating aggregator.
  pub rating:        f64,
  pub total_ratings: u32,
  pub exam_types:    Vec<String>,
  pub location:      String,
  pub languages:     Vec<String>,
  pub availability:  Availability,
  pub gender:        String,
  pub age:           u32,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Input to [`crate::store::PlatformStore::add_scribe`]. Rating starts at
/// zero with zero submissions.
#[derive(Debug, Clone, Deserialize)]
pub struct NewScribe {
  pub user_id:      String,
  pub name:         String,
  pub email:        Option<String>,
  #[serde(default)]
  pub subjects:     Vec<String>,
  pub experience:   String,
  #[serde(default)]
  pub exam_types:   Vec<String>,
  pub location:     String,
  pub languages:    Vec<String>,
  pub availability: Availability,
  pub gender:       String,
  pub age:          u32,
}

// ─── Admin ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
  pub user_id:     String,
  pub school_name: String,
  pub school_id:   String,
  /// False until an [`crate::request::AdminRequest`] for this user is
  /// approved by a super-admin; the admin-request workflow is the sole
  /// writer.
  pub is_approved: bool,
  pub approved_by: Option<String>,
  pub approved_at: Option<DateTime<Utc>>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::PlatformStore::add_admin`]. Always starts
/// unapproved.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdmin {
  pub user_id:     String,
  pub name:        String,
  pub email:       Option<String>,
  pub school_name: String,
  pub school_id:   String,
}
