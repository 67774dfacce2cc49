//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Structured fields
//! (ExamDetails, Disability, AdminDocuments, string lists) are stored as
//! compact JSON. UUIDs are stored as hyphenated lowercase strings; statuses
//! and role tags as their lowercase discriminants.

use chrono::{DateTime, Utc};
use sahaya_core::{
  matching::{Match, MatchStatus},
  profile::{
    Admin, Availability, Disability, ExamDetails, Role, Scribe, Student, User,
  },
  rating::Feedback,
  request::{
    AdminDocuments, AdminRequest, AdminRequestStatus, ScribeRequest,
    ScribeRequestStatus,
  },
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::Student => "student",
    Role::Scribe => "scribe",
    Role::Admin => "admin",
    Role::SuperAdmin => "superadmin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "student" => Ok(Role::Student),
    "scribe" => Ok(Role::Scribe),
    "admin" => Ok(Role::Admin),
    "superadmin" => Ok(Role::SuperAdmin),
    other => Err(sahaya_core::Error::UnknownStatus(other.to_string()).into()),
  }
}

// ─── Availability ─────────────────────────────────────────────────────────────

pub fn encode_availability(a: Availability) -> &'static str {
  match a {
    Availability::Available => "available",
    Availability::Busy => "busy",
    Availability::Inactive => "inactive",
  }
}

pub fn decode_availability(s: &str) -> Result<Availability> {
  match s {
    "available" => Ok(Availability::Available),
    "busy" => Ok(Availability::Busy),
    "inactive" => Ok(Availability::Inactive),
    other => Err(sahaya_core::Error::UnknownStatus(other.to_string()).into()),
  }
}

// ─── Statuses ─────────────────────────────────────────────────────────────────

pub fn encode_match_status(s: MatchStatus) -> &'static str {
  match s {
    MatchStatus::Matched => "matched",
    MatchStatus::Confirmed => "confirmed",
    MatchStatus::Completed => "completed",
    MatchStatus::Cancelled => "cancelled",
  }
}

pub fn decode_match_status(s: &str) -> Result<MatchStatus> {
  match s {
    "matched" => Ok(MatchStatus::Matched),
    "confirmed" => Ok(MatchStatus::Confirmed),
    "completed" => Ok(MatchStatus::Completed),
    "cancelled" => Ok(MatchStatus::Cancelled),
    other => Err(sahaya_core::Error::UnknownStatus(other.to_string()).into()),
  }
}

pub fn encode_scribe_request_status(s: ScribeRequestStatus) -> &'static str {
  match s {
    ScribeRequestStatus::Pending => "pending",
    ScribeRequestStatus::Approved => "approved",
    ScribeRequestStatus::Rejected => "rejected",
    ScribeRequestStatus::Completed => "completed",
  }
}

pub fn decode_scribe_request_status(s: &str) -> Result<ScribeRequestStatus> {
  match s {
    "pending" => Ok(ScribeRequestStatus::Pending),
    "approved" => Ok(ScribeRequestStatus::Approved),
    "rejected" => Ok(ScribeRequestStatus::Rejected),
    "completed" => Ok(ScribeRequestStatus::Completed),
    other => Err(sahaya_core::Error::UnknownStatus(other.to_string()).into()),
  }
}

pub fn encode_admin_request_status(s: AdminRequestStatus) -> &'static str {
  match s {
    AdminRequestStatus::Pending => "pending",
    AdminRequestStatus::Approved => "approved",
    AdminRequestStatus::Rejected => "rejected",
  }
}

pub fn decode_admin_request_status(s: &str) -> Result<AdminRequestStatus> {
  match s {
    "pending" => Ok(AdminRequestStatus::Pending),
    "approved" => Ok(AdminRequestStatus::Approved),
    "rejected" => Ok(AdminRequestStatus::Rejected),
    other => Err(sahaya_core::Error::UnknownStatus(other.to_string()).into()),
  }
}

// ─── JSON columns ─────────────────────────────────────────────────────────────

pub fn encode_strings(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_strings(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_exam_details(e: &ExamDetails) -> Result<String> {
  Ok(serde_json::to_string(e)?)
}

pub fn decode_exam_details(s: &str) -> Result<ExamDetails> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_disability(d: &Disability) -> Result<String> {
  Ok(serde_json::to_string(d)?)
}

pub fn decode_disability(s: &str) -> Result<Disability> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_documents(d: &AdminDocuments) -> Result<String> {
  Ok(serde_json::to_string(d)?)
}

pub fn decode_documents(s: &str) -> Result<AdminDocuments> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub name:       String,
  pub email:      Option<String>,
  pub role:       String,
  pub is_active:  bool,
  pub created_at: String,
  pub updated_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    self.user_id,
      name:       self.name,
      email:      self.email,
      role:       decode_role(&self.role)?,
      is_active:  self.is_active,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// A `students` row joined with its `users` row for the timestamps.
pub struct RawStudent {
  pub user_id:      String,
  pub class:        String,
  pub subjects:     String,
  pub exam_details: Option<String>,
  pub disability:   String,
  pub school_id:    Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawStudent {
  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      user_id:      self.user_id,
      class:        self.class,
      subjects:     decode_strings(&self.subjects)?,
      exam_details: self
        .exam_details
        .as_deref()
        .map(decode_exam_details)
        .transpose()?,
      disability:   decode_disability(&self.disability)?,
      school_id:    self.school_id,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// A `scribes` row joined with its `users` row for the timestamps.
pub struct RawScribe {
  pub user_id:       String,
  pub subjects:      String,
  pub experience:    String,
  pub rating:        f64,
  pub total_ratings: i64,
  pub exam_types:    String,
  pub location:      String,
  pub languages:     String,
  pub availability:  String,
  pub gender:        String,
  pub age:           i64,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawScribe {
  pub fn into_scribe(self) -> Result<Scribe> {
    Ok(Scribe {
      user_id:       self.user_id,
      subjects:      decode_strings(&self.subjects)?,
      experience:    self.experience,
      rating:        self.rating,
      total_ratings: self.total_ratings as u32,
      exam_types:    decode_strings(&self.exam_types)?,
      location:      self.location,
      languages:     decode_strings(&self.languages)?,
      availability:  decode_availability(&self.availability)?,
      gender:        self.gender,
      age:           self.age as u32,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// An `admins` row joined with its `users` row for the timestamps.
pub struct RawAdmin {
  pub user_id:     String,
  pub school_name: String,
  pub school_id:   String,
  pub is_approved: bool,
  pub approved_by: Option<String>,
  pub approved_at: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawAdmin {
  pub fn into_admin(self) -> Result<Admin> {
    Ok(Admin {
      user_id:     self.user_id,
      school_name: self.school_name,
      school_id:   self.school_id,
      is_approved: self.is_approved,
      approved_by: self.approved_by,
      approved_at: decode_dt_opt(self.approved_at.as_deref())?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `matches` row.
pub struct RawMatch {
  pub match_id:      String,
  pub student_id:    String,
  pub scribe_id:     String,
  pub exam_details:  String,
  pub match_score:   i64,
  pub status:        String,
  pub created_at:    String,
  pub confirmed_at:  Option<String>,
  pub completed_at:  Option<String>,
  pub cancelled_at:  Option<String>,
  pub cancel_reason: Option<String>,
}

impl RawMatch {
  pub fn into_match(self) -> Result<Match> {
    Ok(Match {
      match_id:      decode_uuid(&self.match_id)?,
      student_id:    self.student_id,
      scribe_id:     self.scribe_id,
      exam_details:  decode_exam_details(&self.exam_details)?,
      match_score:   self.match_score as u8,
      status:        decode_match_status(&self.status)?,
      created_at:    decode_dt(&self.created_at)?,
      confirmed_at:  decode_dt_opt(self.confirmed_at.as_deref())?,
      completed_at:  decode_dt_opt(self.completed_at.as_deref())?,
      cancelled_at:  decode_dt_opt(self.cancelled_at.as_deref())?,
      cancel_reason: self.cancel_reason,
    })
  }
}

/// Raw strings read directly from a `scribe_requests` row.
pub struct RawScribeRequest {
  pub request_id:       String,
  pub student_id:       String,
  pub scribe_id:        String,
  pub exam_details:     String,
  pub match_score:      i64,
  pub admin_id:         Option<String>,
  pub status:           String,
  pub approved_by:      Option<String>,
  pub approved_at:      Option<String>,
  pub rejected_by:      Option<String>,
  pub rejected_at:      Option<String>,
  pub rejection_reason: Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawScribeRequest {
  pub fn into_request(self) -> Result<ScribeRequest> {
    Ok(ScribeRequest {
      request_id:       decode_uuid(&self.request_id)?,
      student_id:       self.student_id,
      scribe_id:        self.scribe_id,
      exam_details:     decode_exam_details(&self.exam_details)?,
      match_score:      self.match_score as u8,
      admin_id:         self.admin_id,
      status:           decode_scribe_request_status(&self.status)?,
      approved_by:      self.approved_by,
      approved_at:      decode_dt_opt(self.approved_at.as_deref())?,
      rejected_by:      self.rejected_by,
      rejected_at:      decode_dt_opt(self.rejected_at.as_deref())?,
      rejection_reason: self.rejection_reason,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from an `admin_requests` row.
pub struct RawAdminRequest {
  pub request_id:       String,
  pub user_id:          String,
  pub school_name:      String,
  pub school_id:        String,
  pub documents:        String,
  pub status:           String,
  pub approved_by:      Option<String>,
  pub approved_at:      Option<String>,
  pub rejected_by:      Option<String>,
  pub rejected_at:      Option<String>,
  pub rejection_reason: Option<String>,
  pub requested_at:     String,
}

impl RawAdminRequest {
  pub fn into_request(self) -> Result<AdminRequest> {
    Ok(AdminRequest {
      request_id:       decode_uuid(&self.request_id)?,
      user_id:          self.user_id,
      school_name:      self.school_name,
      school_id:        self.school_id,
      documents:        decode_documents(&self.documents)?,
      status:           decode_admin_request_status(&self.status)?,
      approved_by:      self.approved_by,
      approved_at:      decode_dt_opt(self.approved_at.as_deref())?,
      rejected_by:      self.rejected_by,
      rejected_at:      decode_dt_opt(self.rejected_at.as_deref())?,
      rejection_reason: self.rejection_reason,
      requested_at:     decode_dt(&self.requested_at)?,
    })
  }
}

/// Raw strings read directly from a `feedback` row.
pub struct RawFeedback {
  pub feedback_id:  String,
  pub match_id:     String,
  pub student_id:   String,
  pub scribe_id:    String,
  pub rating:       i64,
  pub comment:      String,
  pub is_anonymous: bool,
  pub created_at:   String,
}

impl RawFeedback {
  pub fn into_feedback(self) -> Result<Feedback> {
    Ok(Feedback {
      feedback_id:  decode_uuid(&self.feedback_id)?,
      match_id:     decode_uuid(&self.match_id)?,
      student_id:   self.student_id,
      scribe_id:    self.scribe_id,
      rating:       self.rating as u8,
      comment:      self.comment,
      is_anonymous: self.is_anonymous,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
