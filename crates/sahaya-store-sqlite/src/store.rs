//! [`SqliteStore`] — the SQLite implementation of [`PlatformStore`].
//!
//! Guarded status transitions are single conditional UPDATEs (the allowed
//! source states come from the core transition tables), and the two
//! cross-entity writes — the admin-approval cascade and the rating fold —
//! run inside explicit transactions so a partial write can never be
//! observed.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use sahaya_core::{
  Error as CoreError,
  matching::{Match, MatchPolicy, MatchStatus, rank_candidates},
  profile::{
    Admin, Availability, ExamDetails, NewAdmin, NewScribe, NewStudent,
    NewUser, Scribe, Student, User,
  },
  rating::{Feedback, NewFeedback, fold_rating, validate_rating},
  request::{
    AdminRequest, AdminRequestStatus, NewAdminRequest, NewScribeRequest,
    ScribeRequest, ScribeRequestStatus,
  },
  store::PlatformStore,
};

use crate::{
  Error, Result,
  encode::{
    RawAdmin, RawAdminRequest, RawFeedback, RawMatch, RawScribe,
    RawScribeRequest, RawStudent, RawUser, encode_admin_request_status,
    encode_availability, encode_disability, encode_documents, encode_dt,
    encode_exam_details, encode_match_status, encode_role,
    encode_scribe_request_status, encode_strings, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Column lists ────────────────────────────────────────────────────────────

const USER_COLS: &str =
  "user_id, name, email, role, is_active, created_at, updated_at";

const STUDENT_COLS: &str = "s.user_id, s.class, s.subjects, s.exam_details, \
   s.disability, s.school_id, u.created_at, u.updated_at";

const SCRIBE_COLS: &str = "s.user_id, s.subjects, s.experience, s.rating, \
   s.total_ratings, s.exam_types, s.location, s.languages, s.availability, \
   s.gender, s.age, u.created_at, u.updated_at";

const ADMIN_COLS: &str = "a.user_id, a.school_name, a.school_id, \
   a.is_approved, a.approved_by, a.approved_at, u.created_at, u.updated_at";

const MATCH_COLS: &str = "match_id, student_id, scribe_id, exam_details, \
   match_score, status, created_at, confirmed_at, completed_at, \
   cancelled_at, cancel_reason";

const SCRIBE_REQUEST_COLS: &str = "request_id, student_id, scribe_id, \
   exam_details, match_score, admin_id, status, approved_by, approved_at, \
   rejected_by, rejected_at, rejection_reason, created_at, updated_at";

const ADMIN_REQUEST_COLS: &str = "request_id, user_id, school_name, \
   school_id, documents, status, approved_by, approved_at, rejected_by, \
   rejected_at, rejection_reason, requested_at";

const FEEDBACK_COLS: &str = "feedback_id, match_id, student_id, scribe_id, \
   rating, comment, is_anonymous, created_at";

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:    row.get(0)?,
    name:       row.get(1)?,
    email:      row.get(2)?,
    role:       row.get(3)?,
    is_active:  row.get(4)?,
    created_at: row.get(5)?,
    updated_at: row.get(6)?,
  })
}

fn student_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawStudent> {
  Ok(RawStudent {
    user_id:      row.get(0)?,
    class:        row.get(1)?,
    subjects:     row.get(2)?,
    exam_details: row.get(3)?,
    disability:   row.get(4)?,
    school_id:    row.get(5)?,
    created_at:   row.get(6)?,
    updated_at:   row.get(7)?,
  })
}

fn scribe_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawScribe> {
  Ok(RawScribe {
    user_id:       row.get(0)?,
    subjects:      row.get(1)?,
    experience:    row.get(2)?,
    rating:        row.get(3)?,
    total_ratings: row.get(4)?,
    exam_types:    row.get(5)?,
    location:      row.get(6)?,
    languages:     row.get(7)?,
    availability:  row.get(8)?,
    gender:        row.get(9)?,
    age:           row.get(10)?,
    created_at:    row.get(11)?,
    updated_at:    row.get(12)?,
  })
}

fn admin_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAdmin> {
  Ok(RawAdmin {
    user_id:     row.get(0)?,
    school_name: row.get(1)?,
    school_id:   row.get(2)?,
    is_approved: row.get(3)?,
    approved_by: row.get(4)?,
    approved_at: row.get(5)?,
    created_at:  row.get(6)?,
    updated_at:  row.get(7)?,
  })
}

fn match_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMatch> {
  Ok(RawMatch {
    match_id:      row.get(0)?,
    student_id:    row.get(1)?,
    scribe_id:     row.get(2)?,
    exam_details:  row.get(3)?,
    match_score:   row.get(4)?,
    status:        row.get(5)?,
    created_at:    row.get(6)?,
    confirmed_at:  row.get(7)?,
    completed_at:  row.get(8)?,
    cancelled_at:  row.get(9)?,
    cancel_reason: row.get(10)?,
  })
}

fn scribe_request_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawScribeRequest> {
  Ok(RawScribeRequest {
    request_id:       row.get(0)?,
    student_id:       row.get(1)?,
    scribe_id:        row.get(2)?,
    exam_details:     row.get(3)?,
    match_score:      row.get(4)?,
    admin_id:         row.get(5)?,
    status:           row.get(6)?,
    approved_by:      row.get(7)?,
    approved_at:      row.get(8)?,
    rejected_by:      row.get(9)?,
    rejected_at:      row.get(10)?,
    rejection_reason: row.get(11)?,
    created_at:       row.get(12)?,
    updated_at:       row.get(13)?,
  })
}

fn admin_request_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawAdminRequest> {
  Ok(RawAdminRequest {
    request_id:       row.get(0)?,
    user_id:          row.get(1)?,
    school_name:      row.get(2)?,
    school_id:        row.get(3)?,
    documents:        row.get(4)?,
    status:           row.get(5)?,
    approved_by:      row.get(6)?,
    approved_at:      row.get(7)?,
    rejected_by:      row.get(8)?,
    rejected_at:      row.get(9)?,
    rejection_reason: row.get(10)?,
    requested_at:     row.get(11)?,
  })
}

fn feedback_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawFeedback> {
  Ok(RawFeedback {
    feedback_id:  row.get(0)?,
    match_id:     row.get(1)?,
    student_id:   row.get(2)?,
    scribe_id:    row.get(3)?,
    rating:       row.get(4)?,
    comment:      row.get(5)?,
    is_anonymous: row.get(6)?,
    created_at:   row.get(7)?,
  })
}

// ─── Transition sources ──────────────────────────────────────────────────────

// The WHERE guards below are derived from the core transition tables, so the
// tables stay the single source of truth for what a conditional UPDATE may
// touch. The produced fragments contain only fixed discriminants.

fn match_sources(to: MatchStatus) -> String {
  use MatchStatus::*;
  [Matched, Confirmed, Completed, Cancelled]
    .into_iter()
    .filter(|s| s.can_transition_to(to))
    .map(|s| format!("'{}'", encode_match_status(s)))
    .collect::<Vec<_>>()
    .join(", ")
}

fn scribe_request_sources(to: ScribeRequestStatus) -> String {
  use ScribeRequestStatus::*;
  [Pending, Approved, Rejected, Completed]
    .into_iter()
    .filter(|s| s.can_transition_to(to))
    .map(|s| format!("'{}'", encode_scribe_request_status(s)))
    .collect::<Vec<_>>()
    .join(", ")
}

fn admin_request_sources(to: AdminRequestStatus) -> String {
  use AdminRequestStatus::*;
  [Pending, Approved, Rejected]
    .into_iter()
    .filter(|s| s.can_transition_to(to))
    .map(|s| format!("'{}'", encode_admin_request_status(s)))
    .collect::<Vec<_>>()
    .join(", ")
}

/// Insert the base user row inside a transaction. Returns `false` without
/// writing anything if the id is already registered.
fn insert_user_tx(
  tx:      &rusqlite::Transaction<'_>,
  user_id: &str,
  name:    &str,
  email:   Option<&str>,
  role:    &str,
  now:     &str,
) -> rusqlite::Result<bool> {
  let exists: bool = tx
    .query_row(
      "SELECT 1 FROM users WHERE user_id = ?1",
      rusqlite::params![user_id],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);

  if exists {
    return Ok(false);
  }

  tx.execute(
    "INSERT INTO users (user_id, name, email, role, is_active, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
    rusqlite::params![user_id, name, email, role, now],
  )?;
  Ok(true)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Sahaya platform store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Conditional status update for a match: applies the transition only when
  /// the current status may legally reach `to`, then reports what happened.
  async fn transition_match(
    &self,
    match_id:  Uuid,
    to:        MatchStatus,
    stamp_col: &'static str,
    reason:    Option<String>,
  ) -> Result<Match> {
    let id_str  = encode_uuid(match_id);
    let now_str = encode_dt(Utc::now());
    let to_str  = encode_match_status(to);
    let sources = match_sources(to);

    let (updated, raw): (bool, Option<RawMatch>) = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "UPDATE matches
           SET status = ?1, {stamp_col} = ?2,
               cancel_reason = COALESCE(?3, cancel_reason)
           WHERE match_id = ?4 AND status IN ({sources})"
        );
        let n = conn.execute(
          &sql,
          rusqlite::params![to_str, now_str, reason, id_str],
        )?;

        let raw = conn
          .query_row(
            &format!("SELECT {MATCH_COLS} FROM matches WHERE match_id = ?1"),
            rusqlite::params![id_str],
            match_from_row,
          )
          .optional()?;

        Ok((n == 1, raw))
      })
      .await?;

    match raw {
      None => Err(CoreError::MatchNotFound(match_id).into()),
      Some(raw) => {
        let m = raw.into_match()?;
        if updated {
          Ok(m)
        } else {
          Err(
            CoreError::InvalidMatchTransition { from: m.status, to }.into(),
          )
        }
      }
    }
  }

  fn classify_scribe_request(
    request_id: Uuid,
    to:         ScribeRequestStatus,
    updated:    bool,
    raw:        Option<RawScribeRequest>,
  ) -> Result<ScribeRequest> {
    match raw {
      None => Err(CoreError::RequestNotFound(request_id).into()),
      Some(raw) => {
        let r = raw.into_request()?;
        if updated {
          Ok(r)
        } else {
          Err(
            CoreError::InvalidScribeRequestTransition {
              from: r.status,
              to,
            }
            .into(),
          )
        }
      }
    }
  }

  fn classify_admin_request(
    request_id: Uuid,
    to:         AdminRequestStatus,
    updated:    bool,
    raw:        Option<RawAdminRequest>,
  ) -> Result<AdminRequest> {
    match raw {
      None => Err(CoreError::RequestNotFound(request_id).into()),
      Some(raw) => {
        let r = raw.into_request()?;
        if updated {
          Ok(r)
        } else {
          Err(
            CoreError::InvalidAdminRequestTransition { from: r.status, to }
              .into(),
          )
        }
      }
    }
  }
}

// ─── Internal outcomes ───────────────────────────────────────────────────────

/// Result of the admin-approval transaction, carried out of the database
/// closure so the domain error can be produced on the async side.
enum AdminApproval {
  Applied(RawAdminRequest),
  NotApplied(Option<RawAdminRequest>),
  /// The cascade target was missing; the transaction was rolled back.
  AdminMissing(String),
}

/// Result of the feedback transaction.
enum FeedbackApplied {
  Applied,
  MatchMissing,
  MatchNotCompleted,
  ScribeMissing,
}

// ─── PlatformStore impl ──────────────────────────────────────────────────────

impl PlatformStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let now = Utc::now();
    let user = User {
      user_id:    input.user_id,
      name:       input.name,
      email:      input.email,
      role:       input.role,
      is_active:  true,
      created_at: now,
      updated_at: now,
    };

    let user_id  = user.user_id.clone();
    let name     = user.name.clone();
    let email    = user.email.clone();
    let role_str = encode_role(user.role).to_owned();
    let now_str  = encode_dt(now);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = insert_user_tx(
          &tx,
          &user_id,
          &name,
          email.as_deref(),
          &role_str,
          &now_str,
        )?;
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    if !inserted {
      return Err(CoreError::UserAlreadyExists(user.user_id).into());
    }
    Ok(user)
  }

  async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
    let id = user_id.to_owned();
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn set_user_active(
    &self,
    user_id:   &str,
    is_active: bool,
  ) -> Result<User> {
    let id      = user_id.to_owned();
    let now_str = encode_dt(Utc::now());

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET is_active = ?1, updated_at = ?2 WHERE user_id = ?3",
          rusqlite::params![is_active, now_str, id],
        )?;
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some(raw) => raw.into_user(),
      None => Err(CoreError::UserNotFound(user_id.to_owned()).into()),
    }
  }

  // ── Students ──────────────────────────────────────────────────────────────

  async fn add_student(&self, input: NewStudent) -> Result<Student> {
    let now = Utc::now();
    let student = Student {
      user_id:      input.user_id.clone(),
      class:        input.class,
      subjects:     input.subjects,
      exam_details: input.exam_details,
      disability:   input.disability,
      school_id:    input.school_id,
      created_at:   now,
      updated_at:   now,
    };

    let user_id      = student.user_id.clone();
    let name         = input.name;
    let email        = input.email;
    let now_str      = encode_dt(now);
    let class        = student.class.clone();
    let subjects     = encode_strings(&student.subjects)?;
    let exam         = student
      .exam_details
      .as_ref()
      .map(encode_exam_details)
      .transpose()?;
    let disability   = encode_disability(&student.disability)?;
    let school_id    = student.school_id.clone();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !insert_user_tx(
          &tx,
          &user_id,
          &name,
          email.as_deref(),
          "student",
          &now_str,
        )? {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO students (user_id, class, subjects, exam_details, disability, school_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![user_id, class, subjects, exam, disability, school_id],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(CoreError::UserAlreadyExists(student.user_id).into());
    }
    Ok(student)
  }

  async fn get_student(&self, user_id: &str) -> Result<Option<Student>> {
    let id = user_id.to_owned();
    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {STUDENT_COLS} FROM students s
                 JOIN users u ON u.user_id = s.user_id
                 WHERE s.user_id = ?1"
              ),
              rusqlite::params![id],
              student_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn update_student_exam(
    &self,
    user_id: &str,
    exam:    ExamDetails,
  ) -> Result<Student> {
    let id       = user_id.to_owned();
    let exam_str = encode_exam_details(&exam)?;
    let now_str  = encode_dt(Utc::now());

    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE students SET exam_details = ?1 WHERE user_id = ?2",
          rusqlite::params![exam_str, id],
        )?;
        if n == 1 {
          conn.execute(
            "UPDATE users SET updated_at = ?1 WHERE user_id = ?2",
            rusqlite::params![now_str, id],
          )?;
        }
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {STUDENT_COLS} FROM students s
                 JOIN users u ON u.user_id = s.user_id
                 WHERE s.user_id = ?1"
              ),
              rusqlite::params![id],
              student_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some(raw) => raw.into_student(),
      None => Err(CoreError::StudentNotFound(user_id.to_owned()).into()),
    }
  }

  // ── Scribes ───────────────────────────────────────────────────────────────

  async fn add_scribe(&self, input: NewScribe) -> Result<Scribe> {
    let now = Utc::now();
    let scribe = Scribe {
      user_id:       input.user_id.clone(),
      subjects:      input.subjects,
      experience:    input.experience,
      rating:        0.0,
      total_ratings: 0,
      exam_types:    input.exam_types,
      location:      input.location,
      languages:     input.languages,
      availability:  input.availability,
      gender:        input.gender,
      age:           input.age,
      created_at:    now,
      updated_at:    now,
    };

    let user_id      = scribe.user_id.clone();
    let name         = input.name;
    let email        = input.email;
    let now_str      = encode_dt(now);
    let subjects     = encode_strings(&scribe.subjects)?;
    let experience   = scribe.experience.clone();
    let exam_types   = encode_strings(&scribe.exam_types)?;
    let location     = scribe.location.clone();
    let languages    = encode_strings(&scribe.languages)?;
    let availability = encode_availability(scribe.availability).to_owned();
    let gender       = scribe.gender.clone();
    let age          = scribe.age as i64;

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !insert_user_tx(
          &tx,
          &user_id,
          &name,
          email.as_deref(),
          "scribe",
          &now_str,
        )? {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO scribes (user_id, subjects, experience, rating, total_ratings,
                                exam_types, location, languages, availability, gender, age)
           VALUES (?1, ?2, ?3, 0, 0, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            user_id, subjects, experience, exam_types, location, languages,
            availability, gender, age,
          ],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(CoreError::UserAlreadyExists(scribe.user_id).into());
    }
    Ok(scribe)
  }

  async fn get_scribe(&self, user_id: &str) -> Result<Option<Scribe>> {
    let id = user_id.to_owned();
    let raw: Option<RawScribe> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SCRIBE_COLS} FROM scribes s
                 JOIN users u ON u.user_id = s.user_id
                 WHERE s.user_id = ?1"
              ),
              rusqlite::params![id],
              scribe_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawScribe::into_scribe).transpose()
  }

  async fn set_scribe_availability(
    &self,
    user_id:      &str,
    availability: Availability,
  ) -> Result<Scribe> {
    let id       = user_id.to_owned();
    let av_str   = encode_availability(availability).to_owned();
    let now_str  = encode_dt(Utc::now());

    let raw: Option<RawScribe> = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE scribes SET availability = ?1 WHERE user_id = ?2",
          rusqlite::params![av_str, id],
        )?;
        if n == 1 {
          conn.execute(
            "UPDATE users SET updated_at = ?1 WHERE user_id = ?2",
            rusqlite::params![now_str, id],
          )?;
        }
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SCRIBE_COLS} FROM scribes s
                 JOIN users u ON u.user_id = s.user_id
                 WHERE s.user_id = ?1"
              ),
              rusqlite::params![id],
              scribe_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some(raw) => raw.into_scribe(),
      None => Err(CoreError::ScribeNotFound(user_id.to_owned()).into()),
    }
  }

  async fn find_available_scribes(
    &self,
    subjects: &[String],
    location: Option<&str>,
  ) -> Result<Vec<Scribe>> {
    let loc = location.map(str::to_owned);

    let raws: Vec<RawScribe> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(l) = loc {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SCRIBE_COLS} FROM scribes s
             JOIN users u ON u.user_id = s.user_id
             WHERE s.availability = 'available' AND u.is_active = 1
               AND s.location = ?1"
          ))?;
          stmt
            .query_map(rusqlite::params![l], scribe_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SCRIBE_COLS} FROM scribes s
             JOIN users u ON u.user_id = s.user_id
             WHERE s.availability = 'available' AND u.is_active = 1"
          ))?;
          stmt
            .query_map([], scribe_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    let mut scribes: Vec<Scribe> = raws
      .into_iter()
      .map(RawScribe::into_scribe)
      .collect::<Result<_>>()?;

    // Post-filter in memory: any subject overlap qualifies, not full
    // coverage.
    if !subjects.is_empty() {
      scribes.retain(|s| s.subjects.iter().any(|sub| subjects.contains(sub)));
    }

    Ok(scribes)
  }

  // ── Admins ────────────────────────────────────────────────────────────────

  async fn add_admin(&self, input: NewAdmin) -> Result<Admin> {
    let now = Utc::now();
    let admin = Admin {
      user_id:     input.user_id.clone(),
      school_name: input.school_name,
      school_id:   input.school_id,
      is_approved: false,
      approved_by: None,
      approved_at: None,
      created_at:  now,
      updated_at:  now,
    };

    let user_id     = admin.user_id.clone();
    let name        = input.name;
    let email       = input.email;
    let now_str     = encode_dt(now);
    let school_name = admin.school_name.clone();
    let school_id   = admin.school_id.clone();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !insert_user_tx(
          &tx,
          &user_id,
          &name,
          email.as_deref(),
          "admin",
          &now_str,
        )? {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO admins (user_id, school_name, school_id, is_approved)
           VALUES (?1, ?2, ?3, 0)",
          rusqlite::params![user_id, school_name, school_id],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(CoreError::UserAlreadyExists(admin.user_id).into());
    }
    Ok(admin)
  }

  async fn get_admin(&self, user_id: &str) -> Result<Option<Admin>> {
    let id = user_id.to_owned();
    let raw: Option<RawAdmin> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ADMIN_COLS} FROM admins a
                 JOIN users u ON u.user_id = a.user_id
                 WHERE a.user_id = ?1"
              ),
              rusqlite::params![id],
              admin_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAdmin::into_admin).transpose()
  }

  // ── Matches ───────────────────────────────────────────────────────────────

  async fn propose_matches(
    &self,
    student_id: &str,
    exam:       ExamDetails,
    location:   Option<&str>,
    policy:     &MatchPolicy,
  ) -> Result<Vec<Match>> {
    let mut student = self
      .get_student(student_id)
      .await?
      .ok_or_else(|| CoreError::StudentNotFound(student_id.to_owned()))?;
    // Score against the exam this proposal is for, not whatever copy the
    // profile happens to hold.
    student.exam_details = Some(exam.clone());

    let candidates = self
      .find_available_scribes(&exam.subjects, location)
      .await?;
    if candidates.is_empty() {
      return Err(CoreError::NoCandidates.into());
    }

    let ranked = rank_candidates(&student, candidates, policy);
    let now = Utc::now();

    let matches: Vec<Match> = ranked
      .into_iter()
      .map(|(scribe, score)| Match {
        match_id:      Uuid::new_v4(),
        student_id:    student_id.to_owned(),
        scribe_id:     scribe.user_id,
        exam_details:  exam.clone(),
        match_score:   score,
        status:        MatchStatus::Matched,
        created_at:    now,
        confirmed_at:  None,
        completed_at:  None,
        cancelled_at:  None,
        cancel_reason: None,
      })
      .collect();

    // All rows land in one transaction — partial creation is not possible.
    let rows: Vec<(String, String, String, String, i64)> = matches
      .iter()
      .map(|m| {
        Ok((
          encode_uuid(m.match_id),
          m.student_id.clone(),
          m.scribe_id.clone(),
          encode_exam_details(&m.exam_details)?,
          m.match_score as i64,
        ))
      })
      .collect::<Result<_>>()?;
    let now_str = encode_dt(now);
    let status_str = encode_match_status(MatchStatus::Matched);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (id, student, scribe, exam, score) in &rows {
          tx.execute(
            "INSERT INTO matches (match_id, student_id, scribe_id, exam_details,
                                  match_score, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![id, student, scribe, exam, score, status_str, now_str],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(matches)
  }

  async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>> {
    let id_str = encode_uuid(match_id);
    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {MATCH_COLS} FROM matches WHERE match_id = ?1"),
              rusqlite::params![id_str],
              match_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMatch::into_match).transpose()
  }

  async fn matches_for_student(&self, student_id: &str) -> Result<Vec<Match>> {
    let id = student_id.to_owned();
    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MATCH_COLS} FROM matches
           WHERE student_id = ?1 ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], match_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_match).collect()
  }

  async fn matches_for_scribe(&self, scribe_id: &str) -> Result<Vec<Match>> {
    let id = scribe_id.to_owned();
    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MATCH_COLS} FROM matches
           WHERE scribe_id = ?1 ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], match_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_match).collect()
  }

  async fn confirm_match(&self, match_id: Uuid) -> Result<Match> {
    self
      .transition_match(match_id, MatchStatus::Confirmed, "confirmed_at", None)
      .await
  }

  async fn complete_match(&self, match_id: Uuid) -> Result<Match> {
    self
      .transition_match(match_id, MatchStatus::Completed, "completed_at", None)
      .await
  }

  async fn cancel_match(
    &self,
    match_id: Uuid,
    reason:   Option<String>,
  ) -> Result<Match> {
    self
      .transition_match(match_id, MatchStatus::Cancelled, "cancelled_at", reason)
      .await
  }

  // ── Scribe requests ───────────────────────────────────────────────────────

  async fn create_scribe_request(
    &self,
    input:  NewScribeRequest,
    policy: &MatchPolicy,
  ) -> Result<ScribeRequest> {
    let mut student = self
      .get_student(&input.student_id)
      .await?
      .ok_or_else(|| CoreError::StudentNotFound(input.student_id.clone()))?;
    student.exam_details = Some(input.exam_details.clone());
    let scribe = self
      .get_scribe(&input.scribe_id)
      .await?
      .ok_or_else(|| CoreError::ScribeNotFound(input.scribe_id.clone()))?;

    let score = sahaya_core::matching::match_score(&student, &scribe, policy);
    let now = Utc::now();

    let request = ScribeRequest {
      request_id:       Uuid::new_v4(),
      student_id:       input.student_id,
      scribe_id:        input.scribe_id,
      exam_details:     input.exam_details,
      match_score:      score,
      admin_id:         input.admin_id,
      status:           ScribeRequestStatus::Pending,
      approved_by:      None,
      approved_at:      None,
      rejected_by:      None,
      rejected_at:      None,
      rejection_reason: None,
      created_at:       now,
      updated_at:       now,
    };

    let id_str     = encode_uuid(request.request_id);
    let student_id = request.student_id.clone();
    let scribe_id  = request.scribe_id.clone();
    let exam_str   = encode_exam_details(&request.exam_details)?;
    let score_val  = request.match_score as i64;
    let admin_id   = request.admin_id.clone();
    let status_str = encode_scribe_request_status(request.status);
    let now_str    = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO scribe_requests (request_id, student_id, scribe_id, exam_details,
                                        match_score, admin_id, status, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![
            id_str, student_id, scribe_id, exam_str, score_val, admin_id,
            status_str, now_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(request)
  }

  async fn get_scribe_request(
    &self,
    request_id: Uuid,
  ) -> Result<Option<ScribeRequest>> {
    let id_str = encode_uuid(request_id);
    let raw: Option<RawScribeRequest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SCRIBE_REQUEST_COLS} FROM scribe_requests
                 WHERE request_id = ?1"
              ),
              rusqlite::params![id_str],
              scribe_request_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawScribeRequest::into_request).transpose()
  }

  async fn pending_scribe_requests(&self) -> Result<Vec<ScribeRequest>> {
    let pending = encode_scribe_request_status(ScribeRequestStatus::Pending);
    let raws: Vec<RawScribeRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SCRIBE_REQUEST_COLS} FROM scribe_requests
           WHERE status = ?1 ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pending], scribe_request_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawScribeRequest::into_request)
      .collect()
  }

  async fn scribe_requests_for_admin(
    &self,
    admin_id: &str,
  ) -> Result<Vec<ScribeRequest>> {
    let id = admin_id.to_owned();
    let raws: Vec<RawScribeRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SCRIBE_REQUEST_COLS} FROM scribe_requests
           WHERE admin_id = ?1 ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], scribe_request_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawScribeRequest::into_request)
      .collect()
  }

  async fn approve_scribe_request(
    &self,
    request_id:  Uuid,
    approved_by: &str,
  ) -> Result<ScribeRequest> {
    let to       = ScribeRequestStatus::Approved;
    let id_str   = encode_uuid(request_id);
    let approver = approved_by.to_owned();
    let now_str  = encode_dt(Utc::now());
    let to_str   = encode_scribe_request_status(to);
    let sources  = scribe_request_sources(to);

    let (updated, raw): (bool, Option<RawScribeRequest>) = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          &format!(
            "UPDATE scribe_requests
             SET status = ?1, approved_by = ?2, approved_at = ?3, updated_at = ?3
             WHERE request_id = ?4 AND status IN ({sources})"
          ),
          rusqlite::params![to_str, approver, now_str, id_str],
        )?;
        let raw = conn
          .query_row(
            &format!(
              "SELECT {SCRIBE_REQUEST_COLS} FROM scribe_requests
               WHERE request_id = ?1"
            ),
            rusqlite::params![id_str],
            scribe_request_from_row,
          )
          .optional()?;
        Ok((n == 1, raw))
      })
      .await?;

    Self::classify_scribe_request(request_id, to, updated, raw)
  }

  async fn reject_scribe_request(
    &self,
    request_id:  Uuid,
    rejected_by: &str,
    reason:      &str,
  ) -> Result<ScribeRequest> {
    if reason.trim().is_empty() {
      return Err(CoreError::EmptyRejectionReason.into());
    }

    let to       = ScribeRequestStatus::Rejected;
    let id_str   = encode_uuid(request_id);
    let rejecter = rejected_by.to_owned();
    let reason   = reason.to_owned();
    let now_str  = encode_dt(Utc::now());
    let to_str   = encode_scribe_request_status(to);
    let sources  = scribe_request_sources(to);

    let (updated, raw): (bool, Option<RawScribeRequest>) = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          &format!(
            "UPDATE scribe_requests
             SET status = ?1, rejected_by = ?2, rejected_at = ?3,
                 rejection_reason = ?4, updated_at = ?3
             WHERE request_id = ?5 AND status IN ({sources})"
          ),
          rusqlite::params![to_str, rejecter, now_str, reason, id_str],
        )?;
        let raw = conn
          .query_row(
            &format!(
              "SELECT {SCRIBE_REQUEST_COLS} FROM scribe_requests
               WHERE request_id = ?1"
            ),
            rusqlite::params![id_str],
            scribe_request_from_row,
          )
          .optional()?;
        Ok((n == 1, raw))
      })
      .await?;

    Self::classify_scribe_request(request_id, to, updated, raw)
  }

  async fn complete_scribe_request(
    &self,
    request_id: Uuid,
  ) -> Result<ScribeRequest> {
    let to      = ScribeRequestStatus::Completed;
    let id_str  = encode_uuid(request_id);
    let now_str = encode_dt(Utc::now());
    let to_str  = encode_scribe_request_status(to);
    let sources = scribe_request_sources(to);

    let (updated, raw): (bool, Option<RawScribeRequest>) = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          &format!(
            "UPDATE scribe_requests SET status = ?1, updated_at = ?2
             WHERE request_id = ?3 AND status IN ({sources})"
          ),
          rusqlite::params![to_str, now_str, id_str],
        )?;
        let raw = conn
          .query_row(
            &format!(
              "SELECT {SCRIBE_REQUEST_COLS} FROM scribe_requests
               WHERE request_id = ?1"
            ),
            rusqlite::params![id_str],
            scribe_request_from_row,
          )
          .optional()?;
        Ok((n == 1, raw))
      })
      .await?;

    Self::classify_scribe_request(request_id, to, updated, raw)
  }

  // ── Admin requests ────────────────────────────────────────────────────────

  async fn create_admin_request(
    &self,
    input: NewAdminRequest,
  ) -> Result<AdminRequest> {
    let now = Utc::now();
    let request = AdminRequest {
      request_id:       Uuid::new_v4(),
      user_id:          input.user_id,
      school_name:      input.school_name,
      school_id:        input.school_id,
      documents:        input.documents,
      status:           AdminRequestStatus::Pending,
      approved_by:      None,
      approved_at:      None,
      rejected_by:      None,
      rejected_at:      None,
      rejection_reason: None,
      requested_at:     now,
    };

    let id_str      = encode_uuid(request.request_id);
    let user_id     = request.user_id.clone();
    let school_name = request.school_name.clone();
    let school_id   = request.school_id.clone();
    let documents   = encode_documents(&request.documents)?;
    let status_str  = encode_admin_request_status(request.status);
    let now_str     = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO admin_requests (request_id, user_id, school_name, school_id,
                                       documents, status, requested_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, user_id, school_name, school_id, documents, status_str,
            now_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(request)
  }

  async fn get_admin_request(
    &self,
    request_id: Uuid,
  ) -> Result<Option<AdminRequest>> {
    let id_str = encode_uuid(request_id);
    let raw: Option<RawAdminRequest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ADMIN_REQUEST_COLS} FROM admin_requests
                 WHERE request_id = ?1"
              ),
              rusqlite::params![id_str],
              admin_request_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAdminRequest::into_request).transpose()
  }

  async fn admin_request_for_user(
    &self,
    user_id: &str,
  ) -> Result<Option<AdminRequest>> {
    let id = user_id.to_owned();
    let raw: Option<RawAdminRequest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ADMIN_REQUEST_COLS} FROM admin_requests
                 WHERE user_id = ?1 ORDER BY requested_at DESC LIMIT 1"
              ),
              rusqlite::params![id],
              admin_request_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAdminRequest::into_request).transpose()
  }

  async fn pending_admin_requests(&self) -> Result<Vec<AdminRequest>> {
    let pending = encode_admin_request_status(AdminRequestStatus::Pending);
    let raws: Vec<RawAdminRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ADMIN_REQUEST_COLS} FROM admin_requests
           WHERE status = ?1 ORDER BY requested_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pending], admin_request_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawAdminRequest::into_request)
      .collect()
  }

  async fn approve_admin_request(
    &self,
    request_id:     Uuid,
    super_admin_id: &str,
  ) -> Result<AdminRequest> {
    let to       = AdminRequestStatus::Approved;
    let id_str   = encode_uuid(request_id);
    let approver = super_admin_id.to_owned();
    let now_str  = encode_dt(Utc::now());
    let to_str   = encode_admin_request_status(to);
    let sources  = admin_request_sources(to);

    let outcome: AdminApproval = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let n = tx.execute(
          &format!(
            "UPDATE admin_requests
             SET status = ?1, approved_by = ?2, approved_at = ?3
             WHERE request_id = ?4 AND status IN ({sources})"
          ),
          rusqlite::params![to_str, approver, now_str, id_str],
        )?;

        if n != 1 {
          let raw = tx
            .query_row(
              &format!(
                "SELECT {ADMIN_REQUEST_COLS} FROM admin_requests
                 WHERE request_id = ?1"
              ),
              rusqlite::params![id_str],
              admin_request_from_row,
            )
            .optional()?;
          return Ok(AdminApproval::NotApplied(raw));
        }

        // Cascade onto the Admin profile within the same transaction. If
        // the profile is missing, dropping `tx` rolls back the request
        // update — the store never holds an approved request with an
        // unapproved admin.
        let user_id: String = tx.query_row(
          "SELECT user_id FROM admin_requests WHERE request_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?;

        let cascaded = tx.execute(
          "UPDATE admins SET is_approved = 1, approved_by = ?1, approved_at = ?2
           WHERE user_id = ?3",
          rusqlite::params![approver, now_str, user_id],
        )?;
        if cascaded == 0 {
          return Ok(AdminApproval::AdminMissing(user_id));
        }
        tx.execute(
          "UPDATE users SET updated_at = ?1 WHERE user_id = ?2",
          rusqlite::params![now_str, user_id],
        )?;

        let raw = tx.query_row(
          &format!(
            "SELECT {ADMIN_REQUEST_COLS} FROM admin_requests
             WHERE request_id = ?1"
          ),
          rusqlite::params![id_str],
          admin_request_from_row,
        )?;

        tx.commit()?;
        Ok(AdminApproval::Applied(raw))
      })
      .await?;

    match outcome {
      AdminApproval::Applied(raw) => raw.into_request(),
      AdminApproval::AdminMissing(user_id) => {
        Err(CoreError::AdminNotFound(user_id).into())
      }
      AdminApproval::NotApplied(raw) => {
        Self::classify_admin_request(request_id, to, false, raw)
      }
    }
  }

  async fn reject_admin_request(
    &self,
    request_id:  Uuid,
    rejected_by: &str,
    reason:      &str,
  ) -> Result<AdminRequest> {
    if reason.trim().is_empty() {
      return Err(CoreError::EmptyRejectionReason.into());
    }

    let to       = AdminRequestStatus::Rejected;
    let id_str   = encode_uuid(request_id);
    let rejecter = rejected_by.to_owned();
    let reason   = reason.to_owned();
    let now_str  = encode_dt(Utc::now());
    let to_str   = encode_admin_request_status(to);
    let sources  = admin_request_sources(to);

    let (updated, raw): (bool, Option<RawAdminRequest>) = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          &format!(
            "UPDATE admin_requests
             SET status = ?1, rejected_by = ?2, rejected_at = ?3,
                 rejection_reason = ?4
             WHERE request_id = ?5 AND status IN ({sources})"
          ),
          rusqlite::params![to_str, rejecter, now_str, reason, id_str],
        )?;
        let raw = conn
          .query_row(
            &format!(
              "SELECT {ADMIN_REQUEST_COLS} FROM admin_requests
               WHERE request_id = ?1"
            ),
            rusqlite::params![id_str],
            admin_request_from_row,
          )
          .optional()?;
        Ok((n == 1, raw))
      })
      .await?;

    Self::classify_admin_request(request_id, to, updated, raw)
  }

  // ── Feedback ──────────────────────────────────────────────────────────────

  async fn add_feedback(&self, input: NewFeedback) -> Result<Feedback> {
    validate_rating(input.rating).map_err(Error::Core)?;

    let now = Utc::now();
    let feedback = Feedback {
      feedback_id:  Uuid::new_v4(),
      match_id:     input.match_id,
      student_id:   input.student_id,
      scribe_id:    input.scribe_id,
      rating:       input.rating,
      comment:      input.comment,
      is_anonymous: input.is_anonymous,
      created_at:   now,
    };

    let id_str       = encode_uuid(feedback.feedback_id);
    let match_id_str = encode_uuid(feedback.match_id);
    let student_id   = feedback.student_id.clone();
    let scribe_id    = feedback.scribe_id.clone();
    let rating_val   = feedback.rating;
    let comment      = feedback.comment.clone();
    let is_anonymous = feedback.is_anonymous;
    let now_str      = encode_dt(now);

    let outcome: FeedbackApplied = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let status: Option<String> = tx
          .query_row(
            "SELECT status FROM matches WHERE match_id = ?1",
            rusqlite::params![match_id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(status) = status else {
          return Ok(FeedbackApplied::MatchMissing);
        };
        if status != encode_match_status(MatchStatus::Completed) {
          return Ok(FeedbackApplied::MatchNotCompleted);
        }

        // Read-fold-write on the scribe's running mean, inside the same
        // transaction as the feedback insert: concurrent submissions
        // cannot lose updates.
        let current: Option<(f64, i64)> = tx
          .query_row(
            "SELECT rating, total_ratings FROM scribes WHERE user_id = ?1",
            rusqlite::params![scribe_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        let Some((rating, total_ratings)) = current else {
          return Ok(FeedbackApplied::ScribeMissing);
        };

        let (new_rating, new_total) =
          fold_rating(rating, total_ratings as u32, rating_val);

        tx.execute(
          "UPDATE scribes SET rating = ?1, total_ratings = ?2 WHERE user_id = ?3",
          rusqlite::params![new_rating, new_total as i64, scribe_id],
        )?;
        tx.execute(
          "UPDATE users SET updated_at = ?1 WHERE user_id = ?2",
          rusqlite::params![now_str, scribe_id],
        )?;
        tx.execute(
          "INSERT INTO feedback (feedback_id, match_id, student_id, scribe_id,
                                 rating, comment, is_anonymous, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str, match_id_str, student_id, scribe_id, rating_val as i64,
            comment, is_anonymous, now_str,
          ],
        )?;

        tx.commit()?;
        Ok(FeedbackApplied::Applied)
      })
      .await?;

    match outcome {
      FeedbackApplied::Applied => Ok(feedback),
      FeedbackApplied::MatchMissing => {
        Err(CoreError::MatchNotFound(feedback.match_id).into())
      }
      FeedbackApplied::MatchNotCompleted => {
        Err(CoreError::MatchNotCompleted(feedback.match_id).into())
      }
      FeedbackApplied::ScribeMissing => {
        Err(CoreError::ScribeNotFound(feedback.scribe_id).into())
      }
    }
  }

  async fn feedback_for_scribe(&self, scribe_id: &str) -> Result<Vec<Feedback>> {
    let id = scribe_id.to_owned();
    let raws: Vec<RawFeedback> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FEEDBACK_COLS} FROM feedback
           WHERE scribe_id = ?1 ORDER BY created_at DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id], feedback_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFeedback::into_feedback).collect()
  }
}
