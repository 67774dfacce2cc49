//! Approval-request types and their state machines.
//!
//! Two parallel workflows share the shape pending → approved | rejected, each
//! gated by a distinct authority: scribe requests by a school admin, admin
//! requests by a super-admin. Statuses are tagged variants with explicit
//! transition tables; a terminal request can never be approved or rejected
//! again.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::ExamDetails;

// ─── Scribe requests ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScribeRequestStatus {
  Pending,
  Approved,
  Rejected,
  /// Session finished; reachable only from `Approved`.
  Completed,
}

impl ScribeRequestStatus {
  pub fn can_transition_to(self, next: ScribeRequestStatus) -> bool {
    use ScribeRequestStatus::*;
    matches!(
      (self, next),
      (Pending, Approved) | (Pending, Rejected) | (Approved, Completed)
    )
  }
}

impl fmt::Display for ScribeRequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ScribeRequestStatus::Pending => "pending",
      ScribeRequestStatus::Approved => "approved",
      ScribeRequestStatus::Rejected => "rejected",
      ScribeRequestStatus::Completed => "completed",
    };
    f.write_str(s)
  }
}

/// An admin-gated formal pairing request, distinct from an auto-generated
/// [`crate::matching::Match`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScribeRequest {
  pub request_id:       Uuid,
  pub student_id:       String,
  pub scribe_id:        String,
  pub exam_details:     ExamDetails,
  /// Computed by the match scorer at creation time.
  pub match_score:      u8,
  /// The admin expected to act on the request, when known at creation.
  pub admin_id:         Option<String>,
  pub status:           ScribeRequestStatus,
  pub approved_by:      Option<String>,
  pub approved_at:      Option<DateTime<Utc>>,
  pub rejected_by:      Option<String>,
  pub rejected_at:      Option<DateTime<Utc>>,
  pub rejection_reason: Option<String>,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

/// Input to [`crate::store::PlatformStore::create_scribe_request`]. The match
/// score is computed by the store, not accepted from callers.
#[derive(Debug, Clone, Deserialize)]
pub struct NewScribeRequest {
  pub student_id:   String,
  pub scribe_id:    String,
  pub exam_details: ExamDetails,
  pub admin_id:     Option<String>,
}

// ─── Admin requests ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRequestStatus {
  Pending,
  Approved,
  Rejected,
}

impl AdminRequestStatus {
  /// `pending → approved | rejected`; both outcomes are terminal.
  pub fn can_transition_to(self, next: AdminRequestStatus) -> bool {
    use AdminRequestStatus::*;
    matches!((self, next), (Pending, Approved) | (Pending, Rejected))
  }
}

impl fmt::Display for AdminRequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      AdminRequestStatus::Pending => "pending",
      AdminRequestStatus::Approved => "approved",
      AdminRequestStatus::Rejected => "rejected",
    };
    f.write_str(s)
  }
}

/// Opaque URLs of supporting documents; the core never inspects contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminDocuments {
  pub school_certificate: Option<String>,
  pub id_proof:           Option<String>,
}

/// A school representative's request for elevated dashboard privileges,
/// gated by a super-admin. Approval cascades onto the Admin profile's
/// `is_approved` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRequest {
  pub request_id:       Uuid,
  pub user_id:          String,
  pub school_name:      String,
  pub school_id:        String,
  pub documents:        AdminDocuments,
  pub status:           AdminRequestStatus,
  pub approved_by:      Option<String>,
  pub approved_at:      Option<DateTime<Utc>>,
  pub rejected_by:      Option<String>,
  pub rejected_at:      Option<DateTime<Utc>>,
  pub rejection_reason: Option<String>,
  pub requested_at:     DateTime<Utc>,
}

/// Input to [`crate::store::PlatformStore::create_admin_request`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdminRequest {
  pub user_id:     String,
  pub school_name: String,
  pub school_id:   String,
  #[serde(default)]
  pub documents:   AdminDocuments,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scribe_request_transitions_follow_the_table() {
    use ScribeRequestStatus::*;
    assert!(Pending.can_transition_to(Approved));
    assert!(Pending.can_transition_to(Rejected));
    assert!(Approved.can_transition_to(Completed));

    assert!(!Rejected.can_transition_to(Approved));
    assert!(!Approved.can_transition_to(Rejected));
    assert!(!Completed.can_transition_to(Approved));
    assert!(!Pending.can_transition_to(Completed));
  }

  #[test]
  fn admin_request_outcomes_are_terminal() {
    use AdminRequestStatus::*;
    assert!(Pending.can_transition_to(Approved));
    assert!(Pending.can_transition_to(Rejected));

    assert!(!Approved.can_transition_to(Rejected));
    assert!(!Rejected.can_transition_to(Approved));
    assert!(!Approved.can_transition_to(Pending));
  }
}
