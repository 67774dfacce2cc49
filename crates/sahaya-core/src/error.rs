//! Error types for `sahaya-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{
  matching::MatchStatus,
  request::{AdminRequestStatus, ScribeRequestStatus},
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(String),

  #[error("student not found: {0}")]
  StudentNotFound(String),

  #[error("scribe not found: {0}")]
  ScribeNotFound(String),

  #[error("admin not found: {0}")]
  AdminNotFound(String),

  #[error("match not found: {0}")]
  MatchNotFound(Uuid),

  #[error("request not found: {0}")]
  RequestNotFound(Uuid),

  /// The availability filter returned nothing. Distinct from NotFound — the
  /// student exists but no scribe fits.
  #[error("no available scribes match the requested subjects and location")]
  NoCandidates,

  #[error("a profile already exists for user {0}")]
  UserAlreadyExists(String),

  #[error("rejection reason must not be blank")]
  EmptyRejectionReason,

  #[error("rating must be between 1 and 5, got {0}")]
  RatingOutOfRange(u8),

  /// Feedback may only be submitted against a completed match.
  #[error("match {0} is not completed")]
  MatchNotCompleted(Uuid),

  #[error("cannot move match from {from} to {to}")]
  InvalidMatchTransition { from: MatchStatus, to: MatchStatus },

  #[error("cannot move scribe request from {from} to {to}")]
  InvalidScribeRequestTransition {
    from: ScribeRequestStatus,
    to:   ScribeRequestStatus,
  },

  #[error("cannot move admin request from {from} to {to}")]
  InvalidAdminRequestTransition {
    from: AdminRequestStatus,
    to:   AdminRequestStatus,
  },

  #[error("unknown status discriminant: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Error kinds ─────────────────────────────────────────────────────────────

/// Coarse classification of a failure, used by the HTTP layer to pick a
/// status code without knowing the concrete store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A referenced entity does not exist.
  NotFound,
  /// The request itself is malformed or violates a validation rule.
  Invalid,
  /// The operation conflicts with current state (e.g. a terminal request).
  Conflict,
  /// A storage or serialisation fault.
  Internal,
}

/// Implemented by every error type a [`crate::store::PlatformStore`] backend
/// may return, so callers can classify failures generically.
pub trait DomainError {
  fn kind(&self) -> ErrorKind;
}

impl DomainError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::UserNotFound(_)
      | Error::StudentNotFound(_)
      | Error::ScribeNotFound(_)
      | Error::AdminNotFound(_)
      | Error::MatchNotFound(_)
      | Error::RequestNotFound(_)
      | Error::NoCandidates => ErrorKind::NotFound,

      Error::EmptyRejectionReason
      | Error::RatingOutOfRange(_)
      | Error::MatchNotCompleted(_) => ErrorKind::Invalid,

      Error::UserAlreadyExists(_)
      | Error::InvalidMatchTransition { .. }
      | Error::InvalidScribeRequestTransition { .. }
      | Error::InvalidAdminRequestTransition { .. } => ErrorKind::Conflict,

      Error::UnknownStatus(_) => ErrorKind::Internal,
    }
  }
}
