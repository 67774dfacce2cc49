//! Error type for `sahaya-store-sqlite`.

use sahaya_core::{DomainError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Domain failures: not-found, validation, rejected transitions.
  #[error(transparent)]
  Core(#[from] sahaya_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl DomainError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      _ => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
