//! Error type for `garrison-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] garrison_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// An account row vanished between insert and read-back.
  #[error("account not found: {0}")]
  AccountNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
