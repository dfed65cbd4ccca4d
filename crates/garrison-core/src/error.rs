//! Error types for `garrison-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown user role: {0:?}")]
  UnknownRole(String),

  #[error("failed to sign session token: {0}")]
  TokenEncoding(#[source] jsonwebtoken::errors::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
