//! Session credentials: HS256 JSON Web Tokens bound to one subject.
//!
//! [`SessionKeys`] both issues and verifies credentials. Verification is pure
//! and only distinguishes "expired" from every other kind of invalid token.
//! The HMAC comparison inside `jsonwebtoken` runs in constant time.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{Error, Result};

/// Claims carried by every session credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  /// Account identifier in the table matching the cookie's account kind.
  pub sub: Uuid,
  /// Issued-at, Unix seconds.
  pub iat: i64,
  /// Expiry, Unix seconds.
  pub exp: i64,
}

impl Claims {
  pub fn expires_at(&self) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(self.exp, 0)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
  /// Malformed, unsigned, wrongly signed, or carrying unexpected claims.
  #[error("invalid token")]
  InvalidToken,
  #[error("expired token")]
  ExpiredToken,
}

/// Key material derived from the shared `JWT_SECRET`.
#[derive(Clone)]
pub struct SessionKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl std::fmt::Debug for SessionKeys {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionKeys").finish_non_exhaustive()
  }
}

impl SessionKeys {
  pub fn from_secret(secret: &[u8]) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
    }
  }

  /// Issue a credential for `subject` valid for `ttl` from now.
  pub fn issue(&self, subject: Uuid, ttl: Duration) -> Result<String> {
    self.issue_at(subject, Utc::now(), ttl)
  }

  /// Issue a credential with an explicit issue instant.
  pub fn issue_at(
    &self,
    subject: Uuid,
    issued_at: DateTime<Utc>,
    ttl: Duration,
  ) -> Result<String> {
    let claims = Claims {
      sub: subject,
      iat: issued_at.timestamp(),
      exp: (issued_at + ttl).timestamp(),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(Error::TokenEncoding)
  }

  /// Verify a credential and return its claims.
  pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
    jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
        _ => TokenError::InvalidToken,
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn keys() -> SessionKeys { SessionKeys::from_secret(b"test-secret") }

  #[test]
  fn issued_token_verifies() {
    let keys    = keys();
    let subject = Uuid::new_v4();
    let token   = keys.issue(subject, Duration::hours(1)).unwrap();
    let claims  = keys.verify(&token).unwrap();
    assert_eq!(claims.sub, subject);
    assert!(claims.expires_at().unwrap() > Utc::now());
  }

  #[test]
  fn expired_token_is_reported_as_expired() {
    let keys  = keys();
    let token = keys
      .issue_at(Uuid::new_v4(), Utc::now() - Duration::hours(2), Duration::hours(1))
      .unwrap();
    assert_eq!(keys.verify(&token), Err(TokenError::ExpiredToken));
  }

  #[test]
  fn token_signed_with_other_secret_is_invalid() {
    let other = SessionKeys::from_secret(b"someone-else");
    let token = other.issue(Uuid::new_v4(), Duration::hours(1)).unwrap();
    assert_eq!(keys().verify(&token), Err(TokenError::InvalidToken));
  }

  #[test]
  fn garbage_is_invalid() {
    assert_eq!(keys().verify("not-a-jwt"), Err(TokenError::InvalidToken));
    assert_eq!(keys().verify(""), Err(TokenError::InvalidToken));
  }

  #[test]
  fn non_uuid_subject_is_invalid() {
    #[derive(Serialize)]
    struct Loose {
      sub: &'static str,
      exp: i64,
    }
    let token = jsonwebtoken::encode(
      &Header::new(Algorithm::HS256),
      &Loose { sub: "42", exp: Utc::now().timestamp() + 3600 },
      &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap();
    assert_eq!(keys().verify(&token), Err(TokenError::InvalidToken));
  }
}
