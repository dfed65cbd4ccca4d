//! Request extractors whose rejections render as [`ApiError`].

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::ApiError;

/// [`axum::Json`] with malformed bodies reported as `400 {"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    tracing::debug!(error = %rejection, "rejected request body");
    ApiError::BadRequest(rejection.body_text())
  }
}
