//! Handler for `POST /cron`: the yearly paid-leave reset.
//!
//! Triggered by an external scheduler with `Authorization: Bearer
//! <CRON_SECRET>`. Zeroes `paid_leave_used` on every balance of the previous
//! calendar year and stamps the reset date.

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, header},
};
use chrono::Utc;
use garrison_core::{leave::reset_target_year, store::LeaveStore};
use serde::Serialize;
use subtle::ConstantTimeEq as _;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct CronResponse {
  pub success: bool,
  pub message: String,
}

/// `POST /cron`
pub async fn reset_leave<S>(
  State(state): State<ApiState<S>>,
  headers: HeaderMap,
) -> Result<Json<CronResponse>, ApiError>
where
  S: LeaveStore,
{
  authorize(&headers, state.cron_secret.as_deref())?;

  let now  = Utc::now();
  let year = reset_target_year(now);

  let touched = state
    .store
    .reset_paid_leave(year, now)
    .await
    .map_err(|e| {
      tracing::error!(error = %e, year, "paid leave reset failed");
      ApiError::Store(Box::new(e))
    })?;

  tracing::info!(year, touched, "paid leave reset");
  Ok(Json(CronResponse {
    success: true,
    message: format!("Reset paid leave on {touched} balance(s) for {year}"),
  }))
}

/// Missing header → 401; anything other than exactly `Bearer <secret>` →
/// 403. The comparison runs in constant time for equal-length inputs.
fn authorize(headers: &HeaderMap, secret: Option<&str>) -> Result<(), ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .ok_or(ApiError::Unauthorized)?;

  let Some(secret) = secret.filter(|s| !s.is_empty()) else {
    tracing::warn!("cron call refused: CRON_SECRET is not configured");
    return Err(ApiError::InvalidToken);
  };

  let expected = format!("Bearer {secret}");
  if bool::from(value.as_bytes().ct_eq(expected.as_bytes())) {
    Ok(())
  } else {
    tracing::warn!("cron call refused: bearer token mismatch");
    Err(ApiError::InvalidToken)
  }
}
