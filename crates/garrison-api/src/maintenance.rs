//! Handlers for `/admin/maintenance*` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/admin/maintenance-status` | `{"maintenanceMode": bool}` |
//! | `GET`  | `/admin/maintenance` | Full setting; end date is ISO-8601 or `""` |
//! | `POST` | `/admin/maintenance` | Body: [`MaintenanceUpdate`]; upserts the single row |

use axum::{Json, extract::State};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use garrison_core::{
  maintenance::{MaintenanceSetting, format_instant},
  store::SettingsStore,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError, extract::ApiJson};

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceStatus {
  pub maintenance_mode: bool,
}

/// `GET /admin/maintenance-status`
pub async fn status<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<MaintenanceStatus>, ApiError>
where
  S: SettingsStore,
{
  let setting = load(&*state.store).await?;
  Ok(Json(MaintenanceStatus {
    maintenance_mode: setting.enabled,
  }))
}

// ─── Get ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceView {
  pub maintenance_mode:     bool,
  pub maintenance_message:  String,
  /// ISO-8601 with milliseconds, or empty when no end is scheduled.
  pub maintenance_end_date: String,
}

impl From<MaintenanceSetting> for MaintenanceView {
  fn from(s: MaintenanceSetting) -> Self {
    MaintenanceView {
      maintenance_mode:     s.enabled,
      maintenance_message:  s.message,
      maintenance_end_date: s.end_time.map(format_instant).unwrap_or_default(),
    }
  }
}

/// `GET /admin/maintenance`
pub async fn get_setting<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<MaintenanceView>, ApiError>
where
  S: SettingsStore,
{
  let setting = load(&*state.store).await?;
  Ok(Json(MaintenanceView::from(setting)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /admin/maintenance`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceUpdate {
  #[serde(default)]
  pub maintenance_mode:     bool,
  #[serde(default)]
  pub maintenance_message:  Option<String>,
  /// ISO-8601; empty or `null` clears the end date.
  #[serde(default)]
  pub maintenance_end_date: Option<String>,
}

/// `POST /admin/maintenance`, returning `{"success": true}`.
pub async fn update_setting<S>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<MaintenanceUpdate>,
) -> Result<Json<Value>, ApiError>
where
  S: SettingsStore,
{
  let end_time = match body.maintenance_end_date.as_deref().map(str::trim) {
    None | Some("") => None,
    Some(raw) => Some(parse_instant(raw).ok_or_else(|| {
      ApiError::BadRequest(format!("invalid maintenanceEndDate: {raw:?}"))
    })?),
  };

  let setting = MaintenanceSetting {
    enabled: body.maintenance_mode,
    message: body.maintenance_message.unwrap_or_default(),
    end_time,
  };

  state.store.put_maintenance(setting.clone()).await.map_err(|e| {
    tracing::error!(error = %e, "failed to update maintenance setting");
    ApiError::Store(Box::new(e))
  })?;

  tracing::info!(
    enabled = setting.enabled,
    end_time = ?setting.end_time,
    "maintenance setting updated"
  );
  Ok(Json(json!({ "success": true })))
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn load<S: SettingsStore>(store: &S) -> Result<MaintenanceSetting, ApiError> {
  Ok(
    store
      .get_maintenance()
      .await
      .map_err(|e| {
        tracing::error!(error = %e, "failed to read maintenance setting");
        ApiError::Store(Box::new(e))
      })?
      .unwrap_or_default(),
  )
}

/// Accepts full RFC 3339, a zone-less `datetime-local` value (read as UTC),
/// or a bare date (midnight UTC).
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
      return Some(naive.and_utc());
    }
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
  use axum::http::{StatusCode, header};

  use super::*;
  use crate::test_support::{json_body, make_state, oneshot};

  const ROUND_TRIP: &str = r#"{"maintenanceMode":true,"maintenanceMessage":"m","maintenanceEndDate":"2025-12-31T00:00:00.000Z"}"#;

  #[test]
  fn parse_instant_accepts_common_shapes() {
    let expected = "2025-12-31T00:00:00.000Z";
    for raw in [
      "2025-12-31T00:00:00.000Z",
      "2025-12-31T00:00:00Z",
      "2025-12-31T00:00",
      "2025-12-31",
      "2025-12-31T03:00:00+03:00",
    ] {
      let parsed = parse_instant(raw).unwrap_or_else(|| panic!("failed on {raw}"));
      assert_eq!(format_instant(parsed), expected, "input {raw}");
    }
    assert!(parse_instant("next tuesday").is_none());
  }

  #[tokio::test]
  async fn status_defaults_to_off_without_row() {
    let state = make_state().await;
    let resp  = oneshot(state, "GET", "/admin/maintenance-status", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "maintenanceMode": false }));
  }

  #[tokio::test]
  async fn get_without_row_returns_empty_fields() {
    let state = make_state().await;
    let resp  = oneshot(state, "GET", "/admin/maintenance", vec![], "").await;
    assert_eq!(
      json_body(resp).await,
      json!({
        "maintenanceMode": false,
        "maintenanceMessage": "",
        "maintenanceEndDate": ""
      })
    );
  }

  #[tokio::test]
  async fn post_then_get_round_trips_verbatim() {
    let state = make_state().await;
    let resp  = oneshot(
      state.clone(),
      "POST",
      "/admin/maintenance",
      vec![(header::CONTENT_TYPE, "application/json")],
      ROUND_TRIP,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "success": true }));

    let resp = oneshot(state, "GET", "/admin/maintenance", vec![], "").await;
    assert_eq!(
      json_body(resp).await,
      json!({
        "maintenanceMode": true,
        "maintenanceMessage": "m",
        "maintenanceEndDate": "2025-12-31T00:00:00.000Z"
      })
    );
  }

  #[tokio::test]
  async fn status_is_stable_between_updates() {
    let state = make_state().await;
    oneshot(
      state.clone(),
      "POST",
      "/admin/maintenance",
      vec![(header::CONTENT_TYPE, "application/json")],
      ROUND_TRIP,
    )
    .await;

    let first  = json_body(oneshot(state.clone(), "GET", "/admin/maintenance-status", vec![], "").await).await;
    let second = json_body(oneshot(state, "GET", "/admin/maintenance-status", vec![], "").await).await;
    assert_eq!(first, second);
    assert_eq!(first, json!({ "maintenanceMode": true }));
  }

  #[tokio::test]
  async fn empty_end_date_clears_it() {
    let state = make_state().await;
    oneshot(
      state.clone(),
      "POST",
      "/admin/maintenance",
      vec![(header::CONTENT_TYPE, "application/json")],
      ROUND_TRIP,
    )
    .await;
    oneshot(
      state.clone(),
      "POST",
      "/admin/maintenance",
      vec![(header::CONTENT_TYPE, "application/json")],
      r#"{"maintenanceMode":false,"maintenanceMessage":"","maintenanceEndDate":""}"#,
    )
    .await;

    let resp = oneshot(state, "GET", "/admin/maintenance", vec![], "").await;
    assert_eq!(json_body(resp).await["maintenanceEndDate"], "");
  }

  #[tokio::test]
  async fn unparseable_end_date_is_rejected() {
    let state = make_state().await;
    let resp  = oneshot(
      state,
      "POST",
      "/admin/maintenance",
      vec![(header::CONTENT_TYPE, "application/json")],
      r#"{"maintenanceMode":true,"maintenanceEndDate":"soon"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn malformed_body_is_json_400_and_leaves_setting_alone() {
    let state = make_state().await;
    let resp  = oneshot(
      state.clone(),
      "POST",
      "/admin/maintenance",
      vec![(header::CONTENT_TYPE, "application/json")],
      "{not json",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    assert!(json_body(resp).await["error"].is_string());

    let resp = oneshot(state, "GET", "/admin/maintenance-status", vec![], "").await;
    assert_eq!(json_body(resp).await, json!({ "maintenanceMode": false }));
  }

  #[tokio::test]
  async fn missing_content_type_is_json_error() {
    let state = make_state().await;
    let resp  = oneshot(state, "POST", "/admin/maintenance", vec![], ROUND_TRIP).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }
}
