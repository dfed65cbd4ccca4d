//! Request-entry interceptor enforcing maintenance mode.

use axum::{
  extract::{Request, State},
  http::Method,
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use garrison_core::{
  maintenance::{GateDecision, MaintenanceSetting, format_instant},
  store::SettingsStore,
};

use crate::AppState;

/// Path of the admin endpoint that writes the setting.
const SETTING_PATH: &str = "/api/admin/maintenance";

/// Redirect every non-exempt request to the notice page while maintenance is
/// on. Installed as the outermost layer of the router. A successful write to
/// the setting drops the gate's cached copy.
pub async fn maintenance_gate<S>(
  State(state): State<AppState<S>>,
  req: Request,
  next: Next,
) -> Response
where
  S: SettingsStore + 'static,
{
  let decision = state.gate.evaluate(req.uri().path(), &*state.store).await;

  match decision {
    GateDecision::Blocked(setting) => {
      tracing::debug!(path = req.uri().path(), "maintenance gate redirect");
      Redirect::temporary(&notice_location(&setting)).into_response()
    }
    GateDecision::Exempt | GateDecision::Open | GateDecision::FailedOpen => {
      let writes_setting =
        req.method() == Method::POST && req.uri().path() == SETTING_PATH;
      let resp = next.run(req).await;
      if writes_setting && resp.status().is_success() {
        state.gate.invalidate();
      }
      resp
    }
  }
}

/// `/maintenance`, carrying the message and end time as query parameters.
pub fn notice_location(setting: &MaintenanceSetting) -> String {
  let mut params = Vec::new();
  if !setting.message.is_empty() {
    params.push(format!("message={}", urlencoding::encode(&setting.message)));
  }
  if let Some(end) = setting.end_time {
    params.push(format!("end={}", urlencoding::encode(&format_instant(end))));
  }

  if params.is_empty() {
    "/maintenance".to_owned()
  } else {
    format!("/maintenance?{}", params.join("&"))
  }
}
