//! Minimal HTML shells for the landing page, sign-in forms, guarded area
//! pages and the maintenance notice. Real page content lives elsewhere;
//! these only prove who the request resolved to.

use axum::{
  extract::{OriginalUri, Query, State},
  response::Html,
};
use garrison_core::{
  area::RoleArea,
  maintenance::{MaintenanceSetting, format_instant},
  principal::Principal,
  store::SettingsStore,
};
use serde::Deserialize;
use strum::IntoEnumIterator as _;

use crate::{AppState, guard::CurrentPrincipal};

fn layout(title: &str, body: &str) -> Html<String> {
  Html(format!(
    "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{body}\n</body>\n</html>\n",
    escape(title)
  ))
}

fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

/// `GET /`
pub async fn landing() -> Html<String> {
  let links: String = RoleArea::iter()
    .map(|area| {
      format!(
        "<li><a href=\"{}\">{area}</a></li>",
        escape(&area.sign_in_path())
      )
    })
    .collect();
  layout("Garrison", &format!("<h1>Sign in</h1>\n<ul>{links}</ul>"))
}

/// `GET /<area>/sign-in`
pub fn sign_in_form(area: RoleArea) -> Html<String> {
  let body = format!(
    r#"<h1>Sign in: {area}</h1>
<form id="sign-in">
  <label>Email <input name="email" type="email" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Sign in</button>
  <p id="error" hidden>Invalid credentials</p>
</form>
<script>
document.getElementById("sign-in").addEventListener("submit", async (e) => {{
  e.preventDefault();
  const form = new FormData(e.target);
  const res = await fetch("/api/auth/{area}/sign-in", {{
    method: "POST",
    headers: {{ "Content-Type": "application/json" }},
    body: JSON.stringify({{ email: form.get("email"), password: form.get("password") }}),
  }});
  if (res.ok) {{ window.location = (await res.json()).redirect; }}
  else {{ document.getElementById("error").hidden = false; }}
}});
</script>"#
  );
  layout(&format!("Sign in: {area}"), &body)
}

/// Any guarded page under `/<area>`.
pub async fn area_page(
  current: CurrentPrincipal,
  OriginalUri(uri): OriginalUri,
) -> Html<String> {
  let CurrentPrincipal { area, principal } = current;

  let detail = match &principal {
    Principal::Employee(e) => {
      let department = e
        .department
        .as_ref()
        .map(|d| d.name.as_str())
        .unwrap_or("unassigned");
      let job_title = e
        .job_title
        .as_ref()
        .map(|j| j.title.as_str())
        .unwrap_or("unassigned");
      format!(
        "<p>Department: {}</p>\n<p>Job title: {}</p>",
        escape(department),
        escape(job_title)
      )
    }
    Principal::Client(c) => c
      .company
      .as_deref()
      .map(|co| format!("<p>Company: {}</p>", escape(co)))
      .unwrap_or_default(),
    Principal::Supplier(s) => s
      .company
      .as_deref()
      .map(|co| format!("<p>Company: {}</p>", escape(co)))
      .unwrap_or_default(),
  };

  let body = format!(
    "<h1>{area}</h1>\n<p>Signed in as {}</p>\n{detail}\n<p>Page: {}</p>\n<form method=\"post\" action=\"/api/auth/{area}/sign-out\"><button>Sign out</button></form>",
    escape(principal.name()),
    escape(uri.path()),
  );
  layout(&area.to_string(), &body)
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeParams {
  pub message: Option<String>,
  pub end:     Option<String>,
}

/// `GET /maintenance`. Uses the query parameters set by the gate redirect;
/// a direct visit reads the stored setting instead.
pub async fn maintenance_notice<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<NoticeParams>,
) -> Html<String>
where
  S: SettingsStore + 'static,
{
  let (message, end) = if params.message.is_some() || params.end.is_some() {
    (params.message.unwrap_or_default(), params.end)
  } else {
    let setting = match state.store.get_maintenance().await {
      Ok(s) => s.unwrap_or_default(),
      Err(e) => {
        tracing::warn!(error = %e, "maintenance notice could not read setting");
        MaintenanceSetting::default()
      }
    };
    (setting.message, setting.end_time.map(format_instant))
  };

  let message = if message.is_empty() {
    "We are performing scheduled maintenance.".to_owned()
  } else {
    message
  };
  let until = end
    .filter(|e| !e.is_empty())
    .map(|e| format!("<p>Expected back: <time datetime=\"{0}\">{0}</time></p>", escape(&e)))
    .unwrap_or_default();

  layout(
    "Under maintenance",
    &format!("<h1>Under maintenance</h1>\n<p>{}</p>\n{until}", escape(&message)),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escape_neutralises_markup() {
    assert_eq!(
      escape(r#"<script>"x" & 'y'</script>"#),
      "&lt;script&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/script&gt;"
    );
  }

  #[test]
  fn sign_in_form_posts_to_area_endpoint() {
    let Html(html) = sign_in_form(RoleArea::ReportingManager);
    assert!(html.contains("/api/auth/reporting-manager/sign-in"));
  }
}
