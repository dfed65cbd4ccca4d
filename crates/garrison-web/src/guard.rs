//! Role layout guard: every page under `/<area>/…` passes through here.
//!
//! The guard resolves the area's session cookie. A found principal is
//! attached to the request as [`CurrentPrincipal`]; every other outcome is a
//! redirect to the area's sign-in page, with the reason logged.

use axum::{
  extract::{FromRequestParts, Request, State},
  http::request::Parts,
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use garrison_core::{
  area::RoleArea,
  principal::Principal,
  resolve::Resolution,
  store::AccountStore,
};

use crate::{AppState, error::Error};

/// State for one area's guard layer.
pub struct AreaGuard<S> {
  pub area:  RoleArea,
  pub state: AppState<S>,
}

impl<S> Clone for AreaGuard<S> {
  fn clone(&self) -> Self {
    Self {
      area:  self.area,
      state: self.state.clone(),
    }
  }
}

/// The principal the guard resolved for this request.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal {
  pub area:      RoleArea,
  pub principal: Principal,
}

pub async fn require_principal<S>(
  State(guard): State<AreaGuard<S>>,
  jar: CookieJar,
  mut req: Request,
  next: Next,
) -> Response
where
  S: AccountStore + 'static,
{
  let area       = guard.area;
  let credential = jar
    .get(area.account_kind().cookie_name())
    .map(|c| c.value().to_owned());

  let resolution = match guard
    .state
    .resolver
    .resolve_for_area(area, credential.as_deref())
    .await
  {
    Ok(r) => r,
    Err(e) => return Error::Store(Box::new(e)).into_response(),
  };

  match resolution {
    Resolution::Found(principal) => {
      req.extensions_mut().insert(CurrentPrincipal { area, principal });
      next.run(req).await
    }
    Resolution::Anonymous => {
      tracing::debug!(%area, path = req.uri().path(), "no session credential");
      Redirect::temporary(&area.sign_in_path()).into_response()
    }
    Resolution::Invalid(reason) => {
      tracing::info!(%area, %reason, path = req.uri().path(), "session credential rejected");
      Redirect::temporary(&area.sign_in_path()).into_response()
    }
  }
}

impl<S> FromRequestParts<S> for CurrentPrincipal
where
  S: Send + Sync,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<CurrentPrincipal>()
      .cloned()
      .ok_or(Error::Unguarded)
  }
}
