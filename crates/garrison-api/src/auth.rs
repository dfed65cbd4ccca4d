//! Sign-in, sign-out and session introspection for each role area.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/{area}/sign-in` | Body: `{"email","password"}`; sets the session cookie |
//! | `POST` | `/auth/{area}/sign-out` | Removes the session cookie |
//! | `GET`  | `/auth/{area}/me` | Resolved principal, or 401 |

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  Json,
  extract::{Path, State},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use garrison_core::{
  area::RoleArea,
  principal::Principal,
  resolve::Resolution,
  store::AccountStore,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError, extract::ApiJson};

/// Checked when the email is unknown, so both refusals cost one argon2 run.
const DUMMY_HASH: &str =
  "$argon2id$v=19$m=19456,t=2,p=1$U4hWczMTwIxB27EDNYp8yw$FRQvVc1+8tHai2u99DRazkS5bJ7YIoktUvue1B63Cjw";

#[derive(Deserialize)]
pub struct SignInBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
  pub success:  bool,
  /// Where the client should navigate next.
  pub redirect: String,
}

/// `POST /auth/{area}/sign-in`
pub async fn sign_in<S>(
  State(state): State<ApiState<S>>,
  Path(area): Path<RoleArea>,
  jar: CookieJar,
  ApiJson(body): ApiJson<SignInBody>,
) -> Result<(CookieJar, Json<SignInResponse>), ApiError>
where
  S: AccountStore,
{
  let kind = area.account_kind();

  let creds = state
    .store
    .find_credentials(kind, &body.email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let Some(creds) = creds else {
    if let Ok(dummy) = PasswordHash::new(DUMMY_HASH) {
      let _ = Argon2::default().verify_password(body.password.as_bytes(), &dummy);
    }
    tracing::info!(%area, "sign-in refused: unknown email");
    return Err(ApiError::InvalidCredentials);
  };

  let parsed = PasswordHash::new(&creds.password_hash).map_err(|e| {
    tracing::error!(%area, account_id = %creds.account_id, error = %e, "stored password hash is malformed");
    ApiError::InvalidCredentials
  })?;

  if Argon2::default()
    .verify_password(body.password.as_bytes(), &parsed)
    .is_err()
  {
    tracing::info!(%area, account_id = %creds.account_id, "sign-in refused: wrong password");
    return Err(ApiError::InvalidCredentials);
  }

  if !area.admits_role(creds.role) {
    tracing::info!(%area, account_id = %creds.account_id, role = ?creds.role, "sign-in refused: role mismatch");
    return Err(ApiError::InvalidCredentials);
  }

  let token = state
    .sessions
    .issue(creds.account_id, state.session_ttl)
    .map_err(|e| ApiError::Internal(e.to_string()))?;

  let cookie = Cookie::build((kind.cookie_name(), token))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(state.secure_cookies);

  tracing::info!(%area, account_id = %creds.account_id, "signed in");
  Ok((
    jar.add(cookie),
    Json(SignInResponse {
      success:  true,
      redirect: area.path_prefix(),
    }),
  ))
}

/// `POST /auth/{area}/sign-out`
pub async fn sign_out(
  Path(area): Path<RoleArea>,
  jar: CookieJar,
) -> (CookieJar, Json<Value>) {
  let jar = jar.remove(Cookie::build(area.account_kind().cookie_name()).path("/"));
  (jar, Json(json!({ "success": true })))
}

/// `GET /auth/{area}/me`
pub async fn me<S>(
  State(state): State<ApiState<S>>,
  Path(area): Path<RoleArea>,
  jar: CookieJar,
) -> Result<Json<Principal>, ApiError>
where
  S: AccountStore,
{
  let credential = jar.get(area.account_kind().cookie_name()).map(Cookie::value);

  match state
    .resolver
    .resolve_for_area(area, credential)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
  {
    Resolution::Found(principal) => Ok(Json(principal)),
    Resolution::Anonymous => Err(ApiError::Unauthorized),
    Resolution::Invalid(reason) => {
      tracing::info!(%area, %reason, "session credential rejected");
      Err(ApiError::Unauthorized)
    }
  }
}
