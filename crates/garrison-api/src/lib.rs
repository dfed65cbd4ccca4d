//! JSON API for Garrison.
//!
//! Exposes an axum [`Router`] backed by any store implementing the
//! `garrison-core` store traits. TLS and the maintenance gate are the
//! caller's responsibility; these routes are always exempt from the gate.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", garrison_api::api_router(state))
//! ```

pub mod auth;
pub mod cron;
pub mod error;
pub mod extract;
pub mod maintenance;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use garrison_core::{
  resolve::Resolver,
  session::SessionKeys,
  store::{AccountStore, LeaveStore, SettingsStore},
};

pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:          Arc<S>,
  pub sessions:       Arc<SessionKeys>,
  pub resolver:       Resolver<S>,
  /// `CRON_SECRET`; when unset every cron call is refused.
  pub cron_secret:    Option<Arc<str>>,
  pub session_ttl:    chrono::Duration,
  pub secure_cookies: bool,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:          Arc::clone(&self.store),
      sessions:       Arc::clone(&self.sessions),
      resolver:       self.resolver.clone(),
      cron_secret:    self.cron_secret.clone(),
      session_ttl:    self.session_ttl,
      secure_cookies: self.secure_cookies,
    }
  }
}

impl<S: AccountStore> ApiState<S> {
  pub fn new(store: Arc<S>, sessions: Arc<SessionKeys>) -> Self {
    Self {
      resolver: Resolver::new(Arc::clone(&store), Arc::clone(&sessions)),
      store,
      sessions,
      cron_secret: None,
      session_ttl: chrono::Duration::hours(24),
      secure_cookies: false,
    }
  }
}

/// Build the API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: AccountStore + SettingsStore + LeaveStore + 'static,
{
  Router::new()
    // Maintenance
    .route("/admin/maintenance-status", get(maintenance::status::<S>))
    .route(
      "/admin/maintenance",
      get(maintenance::get_setting::<S>).post(maintenance::update_setting::<S>),
    )
    // Scheduled jobs
    .route("/cron", post(cron::reset_leave::<S>))
    // Sessions
    .route("/auth/{area}/sign-in", post(auth::sign_in::<S>))
    .route("/auth/{area}/sign-out", post(auth::sign_out))
    .route("/auth/{area}/me", get(auth::me::<S>))
    .with_state(state)
}
