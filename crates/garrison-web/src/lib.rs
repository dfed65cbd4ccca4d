//! HTTP front end for Garrison.
//!
//! Wires the maintenance gate, the per-area layout guards, the HTML page
//! shells and the JSON API into one axum [`Router`] backed by any store
//! implementing the `garrison-core` store traits.

pub mod error;
pub mod gate;
pub mod guard;
pub mod pages;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, middleware, routing::get};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use garrison_api::ApiState;
use garrison_core::{
  area::RoleArea,
  maintenance::{FailPolicy, GateConfig, MaintenanceGate},
  resolve::Resolver,
  session::SessionKeys,
  store::{AccountStore, LeaveStore, SettingsStore},
};
use serde::Deserialize;
use strum::IntoEnumIterator as _;
use tower_http::{services::ServeDir, trace::TraceLayer};

use guard::AreaGuard;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                    String,
  #[serde(default = "default_port")]
  pub port:                    u16,
  #[serde(default = "default_store_path")]
  pub store_path:              PathBuf,
  /// HMAC secret for session credentials (`JWT_SECRET`).
  pub jwt_secret:              String,
  /// Bearer secret for `/api/cron` (`CRON_SECRET`).
  #[serde(default)]
  pub cron_secret:             Option<String>,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours:       u32,
  #[serde(default)]
  pub secure_cookies:          bool,
  #[serde(default)]
  pub maintenance_fail_policy: FailPolicy,
  #[serde(default)]
  pub maintenance_cache_secs:  u64,
  /// Extra path prefixes the maintenance gate lets through.
  #[serde(default)]
  pub maintenance_exempt:      Vec<String>,
  /// Static files served under `/assets`.
  #[serde(default)]
  pub assets_dir:              Option<PathBuf>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/garrison/garrison.db") }
fn default_session_ttl_hours() -> u32 { 24 }

impl ServerConfig {
  /// Read `path` (if it exists), then `GARRISON_*` variables, then the bare
  /// `JWT_SECRET` and `CRON_SECRET` variables.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(Config::builder().add_source(File::from(path).required(false)))
  }

  /// Layer the environment over `builder` and deserialise.
  pub fn from_builder(
    builder: ConfigBuilder<DefaultState>,
  ) -> Result<Self, ConfigError> {
    let config: Self = builder
      .add_source(
        Environment::with_prefix("GARRISON")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("maintenance_exempt"),
      )
      .set_override_option("jwt_secret", std::env::var("JWT_SECRET").ok())?
      .set_override_option("cron_secret", std::env::var("CRON_SECRET").ok())?
      .build()?
      .try_deserialize()?;

    if config.jwt_secret.is_empty() {
      return Err(ConfigError::Message("jwt_secret must not be empty".into()));
    }
    Ok(config)
  }

  pub fn gate_config(&self) -> GateConfig {
    let mut gate = GateConfig {
      fail_policy: self.maintenance_fail_policy,
      cache_ttl: std::time::Duration::from_secs(self.maintenance_cache_secs),
      ..GateConfig::default()
    };
    gate
      .exempt_prefixes
      .extend(self.maintenance_exempt.iter().cloned());
    gate
  }

  pub fn session_ttl(&self) -> chrono::Duration {
    chrono::Duration::hours(i64::from(self.session_ttl_hours))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the gate, the guards and the page handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub sessions: Arc<SessionKeys>,
  pub resolver: Resolver<S>,
  pub gate:     Arc<MaintenanceGate>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      config:   Arc::clone(&self.config),
      sessions: Arc::clone(&self.sessions),
      resolver: self.resolver.clone(),
      gate:     Arc::clone(&self.gate),
    }
  }
}

impl<S: AccountStore> AppState<S> {
  pub fn new(store: Arc<S>, config: ServerConfig) -> Self {
    let sessions = Arc::new(SessionKeys::from_secret(config.jwt_secret.as_bytes()));
    Self {
      resolver: Resolver::new(Arc::clone(&store), Arc::clone(&sessions)),
      gate: Arc::new(MaintenanceGate::new(config.gate_config())),
      store,
      sessions,
      config: Arc::new(config),
    }
  }

  /// State for the JSON API, sharing this state's store and keys.
  pub fn api_state(&self) -> ApiState<S> {
    let mut api = ApiState::new(Arc::clone(&self.store), Arc::clone(&self.sessions));
    api.cron_secret = self.config.cron_secret.as_deref().map(Arc::from);
    api.session_ttl = self.config.session_ttl();
    api.secure_cookies = self.config.secure_cookies;
    api
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AccountStore + SettingsStore + LeaveStore + 'static,
{
  let mut app = Router::new()
    .route("/", get(pages::landing))
    .route("/maintenance", get(pages::maintenance_notice::<S>))
    .nest_service("/api", garrison_api::api_router(state.api_state()));

  for area in RoleArea::iter() {
    app = app.merge(area_router(area, state.clone()));
  }

  if let Some(dir) = &state.config.assets_dir {
    app = app.nest_service("/assets", ServeDir::new(dir));
  }

  app
    .layer(middleware::from_fn_with_state(
      state.clone(),
      gate::maintenance_gate::<S>,
    ))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Pages under `/<area>`, with and without a trailing slash. Everything
/// except the sign-in form sits behind the area's guard.
fn area_router<S>(area: RoleArea, state: AppState<S>) -> Router<AppState<S>>
where
  S: AccountStore + SettingsStore + LeaveStore + 'static,
{
  let prefix = area.path_prefix();
  Router::new()
    .route(&prefix, get(pages::area_page))
    .route(&format!("{prefix}/"), get(pages::area_page))
    .route(&format!("{prefix}/{{*rest}}"), get(pages::area_page))
    .route_layer(middleware::from_fn_with_state(
      AreaGuard { area, state },
      guard::require_principal::<S>,
    ))
    .route(
      &area.sign_in_path(),
      get(move || async move { pages::sign_in_form(area) }),
    )
}
