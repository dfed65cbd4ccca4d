//! The maintenance setting and the gate that enforces it.
//!
//! The gate has two states, OPEN and BLOCKED, derived from the setting's
//! `enabled` flag. It is evaluated for every request whose path is not
//! exempt. The setting comes from an injected [`SettingsStore`]; what happens
//! when that fetch fails is decided by [`FailPolicy`].

use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::store::SettingsStore;

/// Identifier of the one meaningful settings row.
pub const MAINTENANCE_SETTING_ID: i64 = 1;

/// Path prefixes the gate never redirects.
pub const DEFAULT_EXEMPT_PREFIXES: &[&str] = &[
  "/maintenance",
  "/api",
  "/_next",
  "/assets",
  "/superadmin",
  "/favicon.ico",
];

/// Contents of the single-row maintenance setting. A missing row reads as
/// [`MaintenanceSetting::default`], i.e. disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceSetting {
  pub enabled:  bool,
  pub message:  String,
  pub end_time: Option<DateTime<Utc>>,
}

/// ISO-8601 with millisecond precision and a `Z` suffix, e.g.
/// `2025-12-31T00:00:00.000Z`.
pub fn format_instant(at: DateTime<Utc>) -> String {
  at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ─── Gate configuration ──────────────────────────────────────────────────────

/// What the gate does when the setting cannot be fetched.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FailPolicy {
  /// Let the request through and log the failure.
  #[default]
  Open,
  /// Treat the site as under maintenance.
  Closed,
}

#[derive(Debug, Clone)]
pub struct GateConfig {
  pub exempt_prefixes: Vec<String>,
  pub fail_policy:     FailPolicy,
  /// How long a fetched setting is reused. Zero disables caching.
  pub cache_ttl:       Duration,
}

impl Default for GateConfig {
  fn default() -> Self {
    Self {
      exempt_prefixes: DEFAULT_EXEMPT_PREFIXES
        .iter()
        .map(|p| (*p).to_owned())
        .collect(),
      fail_policy:     FailPolicy::Open,
      cache_ttl:       Duration::ZERO,
    }
  }
}

impl GateConfig {
  /// A path is exempt when it equals a prefix or continues it with `/`.
  pub fn is_exempt(&self, path: &str) -> bool {
    self.exempt_prefixes.iter().any(|prefix| {
      let prefix = prefix.trim_end_matches('/');
      match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
      }
    })
  }
}

// ─── Gate ────────────────────────────────────────────────────────────────────

/// Outcome of evaluating the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
  /// Path is on the exemption list; the setting was not consulted.
  Exempt,
  /// Maintenance is off.
  Open,
  /// The fetch failed and the policy let the request through.
  FailedOpen,
  /// Maintenance is on; redirect to the notice page.
  Blocked(MaintenanceSetting),
}

impl GateDecision {
  pub fn is_blocked(&self) -> bool { matches!(self, GateDecision::Blocked(_)) }
}

struct CachedSetting {
  fetched_at: Instant,
  setting:    MaintenanceSetting,
}

pub struct MaintenanceGate {
  config: GateConfig,
  cache:  Mutex<Option<CachedSetting>>,
}

impl MaintenanceGate {
  pub fn new(config: GateConfig) -> Self {
    Self {
      config,
      cache: Mutex::new(None),
    }
  }

  /// Decide what to do with a request for `path`.
  pub async fn evaluate<P>(&self, path: &str, provider: &P) -> GateDecision
  where
    P: SettingsStore,
  {
    if self.config.is_exempt(path) {
      return GateDecision::Exempt;
    }

    match self.current(provider).await {
      Ok(setting) if setting.enabled => GateDecision::Blocked(setting),
      Ok(_) => GateDecision::Open,
      Err(e) => match self.config.fail_policy {
        FailPolicy::Open => {
          tracing::warn!(error = %e, path, "maintenance setting fetch failed; failing open");
          GateDecision::FailedOpen
        }
        FailPolicy::Closed => {
          tracing::warn!(error = %e, path, "maintenance setting fetch failed; failing closed");
          GateDecision::Blocked(MaintenanceSetting {
            enabled: true,
            ..MaintenanceSetting::default()
          })
        }
      },
    }
  }

  /// Drop any cached setting so the next evaluation fetches afresh.
  pub fn invalidate(&self) { *self.cache.lock() = None; }

  async fn current<P>(&self, provider: &P) -> Result<MaintenanceSetting, P::Error>
  where
    P: SettingsStore,
  {
    let ttl = self.config.cache_ttl;
    if !ttl.is_zero() {
      let cached = {
        let guard = self.cache.lock();
        guard
          .as_ref()
          .filter(|c| c.fetched_at.elapsed() < ttl)
          .map(|c| c.setting.clone())
      };
      if let Some(setting) = cached {
        return Ok(setting);
      }
    }

    let setting = provider.get_maintenance().await?.unwrap_or_default();

    if !ttl.is_zero() {
      *self.cache.lock() = Some(CachedSetting {
        fetched_at: Instant::now(),
        setting:    setting.clone(),
      });
    }
    Ok(setting)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::store::Store;

  /// In-memory provider that counts fetches.
  struct FixedSettings {
    setting: Option<MaintenanceSetting>,
    fetches: AtomicUsize,
  }

  impl FixedSettings {
    fn new(setting: Option<MaintenanceSetting>) -> Self {
      Self { setting, fetches: AtomicUsize::new(0) }
    }
  }

  impl Store for FixedSettings {
    type Error = std::io::Error;
  }

  impl SettingsStore for FixedSettings {
    async fn get_maintenance(&self) -> Result<Option<MaintenanceSetting>, Self::Error> {
      self.fetches.fetch_add(1, Ordering::SeqCst);
      Ok(self.setting.clone())
    }

    async fn put_maintenance(&self, _: MaintenanceSetting) -> Result<(), Self::Error> {
      unimplemented!()
    }
  }

  struct BrokenSettings;

  impl Store for BrokenSettings {
    type Error = std::io::Error;
  }

  impl SettingsStore for BrokenSettings {
    async fn get_maintenance(&self) -> Result<Option<MaintenanceSetting>, Self::Error> {
      Err(std::io::Error::other("database is locked"))
    }

    async fn put_maintenance(&self, _: MaintenanceSetting) -> Result<(), Self::Error> {
      unimplemented!()
    }
  }

  fn enabled() -> MaintenanceSetting {
    MaintenanceSetting {
      enabled:  true,
      message:  "Payroll migration".into(),
      end_time: None,
    }
  }

  #[test]
  fn exemptions_match_whole_segments() {
    let cfg = GateConfig::default();
    assert!(cfg.is_exempt("/api"));
    assert!(cfg.is_exempt("/api/anything"));
    assert!(cfg.is_exempt("/superadmin/anything"));
    assert!(cfg.is_exempt("/maintenance"));
    assert!(cfg.is_exempt("/_next/static/chunk.js"));
    assert!(!cfg.is_exempt("/apiary"));
    assert!(!cfg.is_exempt("/head/dashboard"));
    assert!(!cfg.is_exempt("/"));
  }

  #[test]
  fn format_instant_matches_iso_with_millis() {
    let at = DateTime::parse_from_rfc3339("2025-12-31T00:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    assert_eq!(format_instant(at), "2025-12-31T00:00:00.000Z");
  }

  #[tokio::test]
  async fn blocks_non_exempt_paths_when_enabled() {
    let gate     = MaintenanceGate::new(GateConfig::default());
    let provider = FixedSettings::new(Some(enabled()));
    assert_eq!(
      gate.evaluate("/head/dashboard", &provider).await,
      GateDecision::Blocked(enabled())
    );
    assert_eq!(gate.evaluate("/api/anything", &provider).await, GateDecision::Exempt);
    assert_eq!(
      gate.evaluate("/superadmin/anything", &provider).await,
      GateDecision::Exempt
    );
  }

  #[tokio::test]
  async fn missing_row_means_open() {
    let gate     = MaintenanceGate::new(GateConfig::default());
    let provider = FixedSettings::new(None);
    assert_eq!(gate.evaluate("/client", &provider).await, GateDecision::Open);
  }

  #[tokio::test]
  async fn exempt_paths_skip_the_fetch() {
    let gate     = MaintenanceGate::new(GateConfig::default());
    let provider = FixedSettings::new(Some(enabled()));
    gate.evaluate("/api/admin/maintenance", &provider).await;
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn fetch_failure_fails_open_by_default() {
    let gate = MaintenanceGate::new(GateConfig::default());
    assert_eq!(
      gate.evaluate("/employee", &BrokenSettings).await,
      GateDecision::FailedOpen
    );
  }

  #[tokio::test]
  async fn fetch_failure_blocks_under_closed_policy() {
    let gate = MaintenanceGate::new(GateConfig {
      fail_policy: FailPolicy::Closed,
      ..GateConfig::default()
    });
    assert!(gate.evaluate("/employee", &BrokenSettings).await.is_blocked());
  }

  #[tokio::test]
  async fn cache_reuses_setting_within_ttl() {
    let gate = MaintenanceGate::new(GateConfig {
      cache_ttl: Duration::from_secs(60),
      ..GateConfig::default()
    });
    let provider = FixedSettings::new(Some(enabled()));
    gate.evaluate("/client", &provider).await;
    gate.evaluate("/client/orders", &provider).await;
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);

    gate.invalidate();
    gate.evaluate("/client", &provider).await;
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn zero_ttl_always_fetches() {
    let gate     = MaintenanceGate::new(GateConfig::default());
    let provider = FixedSettings::new(None);
    gate.evaluate("/client", &provider).await;
    gate.evaluate("/client", &provider).await;
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);
  }
}
