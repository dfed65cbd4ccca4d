//! Storage traits.
//!
//! Implemented by storage backends (e.g. `garrison-store-sqlite`). The
//! resolver, the maintenance gate and the HTTP crates depend on these
//! abstractions, not on any concrete backend. All three traits share the
//! backend's error type through [`Store`].

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  leave::{LeaveBalance, NewLeaveBalance},
  maintenance::MaintenanceSetting,
  principal::{AccountKind, Credentials, Department, JobTitle, NewAccount, Principal},
};

/// Common supertrait naming the backend error.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// Client, supplier and user accounts, addressed by [`AccountKind`].
pub trait AccountStore: Store {
  fn add_department(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  fn add_job_title(
    &self,
    title: String,
  ) -> impl Future<Output = Result<JobTitle, Self::Error>> + Send + '_;

  /// Persist a new account and return it as a resolved [`Principal`].
  fn add_account(
    &self,
    account: NewAccount,
  ) -> impl Future<Output = Result<Principal, Self::Error>> + Send + '_;

  /// Look up an account by id in the table for `kind`. Employee principals
  /// come back with their department and job title joined in.
  fn find_principal(
    &self,
    kind: AccountKind,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send + '_;

  /// Look up sign-in credentials by email in the table for `kind`.
  fn find_credentials<'a>(
    &'a self,
    kind: AccountKind,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;
}

// ─── Settings ────────────────────────────────────────────────────────────────

/// The single-row maintenance setting. This is the provider injected into
/// the [`MaintenanceGate`](crate::maintenance::MaintenanceGate).
pub trait SettingsStore: Store {
  /// `None` when the row has never been written.
  fn get_maintenance(
    &self,
  ) -> impl Future<Output = Result<Option<MaintenanceSetting>, Self::Error>> + Send + '_;

  /// Insert or replace the row.
  fn put_maintenance(
    &self,
    setting: MaintenanceSetting,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Leave balances ─────────────────────────────────────────────────────────

pub trait LeaveStore: Store {
  fn add_leave_balance(
    &self,
    input: NewLeaveBalance,
  ) -> impl Future<Output = Result<LeaveBalance, Self::Error>> + Send + '_;

  /// All balances, optionally restricted to one year.
  fn list_leave_balances(
    &self,
    year: Option<i32>,
  ) -> impl Future<Output = Result<Vec<LeaveBalance>, Self::Error>> + Send + '_;

  /// Zero `paid_leave_used` and stamp `last_reset_date` on every balance of
  /// `year`. Returns the number of rows touched.
  fn reset_paid_leave(
    &self,
    year: i32,
    reset_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
