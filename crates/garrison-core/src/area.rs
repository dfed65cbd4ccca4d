//! Role areas: the URL sections each guarded by one kind of principal.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::principal::{AccountKind, Principal, UserRole};

/// A guarded section of the site, mounted at `/<area>`.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RoleArea {
  Client,
  Employee,
  Head,
  Superadmin,
  Supplier,
  ReportingManager,
}

impl RoleArea {
  /// The account table principals of this area come from.
  pub fn account_kind(self) -> AccountKind {
    match self {
      RoleArea::Client => AccountKind::Client,
      RoleArea::Supplier => AccountKind::Supplier,
      RoleArea::Employee
      | RoleArea::Head
      | RoleArea::Superadmin
      | RoleArea::ReportingManager => AccountKind::User,
    }
  }

  /// The employee grade required for user-backed areas.
  pub fn required_role(self) -> Option<UserRole> {
    match self {
      RoleArea::Client | RoleArea::Supplier => None,
      RoleArea::Employee => Some(UserRole::Employee),
      RoleArea::Head => Some(UserRole::Head),
      RoleArea::Superadmin => Some(UserRole::Superadmin),
      RoleArea::ReportingManager => Some(UserRole::ReportingManager),
    }
  }

  /// Whether `principal` may enter this area.
  pub fn admits(self, principal: &Principal) -> bool {
    principal.kind() == self.account_kind()
      && self.required_role() == principal.user_role()
  }

  /// Whether an account with the given grade may sign into this area.
  pub fn admits_role(self, role: Option<UserRole>) -> bool {
    self.required_role() == role
  }

  /// `/client`, `/reporting-manager`, …
  pub fn path_prefix(self) -> String {
    format!("/{self}")
  }

  pub fn sign_in_path(self) -> String {
    format!("/{self}/sign-in")
  }
}
