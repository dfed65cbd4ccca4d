//! Principal: the resolved identity of the caller of a request.
//!
//! A principal is never persisted. It is rebuilt on every request from the
//! session credential by looking the subject up in the account table that
//! matches its [`AccountKind`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

// ─── Account kinds ───────────────────────────────────────────────────────────

/// The account table a session subject is looked up in.
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
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccountKind {
  Client,
  Supplier,
  /// Employees of every grade, including heads and superadmins.
  User,
}

impl AccountKind {
  /// Name of the cookie holding this kind's session credential.
  pub fn cookie_name(self) -> &'static str {
    match self {
      AccountKind::Client => "client_session",
      AccountKind::Supplier => "supplier_session",
      AccountKind::User => "user_session",
    }
  }
}

/// Grade of an employee account.
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
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
  Employee,
  Head,
  Superadmin,
  ReportingManager,
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
  pub department_id: Uuid,
  pub name:          String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTitle {
  pub job_title_id: Uuid,
  pub title:        String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
  pub client_id: Uuid,
  pub name:      String,
  pub email:     String,
  pub company:   Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierProfile {
  pub supplier_id: Uuid,
  pub name:        String,
  pub email:       String,
  pub company:     Option<String>,
}

/// An employee account with its nested department and job title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
  pub user_id:    Uuid,
  pub name:       String,
  pub email:      String,
  pub role:       UserRole,
  pub department: Option<Department>,
  pub job_title:  Option<JobTitle>,
  pub branch_id:  Option<Uuid>,
}

// ─── Principal ───────────────────────────────────────────────────────────────

/// The identity behind a successfully resolved request. Exactly one variant
/// is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
  Client(ClientProfile),
  Supplier(SupplierProfile),
  Employee(EmployeeProfile),
}

impl Principal {
  pub fn id(&self) -> Uuid {
    match self {
      Principal::Client(c) => c.client_id,
      Principal::Supplier(s) => s.supplier_id,
      Principal::Employee(e) => e.user_id,
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Principal::Client(c) => &c.name,
      Principal::Supplier(s) => &s.name,
      Principal::Employee(e) => &e.name,
    }
  }

  pub fn kind(&self) -> AccountKind {
    match self {
      Principal::Client(_) => AccountKind::Client,
      Principal::Supplier(_) => AccountKind::Supplier,
      Principal::Employee(_) => AccountKind::User,
    }
  }

  /// The employee grade, if this is an employee principal.
  pub fn user_role(&self) -> Option<UserRole> {
    match self {
      Principal::Employee(e) => Some(e.role),
      _ => None,
    }
  }
}

// ─── Account creation and sign-in ───────────────────────────────────────────

/// Input to [`AccountStore::add_account`](crate::store::AccountStore::add_account).
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub name:          String,
  pub email:         String,
  /// argon2 PHC string.
  pub password_hash: String,
  pub profile:       NewProfile,
}

#[derive(Debug, Clone)]
pub enum NewProfile {
  Client {
    company: Option<String>,
  },
  Supplier {
    company: Option<String>,
  },
  Employee {
    role:          UserRole,
    department_id: Option<Uuid>,
    job_title_id:  Option<Uuid>,
    branch_id:     Option<Uuid>,
  },
}

impl NewProfile {
  pub fn kind(&self) -> AccountKind {
    match self {
      NewProfile::Client { .. } => AccountKind::Client,
      NewProfile::Supplier { .. } => AccountKind::Supplier,
      NewProfile::Employee { .. } => AccountKind::User,
    }
  }
}

/// What sign-in needs to check a password: never leaves the server.
#[derive(Clone)]
pub struct Credentials {
  pub account_id:    Uuid,
  pub password_hash: String,
  /// Set for employee accounts only.
  pub role:          Option<UserRole>,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("account_id", &self.account_id)
      .field("role", &self.role)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn account_kind_round_trips_through_strings() {
    assert_eq!(AccountKind::User.to_string(), "user");
    assert_eq!("supplier".parse::<AccountKind>().unwrap(), AccountKind::Supplier);
    assert!("admin".parse::<AccountKind>().is_err());
  }

  #[test]
  fn user_role_uses_snake_case() {
    assert_eq!(UserRole::ReportingManager.to_string(), "reporting_manager");
    assert_eq!(
      "reporting_manager".parse::<UserRole>().unwrap(),
      UserRole::ReportingManager
    );
  }

  #[test]
  fn principal_serialises_with_kind_tag() {
    let p = Principal::Client(ClientProfile {
      client_id: Uuid::nil(),
      name:      "Acme Security".into(),
      email:     "ops@acme.test".into(),
      company:   None,
    });
    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["kind"], "client");
    assert_eq!(p.kind(), AccountKind::Client);
    assert_eq!(p.user_role(), None);
  }

  #[test]
  fn credentials_debug_hides_hash() {
    let c = Credentials {
      account_id:    Uuid::nil(),
      password_hash: "$argon2id$secret".into(),
      role:          None,
    };
    assert!(!format!("{c:?}").contains("argon2"));
  }
}
