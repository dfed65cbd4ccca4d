//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Enums are stored as their snake_case names.

use chrono::{DateTime, Utc};
use garrison_core::{
  leave::LeaveBalance,
  maintenance::MaintenanceSetting,
  principal::{
    AccountKind, ClientProfile, Department, EmployeeProfile, JobTitle, Principal,
    SupplierProfile, UserRole,
  },
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── UserRole ─────────────────────────────────────────────────────────────────

pub fn encode_role(role: UserRole) -> &'static str { role.into() }

pub fn decode_role(s: &str) -> Result<UserRole> {
  s.parse()
    .map_err(|_| garrison_core::Error::UnknownRole(s.to_owned()).into())
}

// ─── Account tables ──────────────────────────────────────────────────────────

/// Table and primary-key column holding accounts of `kind`.
pub fn account_table(kind: AccountKind) -> (&'static str, &'static str) {
  match kind {
    AccountKind::Client => ("clients", "client_id"),
    AccountKind::Supplier => ("suppliers", "supplier_id"),
    AccountKind::User => ("users", "user_id"),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read from a `clients` or `suppliers` row; both share a shape.
pub struct RawParty {
  pub id:      String,
  pub name:    String,
  pub email:   String,
  pub company: Option<String>,
}

impl RawParty {
  pub fn into_client(self) -> Result<Principal> {
    Ok(Principal::Client(ClientProfile {
      client_id: decode_uuid(&self.id)?,
      name:      self.name,
      email:     self.email,
      company:   self.company,
    }))
  }

  pub fn into_supplier(self) -> Result<Principal> {
    Ok(Principal::Supplier(SupplierProfile {
      supplier_id: decode_uuid(&self.id)?,
      name:        self.name,
      email:       self.email,
      company:     self.company,
    }))
  }
}

/// Raw strings read from `users` left-joined with departments and job titles.
pub struct RawEmployee {
  pub user_id:         String,
  pub name:            String,
  pub email:           String,
  pub role:            String,
  pub branch_id:       Option<String>,
  pub department_id:   Option<String>,
  pub department_name: Option<String>,
  pub job_title_id:    Option<String>,
  pub job_title:       Option<String>,
}

impl RawEmployee {
  pub fn into_principal(self) -> Result<Principal> {
    let department = match (self.department_id, self.department_name) {
      (Some(id), Some(name)) => Some(Department {
        department_id: decode_uuid(&id)?,
        name,
      }),
      _ => None,
    };
    let job_title = match (self.job_title_id, self.job_title) {
      (Some(id), Some(title)) => Some(JobTitle {
        job_title_id: decode_uuid(&id)?,
        title,
      }),
      _ => None,
    };

    Ok(Principal::Employee(EmployeeProfile {
      user_id: decode_uuid(&self.user_id)?,
      name: self.name,
      email: self.email,
      role: decode_role(&self.role)?,
      department,
      job_title,
      branch_id: decode_opt_uuid(self.branch_id)?,
    }))
  }
}

pub struct RawSetting {
  pub maintenance_mode:     bool,
  pub maintenance_message:  String,
  pub maintenance_end_date: Option<String>,
}

impl RawSetting {
  pub fn into_setting(self) -> Result<MaintenanceSetting> {
    Ok(MaintenanceSetting {
      enabled:  self.maintenance_mode,
      message:  self.maintenance_message,
      end_time: decode_opt_dt(self.maintenance_end_date)?,
    })
  }
}

pub struct RawLeaveBalance {
  pub balance_id:       String,
  pub user_id:          String,
  pub year:             i32,
  pub paid_leave_total: f64,
  pub paid_leave_used:  f64,
  pub last_reset_date:  Option<String>,
}

impl RawLeaveBalance {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      balance_id:       row.get(0)?,
      user_id:          row.get(1)?,
      year:             row.get(2)?,
      paid_leave_total: row.get(3)?,
      paid_leave_used:  row.get(4)?,
      last_reset_date:  row.get(5)?,
    })
  }

  pub fn into_balance(self) -> Result<LeaveBalance> {
    Ok(LeaveBalance {
      balance_id:       decode_uuid(&self.balance_id)?,
      user_id:          decode_uuid(&self.user_id)?,
      year:             self.year,
      paid_leave_total: self.paid_leave_total,
      paid_leave_used:  self.paid_leave_used,
      last_reset_date:  decode_opt_dt(self.last_reset_date)?,
    })
  }
}
