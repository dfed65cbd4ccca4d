//! [`SqliteStore`], the SQLite implementation of the Garrison store traits.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use garrison_core::{
  leave::{LeaveBalance, NewLeaveBalance},
  maintenance::{MAINTENANCE_SETTING_ID, MaintenanceSetting},
  principal::{
    AccountKind, Credentials, Department, JobTitle, NewAccount, NewProfile, Principal,
  },
  store::{AccountStore, LeaveStore, SettingsStore, Store},
};

use crate::{
  Error, Result,
  encode::{
    RawEmployee, RawLeaveBalance, RawParty, RawSetting, account_table, decode_role,
    decode_uuid, encode_dt, encode_role, encode_uuid,
  },
  schema::SCHEMA,
};

const EMPLOYEE_SELECT: &str = "
  SELECT u.user_id, u.name, u.email, u.role, u.branch_id,
         d.department_id, d.name, j.job_title_id, j.title
    FROM users u
    LEFT JOIN departments d ON d.department_id = u.department_id
    LEFT JOIN job_titles  j ON j.job_title_id  = u.job_title_id
   WHERE u.user_id = ?1";

// ─── Store ───────────────────────────────────────────────────────────────────

/// Garrison storage backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl Store for SqliteStore {
  type Error = Error;
}

// ─── AccountStore impl ──────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  async fn add_department(&self, name: String) -> Result<Department> {
    let department = Department {
      department_id: Uuid::new_v4(),
      name,
    };
    let id_str = encode_uuid(department.department_id);
    let name   = department.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO departments (department_id, name) VALUES (?1, ?2)",
          rusqlite::params![id_str, name],
        )?;
        Ok(())
      })
      .await?;

    Ok(department)
  }

  async fn add_job_title(&self, title: String) -> Result<JobTitle> {
    let job_title = JobTitle {
      job_title_id: Uuid::new_v4(),
      title,
    };
    let id_str = encode_uuid(job_title.job_title_id);
    let title  = job_title.title.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO job_titles (job_title_id, title) VALUES (?1, ?2)",
          rusqlite::params![id_str, title],
        )?;
        Ok(())
      })
      .await?;

    Ok(job_title)
  }

  async fn add_account(&self, account: NewAccount) -> Result<Principal> {
    let id     = Uuid::new_v4();
    let kind   = account.profile.kind();
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let NewAccount { name, email, password_hash, profile } = account;

    self
      .conn
      .call(move |conn| {
        match profile {
          NewProfile::Client { company } | NewProfile::Supplier { company } => {
            let (table, id_col) = account_table(kind);
            conn.execute(
              &format!(
                "INSERT INTO {table} ({id_col}, name, email, password_hash, company, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
              ),
              rusqlite::params![id_str, name, email, password_hash, company, at_str],
            )?;
          }
          NewProfile::Employee { role, department_id, job_title_id, branch_id } => {
            conn.execute(
              "INSERT INTO users (
                 user_id, name, email, password_hash, role,
                 department_id, job_title_id, branch_id, created_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
              rusqlite::params![
                id_str,
                name,
                email,
                password_hash,
                encode_role(role),
                department_id.map(encode_uuid),
                job_title_id.map(encode_uuid),
                branch_id.map(encode_uuid),
                at_str,
              ],
            )?;
          }
        }
        Ok(())
      })
      .await?;

    self
      .find_principal(kind, id)
      .await?
      .ok_or(Error::AccountNotFound(id))
  }

  async fn find_principal(&self, kind: AccountKind, id: Uuid) -> Result<Option<Principal>> {
    let id_str = encode_uuid(id);

    match kind {
      AccountKind::Client | AccountKind::Supplier => {
        let (table, id_col) = account_table(kind);
        let raw: Option<RawParty> = self
          .conn
          .call(move |conn| {
            Ok(conn
              .query_row(
                &format!(
                  "SELECT {id_col}, name, email, company FROM {table} WHERE {id_col} = ?1"
                ),
                rusqlite::params![id_str],
                |row| {
                  Ok(RawParty {
                    id:      row.get(0)?,
                    name:    row.get(1)?,
                    email:   row.get(2)?,
                    company: row.get(3)?,
                  })
                },
              )
              .optional()?)
          })
          .await?;

        raw
          .map(|r| match kind {
            AccountKind::Client => r.into_client(),
            _ => r.into_supplier(),
          })
          .transpose()
      }
      AccountKind::User => {
        let raw: Option<RawEmployee> = self
          .conn
          .call(move |conn| {
            Ok(conn
              .query_row(EMPLOYEE_SELECT, rusqlite::params![id_str], |row| {
                Ok(RawEmployee {
                  user_id:         row.get(0)?,
                  name:            row.get(1)?,
                  email:           row.get(2)?,
                  role:            row.get(3)?,
                  branch_id:       row.get(4)?,
                  department_id:   row.get(5)?,
                  department_name: row.get(6)?,
                  job_title_id:    row.get(7)?,
                  job_title:       row.get(8)?,
                })
              })
              .optional()?)
          })
          .await?;

        raw.map(RawEmployee::into_principal).transpose()
      }
    }
  }

  async fn find_credentials(
    &self,
    kind: AccountKind,
    email: &str,
  ) -> Result<Option<Credentials>> {
    let (table, id_col) = account_table(kind);
    let role_col = match kind {
      AccountKind::User => "role",
      _ => "NULL",
    };
    let email = email.trim().to_owned();

    let raw: Option<(String, String, Option<String>)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {id_col}, password_hash, {role_col} FROM {table} WHERE email = ?1"
            ),
            rusqlite::params![email],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(id, password_hash, role)| {
        Ok(Credentials {
          account_id: decode_uuid(&id)?,
          password_hash,
          role: role.as_deref().map(decode_role).transpose()?,
        })
      })
      .transpose()
  }
}

// ─── SettingsStore impl ─────────────────────────────────────────────────────

impl SettingsStore for SqliteStore {
  async fn get_maintenance(&self) -> Result<Option<MaintenanceSetting>> {
    let raw: Option<RawSetting> = self
      .conn
      .call(|conn| {
        Ok(conn
          .query_row(
            "SELECT maintenance_mode, maintenance_message, maintenance_end_date
               FROM settings WHERE setting_id = ?1",
            rusqlite::params![MAINTENANCE_SETTING_ID],
            |row| {
              Ok(RawSetting {
                maintenance_mode:     row.get(0)?,
                maintenance_message:  row.get(1)?,
                maintenance_end_date: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSetting::into_setting).transpose()
  }

  async fn put_maintenance(&self, setting: MaintenanceSetting) -> Result<()> {
    let end_str = setting.end_time.map(encode_dt);
    let at_str  = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO settings (
             setting_id, maintenance_mode, maintenance_message, maintenance_end_date, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (setting_id) DO UPDATE SET
             maintenance_mode     = excluded.maintenance_mode,
             maintenance_message  = excluded.maintenance_message,
             maintenance_end_date = excluded.maintenance_end_date,
             updated_at           = excluded.updated_at",
          rusqlite::params![
            MAINTENANCE_SETTING_ID,
            setting.enabled,
            setting.message,
            end_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── LeaveStore impl ────────────────────────────────────────────────────────

impl LeaveStore for SqliteStore {
  async fn add_leave_balance(&self, input: NewLeaveBalance) -> Result<LeaveBalance> {
    let balance = LeaveBalance {
      balance_id:       Uuid::new_v4(),
      user_id:          input.user_id,
      year:             input.year,
      paid_leave_total: input.paid_leave_total,
      paid_leave_used:  input.paid_leave_used,
      last_reset_date:  None,
    };

    let id_str   = encode_uuid(balance.balance_id);
    let user_str = encode_uuid(balance.user_id);
    let year     = balance.year;
    let total    = balance.paid_leave_total;
    let used     = balance.paid_leave_used;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO leave_balances (balance_id, user_id, year, paid_leave_total, paid_leave_used)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, user_str, year, total, used],
        )?;
        Ok(())
      })
      .await?;

    Ok(balance)
  }

  async fn list_leave_balances(&self, year: Option<i32>) -> Result<Vec<LeaveBalance>> {
    let raws: Vec<RawLeaveBalance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT balance_id, user_id, year, paid_leave_total, paid_leave_used, last_reset_date
             FROM leave_balances
            WHERE ?1 IS NULL OR year = ?1
            ORDER BY year, user_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![year], RawLeaveBalance::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLeaveBalance::into_balance).collect()
  }

  async fn reset_paid_leave(&self, year: i32, reset_at: DateTime<Utc>) -> Result<u64> {
    let at_str = encode_dt(reset_at);

    let touched = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE leave_balances
              SET paid_leave_used = 0, last_reset_date = ?2
            WHERE year = ?1",
          rusqlite::params![year, at_str],
        )?)
      })
      .await?;

    Ok(touched as u64)
  }
}
