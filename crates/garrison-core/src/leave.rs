//! Yearly paid-leave balances and the annual reset rule.

use chrono::{DateTime, Datelike as _, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
  pub balance_id:       Uuid,
  pub user_id:          Uuid,
  pub year:             i32,
  pub paid_leave_total: f64,
  pub paid_leave_used:  f64,
  pub last_reset_date:  Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewLeaveBalance {
  pub user_id:          Uuid,
  pub year:             i32,
  pub paid_leave_total: f64,
  pub paid_leave_used:  f64,
}

/// The year whose balances the reset run at `now` clears: the one before.
pub fn reset_target_year(now: DateTime<Utc>) -> i32 { now.year() - 1 }

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn reset_targets_previous_year() {
    let jan_first = Utc.with_ymd_and_hms(2026, 1, 1, 0, 5, 0).unwrap();
    assert_eq!(reset_target_year(jan_first), 2025);
  }
}
