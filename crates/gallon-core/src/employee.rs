//! Employee identity plus monthly quota state.
//!
//! All quota rules here are pure functions of the record and an explicitly
//! supplied `now`. Persisting the result is the caller's job.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  DistributionError, Error, Ineligibility, Result,
  quota::{self, DEFAULT_MONTHLY_QUOTA, QuotaSnapshot},
};

// ─── Record ──────────────────────────────────────────────────────────────────

/// An employee and their quota state.
///
/// `id` is the storage key; `identifier` is the business key printed on the
/// badge and never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  pub id:               Uuid,
  pub identifier:       String,
  pub name:             String,
  pub department:       String,
  pub monthly_quota:    u32,
  /// Always within `0..=monthly_quota`.
  pub current_quota:    u32,
  /// First day of the month in which the quota was last restored.
  pub quota_reset_date: NaiveDate,
  pub is_active:        bool,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

impl Employee {
  /// Build a new employee with a full quota, reset as of the current month.
  pub fn create(input: NewEmployee, now: DateTime<Utc>) -> Result<Self> {
    let input = input.validated()?;
    let monthly_quota = input.monthly_quota.unwrap_or(DEFAULT_MONTHLY_QUOTA);

    Ok(Self {
      id: Uuid::new_v4(),
      identifier: input.identifier,
      name: input.name,
      department: input.department,
      monthly_quota,
      current_quota: monthly_quota,
      quota_reset_date: quota::month_start(now.date_naive()),
      is_active: input.is_active,
      created_at: now,
      updated_at: now,
    })
  }

  pub fn snapshot(&self) -> QuotaSnapshot {
    QuotaSnapshot {
      monthly_quota:    self.monthly_quota,
      current_quota:    self.current_quota,
      quota_reset_date: self.quota_reset_date,
      is_active:        self.is_active,
    }
  }

  /// Gallons consumed since the last reset.
  pub fn used_quota(&self) -> u32 {
    self.monthly_quota.saturating_sub(self.current_quota)
  }

  /// Restore the full monthly quota if `now` is in a later (or earlier)
  /// calendar month than the last reset. Returns whether anything changed.
  pub fn reset_if_new_month(&mut self, now: DateTime<Utc>) -> bool {
    let today = now.date_naive();
    if quota::same_month(self.quota_reset_date, today) {
      return false;
    }
    self.current_quota = self.monthly_quota;
    self.quota_reset_date = quota::month_start(today);
    self.updated_at = now;
    true
  }

  /// The reason this employee cannot take gallons, ignoring any pending reset.
  pub fn ineligibility(&self) -> Option<Ineligibility> {
    if !self.is_active {
      Some(Ineligibility::Inactive)
    } else if self.current_quota == 0 {
      Some(Ineligibility::NoQuotaRemaining)
    } else {
      None
    }
  }

  /// Apply any pending reset, then report whether a distribution is allowed.
  pub fn can_distribute(&mut self, now: DateTime<Utc>) -> bool {
    self.reset_if_new_month(now);
    self.ineligibility().is_none()
  }

  /// Consume `quantity` gallons in memory.
  ///
  /// Checks run in order: a non-zero quantity, eligibility (after the lazy
  /// reset), then sufficiency. On error the quota is left untouched, although
  /// a reset may already have been applied.
  pub fn take(&mut self, quantity: u32, now: DateTime<Utc>) -> Result<(), DistributionError> {
    if quantity == 0 {
      return Err(DistributionError::ZeroQuantity);
    }
    if !self.can_distribute(now) {
      let reason = self.ineligibility().unwrap_or(Ineligibility::NoQuotaRemaining);
      return Err(DistributionError::NotEligible(reason));
    }
    if self.current_quota < quantity {
      return Err(DistributionError::InsufficientQuota {
        remaining: self.current_quota,
      });
    }
    self.current_quota -= quantity;
    self.updated_at = now;
    Ok(())
  }

  /// Apply an administrative edit.
  ///
  /// Lowering `monthly_quota` below the remaining quota clamps the remaining
  /// quota down; raising it leaves the remaining quota alone until the next
  /// reset.
  pub fn apply_update(&mut self, update: EmployeeUpdate, now: DateTime<Utc>) -> Result<()> {
    let update = update.validated()?;

    if let Some(name) = update.name {
      self.name = name;
    }
    if let Some(department) = update.department {
      self.department = department;
    }
    if let Some(monthly_quota) = update.monthly_quota {
      self.monthly_quota = monthly_quota;
      self.current_quota = self.current_quota.min(monthly_quota);
    }
    if let Some(is_active) = update.is_active {
      self.is_active = is_active;
    }
    self.updated_at = now;
    Ok(())
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Administrative input for creating an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
  pub identifier:    String,
  pub name:          String,
  pub department:    String,
  /// Defaults to [`DEFAULT_MONTHLY_QUOTA`].
  #[serde(default)]
  pub monthly_quota: Option<u32>,
  #[serde(default = "default_true")]
  pub is_active:     bool,
}

fn default_true() -> bool { true }

impl NewEmployee {
  pub fn new(
    identifier: impl Into<String>,
    name: impl Into<String>,
    department: impl Into<String>,
  ) -> Self {
    Self {
      identifier:    identifier.into(),
      name:          name.into(),
      department:    department.into(),
      monthly_quota: None,
      is_active:     true,
    }
  }

  fn validated(self) -> Result<Self> {
    let identifier = required("identifier", self.identifier)?;
    let name = required("name", self.name)?;
    let department = required("department", self.department)?;
    if let Some(q) = self.monthly_quota {
      check_monthly_quota(q)?;
    }
    Ok(Self { identifier, name, department, ..self })
  }
}

/// A partial administrative edit. `None` fields are left unchanged; the
/// business identifier cannot be edited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
  pub name:          Option<String>,
  pub department:    Option<String>,
  pub monthly_quota: Option<u32>,
  pub is_active:     Option<bool>,
}

impl EmployeeUpdate {
  fn validated(self) -> Result<Self> {
    let name = self.name.map(|n| required("name", n)).transpose()?;
    let department = self
      .department
      .map(|d| required("department", d))
      .transpose()?;
    if let Some(q) = self.monthly_quota {
      check_monthly_quota(q)?;
    }
    Ok(Self { name, department, ..self })
  }
}

fn required(field: &'static str, value: String) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::EmptyField(field));
  }
  Ok(trimmed.to_owned())
}

fn check_monthly_quota(quota: u32) -> Result<()> {
  if quota == 0 {
    return Err(Error::InvalidMonthlyQuota(quota));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
  }

  fn employee(current: u32, monthly: u32, active: bool, now: DateTime<Utc>) -> Employee {
    let mut input = NewEmployee::new("EMP1001", "Ada Lovelace", "Operations");
    input.monthly_quota = Some(monthly);
    input.is_active = active;
    let mut e = Employee::create(input, now).unwrap();
    e.current_quota = current;
    e
  }

  #[test]
  fn create_starts_with_full_quota_at_month_start() {
    let now = at(2024, 7, 18);
    let e = Employee::create(NewEmployee::new("  EMP1  ", "Ada", "Ops"), now).unwrap();
    assert_eq!(e.identifier, "EMP1");
    assert_eq!(e.monthly_quota, DEFAULT_MONTHLY_QUOTA);
    assert_eq!(e.current_quota, DEFAULT_MONTHLY_QUOTA);
    assert_eq!(e.quota_reset_date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    assert!(e.is_active);
  }

  #[test]
  fn create_rejects_blank_fields_and_zero_quota() {
    let now = at(2024, 7, 18);
    assert_eq!(
      Employee::create(NewEmployee::new(" ", "Ada", "Ops"), now),
      Err(Error::EmptyField("identifier"))
    );
    let mut input = NewEmployee::new("EMP1", "Ada", "Ops");
    input.monthly_quota = Some(0);
    assert_eq!(Employee::create(input, now), Err(Error::InvalidMonthlyQuota(0)));
  }

  #[test]
  fn reset_restores_quota_in_new_month() {
    let mut e = employee(5, 10, true, at(2024, 6, 3));
    let now = at(2024, 7, 18);

    assert!(e.reset_if_new_month(now));
    assert_eq!(e.current_quota, 10);
    assert_eq!(e.quota_reset_date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
  }

  #[test]
  fn reset_is_idempotent_within_month() {
    let mut e = employee(5, 10, true, at(2024, 6, 3));
    let now = at(2024, 7, 18);
    assert!(e.reset_if_new_month(now));
    e.current_quota = 4;

    assert!(!e.reset_if_new_month(at(2024, 7, 31)));
    assert_eq!(e.current_quota, 4);
  }

  #[test]
  fn reset_same_month_is_noop() {
    let mut e = employee(5, 10, true, at(2024, 6, 3));
    let before = e.clone();
    assert!(!e.reset_if_new_month(at(2024, 6, 30)));
    assert_eq!(e, before);
  }

  #[test]
  fn reset_crossing_year_boundary() {
    let mut e = employee(0, 8, true, at(2023, 12, 31));
    assert!(e.reset_if_new_month(at(2024, 1, 1)));
    assert_eq!(e.current_quota, 8);
  }

  #[test]
  fn can_distribute_requires_active_and_quota() {
    let now = at(2024, 6, 10);
    assert!(employee(5, 10, true, now).can_distribute(now));
    assert!(!employee(5, 10, false, now).can_distribute(now));
    assert!(!employee(0, 10, true, now).can_distribute(now));
  }

  #[test]
  fn can_distribute_applies_pending_reset() {
    let mut e = employee(0, 10, true, at(2024, 5, 20));
    assert!(e.can_distribute(at(2024, 6, 1)));
    assert_eq!(e.current_quota, 10);
  }

  #[test]
  fn take_decrements_quota() {
    let now = at(2024, 6, 10);
    let mut e = employee(10, 10, true, now);
    e.take(3, now).unwrap();
    assert_eq!(e.current_quota, 7);
    assert_eq!(e.used_quota(), 3);
  }

  #[test]
  fn take_reports_actual_remaining_quota() {
    let now = at(2024, 6, 10);
    let mut e = employee(1, 10, true, now);
    assert_eq!(
      e.take(2, now),
      Err(DistributionError::InsufficientQuota { remaining: 1 })
    );
    assert_eq!(e.current_quota, 1);
  }

  #[test]
  fn take_zero_is_refused_without_a_range() {
    let now = at(2024, 6, 10);
    let mut e = employee(5, 10, true, now);
    let err = e.take(0, now).unwrap_err();
    assert_eq!(err, DistributionError::ZeroQuantity);
    assert_eq!(err.to_string(), "quantity must be at least 1");
    assert_eq!(e.current_quota, 5);
  }

  #[test]
  fn take_refuses_inactive_before_checking_quota() {
    let now = at(2024, 6, 10);
    let mut e = employee(5, 10, false, now);
    assert_eq!(
      e.take(1, now),
      Err(DistributionError::NotEligible(Ineligibility::Inactive))
    );
    assert_eq!(e.current_quota, 5);
  }

  #[test]
  fn take_refuses_empty_quota() {
    let now = at(2024, 6, 10);
    let mut e = employee(0, 10, true, now);
    assert_eq!(
      e.take(1, now),
      Err(DistributionError::NotEligible(Ineligibility::NoQuotaRemaining))
    );
  }

  #[test]
  fn update_clamps_current_quota_to_new_monthly_quota() {
    let now = at(2024, 6, 10);
    let mut e = employee(8, 10, true, now);
    e.apply_update(EmployeeUpdate { monthly_quota: Some(5), ..Default::default() }, now)
      .unwrap();
    assert_eq!((e.current_quota, e.monthly_quota), (5, 5));

    e.apply_update(EmployeeUpdate { monthly_quota: Some(12), ..Default::default() }, now)
      .unwrap();
    assert_eq!((e.current_quota, e.monthly_quota), (5, 12));
  }

  #[test]
  fn update_rejects_blank_name() {
    let now = at(2024, 6, 10);
    let mut e = employee(8, 10, true, now);
    let err = e
      .apply_update(EmployeeUpdate { name: Some("   ".into()), ..Default::default() }, now)
      .unwrap_err();
    assert_eq!(err, Error::EmptyField("name"));
    assert_eq!(e.name, "Ada Lovelace");
  }

  #[test]
  fn new_employee_json_defaults() {
    let input: NewEmployee = serde_json::from_str(
      r#"{"identifier":"EMP9","name":"Grace","department":"Finance"}"#,
    )
    .unwrap();
    assert!(input.is_active);
    assert_eq!(input.monthly_quota, None);
  }
}
