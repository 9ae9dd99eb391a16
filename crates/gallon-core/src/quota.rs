//! Calendar arithmetic and request policy for monthly quotas.
//!
//! Month boundaries are evaluated on the UTC calendar. Only the `(year, month)`
//! pair matters; day-of-month never influences a reset.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{DistributionError, Error, Result};

/// Gallons handed out by a scan that does not specify a quantity.
pub const DEFAULT_GALLONS: u32 = 1;

/// Monthly allotment given to employees created without an explicit quota.
pub const DEFAULT_MONTHLY_QUOTA: u32 = 10;

/// The first day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
  date.with_day(1).unwrap_or(date)
}

/// Whether `a` and `b` fall in the same calendar month.
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
  a.year() == b.year() && a.month() == b.month()
}

// ─── Quantity policy ─────────────────────────────────────────────────────────

/// The accepted range of gallons for a single distribution request.
///
/// This is request policy, not a domain invariant: the data model only
/// requires `quantity >= 1` and `quantity <= current_quota`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityPolicy {
  min: u32,
  max: u32,
}

impl QuantityPolicy {
  pub fn new(min: u32, max: u32) -> Result<Self> {
    if min == 0 || min > max {
      return Err(Error::InvalidPolicy { min, max });
    }
    Ok(Self { min, max })
  }

  pub fn min(&self) -> u32 { self.min }

  pub fn max(&self) -> u32 { self.max }

  /// Accept `quantity` if it lies within the policy range.
  pub fn validate(&self, quantity: u32) -> Result<u32, DistributionError> {
    if (self.min..=self.max).contains(&quantity) {
      Ok(quantity)
    } else {
      Err(DistributionError::InvalidQuantity {
        quantity,
        min: self.min,
        max: self.max,
      })
    }
  }
}

impl Default for QuantityPolicy {
  fn default() -> Self { Self { min: 1, max: 5 } }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The quota-relevant state of an employee at the moment it was read.
///
/// Stores use it as the expected value of a compare-and-swap: a write only
/// lands if the persisted row still matches the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
  pub monthly_quota:    u32,
  pub current_quota:    u32,
  pub quota_reset_date: NaiveDate,
  pub is_active:        bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn month_start_normalises_day() {
    assert_eq!(month_start(date(2024, 2, 29)), date(2024, 2, 1));
    assert_eq!(month_start(date(2024, 2, 1)), date(2024, 2, 1));
  }

  #[test]
  fn same_month_ignores_day() {
    assert!(same_month(date(2024, 3, 1), date(2024, 3, 31)));
    assert!(!same_month(date(2024, 3, 31), date(2024, 4, 1)));
  }

  #[test]
  fn same_month_distinguishes_years() {
    assert!(!same_month(date(2023, 5, 10), date(2024, 5, 10)));
  }

  #[test]
  fn default_policy_accepts_one_through_five() {
    let policy = QuantityPolicy::default();
    for q in 1..=5 {
      assert_eq!(policy.validate(q), Ok(q));
    }
    assert_eq!(
      policy.validate(0),
      Err(DistributionError::InvalidQuantity { quantity: 0, min: 1, max: 5 })
    );
    assert!(policy.validate(6).is_err());
  }

  #[test]
  fn policy_rejects_zero_minimum_and_inverted_range() {
    assert_eq!(QuantityPolicy::new(0, 5), Err(Error::InvalidPolicy { min: 0, max: 5 }));
    assert!(QuantityPolicy::new(4, 2).is_err());
    assert!(QuantityPolicy::new(2, 2).is_ok());
  }
}
