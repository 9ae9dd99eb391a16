//! Error types for `gallon-core`.

use serde::Serialize;
use thiserror::Error;

/// Validation failures for administrative input and policy construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("{0} must not be empty")]
  EmptyField(&'static str),

  #[error("monthly quota must be at least 1, got {0}")]
  InvalidMonthlyQuota(u32),

  #[error("invalid quantity policy: min {min}, max {max}")]
  InvalidPolicy { min: u32, max: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why an employee cannot receive a distribution right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum Ineligibility {
  #[error("employee is inactive")]
  Inactive,

  #[error("employee has no remaining quota for this month")]
  NoQuotaRemaining,
}

/// The expected, user-facing ways a distribution can be refused.
///
/// None of these leave any state behind other than a lazily-applied monthly
/// reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DistributionError {
  #[error("quantity {quantity} is outside the accepted range {min}..={max}")]
  InvalidQuantity { quantity: u32, min: u32, max: u32 },

  #[error("quantity must be at least 1")]
  ZeroQuantity,

  #[error("{0}")]
  NotEligible(Ineligibility),

  #[error("employee only has {remaining} gallon(s) remaining in quota")]
  InsufficientQuota { remaining: u32 },
}
