//! The `QuotaStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `gallon-store-sqlite`).
//! [`QuotaService`](crate::service::QuotaService) is written against this
//! abstraction only.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  distribution::{DistributionEntry, DistributionRecord},
  employee::Employee,
  quota::QuotaSnapshot,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`QuotaStore::list_employees`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeQuery {
  /// Case-insensitive substring match over identifier, name and department.
  pub search:     Option<String>,
  /// Exact department match.
  pub department: Option<String>,
  pub active:     Option<bool>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

/// Totals across every employee, for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSummary {
  pub total_employees:       u64,
  pub active_employees:      u64,
  pub total_monthly_quota:   u64,
  pub total_remaining_quota: u64,
}

/// Result of a compare-and-swap write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
  Committed,
  /// The stored row no longer matched the expected snapshot (or is gone).
  /// Nothing was written.
  Conflict,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a quota store backend.
///
/// Every write that touches quota state is a compare-and-swap against a
/// [`QuotaSnapshot`] taken when the employee was read, so concurrent writers
/// for the same employee serialise instead of overwriting each other.
pub trait QuotaStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Employees ─────────────────────────────────────────────────────────

  /// Persist a newly-created employee. Returns `false` without writing if
  /// the business identifier is already taken.
  fn insert_employee(
    &self,
    employee: Employee,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Retrieve an employee by surrogate id. Returns `None` if not found.
  fn get_employee(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  /// Look up by business identifier, regardless of active status.
  fn find_by_identifier<'a>(
    &'a self,
    identifier: &'a str,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + 'a;

  /// Look up by business identifier; inactive employees are reported as
  /// `None`, exactly like unknown ones.
  fn find_active_by_identifier<'a>(
    &'a self,
    identifier: &'a str,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + 'a;

  fn list_employees<'a>(
    &'a self,
    query: &'a EmployeeQuery,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + 'a;

  /// Overwrite the mutable fields of `employee` if the stored quota state
  /// still equals `expected`.
  fn swap_employee(
    &self,
    expected: QuotaSnapshot,
    employee: Employee,
  ) -> impl Future<Output = Result<CommitOutcome, Self::Error>> + Send + '_;

  /// Delete an employee and, by cascade, its ledger. Returns `false` if the
  /// employee did not exist.
  fn delete_employee(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Ledger ────────────────────────────────────────────────────────────

  /// Atomically write the decremented `employee` and append `record`.
  ///
  /// Either both land or neither does. The write is refused with
  /// [`CommitOutcome::Conflict`] if the stored quota state no longer equals
  /// `expected`.
  fn commit_distribution(
    &self,
    expected: QuotaSnapshot,
    employee: Employee,
    record: DistributionRecord,
  ) -> impl Future<Output = Result<CommitOutcome, Self::Error>> + Send + '_;

  /// Ledger records for one employee, most recent first.
  fn employee_distributions(
    &self,
    employee_id: Uuid,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<DistributionRecord>, Self::Error>> + Send + '_;

  /// Up to `limit` ledger records across all employees, most recent first.
  fn recent_distributions(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<DistributionEntry>, Self::Error>> + Send + '_;

  fn summary(&self) -> impl Future<Output = Result<QuotaSummary, Self::Error>> + Send + '_;
}
