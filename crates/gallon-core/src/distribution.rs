//! Distribution ledger types.
//!
//! Ledger records are immutable. They are never updated or individually
//! deleted; they disappear only when their owning employee is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::employee::Employee;

/// One distribution event: `gallons_taken` were subtracted from the owning
/// employee's quota at `distributed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRecord {
  pub id:             Uuid,
  pub employee_id:    Uuid,
  pub gallons_taken:  u32,
  pub notes:          Option<String>,
  pub distributed_at: DateTime<Utc>,
}

impl DistributionRecord {
  pub fn new(
    employee_id: Uuid,
    gallons_taken: u32,
    notes: Option<String>,
    distributed_at: DateTime<Utc>,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      employee_id,
      gallons_taken,
      notes: notes.filter(|n| !n.trim().is_empty()),
      distributed_at,
    }
  }
}

/// The outcome of a successful distribution: the employee as persisted after
/// the decrement, and the ledger record written alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distribution {
  pub employee: Employee,
  pub record:   DistributionRecord,
}

/// The employee fields shown next to a ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
  pub id:         Uuid,
  pub identifier: String,
  pub name:       String,
  pub department: String,
}

/// A ledger record joined with its employee, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionEntry {
  #[serde(flatten)]
  pub record:   DistributionRecord,
  pub employee: EmployeeSummary,
}
