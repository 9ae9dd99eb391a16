//! Plain-text rendering of API responses for the terminal.

use chrono::{DateTime, Local, Utc};
use gallon_core::{distribution::DistributionEntry, employee::Employee, store::QuotaSummary};

use crate::client::ScanReceipt;

fn local_time(at: DateTime<Utc>) -> String {
  at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// One line per successful scan, e.g. `Successfully distributed ... (3/10 left)`.
pub fn receipt(r: &ScanReceipt) -> String {
  format!(
    "{} ({}/{} left)",
    r.message, r.employee.current_quota, r.employee.monthly_quota
  )
}

pub fn employee_row(e: &Employee) -> String {
  let status = if e.is_active { "" } else { "  [inactive]" };
  format!(
    "{:<12} {:<24} {:<20} {:>3}/{:<3}{status}",
    e.identifier, e.name, e.department, e.current_quota, e.monthly_quota
  )
}

pub fn entry_row(e: &DistributionEntry) -> String {
  let notes = e
    .record
    .notes
    .as_deref()
    .map(|n| format!("  {n}"))
    .unwrap_or_default();
  format!(
    "{}  {:<12} {:<24} {:>2} gal{notes}",
    local_time(e.record.distributed_at),
    e.employee.identifier,
    e.employee.name,
    e.record.gallons_taken
  )
}

pub fn totals(s: &QuotaSummary) -> String {
  format!(
    "Employees: {} ({} active)\nGallons:   {} of {} remaining this month",
    s.total_employees, s.active_employees, s.total_remaining_quota, s.total_monthly_quota
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use gallon_core::{
    distribution::{DistributionRecord, EmployeeSummary},
    employee::NewEmployee,
  };

  fn employee() -> Employee {
    let now = Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap();
    Employee::create(NewEmployee::new("EMP1001", "Ada Lovelace", "Ops"), now).unwrap()
  }

  #[test]
  fn inactive_employees_are_flagged() {
    let mut e = employee();
    assert!(!employee_row(&e).contains("[inactive]"));
    e.is_active = false;
    assert!(employee_row(&e).contains("[inactive]"));
  }

  #[test]
  fn entry_row_includes_notes_only_when_present() {
    let e = employee();
    let at = Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).unwrap();
    let mut entry = DistributionEntry {
      record:   DistributionRecord::new(e.id, 2, None, at),
      employee: EmployeeSummary {
        id:         e.id,
        identifier: e.identifier.clone(),
        name:       e.name.clone(),
        department: e.department.clone(),
      },
    };
    let row = entry_row(&entry);
    assert!(row.contains("EMP1001"));
    assert!(row.ends_with(" 2 gal"));

    entry.record.notes = Some("night shift".to_string());
    assert!(entry_row(&entry).ends_with("night shift"));
  }

  #[test]
  fn totals_reports_remaining_over_monthly() {
    let s = QuotaSummary {
      total_employees:       3,
      active_employees:      2,
      total_monthly_quota:   30,
      total_remaining_quota: 21,
    };
    let out = totals(&s);
    assert!(out.contains("3 (2 active)"));
    assert!(out.contains("21 of 30"));
  }
}
