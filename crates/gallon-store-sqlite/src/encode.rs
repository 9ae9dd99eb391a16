//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so lexical order equals chronological order. Dates are
//! `YYYY-MM-DD`. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use gallon_core::{
  distribution::{DistributionEntry, DistributionRecord, EmployeeSummary},
  employee::Employee,
  quota::QuotaSnapshot,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Integers ─────────────────────────────────────────────────────────────────

pub fn decode_u32(column: &'static str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

pub fn decode_u64(column: &'static str, value: i64) -> Result<u64> {
  u64::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// A [`QuotaSnapshot`] in column form, bound as the `WHERE` clause of a
/// compare-and-swap.
pub struct EncodedSnapshot {
  pub monthly_quota:    i64,
  pub current_quota:    i64,
  pub quota_reset_date: String,
  pub is_active:        bool,
}

pub fn encode_snapshot(s: &QuotaSnapshot) -> EncodedSnapshot {
  EncodedSnapshot {
    monthly_quota:    i64::from(s.monthly_quota),
    current_quota:    i64::from(s.current_quota),
    quota_reset_date: encode_date(s.quota_reset_date),
    is_active:        s.is_active,
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawEmployee::from_row`].
pub const EMPLOYEE_COLUMNS: &str = "id, identifier, name, department, monthly_quota, \
   current_quota, quota_reset_date, is_active, created_at, updated_at";

/// Raw values read directly from an `employees` row.
pub struct RawEmployee {
  pub id:               String,
  pub identifier:       String,
  pub name:             String,
  pub department:       String,
  pub monthly_quota:    i64,
  pub current_quota:    i64,
  pub quota_reset_date: String,
  pub is_active:        bool,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawEmployee {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      identifier:       row.get(1)?,
      name:             row.get(2)?,
      department:       row.get(3)?,
      monthly_quota:    row.get(4)?,
      current_quota:    row.get(5)?,
      quota_reset_date: row.get(6)?,
      is_active:        row.get(7)?,
      created_at:       row.get(8)?,
      updated_at:       row.get(9)?,
    })
  }

  /// Encode a domain employee for writing.
  pub fn from_employee(e: &Employee) -> Self {
    Self {
      id:               encode_uuid(e.id),
      identifier:       e.identifier.clone(),
      name:             e.name.clone(),
      department:       e.department.clone(),
      monthly_quota:    i64::from(e.monthly_quota),
      current_quota:    i64::from(e.current_quota),
      quota_reset_date: encode_date(e.quota_reset_date),
      is_active:        e.is_active,
      created_at:       encode_dt(e.created_at),
      updated_at:       encode_dt(e.updated_at),
    }
  }

  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      id:               decode_uuid(&self.id)?,
      identifier:       self.identifier,
      name:             self.name,
      department:       self.department,
      monthly_quota:    decode_u32("monthly_quota", self.monthly_quota)?,
      current_quota:    decode_u32("current_quota", self.current_quota)?,
      quota_reset_date: decode_date(&self.quota_reset_date)?,
      is_active:        self.is_active,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawDistribution::from_row`].
pub const DISTRIBUTION_COLUMNS: &str = "id, employee_id, gallons_taken, notes, distributed_at";

/// Raw values read directly from a `distributions` row.
pub struct RawDistribution {
  pub id:             String,
  pub employee_id:    String,
  pub gallons_taken:  i64,
  pub notes:          Option<String>,
  pub distributed_at: String,
}

impl RawDistribution {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      employee_id:    row.get(1)?,
      gallons_taken:  row.get(2)?,
      notes:          row.get(3)?,
      distributed_at: row.get(4)?,
    })
  }

  pub fn from_record(r: &DistributionRecord) -> Self {
    Self {
      id:             encode_uuid(r.id),
      employee_id:    encode_uuid(r.employee_id),
      gallons_taken:  i64::from(r.gallons_taken),
      notes:          r.notes.clone(),
      distributed_at: encode_dt(r.distributed_at),
    }
  }

  pub fn into_record(self) -> Result<DistributionRecord> {
    Ok(DistributionRecord {
      id:             decode_uuid(&self.id)?,
      employee_id:    decode_uuid(&self.employee_id)?,
      gallons_taken:  decode_u32("gallons_taken", self.gallons_taken)?,
      notes:          self.notes,
      distributed_at: decode_dt(&self.distributed_at)?,
    })
  }
}

/// A `distributions` row joined with the owning employee's display fields.
pub struct RawEntry {
  pub record:     RawDistribution,
  pub identifier: String,
  pub name:       String,
  pub department: String,
}

impl RawEntry {
  /// Expects [`DISTRIBUTION_COLUMNS`] followed by `identifier, name,
  /// department`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record:     RawDistribution::from_row(row)?,
      identifier: row.get(5)?,
      name:       row.get(6)?,
      department: row.get(7)?,
    })
  }

  pub fn into_entry(self) -> Result<DistributionEntry> {
    let record = self.record.into_record()?;
    Ok(DistributionEntry {
      employee: EmployeeSummary {
        id:         record.employee_id,
        identifier: self.identifier,
        name:       self.name,
        department: self.department,
      },
      record,
    })
  }
}
