//! [`SqliteStore`]: the SQLite implementation of [`QuotaStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use gallon_core::{
  distribution::{DistributionEntry, DistributionRecord},
  employee::Employee,
  quota::QuotaSnapshot,
  store::{CommitOutcome, EmployeeQuery, QuotaStore, QuotaSummary},
};

use crate::{
  Result,
  encode::{
    DISTRIBUTION_COLUMNS, EMPLOYEE_COLUMNS, EncodedSnapshot, RawDistribution, RawEmployee,
    RawEntry, decode_u64, encode_snapshot, encode_uuid,
  },
  schema::SCHEMA,
};

/// Rows returned by list queries that do not specify a limit.
const DEFAULT_LIST_LIMIT: usize = 100;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A quota store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// run one at a time on the connection's worker thread.
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

  /// Open an in-memory store, useful for testing.
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

  async fn find_employee_where(
    &self,
    identifier: String,
    active_only: bool,
  ) -> Result<Option<Employee>> {
    let raw: Option<RawEmployee> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {EMPLOYEE_COLUMNS} FROM employees
           WHERE identifier = ?1 AND (?2 = 0 OR is_active = 1)"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![identifier, active_only], RawEmployee::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }
}

/// Overwrite an employee's mutable columns if they still match `expected`.
/// Returns the number of rows changed (0 or 1).
fn swap_row(
  conn: &rusqlite::Connection,
  expected: &EncodedSnapshot,
  row: &RawEmployee,
) -> rusqlite::Result<usize> {
  conn.execute(
    "UPDATE employees
        SET name = ?1, department = ?2, monthly_quota = ?3, current_quota = ?4,
            quota_reset_date = ?5, is_active = ?6, updated_at = ?7
      WHERE id = ?8
        AND monthly_quota = ?9 AND current_quota = ?10
        AND quota_reset_date = ?11 AND is_active = ?12",
    rusqlite::params![
      row.name,
      row.department,
      row.monthly_quota,
      row.current_quota,
      row.quota_reset_date,
      row.is_active,
      row.updated_at,
      row.id,
      expected.monthly_quota,
      expected.current_quota,
      expected.quota_reset_date,
      expected.is_active,
    ],
  )
}

// ─── QuotaStore impl ─────────────────────────────────────────────────────────

impl QuotaStore for SqliteStore {
  type Error = crate::Error;

  // ── Employees ─────────────────────────────────────────────────────────────

  async fn insert_employee(&self, employee: Employee) -> Result<bool> {
    let row = RawEmployee::from_employee(&employee);

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO employees (
             id, identifier, name, department, monthly_quota, current_quota,
             quota_reset_date, is_active, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
           ON CONFLICT(identifier) DO NOTHING",
          rusqlite::params![
            row.id,
            row.identifier,
            row.name,
            row.department,
            row.monthly_quota,
            row.current_quota,
            row.quota_reset_date,
            row.is_active,
            row.created_at,
            row.updated_at,
          ],
        )?;
        Ok(n == 1)
      })
      .await?;

    Ok(inserted)
  }

  async fn get_employee(&self, id: Uuid) -> Result<Option<Employee>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEmployee> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawEmployee::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Employee>> {
    self.find_employee_where(identifier.to_owned(), false).await
  }

  async fn find_active_by_identifier(&self, identifier: &str) -> Result<Option<Employee>> {
    self.find_employee_where(identifier.to_owned(), true).await
  }

  async fn list_employees(&self, query: &EmployeeQuery) -> Result<Vec<Employee>> {
    let search_pattern = query
      .search
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| format!("%{s}%"));
    let department = query.department.clone();
    let active     = query.active;
    let limit_val  = i64::try_from(query.limit.unwrap_or(DEFAULT_LIST_LIMIT)).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX);

    let raws: Vec<RawEmployee> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {EMPLOYEE_COLUMNS} FROM employees
           WHERE (?1 IS NULL OR identifier LIKE ?1 OR name LIKE ?1 OR department LIKE ?1)
             AND (?2 IS NULL OR department = ?2)
             AND (?3 IS NULL OR is_active = ?3)
           ORDER BY name COLLATE NOCASE, identifier
           LIMIT ?4 OFFSET ?5"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![search_pattern, department, active, limit_val, offset_val],
            RawEmployee::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployee::into_employee).collect()
  }

  async fn swap_employee(&self, expected: QuotaSnapshot, employee: Employee) -> Result<CommitOutcome> {
    let expected = encode_snapshot(&expected);
    let row      = RawEmployee::from_employee(&employee);

    let outcome = self
      .conn
      .call(move |conn| {
        let changed = swap_row(conn, &expected, &row)?;
        Ok(if changed == 1 { CommitOutcome::Committed } else { CommitOutcome::Conflict })
      })
      .await?;

    Ok(outcome)
  }

  async fn delete_employee(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        // Ledger rows follow through ON DELETE CASCADE.
        let n = conn.execute("DELETE FROM employees WHERE id = ?1", rusqlite::params![id_str])?;
        Ok(n == 1)
      })
      .await?;

    Ok(deleted)
  }

  // ── Ledger ────────────────────────────────────────────────────────────────

  async fn commit_distribution(
    &self,
    expected: QuotaSnapshot,
    employee: Employee,
    record:   DistributionRecord,
  ) -> Result<CommitOutcome> {
    let expected = encode_snapshot(&expected);
    let row      = RawEmployee::from_employee(&employee);
    let ledger   = RawDistribution::from_record(&record);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if swap_row(&tx, &expected, &row)? != 1 {
          // Dropping `tx` rolls back; nothing was written anyway.
          return Ok(CommitOutcome::Conflict);
        }

        tx.execute(
          "INSERT INTO distributions (id, employee_id, gallons_taken, notes, distributed_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            ledger.id,
            ledger.employee_id,
            ledger.gallons_taken,
            ledger.notes,
            ledger.distributed_at,
          ],
        )?;

        tx.commit()?;
        Ok(CommitOutcome::Committed)
      })
      .await?;

    Ok(outcome)
  }

  async fn employee_distributions(
    &self,
    employee_id: Uuid,
    limit:       Option<usize>,
  ) -> Result<Vec<DistributionRecord>> {
    let id_str    = encode_uuid(employee_id);
    // SQLite treats a negative LIMIT as "no limit".
    let limit_val = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

    let raws: Vec<RawDistribution> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {DISTRIBUTION_COLUMNS} FROM distributions
           WHERE employee_id = ?1
           ORDER BY distributed_at DESC, rowid DESC
           LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, limit_val], RawDistribution::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDistribution::into_record).collect()
  }

  async fn recent_distributions(&self, limit: usize) -> Result<Vec<DistributionEntry>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT d.id, d.employee_id, d.gallons_taken, d.notes, d.distributed_at,
                  e.identifier, e.name, e.department
           FROM distributions d
           JOIN employees e ON e.id = d.employee_id
           ORDER BY d.distributed_at DESC, d.rowid DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  async fn summary(&self) -> Result<QuotaSummary> {
    let (total, active, monthly, remaining): (i64, i64, i64, i64) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*),
                  COALESCE(SUM(is_active), 0),
                  COALESCE(SUM(monthly_quota), 0),
                  COALESCE(SUM(current_quota), 0)
           FROM employees",
          [],
          |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )?)
      })
      .await?;

    Ok(QuotaSummary {
      total_employees:       decode_u64("total_employees", total)?,
      active_employees:      decode_u64("active_employees", active)?,
      total_monthly_quota:   decode_u64("total_monthly_quota", monthly)?,
      total_remaining_quota: decode_u64("total_remaining_quota", remaining)?,
    })
  }
}
