//! SQL schema for the Gallon SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS employees (
    id               TEXT PRIMARY KEY,
    identifier       TEXT NOT NULL UNIQUE,   -- business key, immutable
    name             TEXT NOT NULL,
    department       TEXT NOT NULL,
    monthly_quota    INTEGER NOT NULL DEFAULT 10 CHECK (monthly_quota >= 1),
    current_quota    INTEGER NOT NULL
                     CHECK (current_quota >= 0 AND current_quota <= monthly_quota),
    quota_reset_date TEXT NOT NULL,          -- YYYY-MM-01
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

-- Append-only ledger. Rows go away only through the cascade.
CREATE TABLE IF NOT EXISTS distributions (
    id             TEXT PRIMARY KEY,
    employee_id    TEXT NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    gallons_taken  INTEGER NOT NULL CHECK (gallons_taken >= 1),
    notes          TEXT,
    distributed_at TEXT NOT NULL              -- fixed-width RFC 3339 UTC
);

CREATE INDEX IF NOT EXISTS employees_department_idx ON employees(department);
CREATE INDEX IF NOT EXISTS employees_active_idx     ON employees(is_active, department);
CREATE INDEX IF NOT EXISTS distributions_at_idx     ON distributions(distributed_at);
CREATE INDEX IF NOT EXISTS distributions_emp_idx    ON distributions(employee_id, distributed_at);

PRAGMA user_version = 1;
";
