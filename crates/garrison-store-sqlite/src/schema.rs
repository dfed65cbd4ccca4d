//! SQL schema for the Garrison SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS departments (
    department_id TEXT PRIMARY KEY,
    name          TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS job_titles (
    job_title_id TEXT PRIMARY KEY,
    title        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS clients (
    client_id     TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    company       TEXT,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS suppliers (
    supplier_id   TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    company       TEXT,
    created_at    TEXT NOT NULL
);

-- Every employee grade lives here; `role` selects the area they may enter.
CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL,   -- 'employee' | 'head' | 'superadmin' | 'reporting_manager'
    department_id TEXT REFERENCES departments(department_id),
    job_title_id  TEXT REFERENCES job_titles(job_title_id),
    branch_id     TEXT,
    created_at    TEXT NOT NULL
);

-- Exactly one meaningful row, never deleted.
CREATE TABLE IF NOT EXISTS settings (
    setting_id           INTEGER PRIMARY KEY CHECK (setting_id = 1),
    maintenance_mode     INTEGER NOT NULL DEFAULT 0,
    maintenance_message  TEXT    NOT NULL DEFAULT '',
    maintenance_end_date TEXT,
    updated_at           TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS leave_balances (
    balance_id       TEXT PRIMARY KEY,
    user_id          TEXT NOT NULL REFERENCES users(user_id),
    year             INTEGER NOT NULL,
    paid_leave_total REAL NOT NULL DEFAULT 0,
    paid_leave_used  REAL NOT NULL DEFAULT 0,
    last_reset_date  TEXT,
    UNIQUE (user_id, year)
);

CREATE INDEX IF NOT EXISTS leave_balances_year_idx ON leave_balances(year);

PRAGMA user_version = 1;
";
