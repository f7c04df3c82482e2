//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout so a database written by a newer build is refused rather than
//! overwritten.

pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per collection ('teachers' | 'classes' | 'students').
-- The value is the whole collection as a JSON array, rewritten on every save.
CREATE TABLE IF NOT EXISTS kv (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

PRAGMA user_version = 1;
";
