//! [`SqliteKv`] — the SQLite implementation of [`KeyValueStore`].

use std::path::Path;

use roster_core::KeyValueStore;
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  Error, Result,
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A key-value store backed by a single SQLite file.
pub struct SqliteKv {
  conn: Connection,
}

impl SqliteKv {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    let store = Self { conn };
    store.init_schema()?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    let store = Self { conn };
    store.init_schema()?;
    Ok(store)
  }

  fn init_schema(&self) -> Result<()> {
    let found: i64 =
      self
        .conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion {
        found,
        supported: SCHEMA_VERSION,
      });
    }

    self.conn.execute_batch(SCHEMA)?;
    tracing::debug!(version = SCHEMA_VERSION, "sqlite schema ready");
    Ok(())
  }
}

// ─── KeyValueStore impl ──────────────────────────────────────────────────────

impl KeyValueStore for SqliteKv {
  type Error = Error;

  fn load(&self, key: &str) -> Result<Option<String>> {
    let value = self
      .conn
      .query_row(
        "SELECT value FROM kv WHERE key = ?1",
        rusqlite::params![key],
        |r| r.get(0),
      )
      .optional()?;
    Ok(value)
  }

  fn save(&mut self, key: &str, value: &str) -> Result<()> {
    self.conn.execute(
      "INSERT INTO kv (key, value) VALUES (?1, ?2)
       ON CONFLICT (key) DO UPDATE SET value = excluded.value",
      rusqlite::params![key, value],
    )?;
    Ok(())
  }
}
