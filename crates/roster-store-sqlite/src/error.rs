//! Error type for `roster-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("unsupported schema version {found}; expected at most {supported}")]
  SchemaVersion { found: i64, supported: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
