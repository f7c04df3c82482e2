//! Error types for `roster-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("failed to decode stored {key:?} collection: {source}")]
  Decode {
    key:    &'static str,
    #[source]
    source: serde_json::Error,
  },

  /// The persistence backend rejected a read or write.
  #[error("key-value backend error on {key:?}: {source}")]
  Backend {
    key:    &'static str,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
