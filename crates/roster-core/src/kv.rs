//! The `KeyValueStore` trait and an in-memory implementation.
//!
//! The trait is implemented by durable backends (e.g. `roster-store-sqlite`).
//! [`crate::RosterStore`] depends on this abstraction, not on any concrete
//! backend.

use std::{collections::BTreeMap, convert::Infallible};

/// A local string-keyed, string-valued store.
///
/// Each collection is written whole under a single key, so implementations
/// only need last-write-wins semantics per key.
pub trait KeyValueStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value stored under `key`. Returns `None` if the key was never
  /// written.
  fn load(&self, key: &str) -> Result<Option<String>, Self::Error>;

  /// Replace the value stored under `key`.
  fn save(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// Ephemeral backend; everything is lost when it is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryKv {
  entries: BTreeMap<String, String>,
}

impl MemoryKv {
  pub fn new() -> Self { Self::default() }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }
}

impl KeyValueStore for MemoryKv {
  type Error = Infallible;

  fn load(&self, key: &str) -> Result<Option<String>, Infallible> {
    Ok(self.entries.get(key).cloned())
  }

  fn save(&mut self, key: &str, value: &str) -> Result<(), Infallible> {
    self.entries.insert(key.to_owned(), value.to_owned());
    Ok(())
  }
}
