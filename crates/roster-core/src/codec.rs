//! Encoding and decoding of whole collections to the text stored under each
//! key-value key.
//!
//! A collection is a JSON array of flat records in insertion order. Field names
//! are camelCase, timestamps are RFC 3339 strings, ids are hyphenated UUIDs and
//! cleared references are `null`.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, KeyValueStore, Result};

// ─── Keys ────────────────────────────────────────────────────────────────────

pub const TEACHERS_KEY: &str = "teachers";
pub const CLASSES_KEY: &str = "classes";
pub const STUDENTS_KEY: &str = "students";

// ─── Collections ─────────────────────────────────────────────────────────────

pub fn encode_collection<T: Serialize>(records: &[T]) -> Result<String> {
  Ok(serde_json::to_string(records)?)
}

pub fn decode_collection<T: DeserializeOwned>(
  key: &'static str,
  raw: &str,
) -> Result<Vec<T>> {
  serde_json::from_str(raw).map_err(|source| Error::Decode { key, source })
}

/// Read and decode the collection under `key`; an absent key is an empty
/// collection.
pub fn load_collection<K, T>(kv: &K, key: &'static str) -> Result<Vec<T>>
where
  K: KeyValueStore,
  T: DeserializeOwned,
{
  let raw = kv.load(key).map_err(|e| Error::Backend {
    key,
    source: Box::new(e),
  })?;

  match raw {
    Some(raw) => decode_collection(key, &raw),
    None => Ok(Vec::new()),
  }
}

/// Encode and write the collection under `key`.
pub fn save_collection<K, T>(
  kv: &mut K,
  key: &'static str,
  records: &[T],
) -> Result<()>
where
  K: KeyValueStore,
  T: Serialize,
{
  let raw = encode_collection(records)?;
  kv.save(key, &raw).map_err(|e| Error::Backend {
    key,
    source: Box::new(e),
  })
}
