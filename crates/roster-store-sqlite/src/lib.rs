//! SQLite backend for the Roster key-value persistence layer.
//!
//! A single `kv` table holds one row per roster collection. Access is
//! synchronous through [`rusqlite`]; the roster store never runs concurrently.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteKv;
