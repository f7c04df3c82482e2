//! Core types and the relational state store for the Roster school-records
//! manager.
//!
//! This crate is deliberately free of database and CLI dependencies. Durable
//! storage is injected through the [`kv::KeyValueStore`] trait; the SQLite
//! backend lives in `roster-store-sqlite`.

pub mod codec;
pub mod error;
pub mod kv;
pub mod model;
pub mod store;

pub use error::{Error, Result};
pub use kv::{KeyValueStore, MemoryKv};
pub use store::{RosterStore, Summary};

#[cfg(test)]
mod tests;
