//! SQLite-backed cache store of versioned generations.
//!
//! Each generation maps canonical request URLs to immutable response
//! snapshots. Generations are created on install, superseded ones are
//! deleted wholesale on activate, and entries are only ever added or
//! overwritten individually.

pub mod connection;
pub mod entries;
pub mod generations;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{EntryInfo, StoreHandle};
