//! MCP tool implementations.
//!
//! This module contains all tools exposed by the offline-worker server.

pub mod cache;
pub mod clients;
pub mod events;
pub mod lifecycle;
pub mod worker_fetch;
