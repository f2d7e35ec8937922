//! Core types and shared functionality for offline-worker.
//!
//! This crate provides:
//! - The versioned cache store with SQLite backend
//! - Scope resolution and request classification
//! - Response snapshots and the cacheability rule
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod scope;

pub use cache::{CacheDb, EntryInfo, StoreHandle};
pub use config::AppConfig;
pub use error::Error;
pub use request::{Classification, InterceptedRequest, OriginClass, RequestKind, RequestMode, classify};
pub use response::{Response, ResponseType};
pub use scope::Scope;
