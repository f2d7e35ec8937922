//! Client code for offline-worker.
//!
//! This crate provides the network layer and the request-interception worker
//! (lifecycle, caching strategies, sync and push handlers) shared by the
//! server binary and embedding hosts.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Network};

pub use worker::{
    ActivateReport, ClientSessions, FetchDecision, InstallReport, Notification, ResponseSource, SyncOutcome, Worker,
    WorkerConfig, WorkerState, WorkerStatus,
};
