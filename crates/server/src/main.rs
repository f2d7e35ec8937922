//! offline-worker server entry point.
//!
//! Boots the worker from configuration and exposes its events as MCP tools
//! on stdio transport. Logging goes to stderr to avoid interfering with the
//! JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use offline_client::{FetchClient, FetchConfig, Network, Worker, WorkerConfig};
use offline_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let scope = config.parsed_scope()?;

    tracing::info!(scope = %scope, generation = %config.generation, db = %config.db_path.display(), "Starting offline-worker on stdio transport");

    let db = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(FetchConfig::from(&config), scope.clone())?);
    let worker = Arc::new(Worker::new(scope, WorkerConfig::from(&config), db, Arc::clone(&network))?);

    let handler = handler::OfflineWorkerServer::new(Arc::clone(&worker), network);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    worker.settle_background().await;
    tracing::info!("offline-worker stopped");

    Ok(())
}
