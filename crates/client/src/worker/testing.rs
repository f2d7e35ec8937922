//! Scripted network double for worker tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use offline_core::{CacheDb, Error, InterceptedRequest, Response, ResponseType, Scope};

use super::{Worker, WorkerConfig};
use crate::Network;

pub const SCOPE: &str = "https://user.github.io/repo/";

#[derive(Default)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Response>>,
    delays: Mutex<HashMap<String, Duration>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve `body` with `status` and `response_type` for `path` under the scope.
    pub fn route(&self, path: &str, status: u16, response_type: ResponseType, body: &str) {
        let url = Scope::parse(SCOPE).unwrap().resolve(path).unwrap();
        let response = Response::new(url.clone(), status, response_type, body.to_string())
            .with_header("Content-Type", "text/plain");
        self.routes.lock().unwrap().insert(url.to_string(), response);
    }

    pub fn ok(&self, path: &str, body: &str) {
        self.route(path, 200, ResponseType::Basic, body);
    }

    /// Hold every later fetch of `path` for `delay` before answering.
    pub fn delay(&self, path: &str, delay: Duration) {
        let url = Scope::parse(SCOPE).unwrap().resolve(path).unwrap();
        self.delays.lock().unwrap().insert(url.to_string(), delay);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        let url = Scope::parse(SCOPE).unwrap().resolve(path).unwrap().to_string();
        self.calls().iter().filter(|c| **c == url).count()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error> {
        self.calls.lock().unwrap().push(request.url.to_string());
        let delay = self.delays.lock().unwrap().get(request.url.as_str()).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if request.method.contains(char::is_whitespace) {
            return Err(Error::InvalidInput(format!("invalid method: {}", request.method)));
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::NetworkFetch(format!("{}: offline", request.url)));
        }
        let routes = self.routes.lock().unwrap();
        match routes.get(request.url.as_str()) {
            Some(response) => Ok(response.clone()),
            None => Ok(Response::new(request.url.clone(), 404, ResponseType::Basic, "not found")),
        }
    }
}

pub fn config(generation: &str) -> WorkerConfig {
    WorkerConfig { generation: generation.to_string(), ..WorkerConfig::default() }
}

pub fn worker_with(network: Arc<ScriptedNetwork>, db: CacheDb, generation: &str) -> Worker {
    Worker::new(Scope::parse(SCOPE).unwrap(), config(generation), db, network).unwrap()
}

/// Network with the default core assets routed, plus a fresh in-memory store.
pub async fn seeded_network() -> (Arc<ScriptedNetwork>, CacheDb) {
    let network = ScriptedNetwork::new();
    network.ok("index.html", "<html>home</html>");
    network.ok("manifest.json", "{\"name\":\"site\"}");
    network.ok("sw.js", "// worker");
    let db = CacheDb::open_in_memory().await.unwrap();
    (network, db)
}

/// Installed and activated worker.
pub async fn active_worker(generation: &str) -> (Worker, Arc<ScriptedNetwork>, CacheDb) {
    let (network, db) = seeded_network().await;
    let worker = worker_with(network.clone(), db.clone(), generation);
    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    (worker, network, db)
}
