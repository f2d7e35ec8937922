//! Fetch interception strategies.
//!
//! - Navigations: network first, entry-point snapshot as the offline fallback.
//! - Same-origin static assets: cache first, refreshed in the background.
//! - Cross-origin static assets: passed through untouched.

use std::sync::Arc;

use offline_core::{
    CacheDb, Classification, Error, InterceptedRequest, OriginClass, RequestKind, Response, classify,
};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Worker, WorkerState, open_store};
use crate::Network;

/// Where a response handed to the caller came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
}

/// What the host should do with an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    /// Respond with this response.
    Respond { response: Response, source: ResponseSource, classification: Classification },
    /// Not handled; the host applies its default network behavior.
    Passthrough { classification: Option<Classification> },
}

impl FetchDecision {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchDecision::Respond { response, .. } => Some(response),
            FetchDecision::Passthrough { .. } => None,
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            FetchDecision::Respond { source, .. } => Some(*source),
            FetchDecision::Passthrough { .. } => None,
        }
    }
}

impl Worker {
    /// Handle one intercepted request.
    ///
    /// Only an activated worker intercepts; before that every request is
    /// passed through. The returned future settles once the chosen strategy
    /// has a response or has failed.
    pub async fn handle_fetch(&self, request: &InterceptedRequest) -> Result<FetchDecision, Error> {
        if *self.state.read().await != WorkerState::Activated {
            return Ok(FetchDecision::Passthrough { classification: None });
        }

        let classification = classify(request, &self.scope);
        match (classification.kind, classification.origin) {
            (RequestKind::Navigation, _) => self.network_first(request, classification).await,
            (RequestKind::StaticAsset, OriginClass::SameOrigin) => self.cache_first(request, classification).await,
            (RequestKind::StaticAsset, OriginClass::CrossOrigin) => {
                tracing::trace!(url = %request.url, "cross-origin asset passed through");
                Ok(FetchDecision::Passthrough { classification: Some(classification) })
            }
        }
    }

    async fn network_first(
        &self, request: &InterceptedRequest, classification: Classification,
    ) -> Result<FetchDecision, Error> {
        match self.network.fetch(request).await {
            Ok(response) => {
                if let Some(store) = self.current_store().await {
                    let copy = response.clone();
                    store.put(&self.entry_key, &copy).await;
                }
                Ok(FetchDecision::Respond { response, source: ResponseSource::Network, classification })
            }
            Err(e) if !e.is_network() => Err(e),
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "navigation fetch failed, falling back to entry point");
                let cached = match self.current_store().await {
                    Some(store) => store.lookup(&self.entry_key).await,
                    None => None,
                };
                match cached {
                    Some(response) => {
                        Ok(FetchDecision::Respond { response, source: ResponseSource::Cache, classification })
                    }
                    None => Err(Error::OfflineUnavailable(format!("{} ({e})", self.entry_key))),
                }
            }
        }
    }

    async fn cache_first(
        &self, request: &InterceptedRequest, classification: Classification,
    ) -> Result<FetchDecision, Error> {
        if !request.is_get() {
            // Cache storage only holds GET requests.
            let response = self.network.fetch(request).await?;
            return Ok(FetchDecision::Respond { response, source: ResponseSource::Network, classification });
        }

        let key = self.scope.resolve(request.url.as_str())?;

        let cached = match self.current_store().await {
            Some(store) => store.lookup(&key).await,
            None => None,
        };

        if let Some(response) = cached {
            self.spawn_refresh(request.clone(), key).await;
            return Ok(FetchDecision::Respond { response, source: ResponseSource::Cache, classification });
        }

        let response = self.network.fetch(request).await?;
        if response.is_cacheable() {
            if let Some(store) = self.current_store().await {
                let copy = response.clone();
                store.put(&key, &copy).await;
            }
        } else {
            tracing::debug!(
                url = %request.url,
                status = response.status,
                response_type = response.response_type.as_str(),
                "response not cacheable"
            );
        }

        Ok(FetchDecision::Respond { response, source: ResponseSource::Network, classification })
    }

    async fn spawn_refresh(&self, request: InterceptedRequest, key: Url) {
        let network = Arc::clone(&self.network);
        let store = self.store.clone();
        let generation = self.config.generation.clone();

        let mut set = self.background.lock().await;
        while set.try_join_next().is_some() {}
        set.spawn(refresh(network, store, generation, request, key));
    }
}

/// Re-fetch a cached asset and overwrite it if the new response is cacheable.
/// Every failure is swallowed; the caller already has its response.
async fn refresh(network: Arc<dyn Network>, db: CacheDb, generation: String, request: InterceptedRequest, key: Url) {
    match network.fetch(&request).await {
        Ok(response) if response.is_cacheable() => {
            if let Some(store) = open_store(&db, &generation).await {
                store.put(&key, &response).await;
            }
        }
        Ok(response) => {
            tracing::debug!(key = %key, status = response.status, "background refresh not cacheable, keeping entry");
        }
        Err(e) => {
            tracing::debug!(key = %key, error = %e, "background refresh failed");
        }
    }
}
