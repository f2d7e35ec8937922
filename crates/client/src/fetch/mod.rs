//! Network access for the worker.
//!
//! ### Transport vs. HTTP failures
//! - Only transport failures (DNS, connect, reset, timeout, body read) are
//!   errors. Any HTTP status, including 4xx/5xx, is a successful fetch.
//! - Bodies are read fully once; larger than `max_bytes` is an error.
//!
//! ### Response type
//! - `basic` when the final URL shares the scope's origin.
//! - `cors` for cross-origin responses to `cors`-mode requests.
//! - `opaque` for every other cross-origin response.

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

use offline_core::{Error, InterceptedRequest, RequestMode, Response, ResponseType, Scope};

/// Something that can perform a network fetch for an intercepted request.
///
/// The worker only talks to the network through this trait, which keeps the
/// strategies testable without sockets.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "offline-worker/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` from the environment (default: true)
    pub system_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "offline-worker/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
            system_proxy: true,
        }
    }
}

impl From<&offline_core::AppConfig> for FetchConfig {
    fn from(config: &offline_core::AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// reqwest-backed [`Network`].
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
    scope: Scope,
}

impl FetchClient {
    /// Create a new fetch client for requests made on behalf of `scope`.
    pub fn new(config: FetchConfig, scope: Scope) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if !config.system_proxy {
            builder = builder.no_proxy();
        }

        let http = builder
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::NetworkFetch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config, scope })
    }

    fn response_type(&self, request: &InterceptedRequest, final_url: &url::Url) -> ResponseType {
        if self.scope.is_same_origin(final_url) {
            ResponseType::Basic
        } else if request.mode == RequestMode::Cors {
            ResponseType::Cors
        } else {
            ResponseType::Opaque
        }
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<Response, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {}", request.method)))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::NetworkFetch(format!("{}: {}", request.url, e)))?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::NetworkFetch(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let response_type = self.response_type(request, &final_url);

        tracing::debug!(
            url = %request.url,
            final_url = %final_url,
            status = status.as_u16(),
            content_type = headers
                .iter()
                .find(|(k, _)| k.as_str() == header::CONTENT_TYPE.as_str())
                .map(|(_, v)| v.as_str())
                .unwrap_or(""),
            bytes = bytes.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(Response { url: final_url, status: status.as_u16(), headers, body: bytes, response_type })
    }
}
