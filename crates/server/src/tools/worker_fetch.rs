//! worker_fetch tool implementation.
//!
//! Dispatches one intercepted request through the worker. Requests the
//! worker passes through are fetched from the network without caching, as
//! a browser would. A navigation carrying a `client_id` opens that client
//! session once it has a response.

use offline_client::{FetchDecision, Network, ResponseSource, Worker};
use offline_core::{Classification, InterceptedRequest, RequestKind, RequestMode, Response, ResponseType, classify};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ToolError, json_result};

/// Input parameters for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Absolute URL, or a path relative to the worker scope.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate", "same-origin", "no-cors" (default) or "cors".
    #[serde(default)]
    pub mode: RequestMode,

    /// Optional Accept header.
    #[serde(default)]
    pub accept: Option<String>,

    /// Session (tab) that issued the request. Navigations open it.
    #[serde(default)]
    pub client_id: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// Canonical request URL.
    pub url: String,
    /// "respond" when the worker answered, "passthrough" otherwise.
    pub handling: String,
    /// Where the response came from.
    pub source: Option<ResponseSource>,
    pub classification: Option<Classification>,
    pub status: u16,
    pub response_type: ResponseType,
    pub final_url: String,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    /// Session opened by this navigation, if any.
    pub client_id: Option<String>,
}

impl WorkerFetchOutput {
    fn new(
        url: &str, handling: &str, source: Option<ResponseSource>, classification: Option<Classification>,
        response: Response,
    ) -> Self {
        Self {
            url: url.to_string(),
            handling: handling.to_string(),
            source,
            classification,
            status: response.status,
            response_type: response.response_type,
            final_url: response.url.to_string(),
            headers: response.headers,
            body: String::from_utf8_lossy(&response.body).to_string(),
            client_id: None,
        }
    }
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl(
    worker: &Worker, network: &dyn Network, params: WorkerFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(ToolError::InvalidInput("method cannot be empty".into()).into());
    }

    let url = worker.scope().resolve(&params.url)?;
    let mut request = InterceptedRequest { method: params.method, url, mode: params.mode, headers: Vec::new() };
    if let Some(accept) = params.accept {
        request = request.with_header("Accept", accept);
    }

    let is_navigation = classify(&request, worker.scope()).kind == RequestKind::Navigation;

    let mut output = match worker.handle_fetch(&request).await? {
        FetchDecision::Respond { response, source, classification } => {
            WorkerFetchOutput::new(request.url.as_str(), "respond", Some(source), Some(classification), response)
        }
        FetchDecision::Passthrough { classification } => {
            let response = network.fetch(&request).await?;
            WorkerFetchOutput::new(request.url.as_str(), "passthrough", None, classification, response)
        }
    };

    if is_navigation && let Some(id) = params.client_id.filter(|id| !id.trim().is_empty()) {
        worker.open_client(&id).await;
        output.client_id = Some(id);
    }

    json_result(&output)
}
