//! cache_generations tool implementation.

use offline_client::Worker;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerationSummary {
    pub name: String,
    pub entries: usize,
    /// True for the generation this worker reads and writes.
    pub current: bool,
}

/// Output from the cache_generations tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGenerationsOutput {
    pub generations: Vec<GenerationSummary>,
}

/// List every generation in the store with its entry count.
pub async fn generations_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let db = worker.store();
    let mut generations = Vec::new();

    for name in db.list_generations().await? {
        let entries = db.open_generation(&name).await?.entries().await?.len();
        let current = name == worker.generation();
        generations.push(GenerationSummary { name, entries, current });
    }

    json_result(&CacheGenerationsOutput { generations })
}
