use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::SearchQuery;

use super::PriceExtractor;

/// A capability the agent runtime may call any number of times.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;

    /// Always answers with a JSON object, errors included.
    async fn call(&self, args: Value) -> Value;
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn dispatch(&self, name: &str, args: Value) -> Value {
        match self.tools.iter().find(|t| t.name() == name) {
            Some(tool) => tool.call(args).await,
            None => {
                log::error!("Agent requested unknown tool: {}", name);
                json!({ "error": format!("Unknown tool: {}", name) })
            }
        }
    }
}

#[derive(Deserialize)]
struct ProductDataArgs {
    search_query: String,
}

/// Exposes [`PriceExtractor::extract`] as `get_product_data`.
pub struct ProductDataTool {
    extractor: Arc<PriceExtractor>,
}

impl ProductDataTool {
    pub fn new(extractor: Arc<PriceExtractor>) -> Self {
        ProductDataTool { extractor }
    }
}

#[async_trait]
impl Tool for ProductDataTool {
    fn name(&self) -> &str {
        "get_product_data"
    }

    fn description(&self) -> &str {
        "Opens eBay, searches for the given search_query and returns a mapping of listing title to listing price."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search_query": {
                    "type": "string",
                    "description": "Specific keywords for the item, e.g. \"Nintendo GameBoy Color Lime Green\"."
                }
            },
            "required": ["search_query"]
        })
    }

    async fn call(&self, args: Value) -> Value {
        let query = serde_json::from_value::<ProductDataArgs>(args)
            .map_err(|e| format!("Invalid arguments: {}", e))
            .and_then(|args| SearchQuery::parse(&args.search_query));

        match query {
            Ok(query) => self.extractor.extract(&query).await.to_tool_payload(),
            Err(e) => json!({ "error": e }),
        }
    }
}
