use crate::error::Result;
use crate::tools::schema::{ToolMetadata, ToolResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// Trait for callable tools.
///
/// A tool is a named, described unit with a declared parameter schema.
/// [`execute`](Tool::execute) carries the business logic and may fail;
/// [`call`](Tool::call) is the boundary the executor uses and never fails,
/// converting any underlying failure into a failed [`ToolResult`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's metadata (name, description, parameter schema)
    fn metadata(&self) -> ToolMetadata;

    /// Execute the tool with given arguments
    async fn execute(&self, args: &HashMap<String, Value>) -> Result<Value>;

    /// Check if this tool matches the given name
    fn matches(&self, name: &str) -> bool {
        self.metadata().name == name
    }

    /// Execute the tool and wrap the outcome in a [`ToolResult`].
    ///
    /// Never raises: execution failures become `{success: false, error}` with
    /// the tool name in the metadata.
    async fn call(&self, args: &HashMap<String, Value>) -> ToolResult {
        let name = self.metadata().name;
        let metadata = HashMap::from([("tool_name".to_string(), Value::String(name.clone()))]);

        match self.execute(args).await {
            Ok(result) => ToolResult::ok(result, metadata),
            Err(e) => {
                warn!(tool = name.as_str(), error = %e, "Tool execution failed");
                ToolResult::err(e.to_string(), metadata)
            }
        }
    }
}
