//! Execution seam between the invocation state machine and live connections

use async_trait::async_trait;
use serde_json::Value;

use super::client::{McpClient, McpError, McpResult};

/// Executable side of a tool binding
///
/// `McpClient` is the production implementation; tests substitute
/// `MockToolServer` so invocation semantics can be exercised without a
/// running server.
#[async_trait]
pub trait ToolPort: Send + Sync {
    /// Invoke a tool on the owning server and render its output as text
    async fn call(&self, name: &str, args: Value) -> McpResult<String>;
}

#[async_trait]
impl ToolPort for McpClient {
    async fn call(&self, name: &str, args: Value) -> McpResult<String> {
        let result = self.call_tool(name, args).await?;
        render_result(&result)
    }
}

/// Flatten an MCP call result into the text the conversation carries
fn render_result(result: &rmcp::model::CallToolResult) -> McpResult<String> {
    use rmcp::model::RawContent;

    let text = result
        .content
        .iter()
        .filter_map(|content| match &content.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if result.is_error.unwrap_or(false) {
        Err(McpError::ToolCallFailed(text))
    } else {
        Ok(text)
    }
}
