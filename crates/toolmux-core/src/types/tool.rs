//! Tool descriptors and the invocation lifecycle

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Approval outcome recorded on an invocation once the user confirms it.
pub const APPROVAL_APPROVED: &str = "approved";
/// Approval outcome recorded on an invocation once the user denies it.
pub const APPROVAL_DENIED: &str = "denied";

/// Result attached to an invocation the user denied.
pub const RESULT_DENIED: &str = "Error: tool execution denied by user";
/// Result attached when no executable binding exists for an approved tool.
pub const RESULT_NO_EXECUTOR: &str = "Error: no executable binding found for tool";
/// Result attached when the tool raised during execution.
pub const RESULT_EXECUTION_ERROR: &str = "Error: tool execution failed";

/// A tool advertised by a configured server, stripped of any live binding.
///
/// Safe to serialize, display and cache across request boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for tool arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// Name of the server that advertised this tool
    pub server: String,
}

impl ToolInfo {
    /// Create a new tool descriptor
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        server: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: Value::Object(Default::default()),
            server: server.into(),
        }
    }

    /// Set the argument schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

/// A tool call embedded in a conversational message.
///
/// Created when the model proposes a call, mutated once the user records an
/// approval outcome, and terminal once a result is attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Unique identifier for this call
    #[serde(rename = "toolCallId")]
    pub id: String,
    /// Name of the tool being called
    #[serde(rename = "toolName")]
    pub name: String,
    /// Arguments the model supplied
    pub args: Value,
    /// Approval outcome, absent until the user decides.
    ///
    /// Recognized values are [`APPROVAL_APPROVED`] and [`APPROVAL_DENIED`];
    /// anything else round-trips untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<String>,
    /// Execution result, present once the invocation is resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ToolInvocation {
    /// Create a pending invocation with no approval outcome yet
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
            approval: None,
            result: None,
        }
    }

    /// Record user approval
    pub fn approve(&mut self) {
        self.approval = Some(APPROVAL_APPROVED.to_string());
    }

    /// Record user denial
    pub fn deny(&mut self) {
        self.approval = Some(APPROVAL_DENIED.to_string());
    }

    /// Whether a result has been attached
    pub fn is_resolved(&self) -> bool {
        self.result.is_some()
    }
}
