//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to connect to configured tool servers over
//! three transports: child process (stdio), server-sent events and
//! streamable HTTP.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolmux_core::mcp::{McpClient, RuntimeEnv};
//! use std::sync::Arc;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger::new());
//!
//! // Connect using whichever transport the validated config selects
//! let client = McpClient::connect("search", &config, RuntimeEnv::Native, logger).await?;
//!
//! // List the server's tools as stripped descriptors
//! let tools = client.list_tools().await?;
//!
//! // Call a tool
//! let result = client.call_tool("web_search", json!({"query": "rust"})).await?;
//! ```

mod client;
mod mock;
mod port;

pub use client::{McpClient, McpError, McpResult, RuntimeEnv};
pub use mock::{MockMode, MockToolServer};
pub use port::ToolPort;
