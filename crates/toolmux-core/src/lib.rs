//! ToolMux Core
//!
//! Runtime-agnostic orchestration core for externally configured MCP tool
//! servers. The host application hands this crate a settings document, and
//! the crate takes care of validating transport configurations, connecting
//! to each server, merging the advertised tools into a single namespace and
//! mediating human-approved execution inside a conversational loop.
//!
//! ## Orchestration lifecycle
//!
//! Connections cannot outlive a request in a stateless-request runtime, so
//! the crate splits state in two: a process-wide [`SnapshotCache`] holding
//! only stripped metadata, and a request-scoped [`Orchestrator`] that opens
//! live connections lazily, only when a tool is actually about to execute.
//!
//! ```rust,ignore
//! use toolmux_core::{
//!     ConsoleLogger, MemorySettingsStore, Orchestrator, RuntimeEnv, SnapshotCache,
//! };
//!
//! let store = MemorySettingsStore::with_document(settings);
//! let cache = Arc::new(SnapshotCache::new());
//! let logger = Arc::new(ConsoleLogger::new());
//!
//! // Bootstrap: connect to every configured server once, cache the result.
//! let (orchestrator, statuses) =
//!     Orchestrator::bootstrap(&store, cache.clone(), RuntimeEnv::Native, logger).await?;
//!
//! // Per request: resolve approved tool invocations in the latest message.
//! let messages = orchestrator.process_tool_invocations(messages, &sink).await;
//! orchestrator.close().await;
//! ```

pub mod config;
pub mod logging;
pub mod mcp;
pub mod orchestrator;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageContent, MessageRole,
    ServerStatus,
    ToolInfo, ToolInvocation,
    ChannelSink, EventSink, MemorySink, StreamEvent,
    APPROVAL_APPROVED, APPROVAL_DENIED,
    RESULT_DENIED, RESULT_EXECUTION_ERROR, RESULT_NO_EXECUTOR,
};

pub use logging::{ConsoleLogger, Logger, NoOpLogger};

pub use config::{
    ConfigError, ConfigResult, MemorySettingsStore, RawServerConfig, ServerConfig,
    ServerRegistry, SettingsStore,
};

pub use mcp::{McpClient, McpError, McpResult, MockToolServer, RuntimeEnv, ToolPort};

pub use tools::{Snapshot, SnapshotCache, ToolBinding, ToolRegistry};

pub use orchestrator::{Orchestrator, LISTING_FAILED_REASON};
