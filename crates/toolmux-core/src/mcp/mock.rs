//! Mock tool server for testing
//!
//! Deterministic, configurable responses without spawning processes or
//! touching the network.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::client::{McpError, McpResult};
use super::port::ToolPort;

/// Response mode for the mock
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Echo the arguments back as compact JSON
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Fail every call
    Error(String),
}

impl Default for MockMode {
    fn default() -> Self {
        MockMode::Echo
    }
}

/// Mock tool server implementing [`ToolPort`]
pub struct MockToolServer {
    mode: MockMode,
    calls: AtomicUsize,
}

impl MockToolServer {
    /// Create a mock with a specific mode
    pub fn with_mode(mode: MockMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    /// Create an echo mock (returns the call arguments)
    pub fn echo() -> Self {
        Self::with_mode(MockMode::Echo)
    }

    /// Create a fixed-response mock
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()))
    }

    /// Create a mock whose every call fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_mode(MockMode::Error(message.into()))
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolPort for MockToolServer {
    async fn call(&self, _name: &str, args: Value) -> McpResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            MockMode::Echo => Ok(args.to_string()),
            MockMode::Fixed(response) => Ok(response.clone()),
            MockMode::Error(message) => Err(McpError::ToolCallFailed(message.clone())),
        }
    }
}
