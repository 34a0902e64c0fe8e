//! Settings collaborator interface

use async_trait::async_trait;
use serde_json::Value;

/// Read access to the application's persisted settings
///
/// Implementations:
/// - `MemorySettingsStore`: In-memory for testing and embedding
/// - Host adapter: Reads the application's persisted key-value store
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Load the raw tool-server configuration document:
    /// `{ "mcpServers": { <name>: <raw entry> } }`
    async fn load_tool_servers(&self) -> Result<Value, ConfigError>;
}

/// Errors that can occur while validating tool-server configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An entry declared both transports at once
    #[error("server '{server}': cannot have both 'command' and 'url' defined")]
    BothCommandAndUrl { server: String },

    /// A URL entry without a transport type
    #[error("server '{server}': missing 'type' field")]
    MissingType { server: String },

    /// An unknown transport type
    #[error("server '{server}': invalid type '{kind}'")]
    InvalidType { server: String, kind: String },

    /// The declared transport's required field is absent
    #[error("server '{server}': missing required field '{field}'")]
    MissingField { server: String, field: &'static str },

    /// Field-level violations, all collected into one message
    #[error("server '{server}': {violations}")]
    Invalid { server: String, violations: String },

    /// The settings document itself could not be parsed
    #[error("malformed tool-server settings document: {0}")]
    Document(#[from] serde_json::Error),

    /// The settings store failed to produce a document
    #[error("settings error: {0}")]
    Store(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
