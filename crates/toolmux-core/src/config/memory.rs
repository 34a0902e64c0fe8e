//! In-memory settings store

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::traits::{ConfigError, SettingsStore};

/// In-memory settings store for testing and simple embeddings
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    document: RwLock<Value>,
}

impl MemorySettingsStore {
    /// Create a store with an empty document
    pub fn new() -> Self {
        Self {
            document: RwLock::new(Value::Object(Default::default())),
        }
    }

    /// Create a store holding the given settings document
    pub fn with_document(document: Value) -> Self {
        Self {
            document: RwLock::new(document),
        }
    }

    /// Create a store by parsing a JSON settings document
    pub fn with_json(json: &str) -> Result<Self, ConfigError> {
        Ok(Self::with_document(serde_json::from_str(json)?))
    }

    /// Replace the stored document
    pub fn set_document(&self, document: Value) {
        *self.document.write() = document;
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load_tool_servers(&self) -> Result<Value, ConfigError> {
        Ok(self.document.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_settings_store() {
        let store = MemorySettingsStore::new();
        assert_eq!(
            store.load_tool_servers().await.unwrap(),
            json!({})
        );

        store.set_document(json!({"mcpServers": {}}));
        let document = store.load_tool_servers().await.unwrap();
        assert!(document.get("mcpServers").is_some());
    }

    #[test]
    fn test_with_json_rejects_garbage() {
        assert!(MemorySettingsStore::with_json("not json").is_err());
        assert!(MemorySettingsStore::with_json("{\"mcpServers\":{}}").is_ok());
    }
}
