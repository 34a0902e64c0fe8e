//! Immutable tool-server registry with generation tracking

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use super::server::{RawServerConfig, ServerConfig};
use super::traits::{ConfigError, ConfigResult};

/// Settings key holding the tool-server map
const SERVERS_KEY: &str = "mcpServers";

// Monotonic across every registry loaded in this process; the generation is
// the staleness check between a registry and a cached metadata snapshot.
static GENERATION: AtomicU64 = AtomicU64::new(0);

fn next_generation() -> u64 {
    GENERATION.fetch_add(1, Ordering::Relaxed) + 1
}

/// A validated, immutable set of tool-server configurations
///
/// Replaced wholesale on every settings update. Entries that fail
/// validation are kept aside with their failure message so one malformed
/// server never sinks the rest of the registry.
#[derive(Debug, Clone)]
pub struct ServerRegistry {
    generation: u64,
    servers: HashMap<String, ServerConfig>,
    rejected: HashMap<String, String>,
}

impl ServerRegistry {
    /// Create a registry with no servers
    pub fn empty() -> Self {
        Self {
            generation: next_generation(),
            servers: HashMap::new(),
            rejected: HashMap::new(),
        }
    }

    /// Create a registry from already validated configurations
    pub fn new(servers: HashMap<String, ServerConfig>) -> Self {
        Self {
            generation: next_generation(),
            servers,
            rejected: HashMap::new(),
        }
    }

    /// Build a registry from a raw settings document.
    ///
    /// Only a document that is not a JSON object is a registry-level
    /// failure; malformed individual entries land in [`Self::rejected`].
    pub fn from_settings(document: &Value) -> ConfigResult<Self> {
        if !document.is_object() {
            return Err(ConfigError::Store(
                "settings document must be a JSON object".to_string(),
            ));
        }

        let mut servers = HashMap::new();
        let mut rejected = HashMap::new();

        if let Some(section) = document.get(SERVERS_KEY) {
            let Some(entries) = section.as_object() else {
                return Err(ConfigError::Store(format!(
                    "'{SERVERS_KEY}' must be a JSON object"
                )));
            };

            for (name, entry) in entries {
                match serde_json::from_value::<RawServerConfig>(entry.clone()) {
                    Ok(raw) => match ServerConfig::validate(name, raw) {
                        Ok(config) => {
                            servers.insert(name.clone(), config);
                        }
                        Err(err) => {
                            rejected.insert(name.clone(), err.to_string());
                        }
                    },
                    Err(err) => {
                        rejected.insert(name.clone(), format!("malformed entry: {err}"));
                    }
                }
            }
        }

        Ok(Self {
            generation: next_generation(),
            servers,
            rejected,
        })
    }

    /// Generation number assigned when this registry was loaded
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The validated server configurations
    pub fn servers(&self) -> &HashMap<String, ServerConfig> {
        &self.servers
    }

    /// Entries that failed validation, with their failure messages
    pub fn rejected(&self) -> &HashMap<String, String> {
        &self.rejected
    }

    /// Look up one server's configuration
    pub fn get(&self, server: &str) -> Option<&ServerConfig> {
        self.servers.get(server)
    }

    /// Number of validated servers
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Whether no servers validated
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
