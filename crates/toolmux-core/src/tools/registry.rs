//! Name-keyed tool namespace merged from every connected server

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::logging::Logger;
use crate::mcp::ToolPort;
use crate::types::ToolInfo;

/// Executable binding for a single tool
#[derive(Clone)]
pub struct ToolBinding {
    /// Owning server name
    pub server: String,
    /// Live connection the tool executes through
    pub port: Arc<dyn ToolPort>,
}

/// Tool namespace shared by all servers in one orchestration instance
///
/// The stripped view (no live bindings) and the executable view are kept in
/// lockstep so the stripped side can be snapshotted across request
/// boundaries. A name advertised by two servers keeps only the newest
/// registration; the collision is logged as a warning.
pub struct ToolRegistry {
    /// Tool name -> stripped descriptor
    stripped: RwLock<HashMap<String, ToolInfo>>,
    /// Tool name -> executable binding; absent until a connection exists
    bindings: RwLock<HashMap<String, ToolBinding>>,
    /// Tool name -> owning server name
    owners: RwLock<HashMap<String, String>>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            stripped: RwLock::new(HashMap::new()),
            bindings: RwLock::new(HashMap::new()),
            owners: RwLock::new(HashMap::new()),
            logger,
        }
    }

    /// Merge one server's freshly listed tools into the namespace.
    ///
    /// A name that already belongs to a different server is overwritten:
    /// the newest registration wins and the collision is logged. Passing a
    /// port splices executable bindings in; `None` registers metadata only.
    pub fn register(&self, server: &str, tools: Vec<ToolInfo>, port: Option<Arc<dyn ToolPort>>) {
        let mut stripped = self.stripped.write();
        let mut bindings = self.bindings.write();
        let mut owners = self.owners.write();

        for tool in tools {
            let name = tool.name.clone();
            if let Some(previous) = owners.get(&name) {
                if previous != server {
                    self.logger.warn(&format!(
                        "[ToolRegistry] Tool '{}' from server '{}' overrides the registration from server '{}'",
                        name, server, previous
                    ));
                }
            }

            owners.insert(name.clone(), server.to_string());
            match &port {
                Some(port) => {
                    bindings.insert(
                        name.clone(),
                        ToolBinding {
                            server: server.to_string(),
                            port: Arc::clone(port),
                        },
                    );
                }
                None => {
                    bindings.remove(&name);
                }
            }
            stripped.insert(name, tool);
        }
    }

    /// Seed the stripped namespace from a cached snapshot (no live bindings)
    pub fn hydrate(&self, tools: &HashMap<String, ToolInfo>) {
        let mut stripped = self.stripped.write();
        let mut owners = self.owners.write();
        for (name, tool) in tools {
            owners.insert(name.clone(), tool.server.clone());
            stripped.insert(name.clone(), tool.clone());
        }
    }

    /// Whether a tool name is known (works with no live connection)
    pub fn contains(&self, name: &str) -> bool {
        self.stripped.read().contains_key(name)
    }

    /// The server owning a tool name
    pub fn owner(&self, name: &str) -> Option<String> {
        self.owners.read().get(name).cloned()
    }

    /// A tool's stripped descriptor
    pub fn get(&self, name: &str) -> Option<ToolInfo> {
        self.stripped.read().get(name).cloned()
    }

    /// A tool's executable binding, if a live connection registered one
    pub fn binding(&self, name: &str) -> Option<ToolBinding> {
        self.bindings.read().get(name).cloned()
    }

    /// Clone of the full stripped namespace
    pub fn stripped(&self) -> HashMap<String, ToolInfo> {
        self.stripped.read().clone()
    }

    /// Clone of the ownership index
    pub fn owners(&self) -> HashMap<String, String> {
        self.owners.read().clone()
    }

    /// Number of known tools
    pub fn len(&self) -> usize {
        self.stripped.read().len()
    }

    /// Whether no tools are known
    pub fn is_empty(&self) -> bool {
        self.stripped.read().is_empty()
    }

    /// Drop every tool and binding
    pub fn clear(&self) {
        self.stripped.write().clear();
        self.bindings.write().clear();
        self.owners.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::mcp::MockToolServer;
    use parking_lot::Mutex;

    /// Logger that captures warnings so collisions are observable
    #[derive(Default)]
    struct CaptureLogger {
        warnings: Mutex<Vec<String>>,
    }

    impl Logger for CaptureLogger {
        fn debug(&self, _message: &str) {}
        fn info(&self, _message: &str) {}
        fn warn(&self, message: &str) {
            self.warnings.lock().push(message.to_string());
        }
        fn error(&self, _message: &str) {}
    }

    fn tool(name: &str, server: &str) -> ToolInfo {
        ToolInfo::new(name, format!("{name} from {server}"), server)
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ToolRegistry::new(Arc::new(NoOpLogger));
        let port: Arc<dyn ToolPort> = Arc::new(MockToolServer::fixed("ok"));

        registry.register("alpha", vec![tool("search", "alpha")], Some(port));

        assert!(registry.contains("search"));
        assert_eq!(registry.owner("search").as_deref(), Some("alpha"));
        assert!(registry.binding("search").is_some());
        assert!(!registry.contains("missing"));
    }

    #[test]
    fn test_collision_keeps_newest_and_warns() {
        let logger = Arc::new(CaptureLogger::default());
        let registry = ToolRegistry::new(logger.clone());

        registry.register("alpha", vec![tool("search", "alpha")], None);
        registry.register("beta", vec![tool("search", "beta")], None);

        // Exactly one binding survives, attributed to the newest server
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.owner("search").as_deref(), Some("beta"));
        assert_eq!(registry.get("search").unwrap().server, "beta");

        let warnings = logger.warnings.lock();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("search"));
        assert!(warnings[0].contains("alpha"));
        assert!(warnings[0].contains("beta"));
    }

    #[test]
    fn test_same_server_reregistration_is_silent() {
        let logger = Arc::new(CaptureLogger::default());
        let registry = ToolRegistry::new(logger.clone());

        registry.register("alpha", vec![tool("search", "alpha")], None);
        registry.register("alpha", vec![tool("search", "alpha")], None);

        assert!(logger.warnings.lock().is_empty());
    }

    #[test]
    fn test_hydrate_has_no_bindings() {
        let registry = ToolRegistry::new(Arc::new(NoOpLogger));
        let mut tools = HashMap::new();
        tools.insert("search".to_string(), tool("search", "alpha"));

        registry.hydrate(&tools);

        assert!(registry.contains("search"));
        assert_eq!(registry.owner("search").as_deref(), Some("alpha"));
        assert!(registry.binding("search").is_none());
    }

    #[test]
    fn test_splicing_binds_known_tools() {
        let registry = ToolRegistry::new(Arc::new(NoOpLogger));
        let mut tools = HashMap::new();
        tools.insert("search".to_string(), tool("search", "alpha"));
        registry.hydrate(&tools);

        // Lazy materialization re-registers the server's tools with a port
        let port: Arc<dyn ToolPort> = Arc::new(MockToolServer::fixed("ok"));
        registry.register("alpha", vec![tool("search", "alpha")], Some(port));

        assert!(registry.binding("search").is_some());
    }

    #[test]
    fn test_clear_resets_everything() {
        let registry = ToolRegistry::new(Arc::new(NoOpLogger));
        registry.register("alpha", vec![tool("search", "alpha")], None);
        assert!(!registry.is_empty());

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.owner("search").is_none());
    }
}
