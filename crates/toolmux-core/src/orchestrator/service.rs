//! Connection orchestration across all configured servers

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinSet;

use crate::config::{ConfigResult, ServerConfig, ServerRegistry, SettingsStore};
use crate::logging::Logger;
use crate::mcp::{McpClient, McpError, RuntimeEnv, ToolPort};
use crate::tools::{Snapshot, SnapshotCache, ToolRegistry};
use crate::types::{ServerStatus, ToolInfo};

/// Reason attached to a server whose connection succeeded but whose tool
/// listing failed
pub const LISTING_FAILED_REASON: &str = "could not retrieve tools from server";

/// Outcome of probing one configured server
enum ProbeOutcome {
    Available {
        client: Arc<McpClient>,
        tools: Vec<ToolInfo>,
    },
    ListingFailed {
        client: Arc<McpClient>,
    },
    ConnectFailed {
        reason: String,
    },
}

/// Request-scoped orchestration service
///
/// Exclusively owns every connection it opens; the only state shared with
/// other instances is the stripped [`SnapshotCache`]. Call [`Self::close`]
/// before discarding an instance.
pub struct Orchestrator {
    /// Configuration this instance was built against
    registry: Arc<ServerRegistry>,
    /// Process-wide metadata cache, shared across instances
    cache: Arc<SnapshotCache>,
    /// Capabilities of the hosting process
    env: RuntimeEnv,
    /// Logger
    logger: Arc<dyn Logger>,
    /// Live tool namespace for this instance
    tools: ToolRegistry,
    /// Server name -> connection opened by this instance, kept for teardown
    connected: Mutex<HashMap<String, Arc<McpClient>>>,
    /// Per-server lazy connection memo; concurrent callers share the cell
    lazy: parking_lot::Mutex<HashMap<String, Arc<OnceCell<Arc<McpClient>>>>>,
}

impl Orchestrator {
    /// Build a request-scoped service from the shared metadata cache.
    ///
    /// No connections are opened. When the cached snapshot matches the
    /// registry's generation, the stripped namespace is hydrated from it so
    /// tool names resolve before any connection exists.
    pub fn new(
        registry: Arc<ServerRegistry>,
        cache: Arc<SnapshotCache>,
        env: RuntimeEnv,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let tools = ToolRegistry::new(Arc::clone(&logger));
        if let Some(snapshot) = cache.load_if_current(registry.generation()) {
            tools.hydrate(snapshot.tools());
        }

        Self {
            registry,
            cache,
            env,
            logger,
            tools,
            connected: Mutex::new(HashMap::new()),
            lazy: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// One-shot bootstrap: load the settings document, validate it into a
    /// registry and run a full reconfiguration pass.
    pub async fn bootstrap(
        store: &dyn SettingsStore,
        cache: Arc<SnapshotCache>,
        env: RuntimeEnv,
        logger: Arc<dyn Logger>,
    ) -> ConfigResult<(Self, HashMap<String, ServerStatus>)> {
        let document = store.load_tool_servers().await?;
        let registry = Arc::new(ServerRegistry::from_settings(&document)?);
        let orchestrator = Self::new(registry, cache, env, logger);
        let statuses = orchestrator.reconfigure().await;
        Ok((orchestrator, statuses))
    }

    /// The registry this instance was built against
    pub fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    /// The live tool namespace
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub(crate) fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Whether a tool name is known, from stripped metadata only
    pub fn is_known_tool(&self, name: &str) -> bool {
        self.tools.contains(name)
    }

    /// Connect to every configured server and rebuild the namespace.
    ///
    /// Attempts run concurrently with independent outcomes; one server's
    /// failure never aborts another's attempt. The resulting stripped
    /// snapshot replaces the process-wide cache.
    pub async fn reconfigure(&self) -> HashMap<String, ServerStatus> {
        self.tools.clear();
        self.lazy.lock().clear();

        let mut statuses: HashMap<String, ServerStatus> = HashMap::new();

        // Entries that failed validation never get a connection attempt.
        for (name, reason) in self.registry.rejected() {
            statuses.insert(
                name.clone(),
                ServerStatus::Unavailable {
                    reason: reason.clone(),
                },
            );
        }

        let mut join_set = JoinSet::new();
        for (name, config) in self.registry.servers() {
            let name = name.clone();
            let config = config.clone();
            let env = self.env;
            let logger = Arc::clone(&self.logger);
            join_set.spawn(async move {
                let outcome = probe(&name, &config, env, logger).await;
                (name, outcome)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            let Ok((name, outcome)) = joined else {
                self.logger
                    .error("[Orchestrator] Connection task panicked");
                continue;
            };

            match outcome {
                ProbeOutcome::Available { client, tools } => {
                    let port: Arc<dyn ToolPort> = Arc::clone(&client) as Arc<dyn ToolPort>;
                    self.tools.register(&name, tools.clone(), Some(port));
                    self.track_connection(&name, client).await;
                    statuses.insert(name, ServerStatus::Available { tools });
                }
                ProbeOutcome::ListingFailed { client } => {
                    // The connection is kept so teardown can close it.
                    self.track_connection(&name, client).await;
                    statuses.insert(
                        name,
                        ServerStatus::Unavailable {
                            reason: LISTING_FAILED_REASON.to_string(),
                        },
                    );
                }
                ProbeOutcome::ConnectFailed { reason } => {
                    statuses.insert(name, ServerStatus::Unavailable { reason });
                }
            }
        }

        self.cache.store(Snapshot::new(
            self.registry.generation(),
            self.tools.stripped(),
            self.tools.owners(),
            statuses.clone(),
        ));

        statuses
    }

    /// Per-server availability, served from the shared cache when current.
    ///
    /// A cache hit performs zero connection attempts; a stale or missing
    /// snapshot falls back to a full reconfiguration pass.
    pub async fn check_availability(&self) -> HashMap<String, ServerStatus> {
        if let Some(snapshot) = self.cache.load_if_current(self.registry.generation()) {
            self.logger.debug(&format!(
                "[Orchestrator] Serving availability from snapshot (generation {})",
                snapshot.generation()
            ));
            return snapshot.statuses().clone();
        }
        self.reconfigure().await
    }

    /// Ensure a live connection to `server`, opening at most one per
    /// instance.
    ///
    /// On first success the server's tools are re-listed and their
    /// executable bindings spliced into the live namespace. Failures are
    /// logged and reported as `None`; the caller degrades the affected
    /// tool, not the request.
    pub(crate) async fn ensure_server_client(&self, server: &str) -> Option<Arc<McpClient>> {
        let Some(config) = self.registry.get(server) else {
            self.logger.warn(&format!(
                "[Orchestrator] No configuration for server '{}'",
                server
            ));
            return None;
        };

        let cell = {
            let mut lazy = self.lazy.lock();
            Arc::clone(
                lazy.entry(server.to_string())
                    .or_insert_with(|| Arc::new(OnceCell::new())),
            )
        };

        let connected = cell
            .get_or_try_init(|| async {
                let client = Arc::new(
                    McpClient::connect(server, config, self.env, Arc::clone(&self.logger)).await?,
                );
                let tools = client.list_tools().await?;
                let port: Arc<dyn ToolPort> = Arc::clone(&client) as Arc<dyn ToolPort>;
                self.tools.register(server, tools, Some(port));
                self.track_connection(server, Arc::clone(&client)).await;
                Ok::<_, McpError>(client)
            })
            .await;

        match connected {
            Ok(client) => Some(Arc::clone(client)),
            Err(e) => {
                self.logger.warn(&format!(
                    "[Orchestrator] Lazy connection to '{}' failed: {}",
                    server, e
                ));
                None
            }
        }
    }

    /// Close every connection this instance opened; idempotent
    pub async fn close(&self) {
        let drained: Vec<(String, Arc<McpClient>)> =
            self.connected.lock().await.drain().collect();
        self.lazy.lock().clear();
        self.tools.clear();

        for (name, client) in drained {
            self.logger
                .debug(&format!("[Orchestrator] Closing connection to '{}'", name));
            client.close().await;
        }
    }

    /// Remember a connection for teardown, closing any one it displaces
    async fn track_connection(&self, server: &str, client: Arc<McpClient>) {
        let displaced = self.connected.lock().await.insert(server.to_string(), client);
        if let Some(previous) = displaced {
            previous.close().await;
        }
    }
}

/// Probe one server: connect, then list its tools
async fn probe(
    name: &str,
    config: &ServerConfig,
    env: RuntimeEnv,
    logger: Arc<dyn Logger>,
) -> ProbeOutcome {
    let client = match McpClient::connect(name, config, env, Arc::clone(&logger)).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            logger.warn(&format!(
                "[Orchestrator] Could not connect to server '{}': {}",
                name, e
            ));
            return ProbeOutcome::ConnectFailed {
                reason: e.to_string(),
            };
        }
    };

    match client.list_tools().await {
        Ok(tools) => ProbeOutcome::Available { client, tools },
        Err(e) => {
            logger.warn(&format!(
                "[Orchestrator] Could not list tools from server '{}': {}",
                name, e
            ));
            ProbeOutcome::ListingFailed { client }
        }
    }
}
