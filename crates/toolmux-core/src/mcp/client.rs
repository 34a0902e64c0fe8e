//! MCP client over the transports a tool server can be configured with

use std::collections::HashMap;
use std::sync::Arc;

use rmcp::{
    model::{CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation},
    service::RunningService,
    RoleClient, ServiceExt,
};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::logging::Logger;
use crate::types::ToolInfo;

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool listing failed: {0}")]
    ListToolsFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("stdio tool servers are unsupported in this environment")]
    UnsupportedEnvironment,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

/// Capabilities of the process hosting the orchestration core
///
/// Request-sandboxed runtimes cannot spawn child processes, so stdio
/// transports are refused there before any connection attempt is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    /// Full process-capable runtime; all transports permitted
    Native,
    /// Request-sandboxed runtime; network transports only
    Sandboxed,
}

impl RuntimeEnv {
    /// Whether stdio transports may spawn processes here
    pub fn supports_stdio(self) -> bool {
        matches!(self, RuntimeEnv::Native)
    }
}

/// Connected client for a single configured tool server
pub struct McpClient {
    /// Configured name of the server this client talks to
    server: String,
    /// The underlying rmcp running service; taken out on close
    client: Mutex<Option<RunningService<RoleClient, ClientInfo>>>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl McpClient {
    /// Connect to a tool server using the transport its config selects
    pub async fn connect(
        server: &str,
        config: &ServerConfig,
        env: RuntimeEnv,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        match config {
            ServerConfig::Stdio {
                command,
                args,
                cwd,
                env: process_env,
            } => {
                if !env.supports_stdio() {
                    return Err(McpError::UnsupportedEnvironment);
                }
                Self::connect_stdio(server, command, args, cwd.as_deref(), process_env.as_ref(), logger)
                    .await
            }
            ServerConfig::Sse { url, headers } => {
                Self::connect_sse(server, url, headers.as_ref(), logger).await
            }
            ServerConfig::Http { url, headers } => {
                Self::connect_http(server, url, headers.as_ref(), logger).await
            }
        }
    }

    /// Spawn a local server process and speak MCP over its stdio
    async fn connect_stdio(
        server: &str,
        command: &str,
        args: &[String],
        cwd: Option<&str>,
        process_env: Option<&HashMap<String, String>>,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        use rmcp::transport::TokioChildProcess;

        logger.info(&format!(
            "[McpClient] Spawning stdio server '{}': {}",
            server, command
        ));

        let mut cmd = Command::new(command);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        if let Some(vars) = process_env {
            cmd.envs(vars);
        }

        let transport =
            TokioChildProcess::new(cmd).map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info(&format!("[McpClient] Connected to '{}'", server));

        Ok(Self {
            server: server.to_string(),
            client: Mutex::new(Some(client)),
            logger,
        })
    }

    /// Connect to a server exposing a one-way SSE endpoint
    async fn connect_sse(
        server: &str,
        url: &str,
        headers: Option<&HashMap<String, String>>,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        use rmcp::transport::sse_client::{SseClientConfig, SseClientTransport};

        logger.info(&format!("[McpClient] Connecting to SSE server '{}': {}", server, url));

        let transport = SseClientTransport::start_with_client(
            http_client(headers)?,
            SseClientConfig {
                sse_endpoint: url.into(),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info(&format!("[McpClient] Connected to '{}'", server));

        Ok(Self {
            server: server.to_string(),
            client: Mutex::new(Some(client)),
            logger,
        })
    }

    /// Connect to a server exposing a bidirectional streamable HTTP endpoint
    async fn connect_http(
        server: &str,
        url: &str,
        headers: Option<&HashMap<String, String>>,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
        use rmcp::transport::StreamableHttpClientTransport;

        logger.info(&format!("[McpClient] Connecting to HTTP server '{}': {}", server, url));

        let transport = StreamableHttpClientTransport::with_client(
            http_client(headers)?,
            StreamableHttpClientTransportConfig::with_uri(url.to_string()),
        );

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info(&format!("[McpClient] Connected to '{}'", server));

        Ok(Self {
            server: server.to_string(),
            client: Mutex::new(Some(client)),
            logger,
        })
    }

    /// Configured name of the server this client talks to
    pub fn server(&self) -> &str {
        &self.server
    }

    /// List the server's tools as stripped descriptors
    pub async fn list_tools(&self) -> McpResult<Vec<ToolInfo>> {
        let guard = self.client.lock().await;
        let client = guard
            .as_ref()
            .ok_or_else(|| McpError::Protocol("connection closed".to_string()))?;

        let result = client
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::ListToolsFailed(e.to_string()))?;

        self.logger.info(&format!(
            "[McpClient] '{}' listed {} tools",
            self.server,
            result.tools.len()
        ));

        Ok(result
            .tools
            .into_iter()
            .map(|tool| ToolInfo {
                name: tool.name.to_string(),
                description: tool.description.map(|s| s.to_string()).unwrap_or_default(),
                input_schema: serde_json::to_value(tool.input_schema.as_ref())
                    .unwrap_or_default(),
                server: self.server.clone(),
            })
            .collect())
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallToolResult> {
        self.logger
            .info(&format!("[McpClient] '{}' calling tool: {}", self.server, name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        let guard = self.client.lock().await;
        let client = guard
            .as_ref()
            .ok_or_else(|| McpError::Protocol("connection closed".to_string()))?;

        client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))
    }

    /// Close the connection.
    ///
    /// Safe to call more than once; errors are logged, never returned.
    pub async fn close(&self) {
        let Some(client) = self.client.lock().await.take() else {
            return;
        };
        self.logger
            .info(&format!("[McpClient] Closing connection to '{}'", self.server));
        if let Err(e) = client.cancel().await {
            self.logger.warn(&format!(
                "[McpClient] Error closing connection to '{}': {}",
                self.server, e
            ));
        }
    }
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "toolmux-core".to_string(),
            title: Some("ToolMux Core".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

fn http_client(headers: Option<&HashMap<String, String>>) -> McpResult<reqwest::Client> {
    let mut map = reqwest::header::HeaderMap::new();
    if let Some(headers) = headers {
        for (key, value) in headers {
            let name = reqwest::header::HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| McpError::ConnectionFailed(format!("invalid header '{key}': {e}")))?;
            let value = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| McpError::ConnectionFailed(format!("invalid header '{key}': {e}")))?;
            map.insert(name, value);
        }
    }
    reqwest::Client::builder()
        .default_headers(map)
        .build()
        .map_err(|e| McpError::ConnectionFailed(e.to_string()))
}
