//! Tool-server configuration validation
//!
//! Turns a raw, untyped settings entry into exactly one typed transport
//! configuration, or a descriptive validation failure. Validation is
//! all-or-nothing per server.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::traits::{ConfigError, ConfigResult};

const TYPE_STDIO: &str = "stdio";
const TYPE_SSE: &str = "sse";
const TYPE_HTTP: &str = "http";

/// Untyped server entry as it appears in the settings document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawServerConfig {
    /// Transport kind: `stdio`, `sse` or `http`; inferred for stdio entries
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Command to spawn (stdio)
    pub command: Option<String>,
    /// Arguments for the command (stdio)
    pub args: Option<Vec<String>>,
    /// Working directory for the command (stdio)
    pub cwd: Option<String>,
    /// Environment for the spawned process (stdio)
    pub env: Option<HashMap<String, String>>,
    /// Server endpoint (sse / http)
    pub url: Option<String>,
    /// Headers sent when opening the endpoint (sse / http)
    pub headers: Option<HashMap<String, String>>,
}

/// Validated transport configuration for one tool server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerConfig {
    /// Local process spoken to over stdio
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        env: Option<HashMap<String, String>>,
    },
    /// One-way server-sent event stream
    Sse {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        headers: Option<HashMap<String, String>>,
    },
    /// Bidirectional streamable HTTP
    Http {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        headers: Option<HashMap<String, String>>,
    },
}

impl ServerConfig {
    /// Validate a raw entry into a typed transport configuration.
    ///
    /// Rules, applied in order: an entry with both `command` and `url` is
    /// rejected; a `type`-less entry with `command` is inferred as stdio; a
    /// `url` without `type` is rejected; the declared type must be known
    /// and its required field present; remaining field-level violations are
    /// collected into a single message.
    pub fn validate(server: &str, raw: RawServerConfig) -> ConfigResult<Self> {
        if raw.command.is_some() && raw.url.is_some() {
            return Err(ConfigError::BothCommandAndUrl {
                server: server.to_string(),
            });
        }

        let kind = match raw.kind.clone() {
            Some(kind) => kind,
            None if raw.command.is_some() => TYPE_STDIO.to_string(),
            None => {
                return Err(ConfigError::MissingType {
                    server: server.to_string(),
                })
            }
        };

        match kind.as_str() {
            TYPE_STDIO => Self::validate_stdio(server, raw),
            TYPE_SSE | TYPE_HTTP => Self::validate_endpoint(server, &kind, raw),
            _ => Err(ConfigError::InvalidType {
                server: server.to_string(),
                kind,
            }),
        }
    }

    fn validate_stdio(server: &str, raw: RawServerConfig) -> ConfigResult<Self> {
        let Some(command) = raw.command else {
            return Err(ConfigError::MissingField {
                server: server.to_string(),
                field: "command",
            });
        };

        let mut violations = Vec::new();
        if command.trim().is_empty() {
            violations.push("command: must be a non-empty string".to_string());
        }
        if let Some(cwd) = &raw.cwd {
            if cwd.trim().is_empty() {
                violations.push("cwd: must be a non-empty path".to_string());
            }
        }
        if !violations.is_empty() {
            return Err(ConfigError::Invalid {
                server: server.to_string(),
                violations: violations.join("; "),
            });
        }

        Ok(ServerConfig::Stdio {
            command,
            args: raw.args.unwrap_or_default(),
            cwd: raw.cwd,
            env: raw.env,
        })
    }

    fn validate_endpoint(server: &str, kind: &str, raw: RawServerConfig) -> ConfigResult<Self> {
        let Some(url) = raw.url else {
            return Err(ConfigError::MissingField {
                server: server.to_string(),
                field: "url",
            });
        };

        let mut violations = Vec::new();
        if let Err(err) = reqwest::Url::parse(&url) {
            violations.push(format!("url: {err}"));
        }
        if !violations.is_empty() {
            return Err(ConfigError::Invalid {
                server: server.to_string(),
                violations: violations.join("; "),
            });
        }

        if kind == TYPE_SSE {
            Ok(ServerConfig::Sse {
                url,
                headers: raw.headers,
            })
        } else {
            Ok(ServerConfig::Http {
                url,
                headers: raw.headers,
            })
        }
    }

    /// The transport kind name
    pub fn kind(&self) -> &'static str {
        match self {
            ServerConfig::Stdio { .. } => TYPE_STDIO,
            ServerConfig::Sse { .. } => TYPE_SSE,
            ServerConfig::Http { .. } => TYPE_HTTP,
        }
    }

    /// Whether this config spawns a local process
    pub fn is_stdio(&self) -> bool {
        matches!(self, ServerConfig::Stdio { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: serde_json::Value) -> RawServerConfig {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_stdio_type_inferred_when_omitted() {
        let config = ServerConfig::validate(
            "local",
            raw(serde_json::json!({"command": "echo", "args": ["hi"]})),
        )
        .unwrap();
        assert!(config.is_stdio());
        assert_eq!(config.kind(), "stdio");
    }

    #[test]
    fn test_both_command_and_url_rejected() {
        let err = ServerConfig::validate(
            "confused",
            raw(serde_json::json!({"command": "echo", "url": "http://localhost:3000"})),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::BothCommandAndUrl { .. }));
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn test_url_without_type_rejected() {
        let err = ServerConfig::validate(
            "remote",
            raw(serde_json::json!({"url": "http://localhost:3000"})),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingType { .. }));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = ServerConfig::validate(
            "weird",
            raw(serde_json::json!({"type": "websocket", "url": "http://localhost:3000"})),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidType { .. }));
    }

    #[test]
    fn test_declared_type_requires_its_field() {
        let err = ServerConfig::validate("no-command", raw(serde_json::json!({"type": "stdio"})))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField { field: "command", .. }
        ));

        let err =
            ServerConfig::validate("no-url", raw(serde_json::json!({"type": "sse"}))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "url", .. }));
    }

    #[test]
    fn test_field_violations_are_collected() {
        let err = ServerConfig::validate(
            "blank",
            raw(serde_json::json!({"command": "  ", "cwd": ""})),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("command:"));
        assert!(message.contains("cwd:"));
    }

    #[test]
    fn test_malformed_url_rejected() {
        let err = ServerConfig::validate(
            "bad-url",
            raw(serde_json::json!({"type": "http", "url": "not a url"})),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_endpoint_configs_keep_headers() {
        let config = ServerConfig::validate(
            "remote",
            raw(serde_json::json!({
                "type": "sse",
                "url": "https://tools.example.com/sse",
                "headers": {"authorization": "Bearer token"}
            })),
        )
        .unwrap();
        match config {
            ServerConfig::Sse { headers, .. } => {
                assert_eq!(
                    headers.unwrap().get("authorization").map(String::as_str),
                    Some("Bearer token")
                );
            }
            other => panic!("expected sse config, got {other:?}"),
        }
    }
}
