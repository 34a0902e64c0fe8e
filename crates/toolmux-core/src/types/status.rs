//! Per-server orchestration outcomes

use serde::{Deserialize, Serialize};

use super::tool::ToolInfo;

/// Externally visible result of orchestrating one configured server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ServerStatus {
    /// Connected and listed; carries the stripped tool set
    Available { tools: Vec<ToolInfo> },
    /// Connection or listing failed; carries a human-readable reason
    Unavailable { reason: String },
}

impl ServerStatus {
    /// Whether the server is usable
    pub fn is_available(&self) -> bool {
        matches!(self, ServerStatus::Available { .. })
    }

    /// The failure reason, if unavailable
    pub fn reason(&self) -> Option<&str> {
        match self {
            ServerStatus::Unavailable { reason } => Some(reason),
            ServerStatus::Available { .. } => None,
        }
    }

    /// The advertised tools, empty when unavailable
    pub fn tools(&self) -> &[ToolInfo] {
        match self {
            ServerStatus::Available { tools } => tools,
            ServerStatus::Unavailable { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessors() {
        let available = ServerStatus::Available {
            tools: vec![ToolInfo::new("search", "Search the web", "alpha")],
        };
        assert!(available.is_available());
        assert!(available.reason().is_none());
        assert_eq!(available.tools().len(), 1);

        let unavailable = ServerStatus::Unavailable {
            reason: "connection refused".to_string(),
        };
        assert!(!unavailable.is_available());
        assert_eq!(unavailable.reason(), Some("connection refused"));
        assert!(unavailable.tools().is_empty());
    }

    #[test]
    fn test_status_serialization() {
        let status = ServerStatus::Unavailable {
            reason: "connection refused".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"unavailable\""));
        assert!(json.contains("connection refused"));
    }
}
