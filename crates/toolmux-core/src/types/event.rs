//! Output-stream annotation events
//!
//! The invocation state machine reports progress to the rendering layer
//! through an [`EventSink`] rather than a concrete channel type, so hosts
//! can forward events into whatever response stream they own.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Annotation emitted while resolving tool invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A resolved invocation's result
    ToolResult {
        #[serde(rename = "toolCallId")]
        call_id: String,
        result: String,
    },
    /// Metadata for a newly surfaced invocation
    ToolMeta {
        #[serde(rename = "toolCallId")]
        call_id: String,
        /// Owning server name
        server: String,
        #[serde(rename = "toolName")]
        name: String,
        description: String,
    },
}

/// Destination for [`StreamEvent`]s
///
/// Implementations:
/// - `ChannelSink`: forwards into a tokio channel
/// - `MemorySink`: buffers in memory, mostly for tests
pub trait EventSink: Send + Sync {
    /// Emit one event
    fn emit(&self, event: StreamEvent);
}

/// Sink that forwards events into an unbounded tokio channel
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiving half the host drains
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: StreamEvent) {
        // A dropped receiver means the response stream is gone; nothing to do.
        let _ = self.tx.send(event);
    }
}

/// Sink that buffers events in memory
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<StreamEvent>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all buffered events
    pub fn take(&self) -> Vec<StreamEvent> {
        let mut events = self.events.lock();
        std::mem::take(&mut *events)
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events were emitted
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: StreamEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.emit(StreamEvent::ToolResult {
            call_id: "call_1".to_string(),
            result: "ok".to_string(),
        });
        assert_eq!(sink.len(), 1);

        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_event_serialization() {
        let event = StreamEvent::ToolMeta {
            call_id: "call_1".to_string(),
            server: "search-server".to_string(),
            name: "search".to_string(),
            description: "Search the web".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"tool_meta\""));
        assert!(json.contains("\"toolCallId\":\"call_1\""));
    }

    #[tokio::test]
    async fn test_channel_sink_forwards() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(StreamEvent::ToolResult {
            call_id: "call_1".to_string(),
            result: "ok".to_string(),
        });
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, StreamEvent::ToolResult { .. }));
    }
}
