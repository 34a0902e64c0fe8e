//! Approval-gated tool invocation over conversation messages

use futures::future::join_all;

use crate::types::{
    ChatMessage, ContentPart, EventSink, MessageContent, StreamEvent, ToolInvocation,
    APPROVAL_APPROVED, APPROVAL_DENIED, RESULT_DENIED, RESULT_EXECUTION_ERROR, RESULT_NO_EXECUTOR,
};

use super::service::Orchestrator;

impl Orchestrator {
    /// Resolve pending tool invocations in the most recent message.
    ///
    /// Earlier messages pass through unchanged. Invocations are evaluated
    /// independently and reassembled in their original positions; a failure
    /// in one never aborts its siblings. Every computed result emits a
    /// [`StreamEvent::ToolResult`] before the invocation record is updated.
    pub async fn process_tool_invocations(
        &self,
        mut messages: Vec<ChatMessage>,
        sink: &dyn EventSink,
    ) -> Vec<ChatMessage> {
        let Some(last) = messages.last_mut() else {
            return messages;
        };

        if let MessageContent::Parts(parts) = &mut last.content {
            let resolved = join_all(parts.iter().map(|part| self.resolve_part(part, sink))).await;
            for (part, invocation) in parts.iter_mut().zip(resolved) {
                if let Some(invocation) = invocation {
                    *part = ContentPart::ToolInvocation { invocation };
                }
            }
        }

        messages
    }

    /// Evaluate one content part, returning the updated invocation or
    /// `None` to leave the part untouched
    async fn resolve_part(
        &self,
        part: &ContentPart,
        sink: &dyn EventSink,
    ) -> Option<ToolInvocation> {
        let ContentPart::ToolInvocation { invocation } = part else {
            return None;
        };
        if !self.is_known_tool(&invocation.name) {
            return None;
        }
        if invocation.is_resolved() {
            return None;
        }

        match invocation.approval.as_deref() {
            None => {
                // Newly surfaced: announce the tool so the stream can
                // render an approval prompt for it.
                if let Some(tool) = self.tools().get(&invocation.name) {
                    sink.emit(StreamEvent::ToolMeta {
                        call_id: invocation.id.clone(),
                        server: tool.server,
                        name: tool.name,
                        description: tool.description,
                    });
                }
                None
            }
            Some(APPROVAL_APPROVED) => {
                let result = self.execute_approved(invocation).await;
                Some(self.resolve(invocation, result, sink))
            }
            Some(APPROVAL_DENIED) => Some(self.resolve(invocation, RESULT_DENIED.to_string(), sink)),
            Some(_) => None,
        }
    }

    /// Emit the result event, then produce the terminal invocation record
    fn resolve(
        &self,
        invocation: &ToolInvocation,
        result: String,
        sink: &dyn EventSink,
    ) -> ToolInvocation {
        sink.emit(StreamEvent::ToolResult {
            call_id: invocation.id.clone(),
            result: result.clone(),
        });
        let mut updated = invocation.clone();
        updated.result = Some(result);
        updated
    }

    /// Run an approved invocation, materializing its owning server's
    /// connection on demand
    async fn execute_approved(&self, invocation: &ToolInvocation) -> String {
        let binding = match self.tools().binding(&invocation.name) {
            Some(binding) => Some(binding),
            None => match self.tools().owner(&invocation.name) {
                Some(server) => {
                    self.ensure_server_client(&server).await;
                    self.tools().binding(&invocation.name)
                }
                None => None,
            },
        };

        let Some(binding) = binding else {
            return RESULT_NO_EXECUTOR.to_string();
        };

        match binding.port.call(&invocation.name, invocation.args.clone()).await {
            Ok(result) => result,
            Err(e) => {
                self.logger().warn(&format!(
                    "[Orchestrator] Tool '{}' failed: {}",
                    invocation.name, e
                ));
                RESULT_EXECUTION_ERROR.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::config::ServerRegistry;
    use crate::logging::NoOpLogger;
    use crate::mcp::{MockToolServer, RuntimeEnv, ToolPort};
    use crate::tools::SnapshotCache;
    use crate::types::{MemorySink, MessageRole, ToolInfo};

    use super::*;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(
            Arc::new(ServerRegistry::empty()),
            Arc::new(SnapshotCache::new()),
            RuntimeEnv::Native,
            Arc::new(NoOpLogger),
        )
    }

    fn register(orchestrator: &Orchestrator, server: &str, tool: &str, mock: &Arc<MockToolServer>) {
        let port: Arc<dyn ToolPort> = Arc::clone(mock) as Arc<dyn ToolPort>;
        orchestrator.tools().register(
            server,
            vec![ToolInfo::new(tool, format!("{tool} tool"), server)],
            Some(port),
        );
    }

    fn invocation_part(id: &str, name: &str, approval: Option<&str>) -> ContentPart {
        let mut invocation = ToolInvocation::new(id, name, json!({"query": "rust"}));
        invocation.approval = approval.map(str::to_string);
        ContentPart::ToolInvocation { invocation }
    }

    fn last_invocation(messages: &[ChatMessage]) -> &ToolInvocation {
        messages
            .last()
            .unwrap()
            .tool_invocations()
            .next()
            .unwrap()
    }

    #[tokio::test]
    async fn test_approved_invocation_executes() {
        let orchestrator = orchestrator();
        let mock = Arc::new(MockToolServer::fixed("42 results"));
        register(&orchestrator, "alpha", "search", &mock);

        let messages = vec![ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![invocation_part("call_1", "search", Some(APPROVAL_APPROVED))],
        )];
        let sink = MemorySink::new();

        let messages = orchestrator.process_tool_invocations(messages, &sink).await;

        assert_eq!(
            last_invocation(&messages).result.as_deref(),
            Some("42 results")
        );
        assert_eq!(mock.call_count(), 1);

        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            StreamEvent::ToolResult { call_id, result }
                if call_id == "call_1" && result == "42 results"
        ));
    }

    #[tokio::test]
    async fn test_denied_invocation_never_executes() {
        let orchestrator = orchestrator();
        let mock = Arc::new(MockToolServer::fixed("should not run"));
        register(&orchestrator, "alpha", "search", &mock);

        let messages = vec![ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![invocation_part("call_1", "search", Some(APPROVAL_DENIED))],
        )];
        let sink = MemorySink::new();

        let messages = orchestrator.process_tool_invocations(messages, &sink).await;

        assert_eq!(
            last_invocation(&messages).result.as_deref(),
            Some(RESULT_DENIED)
        );
        assert_eq!(mock.call_count(), 0);
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_pending_invocation_surfaces_metadata() {
        let orchestrator = orchestrator();
        let mock = Arc::new(MockToolServer::fixed("ok"));
        register(&orchestrator, "alpha", "search", &mock);

        let messages = vec![ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![invocation_part("call_1", "search", None)],
        )];
        let sink = MemorySink::new();

        let messages = orchestrator.process_tool_invocations(messages, &sink).await;

        // Untouched until the user decides
        assert!(last_invocation(&messages).result.is_none());
        assert_eq!(mock.call_count(), 0);

        let events = sink.take();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            StreamEvent::ToolMeta { call_id, server, name, .. }
                if call_id == "call_1" && server == "alpha" && name == "search"
        ));
    }

    #[tokio::test]
    async fn test_unknown_tool_passes_through() {
        let orchestrator = orchestrator();

        let messages = vec![ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![invocation_part("call_1", "nonexistent", Some(APPROVAL_APPROVED))],
        )];
        let sink = MemorySink::new();

        let messages = orchestrator.process_tool_invocations(messages, &sink).await;

        assert!(last_invocation(&messages).result.is_none());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_approval_passes_through() {
        let orchestrator = orchestrator();
        let mock = Arc::new(MockToolServer::fixed("ok"));
        register(&orchestrator, "alpha", "search", &mock);

        let messages = vec![ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![invocation_part("call_1", "search", Some("maybe later"))],
        )];
        let sink = MemorySink::new();

        let messages = orchestrator.process_tool_invocations(messages, &sink).await;

        assert!(last_invocation(&messages).result.is_none());
        assert_eq!(mock.call_count(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_execution_error_is_isolated_from_siblings() {
        let orchestrator = orchestrator();
        let failing = Arc::new(MockToolServer::failing("boom"));
        let healthy = Arc::new(MockToolServer::fixed("fine"));
        register(&orchestrator, "alpha", "explode", &failing);
        register(&orchestrator, "beta", "search", &healthy);

        let messages = vec![ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![
                invocation_part("call_1", "explode", Some(APPROVAL_APPROVED)),
                invocation_part("call_2", "search", Some(APPROVAL_APPROVED)),
            ],
        )];
        let sink = MemorySink::new();

        let messages = orchestrator.process_tool_invocations(messages, &sink).await;

        let invocations: Vec<_> = messages.last().unwrap().tool_invocations().collect();
        assert_eq!(invocations[0].result.as_deref(), Some(RESULT_EXECUTION_ERROR));
        assert_eq!(invocations[1].result.as_deref(), Some("fine"));
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn test_resolved_invocation_is_terminal() {
        let orchestrator = orchestrator();
        let mock = Arc::new(MockToolServer::fixed("new result"));
        register(&orchestrator, "alpha", "search", &mock);

        let mut invocation = ToolInvocation::new("call_1", "search", json!({}));
        invocation.approve();
        invocation.result = Some("old result".to_string());
        let messages = vec![ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![ContentPart::ToolInvocation { invocation }],
        )];
        let sink = MemorySink::new();

        let messages = orchestrator.process_tool_invocations(messages, &sink).await;

        assert_eq!(
            last_invocation(&messages).result.as_deref(),
            Some("old result")
        );
        assert_eq!(mock.call_count(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_approved_without_binding_or_config_yields_marker() {
        let orchestrator = orchestrator();
        // Metadata only: the tool is known but nothing can execute it and
        // its server has no configuration to connect with.
        orchestrator.tools().register(
            "ghost",
            vec![ToolInfo::new("vanish", "Gone tool", "ghost")],
            None,
        );

        let messages = vec![ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![invocation_part("call_1", "vanish", Some(APPROVAL_APPROVED))],
        )];
        let sink = MemorySink::new();

        let messages = orchestrator.process_tool_invocations(messages, &sink).await;

        assert_eq!(
            last_invocation(&messages).result.as_deref(),
            Some(RESULT_NO_EXECUTOR)
        );
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_earlier_messages_pass_through() {
        let orchestrator = orchestrator();
        let mock = Arc::new(MockToolServer::fixed("ok"));
        register(&orchestrator, "alpha", "search", &mock);

        let messages = vec![
            ChatMessage::with_parts(
                MessageRole::Assistant,
                vec![invocation_part("call_old", "search", Some(APPROVAL_APPROVED))],
            ),
            ChatMessage::user("and now something else"),
        ];
        let sink = MemorySink::new();

        let messages = orchestrator.process_tool_invocations(messages, &sink).await;

        // Only the most recent message is examined
        let first: Vec<_> = messages[0].tool_invocations().collect();
        assert!(first[0].result.is_none());
        assert_eq!(mock.call_count(), 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_empty_conversation_is_a_no_op() {
        let orchestrator = orchestrator();
        let sink = MemorySink::new();
        let messages = orchestrator.process_tool_invocations(vec![], &sink).await;
        assert!(messages.is_empty());
        assert!(sink.is_empty());
    }
}
