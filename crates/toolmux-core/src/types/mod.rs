//! Core types for tool orchestration
//!
//! This module contains the shared types used across the crate.

mod event;
mod message;
mod status;
mod tool;

pub use event::{ChannelSink, EventSink, MemorySink, StreamEvent};
pub use message::{ChatMessage, ContentPart, MessageContent, MessageRole};
pub use status::ServerStatus;
pub use tool::{
    ToolInfo, ToolInvocation, APPROVAL_APPROVED, APPROVAL_DENIED, RESULT_DENIED,
    RESULT_EXECUTION_ERROR, RESULT_NO_EXECUTOR,
};
