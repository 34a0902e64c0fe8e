//! Orchestration service
//!
//! The request-scoped coordinator: builds its view of the tool namespace
//! from the process-wide snapshot, opens live connections only when a tool
//! is actually about to execute, and tears down everything it opened when
//! the request ends.

mod invoke;
mod service;

pub use service::{Orchestrator, LISTING_FAILED_REASON};
