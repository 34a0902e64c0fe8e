//! Tool-server configuration
//!
//! Configuration enters through the [`SettingsStore`] collaborator as a raw
//! `{ "mcpServers": { <name>: <entry> } }` document, gets validated into
//! typed per-transport [`ServerConfig`]s, and is frozen into an immutable,
//! generation-tracked [`ServerRegistry`].

mod memory;
mod registry;
mod server;
mod traits;

pub use memory::MemorySettingsStore;
pub use registry::ServerRegistry;
pub use server::{RawServerConfig, ServerConfig};
pub use traits::{ConfigError, ConfigResult, SettingsStore};
