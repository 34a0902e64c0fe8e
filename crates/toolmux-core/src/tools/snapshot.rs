//! Process-wide metadata snapshot
//!
//! The only state allowed to outlive a request: the stripped tool
//! namespace, the ownership index and the per-server statuses of the last
//! completed orchestration pass. Never holds a live connection.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::{ServerStatus, ToolInfo};

/// Immutable capture of one completed orchestration pass
#[derive(Debug, Clone)]
pub struct Snapshot {
    generation: u64,
    tools: HashMap<String, ToolInfo>,
    owners: HashMap<String, String>,
    statuses: HashMap<String, ServerStatus>,
}

impl Snapshot {
    /// Capture a pass produced by the registry with the given generation
    pub fn new(
        generation: u64,
        tools: HashMap<String, ToolInfo>,
        owners: HashMap<String, String>,
        statuses: HashMap<String, ServerStatus>,
    ) -> Self {
        Self {
            generation,
            tools,
            owners,
            statuses,
        }
    }

    /// Generation of the registry this snapshot was computed from
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stripped tool namespace
    pub fn tools(&self) -> &HashMap<String, ToolInfo> {
        &self.tools
    }

    /// Tool name -> owning server index
    pub fn owners(&self) -> &HashMap<String, String> {
        &self.owners
    }

    /// Per-server statuses
    pub fn statuses(&self) -> &HashMap<String, ServerStatus> {
        &self.statuses
    }
}

/// Shared, read-mostly cache of the latest snapshot
///
/// Replaced wholesale when a reconfiguration pass completes; readers hold
/// cheap `Arc` clones. Share one instance across all orchestration
/// instances in the process instead of reaching for a global.
#[derive(Default)]
pub struct SnapshotCache {
    inner: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest snapshot, if any pass completed yet
    pub fn load(&self) -> Option<Arc<Snapshot>> {
        self.inner.read().clone()
    }

    /// Latest snapshot only if it matches the given registry generation
    pub fn load_if_current(&self, generation: u64) -> Option<Arc<Snapshot>> {
        self.load().filter(|s| s.generation() == generation)
    }

    /// Replace the cached snapshot
    pub fn store(&self, snapshot: Snapshot) {
        *self.inner.write() = Some(Arc::new(snapshot));
    }

    /// Drop the cached snapshot
    pub fn invalidate(&self) {
        *self.inner.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(generation: u64) -> Snapshot {
        Snapshot::new(generation, HashMap::new(), HashMap::new(), HashMap::new())
    }

    #[test]
    fn test_empty_cache() {
        let cache = SnapshotCache::new();
        assert!(cache.load().is_none());
        assert!(cache.load_if_current(1).is_none());
    }

    #[test]
    fn test_generation_check() {
        let cache = SnapshotCache::new();
        cache.store(snapshot(3));

        assert!(cache.load_if_current(3).is_some());
        assert!(cache.load_if_current(4).is_none());
    }

    #[test]
    fn test_store_replaces_and_invalidate_clears() {
        let cache = SnapshotCache::new();
        cache.store(snapshot(1));
        cache.store(snapshot(2));
        assert_eq!(cache.load().unwrap().generation(), 2);

        cache.invalidate();
        assert!(cache.load().is_none());
    }
}
