//! Tool namespace management
//!
//! [`ToolRegistry`] merges every connected server's tools into one
//! name-keyed namespace; [`SnapshotCache`] shares the stripped side of that
//! namespace across request boundaries.

mod registry;
mod snapshot;

pub use registry::{ToolBinding, ToolRegistry};
pub use snapshot::{Snapshot, SnapshotCache};
