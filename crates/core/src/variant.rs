//! Runtime variant and adapter classification results.

use serde::{Deserialize, Serialize};

/// Which host execution model is live for this process.
///
/// Determined once at first use and immutable afterward: the variant tracks
/// an external host property that cannot change while the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuntimeVariant {
    /// One logical thread owns all mutable world state.
    SingleAuthority,
    /// The world is split into regions, each owned by a thread at a time;
    /// ownership can migrate at runtime.
    SpatiallyPartitioned,
}

impl RuntimeVariant {
    /// True for the spatially-partitioned model.
    pub fn is_partitioned(self) -> bool {
        matches!(self, RuntimeVariant::SpatiallyPartitioned)
    }
}

impl std::fmt::Display for RuntimeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeVariant::SingleAuthority => write!(f, "single-authority"),
            RuntimeVariant::SpatiallyPartitioned => write!(f, "spatially-partitioned"),
        }
    }
}

/// Which executor adapter a work item is dispatched through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdapterKind {
    /// The single logical authority thread (global queue under partitioning).
    Global,
    /// The thread owning the region containing a coordinate.
    Spatial,
    /// The thread owning a specific live entity.
    Entity,
    /// Off-thread pool with no ownership requirement.
    Background,
}

impl AdapterKind {
    /// Stable label used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            AdapterKind::Global => "global",
            AdapterKind::Spatial => "spatial",
            AdapterKind::Entity => "entity",
            AdapterKind::Background => "background",
        }
    }

    /// Dense index, used to key per-adapter one-shot diagnostics.
    pub fn index(self) -> usize {
        match self {
            AdapterKind::Global => 0,
            AdapterKind::Spatial => 1,
            AdapterKind::Entity => 2,
            AdapterKind::Background => 3,
        }
    }
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
