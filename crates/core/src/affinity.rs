//! Work placement: which thread is allowed to execute a work item.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId(u64);

impl WorldId {
    /// Wrap a host-assigned world id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WorldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "world:{}", self.0)
    }
}

/// Opaque identifier for a live host entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a host-assigned entity id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

/// A spatial position used as a region-ownership key.
///
/// The scheduler never interprets the coordinates beyond handing them to the
/// host, which resolves the owning region fresh at every dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// World containing the position.
    pub world: WorldId,
    /// Block-granularity x.
    pub x: i64,
    /// Block-granularity y.
    pub y: i64,
    /// Block-granularity z.
    pub z: i64,
}

impl Coordinate {
    /// Build a coordinate in the given world.
    pub const fn new(world: WorldId, x: i64, y: i64, z: i64) -> Self {
        Self { world, x, y, z }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@({},{},{})", self.world, self.x, self.y, self.z)
    }
}

/// Execution-context requirement of a work item.
///
/// Entity affinity is resolved at submission time, not when the declaring
/// code was written: if the entity migrates between regions, the host follows
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Affinity {
    /// No ownership requirement.
    None,
    /// Must run on the thread owning the region containing this coordinate.
    At(Coordinate),
    /// Must run on the thread owning this live entity.
    For(EntityId),
}

impl Affinity {
    /// True when the item carries no placement requirement.
    pub fn is_none(self) -> bool {
        matches!(self, Affinity::None)
    }
}
