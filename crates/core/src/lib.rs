//! Tickbridge core data model.
//!
//! This crate defines the types shared between the host capability surface
//! and the adapter layer: runtime variants, work affinities, tick arithmetic,
//! work items and the uniform task handle returned to callers.

#![warn(missing_docs)]

// Runtime detection result
mod variant;

// Work placement
mod affinity;

// Host time units
mod ticks;

// Unit of work
mod work;

// Caller-facing handle
mod handle;

// Submission errors
mod error;

pub use affinity::{Affinity, Coordinate, EntityId, WorldId};
pub use error::{Result, SchedError};
pub use handle::{CancelSink, TaskHandle};
pub use ticks::{Ticks, TICK};
pub use variant::{AdapterKind, RuntimeVariant};
pub use work::{Action, WorkItem};
