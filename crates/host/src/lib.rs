//! Host capability surface.
//!
//! An embedding registers a [`Host`] describing which scheduler surfaces its
//! process actually exposes. The adapter layer never talks to a concrete
//! host type: everything goes through the traits here, and the capability
//! detector decides once per process which execution model is live.

#![warn(missing_docs)]

// Host-side failures
mod error;

// Scheduler surface traits
mod caps;

// Runtime variant probing
mod detect;

pub use caps::{
    AuthorityScheduler, Host, NativeHandle, NativeTask, PartitionedScheduler, Rejection,
    RetiredCallback, SubmitResult,
};
pub use detect::detect;
pub use error::{HostError, HostResult};
