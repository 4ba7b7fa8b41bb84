//! Simulated host substrates.
//!
//! In-process implementations of both execution models, used by the
//! integration tests and the demo binary. [`SimAuthorityHost`] runs one
//! authority tick loop plus a tick-driven background pool;
//! [`SimPartitionedHost`] runs a global queue, region-owned tick loops with
//! migratable ownership, an entity registry and a real-time background
//! pool. These are test substrates with faithful dispatch semantics, not
//! production schedulers.

#![warn(missing_docs)]

// Native task representation
mod task;

// Tick-loop thread
mod worker;

// Unaffiliated worker threads
mod pool;

// The two host bindings
mod authority;
mod partitioned;

pub use authority::SimAuthorityHost;
pub use partitioned::SimPartitionedHost;
pub use task::SimTask;
