//! Tickbridge adapter layer.
//!
//! Callers submit [`WorkItem`]s (or use the `schedule_*` convenience
//! surface) without knowing which host execution model is live. The
//! classifier picks an executor adapter from the item's affinity, the
//! adapter routes it to the matching host queue, and a uniform
//! [`TaskHandle`] comes back immediately in every case, including when the
//! host surface is disabled and the work degraded to inline execution.
//!
//! [`WorkItem`]: tickbridge_core::WorkItem
//! [`TaskHandle`]: tickbridge_core::TaskHandle

#![warn(missing_docs)]

// Affinity -> adapter mapping
mod classify;

// Executor adapters
mod background;
mod entity;
mod global;
mod spatial;

// Unsupported-surface fallback
mod degrade;

// Native task wrapping
mod native;

// Public facade and process-global instance
mod scheduler;

pub use classify::classify;
pub use scheduler::{
    global, install, is_partitioned_runtime, schedule_background,
    schedule_background_delayed, schedule_background_repeating, schedule_delayed, schedule_now,
    schedule_repeating, Scheduler,
};
