//! Scheduler surface traits implemented by host bindings.
//!
//! The method grid mirrors the two host models one-to-one: the classic model
//! exposes a main queue and a tick-driven background queue; the partitioned
//! model exposes global, per-region, per-entity and real-time background
//! queues. Every method returns a native task representation immediately,
//! before the work has run.

use crate::{HostError, HostResult};
use std::time::Duration;
use tickbridge_core::{Action, Coordinate, EntityId, Ticks};

/// A host's own representation of a scheduled task.
///
/// Both operations are fallible at this layer; the adapter wrapping the
/// handle swallows failures and treats them as "already not cancellable".
pub trait NativeTask: Send + Sync {
    /// Ask the host to cancel the task.
    fn cancel(&self) -> HostResult<()>;

    /// Ask the host whether the task is cancelled.
    fn is_cancelled(&self) -> HostResult<bool>;
}

/// Boxed native task returned by every scheduling call.
pub type NativeHandle = Box<dyn NativeTask>;

/// Callback fired if an entity is removed before its scheduled work runs.
pub type RetiredCallback = Box<dyn FnOnce() + Send + 'static>;

/// A scheduling call the host refused, with the action handed back so the
/// caller can decide what to do with it (the degradation policy runs it
/// inline on `Unsupported`).
pub struct Rejection {
    /// Why the host refused.
    pub error: HostError,
    /// The action that was not scheduled.
    pub action: Action,
}

impl Rejection {
    /// Pair an error with the unscheduled action.
    pub fn new(error: HostError, action: Action) -> Self {
        Self { error, action }
    }
}

impl std::fmt::Debug for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rejection")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Result of every scheduling call.
pub type SubmitResult = std::result::Result<NativeHandle, Rejection>;

/// Classic single-authority scheduler surface.
///
/// Any method may answer [`HostError::Unsupported`] on hosts that disable
/// the classic queue; the adapter layer degrades to inline execution.
pub trait AuthorityScheduler: Send + Sync {
    /// Queue on the authority thread for the next tick.
    fn run(&self, action: Action) -> SubmitResult;

    /// Queue on the authority thread after `delay` ticks.
    fn run_delayed(&self, action: Action, delay: Ticks) -> SubmitResult;

    /// Queue on the authority thread repeatedly, first after `delay` then
    /// every `period` ticks.
    fn run_repeating(&self, action: Action, delay: Ticks, period: Ticks) -> SubmitResult;

    /// Queue off-thread for the next background pass.
    fn run_background(&self, action: Action) -> SubmitResult;

    /// Queue off-thread after `delay` ticks (the classic background queue is
    /// tick-driven).
    fn run_background_delayed(&self, action: Action, delay: Ticks) -> SubmitResult;

    /// Queue off-thread repeatedly on a tick schedule.
    fn run_background_repeating(&self, action: Action, delay: Ticks, period: Ticks)
        -> SubmitResult;
}

/// Spatially-partitioned scheduler surface.
///
/// Region and entity ownership is resolved by the host fresh at every
/// dispatch of a periodic task; ownership can migrate between invocations.
pub trait PartitionedScheduler: Send + Sync {
    /// Queue on the global region (process-wide) queue.
    fn run_global(&self, action: Action) -> SubmitResult;

    /// Queue on the global region queue after `delay` ticks.
    fn run_global_delayed(&self, action: Action, delay: Ticks) -> SubmitResult;

    /// Queue on the global region queue repeatedly.
    fn run_global_repeating(&self, action: Action, delay: Ticks, period: Ticks) -> SubmitResult;

    /// Queue on the thread owning the region containing `at`.
    ///
    /// Answers [`HostError::NotReady`] when the coordinate's world is not
    /// loaded; a world unloaded between submission and dispatch drops the
    /// dispatch silently inside the host.
    fn run_at(&self, at: Coordinate, action: Action) -> SubmitResult;

    /// Delayed variant of [`PartitionedScheduler::run_at`].
    fn run_at_delayed(&self, at: Coordinate, action: Action, delay: Ticks) -> SubmitResult;

    /// Repeating variant of [`PartitionedScheduler::run_at`].
    fn run_at_repeating(
        &self,
        at: Coordinate,
        action: Action,
        delay: Ticks,
        period: Ticks,
    ) -> SubmitResult;

    /// Queue on the thread currently owning `entity`, following migrations.
    ///
    /// `retired` fires if the entity is removed before the work runs.
    /// Answers [`HostError::Retired`] when the entity is already gone at
    /// submission time.
    fn run_for(
        &self,
        entity: EntityId,
        action: Action,
        retired: Option<RetiredCallback>,
    ) -> SubmitResult;

    /// Delayed variant of [`PartitionedScheduler::run_for`].
    fn run_for_delayed(
        &self,
        entity: EntityId,
        action: Action,
        retired: Option<RetiredCallback>,
        delay: Ticks,
    ) -> SubmitResult;

    /// Repeating variant of [`PartitionedScheduler::run_for`].
    fn run_for_repeating(
        &self,
        entity: EntityId,
        action: Action,
        retired: Option<RetiredCallback>,
        delay: Ticks,
        period: Ticks,
    ) -> SubmitResult;

    /// Queue on the unaffiliated worker pool.
    fn run_background(&self, action: Action) -> SubmitResult;

    /// Queue on the worker pool after a real-time delay (this surface is not
    /// tick-driven; the adapter converts).
    fn run_background_delayed(&self, action: Action, delay: Duration) -> SubmitResult;

    /// Queue on the worker pool repeatedly on a real-time schedule.
    fn run_background_repeating(
        &self,
        action: Action,
        delay: Duration,
        period: Duration,
    ) -> SubmitResult;
}

/// What an embedding registers: the capability surface of its process.
pub trait Host: Send + Sync {
    /// Classic surface. Always present, though individual calls may be
    /// administratively disabled.
    fn authority(&self) -> &dyn AuthorityScheduler;

    /// Partitioned surface, present only on spatially-partitioned hosts.
    fn partitioned(&self) -> Option<&dyn PartitionedScheduler>;
}
