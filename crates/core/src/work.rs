//! The unit of work submitted to the scheduler.

use crate::{Affinity, Coordinate, EntityId, Result, SchedError, Ticks};

/// The callable carried by a work item.
///
/// `FnMut` because repeating tasks are invoked once per period until
/// cancelled; one-shot tasks call it exactly once.
pub type Action = Box<dyn FnMut() + Send + 'static>;

/// A unit of work: an action, a placement requirement and optional timing.
///
/// Created by any caller, consumed exactly once by an adapter, never
/// persisted.
pub struct WorkItem {
    action: Action,
    affinity: Affinity,
    delay: Ticks,
    period: Option<Ticks>,
}

impl WorkItem {
    /// Wrap an action with no placement requirement and no delay.
    pub fn new(action: impl FnMut() + Send + 'static) -> Self {
        Self {
            action: Box::new(action),
            affinity: Affinity::None,
            delay: Ticks::ZERO,
            period: None,
        }
    }

    /// Bind the item to the region owning `coordinate`.
    pub fn at(mut self, coordinate: Coordinate) -> Self {
        self.affinity = Affinity::At(coordinate);
        self
    }

    /// Bind the item to a live entity, following it across migrations.
    pub fn bound_to(mut self, entity: EntityId) -> Self {
        self.affinity = Affinity::For(entity);
        self
    }

    /// Delay the first invocation by `delay` ticks.
    pub fn after(mut self, delay: Ticks) -> Self {
        self.delay = delay;
        self
    }

    /// Run repeatedly: first invocation after `delay`, then every `period`.
    pub fn every(mut self, delay: Ticks, period: Ticks) -> Self {
        self.delay = delay;
        self.period = Some(period);
        self
    }

    /// Declared placement requirement.
    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    /// Initial delay in ticks.
    pub fn delay(&self) -> Ticks {
        self.delay
    }

    /// Repeat period, if this is a repeating item.
    pub fn period(&self) -> Option<Ticks> {
        self.period
    }

    /// Reject programming errors at submission time.
    pub fn validate(&self) -> Result<()> {
        if self.period == Some(Ticks::ZERO) {
            return Err(SchedError::ZeroPeriod);
        }
        Ok(())
    }

    /// Decompose for dispatch.
    pub fn into_parts(self) -> (Action, Affinity, Ticks, Option<Ticks>) {
        (self.action, self.affinity, self.delay, self.period)
    }
}

impl std::fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkItem")
            .field("affinity", &self.affinity)
            .field("delay", &self.delay)
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}
