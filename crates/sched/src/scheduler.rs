//! Public scheduling facade.

use crate::{
    background, classify, degrade, entity, global as global_adapter, native::NativeSink, spatial,
};
use std::sync::{Arc, Once, OnceLock};
use tickbridge_core::{
    Action, AdapterKind, Affinity, Result, RuntimeVariant, SchedError, TaskHandle, Ticks, WorkItem,
};
use tickbridge_host::{detect, Host};
use tracing::{debug, info, warn};

/// The compatibility scheduler.
///
/// Owns the host binding and the runtime variant detected from it. All
/// `schedule_*` methods return a [`TaskHandle`] immediately; the work runs
/// later on the adapter-selected thread, except when degradation ran it
/// inline (observable via [`TaskHandle::is_synchronous`]).
pub struct Scheduler {
    host: Arc<dyn Host>,
    variant: RuntimeVariant,
}

impl Scheduler {
    /// Build a scheduler over a host binding, detecting its variant.
    pub fn new(host: Arc<dyn Host>) -> Self {
        let variant = detect(&*host);
        info!(%variant, "scheduler initialized");
        Self { host, variant }
    }

    /// The execution model this process runs under.
    pub fn variant(&self) -> RuntimeVariant {
        self.variant
    }

    /// True under the spatially-partitioned model. Collaborators use this to
    /// choose between a synchronous fast path and an async-safe path before
    /// touching world state directly.
    pub fn is_partitioned(&self) -> bool {
        self.variant.is_partitioned()
    }

    /// Submit a work item. `Affinity::None` items target the authority
    /// thread; use the `schedule_background` family for pool work.
    pub fn submit(&self, item: WorkItem) -> Result<TaskHandle> {
        item.validate()?;
        let (action, affinity, delay, period) = item.into_parts();
        Ok(self.dispatch(affinity, true, action, delay, period))
    }

    /// Run `action` on its affinity's thread as soon as possible.
    pub fn schedule_now(
        &self,
        affinity: Affinity,
        action: impl FnMut() + Send + 'static,
    ) -> TaskHandle {
        self.dispatch(affinity, true, Box::new(action), Ticks::ZERO, None)
    }

    /// Run `action` on its affinity's thread after `delay` ticks.
    pub fn schedule_delayed(
        &self,
        affinity: Affinity,
        action: impl FnMut() + Send + 'static,
        delay: Ticks,
    ) -> TaskHandle {
        self.dispatch(affinity, true, Box::new(action), delay, None)
    }

    /// Run `action` repeatedly on its affinity's thread: first after
    /// `delay`, then every `period` ticks until cancelled.
    pub fn schedule_repeating(
        &self,
        affinity: Affinity,
        action: impl FnMut() + Send + 'static,
        delay: Ticks,
        period: Ticks,
    ) -> Result<TaskHandle> {
        if period.is_zero() {
            return Err(SchedError::ZeroPeriod);
        }
        Ok(self.dispatch(affinity, true, Box::new(action), delay, Some(period)))
    }

    /// Run `action` on the worker pool, off any affinity thread.
    pub fn schedule_background(&self, action: impl FnMut() + Send + 'static) -> TaskHandle {
        self.dispatch(Affinity::None, false, Box::new(action), Ticks::ZERO, None)
    }

    /// Run `action` on the worker pool after `delay` ticks.
    pub fn schedule_background_delayed(
        &self,
        action: impl FnMut() + Send + 'static,
        delay: Ticks,
    ) -> TaskHandle {
        self.dispatch(Affinity::None, false, Box::new(action), delay, None)
    }

    /// Run `action` repeatedly on the worker pool until cancelled.
    pub fn schedule_background_repeating(
        &self,
        action: impl FnMut() + Send + 'static,
        delay: Ticks,
        period: Ticks,
    ) -> Result<TaskHandle> {
        if period.is_zero() {
            return Err(SchedError::ZeroPeriod);
        }
        Ok(self.dispatch(Affinity::None, false, Box::new(action), delay, Some(period)))
    }

    fn dispatch(
        &self,
        affinity: Affinity,
        authority_request: bool,
        action: Action,
        delay: Ticks,
        period: Option<Ticks>,
    ) -> TaskHandle {
        let kind = classify(self.variant, affinity, authority_request);
        debug!(adapter = %kind, ?affinity, %delay, ?period, "dispatching work item");
        let host = &*self.host;

        let result = match (kind, affinity) {
            (AdapterKind::Spatial, Affinity::At(at)) => {
                spatial::submit(host, self.variant, at, action, delay, period)
            }
            (AdapterKind::Entity, Affinity::For(id)) => {
                return match entity::submit(host, self.variant, id, action, delay, period) {
                    Ok((task, flag)) => {
                        TaskHandle::wrapping_with_flag(Arc::new(NativeSink::new(task)), flag)
                    }
                    Err(rejection) => degrade::resolve(kind, rejection),
                };
            }
            (AdapterKind::Background, _) => {
                background::submit(host, self.variant, action, delay, period)
            }
            _ => global_adapter::submit(host, self.variant, action, delay, period),
        };

        match result {
            Ok(task) => TaskHandle::wrapping(Arc::new(NativeSink::new(task))),
            Err(rejection) => degrade::resolve(kind, rejection),
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

static GLOBAL: OnceLock<Scheduler> = OnceLock::new();
static NO_HOST: Once = Once::new();

/// Install the process-wide scheduler over a host binding.
///
/// The first call wins and fixes the runtime variant for the process
/// lifetime; later calls return the existing instance.
pub fn install(host: Arc<dyn Host>) -> &'static Scheduler {
    GLOBAL.get_or_init(|| Scheduler::new(host))
}

/// The process-wide scheduler, if one was installed.
pub fn global() -> Option<&'static Scheduler> {
    GLOBAL.get()
}

/// True when the process runs under the spatially-partitioned model.
/// Conservatively false before a host is installed.
pub fn is_partitioned_runtime() -> bool {
    global().is_some_and(Scheduler::is_partitioned)
}

fn inline(mut action: Action) -> TaskHandle {
    NO_HOST.call_once(|| {
        warn!("no scheduler host installed, running work inline");
    });
    action();
    TaskHandle::completed()
}

/// Process-global [`Scheduler::schedule_now`]. Degrades to inline execution
/// when no host is installed.
pub fn schedule_now(affinity: Affinity, action: impl FnMut() + Send + 'static) -> TaskHandle {
    match global() {
        Some(scheduler) => scheduler.schedule_now(affinity, action),
        None => inline(Box::new(action)),
    }
}

/// Process-global [`Scheduler::schedule_delayed`].
pub fn schedule_delayed(
    affinity: Affinity,
    action: impl FnMut() + Send + 'static,
    delay: Ticks,
) -> TaskHandle {
    match global() {
        Some(scheduler) => scheduler.schedule_delayed(affinity, action, delay),
        None => inline(Box::new(action)),
    }
}

/// Process-global [`Scheduler::schedule_repeating`].
pub fn schedule_repeating(
    affinity: Affinity,
    action: impl FnMut() + Send + 'static,
    delay: Ticks,
    period: Ticks,
) -> Result<TaskHandle> {
    if period.is_zero() {
        return Err(SchedError::ZeroPeriod);
    }
    match global() {
        Some(scheduler) => scheduler.schedule_repeating(affinity, action, delay, period),
        None => Ok(inline(Box::new(action))),
    }
}

/// Process-global [`Scheduler::schedule_background`].
pub fn schedule_background(action: impl FnMut() + Send + 'static) -> TaskHandle {
    match global() {
        Some(scheduler) => scheduler.schedule_background(action),
        None => inline(Box::new(action)),
    }
}

/// Process-global [`Scheduler::schedule_background_delayed`].
pub fn schedule_background_delayed(
    action: impl FnMut() + Send + 'static,
    delay: Ticks,
) -> TaskHandle {
    match global() {
        Some(scheduler) => scheduler.schedule_background_delayed(action, delay),
        None => inline(Box::new(action)),
    }
}

/// Process-global [`Scheduler::schedule_background_repeating`].
pub fn schedule_background_repeating(
    action: impl FnMut() + Send + 'static,
    delay: Ticks,
    period: Ticks,
) -> Result<TaskHandle> {
    if period.is_zero() {
        return Err(SchedError::ZeroPeriod);
    }
    match global() {
        Some(scheduler) => scheduler.schedule_background_repeating(action, delay, period),
        None => Ok(inline(Box::new(action))),
    }
}
