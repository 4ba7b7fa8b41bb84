//! Simulated single-authority host.

use crate::pool::BackgroundPool;
use crate::task::SimTask;
use crate::worker::TickWorker;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::ThreadId;
use std::time::Duration;
use tickbridge_core::{Action, Ticks};
use tickbridge_host::{
    AuthorityScheduler, Host, HostError, PartitionedScheduler, Rejection, SubmitResult,
};

struct Inner {
    worker: TickWorker,
    pool: BackgroundPool,
    tick: Duration,
    deny_classic: bool,
}

/// Classic host: one authority tick loop plus a tick-driven background
/// pool.
///
/// With `deny_classic` every surface answers `Unsupported`, simulating a
/// host that administratively forces all scheduling elsewhere: the
/// degradation-policy scenario.
#[derive(Clone)]
pub struct SimAuthorityHost {
    inner: Arc<Inner>,
}

impl SimAuthorityHost {
    /// Host ticking at the standard 50 ms rate.
    pub fn new() -> Self {
        Self::with_tick(tickbridge_core::TICK)
    }

    /// Host with a custom tick length (tests run millisecond ticks).
    pub fn with_tick(tick: Duration) -> Self {
        Self::build(tick, false)
    }

    /// Host whose entire classic surface is administratively disabled.
    pub fn denying(tick: Duration) -> Self {
        Self::build(tick, true)
    }

    fn build(tick: Duration, deny_classic: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                worker: TickWorker::spawn("sim-authority".into(), tick),
                pool: BackgroundPool::new(),
                tick,
                deny_classic,
            }),
        }
    }

    /// Id of the authority thread, for execution-placement assertions.
    pub fn authority_thread_id(&self) -> ThreadId {
        self.inner.worker.thread_id()
    }

    /// Stop the authority loop and the background pool.
    pub fn shutdown(&self) {
        self.inner.worker.shutdown();
        self.inner.pool.shutdown();
    }

    fn deny(&self, surface: &'static str, action: Action) -> SubmitResult {
        debug_assert!(self.inner.deny_classic);
        Err(Rejection::new(HostError::Unsupported(surface), action))
    }

    fn queue(&self, action: Action, delay: Ticks, period: Option<Ticks>) -> SubmitResult {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.inner.worker.submit(
            action,
            delay.get(),
            period.map(Ticks::get),
            Arc::clone(&cancelled),
        );
        Ok(Box::new(SimTask::new(cancelled)))
    }

    fn queue_background(
        &self,
        action: Action,
        delay: Ticks,
        period: Option<Ticks>,
    ) -> SubmitResult {
        let cancelled = Arc::new(AtomicBool::new(false));
        // The classic background queue is tick-driven: convert at this
        // host's own tick length.
        let to_real = |t: Ticks| {
            self.inner
                .tick
                .saturating_mul(t.get().min(u32::MAX as u64) as u32)
        };
        self.inner.pool.submit(
            action,
            to_real(delay),
            period.map(to_real),
            Arc::clone(&cancelled),
        );
        Ok(Box::new(SimTask::new(cancelled)))
    }
}

impl Default for SimAuthorityHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorityScheduler for SimAuthorityHost {
    fn run(&self, action: Action) -> SubmitResult {
        if self.inner.deny_classic {
            return self.deny("main thread queue", action);
        }
        self.queue(action, Ticks::ZERO, None)
    }

    fn run_delayed(&self, action: Action, delay: Ticks) -> SubmitResult {
        if self.inner.deny_classic {
            return self.deny("main thread queue", action);
        }
        self.queue(action, delay, None)
    }

    fn run_repeating(&self, action: Action, delay: Ticks, period: Ticks) -> SubmitResult {
        if self.inner.deny_classic {
            return self.deny("main thread queue", action);
        }
        self.queue(action, delay, Some(period))
    }

    fn run_background(&self, action: Action) -> SubmitResult {
        if self.inner.deny_classic {
            return self.deny("background queue", action);
        }
        self.queue_background(action, Ticks::ZERO, None)
    }

    fn run_background_delayed(&self, action: Action, delay: Ticks) -> SubmitResult {
        if self.inner.deny_classic {
            return self.deny("background queue", action);
        }
        self.queue_background(action, delay, None)
    }

    fn run_background_repeating(
        &self,
        action: Action,
        delay: Ticks,
        period: Ticks,
    ) -> SubmitResult {
        if self.inner.deny_classic {
            return self.deny("background queue", action);
        }
        self.queue_background(action, delay, Some(period))
    }
}

impl Host for SimAuthorityHost {
    fn authority(&self) -> &dyn AuthorityScheduler {
        self
    }

    fn partitioned(&self) -> Option<&dyn PartitionedScheduler> {
        None
    }
}
