//! Native task representation shared by both simulated hosts.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tickbridge_host::{HostResult, NativeTask};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A scheduled simulated task.
///
/// The cancel flag is shared with the queue entry (or background thread)
/// carrying the action; dispatch checks it immediately before running, so
/// cancellation prevents any invocation that has not already started.
#[derive(Debug)]
pub struct SimTask {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl SimTask {
    /// Wrap a dispatch cancel flag.
    pub fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            cancelled,
        }
    }

    /// Host-side task id.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl NativeTask for SimTask {
    fn cancel(&self) -> HostResult<()> {
        self.cancelled.store(true, Ordering::Release);
        Ok(())
    }

    fn is_cancelled(&self) -> HostResult<bool> {
        Ok(self.cancelled.load(Ordering::Acquire))
    }
}
