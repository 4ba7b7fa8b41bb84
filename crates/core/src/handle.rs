//! The uniform cancellable handle returned for every submission.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Cancellation backend behind a [`TaskHandle`].
///
/// Implemented over each host's native task representation. Both operations
/// are infallible from the handle's point of view: a backend that cannot
/// cancel reports `false` rather than erroring.
pub trait CancelSink: Send + Sync {
    /// Best-effort cancel. `false` means the task was not cancellable.
    fn cancel(&self) -> bool;

    /// Whether the underlying task reports itself cancelled.
    fn is_cancelled(&self) -> bool;
}

/// Caller-facing reference to a submitted, possibly still-pending unit of
/// work.
///
/// One handle shape covers every outcome: an asynchronously scheduled task,
/// a degraded submission that already ran inline (`is_synchronous`), and a
/// submission refused by a stale affinity (born cancelled). Cancellation is
/// idempotent; cancelling twice is a no-op, never an error.
#[derive(Clone)]
pub struct TaskHandle {
    id: u64,
    synchronous: bool,
    completed: bool,
    cancelled: Arc<AtomicBool>,
    sink: Option<Arc<dyn CancelSink>>,
}

impl TaskHandle {
    /// Wrap a native host task.
    pub fn wrapping(sink: Arc<dyn CancelSink>) -> Self {
        Self::wrapping_with_flag(sink, Arc::new(AtomicBool::new(false)))
    }

    /// Wrap a native host task around an externally created cancel flag.
    ///
    /// Used when a host-side callback (entity retired) must be able to mark
    /// the handle cancelled: the flag is created first, moved into the
    /// callback, and shared with the handle built here.
    pub fn wrapping_with_flag(sink: Arc<dyn CancelSink>, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            synchronous: false,
            completed: false,
            cancelled,
            sink: Some(sink),
        }
    }

    /// Handle for work that already ran synchronously on the calling thread.
    ///
    /// Reports complete and not cancellable; `cancel` is a no-op.
    pub fn completed() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            synchronous: true,
            completed: true,
            cancelled: Arc::new(AtomicBool::new(false)),
            sink: None,
        }
    }

    /// Handle for a submission whose target was already gone.
    ///
    /// Born cancelled; the action never runs.
    pub fn retired() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            synchronous: false,
            completed: false,
            cancelled: Arc::new(AtomicBool::new(true)),
            sink: None,
        }
    }

    /// Opaque process-unique id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True when the work already ran inline during submission.
    pub fn is_synchronous(&self) -> bool {
        self.synchronous
    }

    /// Whether the task is cancelled, consulting the native task if present.
    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::Acquire) {
            return true;
        }
        self.sink.as_deref().is_some_and(CancelSink::is_cancelled)
    }

    /// Cancel the task. Idempotent, never errors.
    ///
    /// Prevents future invocations of a repeating task and marks a not yet
    /// started one-shot as cancelled; an invocation already in progress
    /// cannot be interrupted. A native backend that refuses to cancel is
    /// treated as already not cancellable.
    pub fn cancel(&self) {
        if self.completed {
            return;
        }
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(sink) = &self.sink {
            if !sink.cancel() {
                debug!(id = self.id, "native task refused cancellation");
            }
        }
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("synchronous", &self.synchronous)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
