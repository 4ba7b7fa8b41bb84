//! A tick-loop thread draining a due-ordered queue.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};
use tickbridge_core::Action;
use tracing::trace;

/// A queued invocation. Ordered by (due tick, submission sequence) so that
/// entries due on the same tick run in submission order.
struct Entry {
    due: u64,
    seq: u64,
    action: Action,
    period: Option<u64>,
    cancelled: Arc<AtomicBool>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap and we want the earliest entry on
    // top.
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct QueueState {
    heap: BinaryHeap<Entry>,
    seq: u64,
    now: u64,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    cv: Condvar,
    tick: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One scheduler thread advancing a monotonic tick counter and running the
/// entries that come due, FIFO within a tick. Periodic entries re-arm
/// themselves on the same queue.
pub(crate) struct TickWorker {
    shared: Arc<Shared>,
    thread: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl TickWorker {
    pub(crate) fn spawn(name: String, tick: Duration) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                seq: 0,
                now: 0,
                shutdown: false,
            }),
            cv: Condvar::new(),
            tick,
        });
        let loop_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || run_loop(&loop_shared))
            .expect("failed to spawn tick worker");
        let thread_id = handle.thread().id();
        Self {
            shared,
            thread: Mutex::new(Some(handle)),
            thread_id,
        }
    }

    /// Queue an invocation `delay` ticks from now; `period` re-arms it after
    /// each run. Submissions after shutdown are dropped.
    pub(crate) fn submit(
        &self,
        action: Action,
        delay: u64,
        period: Option<u64>,
        cancelled: Arc<AtomicBool>,
    ) {
        let mut st = self.shared.lock();
        if st.shutdown {
            return;
        }
        let entry = Entry {
            due: st.now + delay,
            seq: st.seq,
            action,
            period,
            cancelled,
        };
        st.seq += 1;
        st.heap.push(entry);
    }

    /// Id of the thread this worker runs its entries on.
    pub(crate) fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Stop the loop and join the thread. Pending entries never run.
    pub(crate) fn shutdown(&self) {
        {
            let mut st = self.shared.lock();
            st.shutdown = true;
        }
        self.shared.cv.notify_all();
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Drop for TickWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(shared: &Shared) {
    let mut next = Instant::now() + shared.tick;
    loop {
        let batch = {
            let mut st = shared.lock();
            loop {
                if st.shutdown {
                    return;
                }
                let now = Instant::now();
                if now >= next {
                    break;
                }
                let (guard, _) = shared
                    .cv
                    .wait_timeout(st, next - now)
                    .unwrap_or_else(PoisonError::into_inner);
                st = guard;
            }
            st.now += 1;
            let tick = st.now;
            let mut batch = Vec::new();
            while st.heap.peek().is_some_and(|e| e.due <= tick) {
                batch.push(st.heap.pop().expect("peeked entry missing"));
            }
            batch
        };

        for mut entry in batch {
            if entry.cancelled.load(Ordering::Acquire) {
                trace!(seq = entry.seq, "skipping cancelled entry");
                continue;
            }
            (entry.action)();
            if let Some(period) = entry.period {
                if !entry.cancelled.load(Ordering::Acquire) {
                    let mut st = shared.lock();
                    if st.shutdown {
                        return;
                    }
                    entry.due = st.now + period;
                    entry.seq = st.seq;
                    st.seq += 1;
                    st.heap.push(entry);
                }
            }
        }
        next += shared.tick;
    }
}
