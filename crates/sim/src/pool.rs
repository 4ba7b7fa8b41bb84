//! Unaffiliated worker threads for background submissions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tickbridge_core::Action;

const SLEEP_SLICE: Duration = Duration::from_millis(2);

/// One detached thread per background submission.
///
/// Delays sleep in short slices so cancellation and shutdown are observed
/// promptly; the flag is checked once more immediately before each
/// invocation.
pub(crate) struct BackgroundPool {
    shutdown: Arc<AtomicBool>,
}

impl BackgroundPool {
    pub(crate) fn new() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn submit(
        &self,
        mut action: Action,
        delay: Duration,
        period: Option<Duration>,
        cancelled: Arc<AtomicBool>,
    ) {
        let shutdown = Arc::clone(&self.shutdown);
        let spawned = thread::Builder::new()
            .name("tickbridge-background".into())
            .spawn(move || {
                if !sleep_unless(delay, &shutdown, &cancelled) {
                    return;
                }
                loop {
                    if shutdown.load(Ordering::Acquire) || cancelled.load(Ordering::Acquire) {
                        return;
                    }
                    action();
                    match period {
                        None => return,
                        Some(period) => {
                            if !sleep_unless(period, &shutdown, &cancelled) {
                                return;
                            }
                        }
                    }
                }
            });
        if spawned.is_err() {
            // Thread limit hit; background work is best-effort in the sim.
            tracing::warn!("failed to spawn background worker");
        }
    }

    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }
}

impl Drop for BackgroundPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sleep for `total`, waking early if either flag is set. Returns false when
/// interrupted.
fn sleep_unless(total: Duration, shutdown: &AtomicBool, cancelled: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if shutdown.load(Ordering::Acquire) || cancelled.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}
