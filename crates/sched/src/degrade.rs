//! Degradation policy for refused host calls.

use std::sync::Once;
use tickbridge_core::{AdapterKind, TaskHandle};
use tickbridge_host::{HostError, Rejection};
use tracing::{debug, warn};

static WARNED: [Once; 4] = [Once::new(), Once::new(), Once::new(), Once::new()];

/// Turn a host rejection into the caller-facing handle. Never fails.
///
/// An unsupported surface degrades to synchronous inline execution on the
/// calling thread: warn once per adapter kind, run the action, answer with
/// an already-complete handle. Stale affinities (world unloaded, entity
/// removed) are expected races and answer with a from-birth-cancelled
/// handle; the action is dropped without running.
pub(crate) fn resolve(kind: AdapterKind, rejection: Rejection) -> TaskHandle {
    let Rejection { error, action } = rejection;
    match error {
        HostError::Unsupported(surface) => {
            WARNED[kind.index()].call_once(|| {
                warn!(
                    adapter = %kind,
                    surface,
                    "host scheduler surface unsupported, degrading to inline execution"
                );
            });
            let mut action = action;
            action();
            TaskHandle::completed()
        }
        HostError::NotReady => {
            debug!(adapter = %kind, "target world not loaded, dropping submission");
            TaskHandle::retired()
        }
        HostError::Retired => {
            debug!(adapter = %kind, "target entity already removed, dropping submission");
            TaskHandle::retired()
        }
    }
}
