//! Global adapter: the single logical authority thread.

use tickbridge_core::{Action, RuntimeVariant, Ticks};
use tickbridge_host::{Host, SubmitResult};

/// Queue work on the authority thread, whichever model provides it.
///
/// Under the partitioned variant this is the host's process-wide global
/// queue (the work runs on whichever thread holds the global lock); under
/// the classic variant it is the conventional main-thread queue. Also the
/// landing spot for spatial and entity work when there is only one region.
pub(crate) fn submit(
    host: &dyn Host,
    variant: RuntimeVariant,
    action: Action,
    delay: Ticks,
    period: Option<Ticks>,
) -> SubmitResult {
    if variant.is_partitioned() {
        if let Some(partitioned) = host.partitioned() {
            return match period {
                Some(period) => partitioned.run_global_repeating(action, delay, period),
                None if delay.is_zero() => partitioned.run_global(action),
                None => partitioned.run_global_delayed(action, delay),
            };
        }
    }
    let authority = host.authority();
    match period {
        Some(period) => authority.run_repeating(action, delay, period),
        None if delay.is_zero() => authority.run(action),
        None => authority.run_delayed(action, delay),
    }
}
