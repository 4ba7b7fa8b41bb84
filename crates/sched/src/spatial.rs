//! Spatial adapter: the thread owning the region containing a coordinate.

use crate::global;
use tickbridge_core::{Action, Coordinate, RuntimeVariant, Ticks};
use tickbridge_host::{Host, SubmitResult};

/// Queue work on the coordinate's current owning thread.
///
/// The host re-resolves ownership at every dispatch of a periodic task, so
/// the work follows the region across migrations. Under the single-authority
/// variant there is only one region and this degenerates to the global
/// adapter.
pub(crate) fn submit(
    host: &dyn Host,
    variant: RuntimeVariant,
    at: Coordinate,
    action: Action,
    delay: Ticks,
    period: Option<Ticks>,
) -> SubmitResult {
    if variant.is_partitioned() {
        if let Some(partitioned) = host.partitioned() {
            return match period {
                Some(period) => partitioned.run_at_repeating(at, action, delay, period),
                None if delay.is_zero() => partitioned.run_at(at, action),
                None => partitioned.run_at_delayed(at, action, delay),
            };
        }
    }
    global::submit(host, variant, action, delay, period)
}
