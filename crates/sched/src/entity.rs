//! Entity adapter: the thread owning a specific live entity.

use crate::global;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tickbridge_core::{Action, EntityId, RuntimeVariant, Ticks};
use tickbridge_host::{Host, NativeHandle, Rejection};

/// Queue work bound to a live entity, following it across migrations.
///
/// Returns the native task together with a cancel flag the caller shares
/// with the handle: the host fires the retired callback if the entity is
/// removed before the work runs, marking the handle cancelled. Under the
/// single-authority variant this degenerates to the global adapter and the
/// flag is never set by the host.
pub(crate) fn submit(
    host: &dyn Host,
    variant: RuntimeVariant,
    entity: EntityId,
    action: Action,
    delay: Ticks,
    period: Option<Ticks>,
) -> Result<(NativeHandle, Arc<AtomicBool>), Rejection> {
    let flag = Arc::new(AtomicBool::new(false));

    if variant.is_partitioned() {
        if let Some(partitioned) = host.partitioned() {
            let mark = {
                let flag = Arc::clone(&flag);
                Box::new(move || flag.store(true, Ordering::Release))
            };
            let native = match period {
                Some(period) => {
                    partitioned.run_for_repeating(entity, action, Some(mark), delay, period)
                }
                None if delay.is_zero() => partitioned.run_for(entity, action, Some(mark)),
                None => partitioned.run_for_delayed(entity, action, Some(mark), delay),
            }?;
            return Ok((native, flag));
        }
    }
    let native = global::submit(host, variant, action, delay, period)?;
    Ok((native, flag))
}
