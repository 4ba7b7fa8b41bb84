//! Background adapter: work with no ownership requirement.

use tickbridge_core::{Action, RuntimeVariant, Ticks};
use tickbridge_host::{Host, SubmitResult};

/// Queue work on the unaffiliated worker pool.
///
/// The partitioned variant's pool is real-time denominated, so the
/// tick-based delay and period are converted here; the classic variant's
/// background queue takes ticks directly.
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
                Some(period) => partitioned.run_background_repeating(
                    action,
                    delay.to_duration(),
                    period.to_duration(),
                ),
                None if delay.is_zero() => partitioned.run_background(action),
                None => partitioned.run_background_delayed(action, delay.to_duration()),
            };
        }
    }
    let authority = host.authority();
    match period {
        Some(period) => authority.run_background_repeating(action, delay, period),
        None if delay.is_zero() => authority.run_background(action),
        None => authority.run_background_delayed(action, delay),
    }
}
