//! Runtime variant detection.

use crate::Host;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tickbridge_core::RuntimeVariant;
use tracing::debug;

/// Determine which execution model the host exposes.
///
/// Never fails: a probe that panics or is inconclusive resolves to the
/// conservative [`RuntimeVariant::SingleAuthority`]. Safe from any thread
/// and before any world data is loaded, since only the declared capability
/// surface is inspected.
pub fn detect(host: &dyn Host) -> RuntimeVariant {
    let variant = match catch_unwind(AssertUnwindSafe(|| host.partitioned().is_some())) {
        Ok(true) => RuntimeVariant::SpatiallyPartitioned,
        Ok(false) => RuntimeVariant::SingleAuthority,
        Err(_) => {
            debug!("partitioned capability probe panicked, assuming single-authority");
            RuntimeVariant::SingleAuthority
        }
    };
    debug!(%variant, "host capability detected");
    variant
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AuthorityScheduler, HostError, PartitionedScheduler, Rejection, SubmitResult,
    };
    use tickbridge_core::{Action, Ticks};

    struct DeniedAuthority;

    fn denied(surface: &'static str, action: Action) -> SubmitResult {
        Err(Rejection::new(HostError::Unsupported(surface), action))
    }

    impl AuthorityScheduler for DeniedAuthority {
        fn run(&self, action: Action) -> SubmitResult {
            denied("classic queue", action)
        }
        fn run_delayed(&self, action: Action, _delay: Ticks) -> SubmitResult {
            denied("classic queue", action)
        }
        fn run_repeating(&self, action: Action, _delay: Ticks, _period: Ticks) -> SubmitResult {
            denied("classic queue", action)
        }
        fn run_background(&self, action: Action) -> SubmitResult {
            denied("classic background queue", action)
        }
        fn run_background_delayed(&self, action: Action, _delay: Ticks) -> SubmitResult {
            denied("classic background queue", action)
        }
        fn run_background_repeating(
            &self,
            action: Action,
            _delay: Ticks,
            _period: Ticks,
        ) -> SubmitResult {
            denied("classic background queue", action)
        }
    }

    struct ClassicOnly;

    impl Host for ClassicOnly {
        fn authority(&self) -> &dyn AuthorityScheduler {
            &DeniedAuthority
        }
        fn partitioned(&self) -> Option<&dyn PartitionedScheduler> {
            None
        }
    }

    struct PanickingProbe;

    impl Host for PanickingProbe {
        fn authority(&self) -> &dyn AuthorityScheduler {
            &DeniedAuthority
        }
        fn partitioned(&self) -> Option<&dyn PartitionedScheduler> {
            panic!("capability surface half-initialized")
        }
    }

    #[test]
    fn test_classic_host_detected() {
        assert_eq!(detect(&ClassicOnly), RuntimeVariant::SingleAuthority);
    }

    #[test]
    fn test_panicking_probe_falls_back() {
        assert_eq!(detect(&PanickingProbe), RuntimeVariant::SingleAuthority);
    }
}
