//! Execution context classification.

use tickbridge_core::{AdapterKind, Affinity, RuntimeVariant};

/// Map a work item's affinity to the adapter that must run it.
///
/// Pure and total. `authority` says whether an affinity-free item asked for
/// the authority thread (the `schedule_now` family) or the worker pool (the
/// `schedule_background` family). Under the single-authority variant there
/// are no separate regions or entity threads, so spatial and entity
/// affinities collapse onto the global adapter.
pub fn classify(variant: RuntimeVariant, affinity: Affinity, authority: bool) -> AdapterKind {
    match affinity {
        Affinity::None => {
            if authority {
                AdapterKind::Global
            } else {
                AdapterKind::Background
            }
        }
        Affinity::At(_) => {
            if variant.is_partitioned() {
                AdapterKind::Spatial
            } else {
                AdapterKind::Global
            }
        }
        Affinity::For(_) => {
            if variant.is_partitioned() {
                AdapterKind::Entity
            } else {
                AdapterKind::Global
            }
        }
    }
}
