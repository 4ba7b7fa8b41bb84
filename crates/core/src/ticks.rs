//! Host scheduler time units.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Real-time length of one host tick.
pub const TICK: Duration = Duration::from_millis(50);

/// A duration measured in host scheduler ticks.
///
/// Tick-denominated surfaces consume this directly; real-time surfaces go
/// through [`Ticks::to_duration`]. Negative delays are unrepresentable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Ticks(pub u64);

impl Ticks {
    /// Zero ticks: run on the next scheduler pass.
    pub const ZERO: Ticks = Ticks(0);

    /// Raw tick count.
    pub fn get(self) -> u64 {
        self.0
    }

    /// True for a zero tick count.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Convert to real time at the fixed tick rate.
    pub fn to_duration(self) -> Duration {
        Duration::from_millis(self.0.saturating_mul(TICK.as_millis() as u64))
    }
}

impl From<u64> for Ticks {
    fn from(n: u64) -> Self {
        Ticks(n)
    }
}

impl std::fmt::Display for Ticks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}t", self.0)
    }
}
