//! Simulation time keeping.

use std::time::Duration;

/// Tracks the duration of the latest tick and the total simulated time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimulationClock {
    elapsed: Duration,
    total: Duration,
}

impl SimulationClock {
    /// Creates a clock at time zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            total: Duration::ZERO,
        }
    }

    /// Records a tick of length `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = dt;
        self.total = self.total.saturating_add(dt);
    }

    /// Duration of the latest tick.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total simulated time.
    #[must_use]
    pub const fn total(&self) -> Duration {
        self.total
    }
}
