//! Cooperative request throttle
//!
//! Spaces consecutive requests of one client by a minimum interval. Callers
//! queue for the next free slot instead of being rejected, so a burst of
//! concurrent fetches against one exchange drains at the exchange's pace.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Per-client request spacer
#[derive(Debug)]
pub struct Throttle {
    /// Minimum gap between two request starts
    min_interval: Duration,
    /// Earliest instant the next request may start
    next_slot: Mutex<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// A throttle that never waits
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Reserve the next slot and wait for it
    ///
    /// The reservation is taken before sleeping; a caller dropped while
    /// waiting still consumes its slot.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let slot = {
            let mut next = self.next_slot.lock();
            let now = Instant::now();
            let slot = if *next > now { *next } else { now };
            *next = slot + self.min_interval;
            slot
        };

        if slot > Instant::now() {
            trace!("Throttle: waiting {:?} for slot", slot - Instant::now());
            tokio::time::sleep_until(slot).await;
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::disabled()
    }
}
