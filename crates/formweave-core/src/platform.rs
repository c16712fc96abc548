//! Platform abstraction traits for formweave runtime services.
//!
//! The engine never reads wall-clock time directly. Hosts hand a [`Clock`]
//! to the [`Coalescer`](crate::Coalescer) so the same refresh pipeline can be
//! driven by real time in applications and by a [`VirtualClock`] in tests.

use std::cell::Cell;

/// Provides timing information for the runtime.
pub trait Clock {
    /// Returns the current time in milliseconds, measured from an arbitrary
    /// origin that stays fixed for the lifetime of the clock.
    fn now_millis(&self) -> u64;
}

/// Manually driven clock used by tests and headless hosts.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Cell<u64>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.set(self.now.get().saturating_add(millis));
    }

    /// Jumps to `millis`. Time never moves backwards.
    pub fn set(&self, millis: u64) {
        if millis > self.now.get() {
            self.now.set(millis);
        }
    }
}

impl Clock for VirtualClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_only_moves_forward() {
        let clock = VirtualClock::new();
        clock.advance(40);
        clock.set(10);
        assert_eq!(clock.now_millis(), 40);
        clock.set(100);
        assert_eq!(clock.now_millis(), 100);
    }
}
