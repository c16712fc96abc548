//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform
//! abstraction traits defined in `formweave-core`. Applications construct a
//! [`StdRuntime`] and hand its coalescer to the nodes they render.

use std::fmt;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use formweave_core::{Clock, Coalescer, CoalescerConfig};

/// Clock implementation backed by [`std::time`]. Time is measured from the
/// moment the clock was created.
#[derive(Debug, Clone)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Returns the elapsed time as a [`Duration`] for convenience.
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Convenience container bundling the standard clock and a coalescer
/// driven by it.
#[derive(Clone)]
pub struct StdRuntime {
    clock: Rc<StdClock>,
    coalescer: Coalescer,
}

impl StdRuntime {
    /// Creates a new standard runtime instance.
    pub fn new() -> Self {
        Self::with_config(CoalescerConfig::default())
    }

    pub fn with_config(config: CoalescerConfig) -> Self {
        let clock = Rc::new(StdClock::new());
        let coalescer = Coalescer::with_config(clock.clone(), config);
        Self { clock, coalescer }
    }

    /// Returns the coalescer nodes should schedule their refreshes on.
    pub fn coalescer(&self) -> Coalescer {
        self.coalescer.clone()
    }

    /// Returns the clock implementation.
    pub fn clock(&self) -> Rc<StdClock> {
        Rc::clone(&self.clock)
    }

    /// Runs every task whose quiet period has elapsed.
    pub fn run_due(&self) -> usize {
        self.coalescer.run_due()
    }

    /// Time until the earliest pending task is due, `None` when idle.
    pub fn time_until_next(&self) -> Option<Duration> {
        let deadline = self.coalescer.next_deadline()?;
        let now = self.clock.now_millis();
        Some(Duration::from_millis(deadline.saturating_sub(now)))
    }

    /// Sleeps until pending work is due and runs it, repeating until the
    /// coalescer is idle. Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(wait) = self.time_until_next() {
            if !wait.is_zero() {
                thread::sleep(wait);
            }
            ran += self.run_due();
        }
        log::trace!("runtime idle after {ran} tasks");
        ran
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("clock", &self.clock)
            .field("pending", &self.coalescer.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn clock_is_monotonic() {
        let clock = StdClock::new();
        let first = clock.now_millis();
        thread::sleep(Duration::from_millis(2));
        assert!(clock.now_millis() >= first);
    }

    #[test]
    fn run_until_idle_waits_out_the_quiet_period() {
        let runtime = StdRuntime::with_config(CoalescerConfig { delay_ms: 5 });
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        runtime
            .coalescer()
            .schedule(1, move || counter.set(counter.get() + 1));
        assert!(runtime.time_until_next().is_some());
        assert_eq!(runtime.run_until_idle(), 1);
        assert_eq!(hits.get(), 1);
        assert!(runtime.time_until_next().is_none());
    }
}
