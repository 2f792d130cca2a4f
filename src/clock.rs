//! Time sources for step timing
//!
//! The accumulator never calls `Instant::now()` directly. It asks a [`Clock`],
//! so the same code path serves live profiling ([`SystemClock`]) and replay of
//! recorded event timestamps ([`ManualClock`]).

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A monotonic source of elapsed time
pub trait Clock {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Monotonic wall clock anchored at construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Caller-driven clock
///
/// Shared by reference between the driver that advances it and the
/// accumulator that reads it. Never goes backwards: [`ManualClock::set`] with
/// an earlier time is ignored and reported to the caller.
///
/// # Example
/// ```
/// use stepwatch::clock::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// clock.advance(Duration::from_secs(2));
/// assert_eq!(clock.now(), Duration::from_secs(2));
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    current: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `delta`
    pub fn advance(&self, delta: Duration) {
        self.current.set(self.current.get() + delta);
    }

    /// Jump to an absolute time
    ///
    /// Returns `false` (and leaves the clock unchanged) if `at` lies before
    /// the current time.
    pub fn set(&self, at: Duration) -> bool {
        if at < self.current.get() {
            return false;
        }
        self.current.set(at);
        true
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.current.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
