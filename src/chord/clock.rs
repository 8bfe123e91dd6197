// src/chord/clock.rs  —  Time source for the debounce gate
use std::time::Instant;

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Monotonic wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant { Instant::now() }
}

/// Hand-advanced clock for deterministic tests.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock(std::cell::Cell<Instant>);

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self { Self(std::cell::Cell::new(Instant::now())) }

    pub fn advance(&self, by: std::time::Duration) {
        self.0.set(self.0.get() + by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant { self.0.get() }
}
