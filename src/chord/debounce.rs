// src/chord/debounce.rs  —  Global dispatch cooldown
//
// One clock for the whole controller, not one per channel: any accepted
// dispatch (single, chord or thumb-alone) restarts the window, and anything
// requested inside the window is dropped, not queued.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct DebounceClock {
    cooldown:      Duration,
    last_dispatch: Option<Instant>,
}

impl DebounceClock {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown, last_dispatch: None }
    }

    /// Accept a dispatch at `now` if the cooldown has elapsed, recording
    /// `now` as the new reference point.  Returns false (and leaves the
    /// clock untouched) while still inside the window.
    pub fn try_accept(&mut self, now: Instant) -> bool {
        if self.is_cooling(now) {
            return false;
        }
        self.last_dispatch = Some(now);
        true
    }

    pub fn is_cooling(&self, now: Instant) -> bool {
        match self.last_dispatch {
            Some(last) => now.saturating_duration_since(last) < self.cooldown,
            None       => false,
        }
    }

    pub fn last_dispatch(&self) -> Option<Instant> { self.last_dispatch }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_millis(300);

    #[test]
    fn first_request_is_always_accepted() {
        let mut d = DebounceClock::new(COOLDOWN);
        let t0 = Instant::now();
        assert!(d.try_accept(t0));
        assert_eq!(d.last_dispatch(), Some(t0));
    }

    #[test]
    fn requests_inside_window_are_dropped_without_moving_clock() {
        let mut d = DebounceClock::new(COOLDOWN);
        let t0 = Instant::now();
        assert!(d.try_accept(t0));
        assert!(!d.try_accept(t0 + Duration::from_millis(50)));
        assert!(!d.try_accept(t0 + Duration::from_millis(299)));
        assert_eq!(d.last_dispatch(), Some(t0));
    }

    #[test]
    fn window_boundary_is_inclusive_of_cooldown() {
        let mut d = DebounceClock::new(COOLDOWN);
        let t0 = Instant::now();
        assert!(d.try_accept(t0));
        assert!(d.try_accept(t0 + COOLDOWN));
        assert_eq!(d.last_dispatch(), Some(t0 + COOLDOWN));
    }
}
