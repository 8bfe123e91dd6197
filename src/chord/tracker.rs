// src/chord/tracker.rs  —  Thumb-hold episode: was the thumb used alone?
use std::time::{Duration, Instant};

/// State of one thumb hold, from press edge to release edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hold {
    started: Instant,
    alone:   bool,
}

/// Tracks whether any finger was pressed during the current thumb hold.
///
/// The `alone` latch is armed only by a thumb press edge and can flip to
/// false at most once per hold; it never re-arms before the next press.
#[derive(Debug, Clone, Default)]
pub struct ChordState {
    hold: Option<Hold>,
}

/// What happened to the thumb hold that just ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldEnd {
    pub held:  Duration,
    pub alone: bool,
}

impl ChordState {
    pub fn new() -> Self { Self::default() }

    /// Thumb press edge: start a new hold, latch armed.
    pub fn thumb_pressed(&mut self, now: Instant) {
        self.hold = Some(Hold { started: now, alone: true });
    }

    /// Finger press edge.  Only counts against the latch when the thumb is
    /// held in the same snapshot.
    pub fn finger_pressed(&mut self, thumb_held: bool) {
        if !thumb_held {
            return;
        }
        if let Some(hold) = self.hold.as_mut() {
            hold.alone = false;
        }
    }

    /// Thumb release edge: ends the hold.  `None` if no hold was open.
    pub fn thumb_released(&mut self, now: Instant) -> Option<HoldEnd> {
        self.hold.take().map(|h| HoldEnd {
            held:  now.saturating_duration_since(h.started),
            alone: h.alone,
        })
    }

    pub fn thumb_held_alone(&self) -> bool {
        self.hold.is_some_and(|h| h.alone)
    }

    #[cfg(test)]
    pub fn is_holding(&self) -> bool { self.hold.is_some() }
}
