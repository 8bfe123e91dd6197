// src/chord/edge.rs  —  Level pairs → press / release edges
//
// No filtering happens here: a single noisy sample is a real edge.  The only
// debounce in the system is the global rate limit in `debounce.rs`; signal
// conditioning is left to the pull resistors.

use crate::input::{Channel, Finger, PollSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Pressed,
    Released,
    Unchanged,
}

impl Edge {
    pub fn between(prev: bool, curr: bool) -> Self {
        match (prev, curr) {
            (false, true) => Edge::Pressed,
            (true, false) => Edge::Released,
            _             => Edge::Unchanged,
        }
    }
}

/// Per-channel edges between two consecutive snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edges {
    pub thumb:   Edge,
    pub fingers: [Edge; 4],
}

impl Edges {
    pub fn detect(prev: &PollSnapshot, curr: &PollSnapshot) -> Self {
        let mut fingers = [Edge::Unchanged; 4];
        for f in Finger::ALL {
            fingers[f.index()] = Edge::between(prev.finger(f), curr.finger(f));
        }
        Self { thumb: Edge::between(prev.thumb, curr.thumb), fingers }
    }

    pub fn finger(&self, f: Finger) -> Edge { self.fingers[f.index()] }

    pub fn channel(&self, ch: Channel) -> Edge {
        match ch {
            Channel::Thumb     => self.thumb,
            Channel::Finger(f) => self.finger(f),
        }
    }

    /// True when nothing changed this tick.
    pub fn is_quiet(&self) -> bool {
        self.thumb == Edge::Unchanged && self.fingers.iter().all(|e| *e == Edge::Unchanged)
    }
}
