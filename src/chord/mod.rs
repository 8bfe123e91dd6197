// src/chord/mod.rs  —  Edge detection, debounce gate, chord/alone tracking
pub mod clock;
pub mod debounce;
pub mod edge;
pub mod engine;
pub mod tracker;

pub use clock::{Clock, SystemClock};
pub use debounce::DebounceClock;
pub use edge::{Edge, Edges};
pub use engine::{ChordEngine, IntentSink};
pub use tracker::ChordState;

use crate::input::Finger;
use std::fmt;

/// A classified user action, ready for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Finger pressed while the thumb was not held
    SingleButton(Finger),
    /// Finger pressed while the thumb was held
    ThumbChord(Finger),
    /// Thumb pressed and released with no finger press in between
    ThumbAlone,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::SingleButton(fg) => write!(f, "{fg} only"),
            Intent::ThumbChord(fg)   => write!(f, "thumb + {fg}"),
            Intent::ThumbAlone       => f.write_str("thumb only"),
        }
    }
}
