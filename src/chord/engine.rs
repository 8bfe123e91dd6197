//! Chord engine — turns successive pin snapshots into dispatched intents.
//!
//! One call to [`ChordEngine::step`] per poll tick.  Within a tick the order
//! is fixed: thumb press, thumb release (thumb-alone check), then each finger
//! in [`Finger::ALL`] order.  Every dispatch goes through the single
//! [`DebounceClock`], so at most one intent leaves the engine per cooldown
//! window no matter which path produced it.
//!
//! Two different thumb signals are in play:
//!
//! * the thumb-alone decision uses the [`ChordState`] latch, which only a
//!   finger *press edge* seen while the thumb is down can clear;
//! * the chord/single decision for a finger reads the thumb *live* from the
//!   input at the moment the press is accepted.
//!
//! They can disagree (a thumb pressed after a finger already fired does not
//! turn that finger into a chord, and the thumb release may still count as
//! thumb-alone).  That is the intended behaviour.

use anyhow::Result;
use super::{ChordState, Clock, DebounceClock, Edge, Edges, Intent};
use crate::input::{Finger, PinInput, PollSnapshot};
use std::time::{Duration, Instant};

/// Receiver of accepted intents.  Called synchronously from inside
/// [`ChordEngine::step`]; a slow sink stalls polling for its duration.
pub trait IntentSink {
    fn dispatch(&mut self, intent: Intent);
}

pub struct ChordEngine {
    prev:     PollSnapshot,
    chord:    ChordState,
    debounce: DebounceClock,
}

impl ChordEngine {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            prev:     PollSnapshot::RELEASED,
            chord:    ChordState::new(),
            debounce: DebounceClock::new(cooldown),
        }
    }

    /// Process one snapshot.  Returns the number of intents dispatched.
    ///
    /// `input` is only used for the live thumb read behind the chord/single
    /// decision.  That read happens before the cooldown is consumed.  If it
    /// fails, the finger is skipped and left unpressed in the stored
    /// snapshot, so its press edge alone is seen again on the next tick;
    /// every other edge of the tick is committed.  The first such error is
    /// returned once the tick is done.
    pub fn step<I, C, S>(
        &mut self,
        curr:  PollSnapshot,
        input: &mut I,
        clock: &C,
        sink:  &mut S,
    ) -> Result<usize>
    where
        I: PinInput + ?Sized,
        C: Clock + ?Sized,
        S: IntentSink + ?Sized,
    {
        let edges = Edges::detect(&self.prev, &curr);
        if edges.is_quiet() {
            return Ok(0);
        }
        let mut dispatched = 0;
        let mut committed = curr;
        let mut failure: Option<anyhow::Error> = None;

        match edges.thumb {
            Edge::Pressed => {
                self.chord.thumb_pressed(clock.now());
                log::info!("[chord] thumb pressed");
            }
            Edge::Released => {
                if let Some(end) = self.chord.thumb_released(clock.now()) {
                    log::info!("[chord] thumb released after {}ms  alone={}", end.held.as_millis(), end.alone);
                    if end.alone && self.accept(Intent::ThumbAlone, clock.now()) {
                        sink.dispatch(Intent::ThumbAlone);
                        dispatched += 1;
                    }
                }
            }
            Edge::Unchanged => {}
        }

        for finger in Finger::ALL {
            if edges.finger(finger) != Edge::Pressed {
                continue;
            }
            self.chord.finger_pressed(curr.thumb);

            let now = clock.now();
            if self.debounce.is_cooling(now) {
                log::debug!("[chord] {finger} press inside cooldown, dropped");
                continue;
            }
            let thumb_down = match input.read_thumb() {
                Ok(down) => down,
                Err(e) => {
                    log::warn!("[chord] live thumb read failed, {finger} press retried next tick: {e:#}");
                    committed.fingers[finger.index()] = false;
                    failure.get_or_insert(e);
                    continue;
                }
            };
            let intent = if thumb_down {
                Intent::ThumbChord(finger)
            } else {
                Intent::SingleButton(finger)
            };
            if !self.accept(intent, now) {
                continue;
            }
            sink.dispatch(intent);
            dispatched += 1;
        }

        self.prev = committed;
        match failure {
            Some(e) => Err(e),
            None    => Ok(dispatched),
        }
    }

    fn accept(&mut self, intent: Intent, now: Instant) -> bool {
        if self.debounce.try_accept(now) {
            log::info!("[chord] {intent}");
            true
        } else {
            log::debug!("[chord] {intent} inside cooldown — dropped");
            false
        }
    }

    pub fn debounce(&self) -> &DebounceClock { &self.debounce }
    pub fn chord_state(&self) -> &ChordState  { &self.chord }
}

/// Collects intents in order; the sink used by loop-level tests.
#[cfg(test)]
impl IntentSink for Vec<Intent> {
    fn dispatch(&mut self, intent: Intent) { self.push(intent); }
}
