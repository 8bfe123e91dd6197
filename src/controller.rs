// src/controller.rs  —  The polling loop + the --check-inputs monitor
use anyhow::{Context, Result};
use crate::chord::{ChordEngine, Clock, Edge, Edges, IntentSink};
use crate::input::{Channel, PinInput, PollSnapshot};
use crate::lifecycle::{InputSession, Shutdown};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks:      u64,
    pub dispatched: u64,
    pub errors:     u64,
}

/// Sample → classify → dispatch, until `shutdown` is requested.
///
/// Single-threaded: dispatch runs inline, so polling pauses while a handler
/// runs.  A failing tick is logged and followed by `backoff`; it never ends
/// the loop.
pub fn run<S, C>(
    session:  &mut InputSession,
    engine:   &mut ChordEngine,
    sink:     &mut S,
    clock:    &C,
    shutdown: &Shutdown,
    poll:     Duration,
    backoff:  Duration,
) -> LoopStats
where
    S: IntentSink + ?Sized,
    C: Clock + ?Sized,
{
    let mut stats = LoopStats::default();
    let input = session.input();

    while !shutdown.requested() {
        stats.ticks += 1;
        match tick(input, engine, sink, clock) {
            Ok(n) => {
                stats.dispatched += n as u64;
                thread::sleep(poll);
            }
            Err(e) => {
                stats.errors += 1;
                log::error!("[loop] error in poll tick: {e:#}");
                thread::sleep(backoff);
            }
        }
    }

    log::info!(
        "[loop] stopped after {} ticks  dispatched={}  errors={}",
        stats.ticks, stats.dispatched, stats.errors
    );
    stats
}

fn tick<S, C>(input: &mut dyn PinInput, engine: &mut ChordEngine, sink: &mut S, clock: &C) -> Result<usize>
where
    S: IntentSink + ?Sized,
    C: Clock + ?Sized,
{
    let snap = input.read().context("Reading inputs")?;
    engine.step(snap, input, clock, sink)
}

/// Print every level change for `duration` (or until interrupted).
/// Nothing is dispatched.  Returns the number of edges seen.
pub fn check_inputs(
    session:  &mut InputSession,
    pins:     &crate::config::PinMap,
    shutdown: &Shutdown,
    duration: Duration,
    poll:     Duration,
) -> usize {
    let input = session.input();
    println!("Watching {} for {}s — press each button in turn.", input.name(), duration.as_secs());

    let deadline = Instant::now() + duration;
    let mut prev = PollSnapshot::RELEASED;
    let mut edges_seen = 0;

    while !shutdown.requested() && Instant::now() < deadline {
        match input.read() {
            Ok(curr) => {
                let edges = Edges::detect(&prev, &curr);
                for ch in Channel::ALL {
                    let what = match edges.channel(ch) {
                        Edge::Pressed   => "pressed",
                        Edge::Released  => "released",
                        Edge::Unchanged => continue,
                    };
                    edges_seen += 1;
                    println!("  {:<8} (BCM {:>2})  {what}", ch.to_string(), pins.channel(ch));
                }
                prev = curr;
            }
            Err(e) => println!("  read failed: {e:#}"),
        }
        thread::sleep(poll);
    }

    if edges_seen == 0 {
        println!("No button activity seen. Check wiring, `pull` and `active_high` in the config.");
    }
    edges_seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::{Intent, SystemClock};
    use crate::input::testing::ScriptedInput;
    use crate::input::Finger;

    /// Requests shutdown once `stop_at` reads have happened.
    struct StopAfter {
        inner:    ScriptedInput,
        stop_at:  usize,
        shutdown: Shutdown,
    }

    impl PinInput for StopAfter {
        fn read(&mut self) -> Result<PollSnapshot> {
            if self.inner.reads + 1 >= self.stop_at {
                self.shutdown.request();
            }
            self.inner.read()
        }
        fn read_thumb(&mut self) -> Result<bool> { self.inner.read_thumb() }
        fn name(&self) -> &str { "stop-after" }
    }

    #[test]
    fn transient_errors_do_not_stop_the_loop() {
        let shutdown = Shutdown::new();
        let inner = ScriptedInput {
            levels:     PollSnapshot { thumb: false, fingers: [true, false, false, false] },
            fail_reads: 2,
            ..Default::default()
        };
        let mut session = InputSession::from_input(Box::new(StopAfter {
            inner,
            stop_at:  5,
            shutdown: shutdown.clone(),
        }));
        let mut engine = ChordEngine::new(Duration::from_millis(300));
        let mut sink: Vec<Intent> = vec![];

        let stats = run(
            &mut session, &mut engine, &mut sink, &SystemClock, &shutdown,
            Duration::from_millis(1), Duration::from_millis(1),
        );

        assert_eq!(stats.errors, 2);
        assert_eq!(stats.ticks, 5);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(sink, vec![Intent::SingleButton(Finger::Pinky)]);
    }

    #[test]
    fn loop_does_not_start_when_already_stopped() {
        let shutdown = Shutdown::new();
        shutdown.request();
        let mut session = InputSession::from_input(Box::new(ScriptedInput::default()));
        let mut engine = ChordEngine::new(Duration::from_millis(300));
        let mut sink: Vec<Intent> = vec![];
        let stats = run(
            &mut session, &mut engine, &mut sink, &SystemClock, &shutdown,
            Duration::from_millis(1), Duration::from_millis(1),
        );
        assert_eq!(stats.ticks, 0);
    }

    #[test]
    fn check_inputs_reports_edges_without_dispatch() {
        let shutdown = Shutdown::new();
        let mut session = InputSession::from_input(Box::new(StopAfter {
            inner: ScriptedInput {
                levels: PollSnapshot { thumb: true, fingers: [false, false, true, false] },
                ..Default::default()
            },
            stop_at:  3,
            shutdown: shutdown.clone(),
        }));
        let seen = check_inputs(
            &mut session, &crate::config::PinMap::default(), &shutdown,
            Duration::from_secs(5), Duration::from_millis(1),
        );
        assert_eq!(seen, 2);
    }
}
