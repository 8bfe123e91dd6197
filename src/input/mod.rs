// src/input/mod.rs  —  PinInput trait, channel model + backend factory
#[cfg(all(feature = "gpio-rppal", target_os = "linux"))]
pub mod gpio;
#[cfg(not(all(feature = "gpio-rppal", target_os = "linux")))]
pub mod null;

use anyhow::Result;
use std::fmt;

/// One of the four finger buttons.
///
/// The thumb is not a `Finger`: it only acts as the chord modifier or as the
/// thumb-alone trigger, never as a single-button action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger { Pinky, Index, Middle, Pointer }

impl Finger {
    /// Fixed evaluation order within one tick.
    pub const ALL: [Finger; 4] = [Finger::Pinky, Finger::Index, Finger::Middle, Finger::Pointer];

    pub fn index(self) -> usize {
        match self {
            Finger::Pinky   => 0,
            Finger::Index   => 1,
            Finger::Middle  => 2,
            Finger::Pointer => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Finger::Pinky   => "pinky",
            Finger::Index   => "index",
            Finger::Middle  => "middle",
            Finger::Pointer => "pointer",
        }
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// Logical input channel: the thumb modifier or one finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Thumb,
    Finger(Finger),
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Thumb,
        Channel::Finger(Finger::Pinky),
        Channel::Finger(Finger::Index),
        Channel::Finger(Finger::Middle),
        Channel::Finger(Finger::Pointer),
    ];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Thumb      => f.write_str("thumb"),
            Channel::Finger(fg) => fg.fmt(f),
        }
    }
}

/// Levels of all five channels captured in one read.  `true` = pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollSnapshot {
    pub thumb:   bool,
    pub fingers: [bool; 4],
}

impl PollSnapshot {
    pub const RELEASED: Self = Self { thumb: false, fingers: [false; 4] };

    pub fn finger(&self, f: Finger) -> bool { self.fingers[f.index()] }

    #[cfg(test)]
    pub fn level(&self, ch: Channel) -> bool {
        match ch {
            Channel::Thumb      => self.thumb,
            Channel::Finger(f)  => self.finger(f),
        }
    }
}

/// Input backend, sampled once per poll tick.
pub trait PinInput {
    /// Read all five channels.
    fn read(&mut self) -> Result<PollSnapshot>;

    /// Live read of the thumb alone.  Used for the chord/single decision,
    /// which must see the thumb as it is *now*, not as it was at the
    /// start of the tick.
    fn read_thumb(&mut self) -> Result<bool> {
        Ok(self.read()?.thumb)
    }

    /// Human-readable backend name
    fn name(&self) -> &str;
}

/// Factory: opens the best available backend for the configured pin map.
///
/// Without GPIO support compiled in this returns the null backend, so the
/// rest of the binary (`--list-actions`, `--run`, dry runs) still works.
pub fn create_input(cfg: &crate::config::AppConfig) -> Result<Box<dyn PinInput>> {
    #[cfg(all(feature = "gpio-rppal", target_os = "linux"))]
    {
        let input = gpio::GpioInput::open(&cfg.pins, cfg.pull, cfg.active_high)?;
        Ok(Box::new(input))
    }
    #[cfg(not(all(feature = "gpio-rppal", target_os = "linux")))]
    {
        log::warn!(
            "[input] this build has no GPIO support — using the null input (pins {:?} ignored)",
            cfg.pins
        );
        Ok(Box::new(null::NullInput::new()))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted backend: `read()` returns the current levels, which the
    /// test sets between ticks.  An optional `live_thumb` queue overrides
    /// `read_thumb()` to model the thumb changing mid-tick; each entry of
    /// `thumb_faults` is consumed by one `read_thumb()`, `true` failing it.
    #[derive(Default)]
    pub struct ScriptedInput {
        pub levels:       PollSnapshot,
        pub live_thumb:   VecDeque<bool>,
        pub thumb_faults: VecDeque<bool>,
        pub fail_reads:   usize,
        pub reads:        usize,
    }

    impl PinInput for ScriptedInput {
        fn read(&mut self) -> Result<PollSnapshot> {
            self.reads += 1;
            if self.fail_reads > 0 {
                self.fail_reads -= 1;
                anyhow::bail!("scripted read failure");
            }
            Ok(self.levels)
        }

        fn read_thumb(&mut self) -> Result<bool> {
            if self.thumb_faults.pop_front() == Some(true) {
                anyhow::bail!("scripted thumb read failure");
            }
            Ok(self.live_thumb.pop_front().unwrap_or(self.levels.thumb))
        }

        fn name(&self) -> &str { "scripted" }
    }
}
