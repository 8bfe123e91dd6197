// src/action/mod.rs  —  Intent → handler table, process invoker, dispatcher
pub mod dispatch;
pub mod invoker;

pub use dispatch::Dispatcher;
pub use invoker::{HandlerOutput, InvokeError, Invoker};

use crate::chord::Intent;
use crate::input::Finger;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named external actions.  Each one is a self-contained program living in
/// the handler directory; the file name is configurable per handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum HandlerId {
    /// Read the thermistor and announce the temperature
    Temperature,
    /// Ask the vision API what the camera sees
    CameraQuery,
    /// Announce the current time
    Time,
    /// Measure and announce the distance ahead
    FrontDistance,
    /// Raise the output volume
    VolumeUp,
    /// Measure and announce the distance behind
    BackDistance,
    /// Lower the output volume
    VolumeDown,
    /// Check the PIR sensor for motion
    Motion,
    /// Look up and announce the local weather
    Weather,
}

impl HandlerId {
    pub const ALL: [HandlerId; 9] = [
        HandlerId::Temperature,   HandlerId::CameraQuery,
        HandlerId::Time,          HandlerId::FrontDistance,
        HandlerId::VolumeUp,      HandlerId::BackDistance,
        HandlerId::VolumeDown,    HandlerId::Motion,
        HandlerId::Weather,
    ];

    pub fn key(self) -> &'static str {
        match self {
            HandlerId::Temperature   => "temperature",
            HandlerId::CameraQuery   => "camera_query",
            HandlerId::Time          => "time",
            HandlerId::FrontDistance => "front_distance",
            HandlerId::VolumeUp      => "volume_up",
            HandlerId::BackDistance  => "back_distance",
            HandlerId::VolumeDown    => "volume_down",
            HandlerId::Motion        => "motion",
            HandlerId::Weather       => "weather",
        }
    }

    /// File name used when the config does not override it.
    pub fn default_file(self) -> &'static str {
        match self {
            HandlerId::Temperature   => "thermistor.py",
            HandlerId::CameraQuery   => "Camera_OpenAI.py",
            HandlerId::Time          => "current_time.py",
            HandlerId::FrontDistance => "ultrasonicfront.py",
            HandlerId::VolumeUp      => "Volume_Up.py",
            HandlerId::BackDistance  => "ultrasonicback.py",
            HandlerId::VolumeDown    => "Volume_Down.py",
            HandlerId::Motion        => "PIR.py",
            HandlerId::Weather       => "weather.py",
        }
    }

    fn slot(self) -> usize {
        Self::ALL.iter().position(|h| *h == self).unwrap_or_default()
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.key()) }
}

/// The dispatch table.  Total over every intent; the thumb has no single or
/// chord entry of its own, which `Intent` already rules out by type.
pub fn handler_for(intent: Intent) -> HandlerId {
    match intent {
        Intent::SingleButton(Finger::Pointer) => HandlerId::Temperature,
        Intent::SingleButton(Finger::Middle)  => HandlerId::Time,
        Intent::SingleButton(Finger::Index)   => HandlerId::VolumeUp,
        Intent::SingleButton(Finger::Pinky)   => HandlerId::VolumeDown,
        Intent::ThumbChord(Finger::Pointer)   => HandlerId::CameraQuery,
        Intent::ThumbChord(Finger::Middle)    => HandlerId::FrontDistance,
        Intent::ThumbChord(Finger::Index)     => HandlerId::BackDistance,
        Intent::ThumbChord(Finger::Pinky)     => HandlerId::Motion,
        Intent::ThumbAlone                    => HandlerId::Weather,
    }
}

/// Every intent, in the order `--list-actions` prints them.
pub fn all_intents() -> Vec<Intent> {
    let mut out: Vec<Intent> = Finger::ALL.iter().rev().map(|f| Intent::SingleButton(*f)).collect();
    out.extend(Finger::ALL.iter().rev().map(|f| Intent::ThumbChord(*f)));
    out.push(Intent::ThumbAlone);
    out
}

/// Handler file names, one per [`HandlerId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFiles([String; 9]);

impl Default for HandlerFiles {
    fn default() -> Self {
        Self(HandlerId::ALL.map(|h| h.default_file().to_string()))
    }
}

impl HandlerFiles {
    pub fn get(&self, id: HandlerId) -> &str { &self.0[id.slot()] }

    pub fn set(&mut self, id: HandlerId, file: impl Into<String>) {
        self.0[id.slot()] = file.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_is_total_and_one_to_one() {
        let intents = all_intents();
        assert_eq!(intents.len(), 9);
        let handlers: HashSet<_> = intents.iter().map(|i| handler_for(*i)).collect();
        assert_eq!(handlers.len(), HandlerId::ALL.len());
    }

    #[test]
    fn table_matches_glove_layout() {
        assert_eq!(handler_for(Intent::SingleButton(Finger::Pointer)), HandlerId::Temperature);
        assert_eq!(handler_for(Intent::ThumbChord(Finger::Pointer)),   HandlerId::CameraQuery);
        assert_eq!(handler_for(Intent::SingleButton(Finger::Middle)),  HandlerId::Time);
        assert_eq!(handler_for(Intent::ThumbChord(Finger::Middle)),    HandlerId::FrontDistance);
        assert_eq!(handler_for(Intent::SingleButton(Finger::Index)),   HandlerId::VolumeUp);
        assert_eq!(handler_for(Intent::ThumbChord(Finger::Index)),     HandlerId::BackDistance);
        assert_eq!(handler_for(Intent::SingleButton(Finger::Pinky)),   HandlerId::VolumeDown);
        assert_eq!(handler_for(Intent::ThumbChord(Finger::Pinky)),     HandlerId::Motion);
        assert_eq!(handler_for(Intent::ThumbAlone),                    HandlerId::Weather);
    }

    #[test]
    fn handler_files_override_one_slot() {
        let mut files = HandlerFiles::default();
        files.set(HandlerId::Weather, "wx.sh");
        assert_eq!(files.get(HandlerId::Weather), "wx.sh");
        assert_eq!(files.get(HandlerId::Motion), "PIR.py");
    }
}
