// src/input/null.rs  —  Null input (no GPIO available)
//
// Always reports "nothing pressed".  The controller loop still runs, which
// keeps dry runs and handler tests usable on a development machine.

use anyhow::Result;
use super::{PinInput, PollSnapshot};

pub struct NullInput;

impl NullInput {
    pub fn new() -> Self { Self }
}

impl PinInput for NullInput {
    fn name(&self) -> &str { "null" }
    fn read(&mut self) -> Result<PollSnapshot> { Ok(PollSnapshot::RELEASED) }
}
