// src/lifecycle.rs  —  Input acquisition / guaranteed release + interrupt flag
//
// Release is tied to scope: `InputSession` owns the input backend and drops
// it (which frees the pins) on every way out of `main`: normal return,
// `?` error, interrupt-driven loop exit, or an unwinding panic.

use anyhow::{Context, Result};
use crate::config::AppConfig;
use crate::input::{self, PinInput};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "please stop" flag, set from the Ctrl+C / SIGTERM handler.
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn new() -> Self { Self::default() }

    /// Route Ctrl+C and SIGTERM to this flag.  Only one handler may be
    /// installed per process.
    pub fn install(&self) -> Result<()> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            log::info!("[lifecycle] interrupt received — stopping after this tick");
            flag.request();
        })
        .context("Installing Ctrl+C handler")
    }

    pub fn request(&self)        { self.0.store(true, Ordering::SeqCst); }
    pub fn requested(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

/// The acquired inputs.  Dropping the session releases them.
pub struct InputSession {
    input: Box<dyn PinInput>,
}

impl InputSession {
    pub fn acquire(cfg: &AppConfig) -> Result<Self> {
        let input = input::create_input(cfg).context("Acquiring button inputs")?;
        log::info!("[lifecycle] inputs acquired via {}", input.name());
        Ok(Self { input })
    }

    pub fn from_input(input: Box<dyn PinInput>) -> Self {
        Self { input }
    }

    pub fn input(&mut self) -> &mut dyn PinInput { self.input.as_mut() }
}

impl Drop for InputSession {
    fn drop(&mut self) {
        log::info!("[lifecycle] releasing {} inputs", self.input.name());
    }
}
