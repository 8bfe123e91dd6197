// src/config.rs  —  Runtime configuration (CLI + TOML)
use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::action::{HandlerFiles, HandlerId};
use crate::input::{Channel, Finger};

/// The example config is embedded directly in the binary at compile time.
/// Users can write it out with:  chordglove --write-config
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config.toml.example");

// ── CLI ───────────────────────────────────────────────────────────────────────
#[derive(Parser, Debug, Default)]
#[command(
    name    = "chordglove",
    about   = "Wearable chord controller — four finger buttons + thumb modifier",
    version,
)]
pub struct Cli {
    /// Config file path (default: ~/.config/chordglove/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the handler programs (default: next to the binary)
    #[arg(long)]
    pub handler_dir: Option<PathBuf>,

    /// Program used to run handlers (default: python3; "" runs them directly)
    #[arg(long)]
    pub interpreter: Option<String>,

    /// Minimum time between two dispatched actions, ms (default: 300)
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Input poll period, ms (default: 10)
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Handler timeout, seconds (default: 30)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log recognised actions without running any handler
    #[arg(long, action)]
    pub dry_run: bool,

    /// Print the button → handler table and exit
    #[arg(long, action)]
    pub list_actions: bool,

    /// Show live button levels for 10 seconds without dispatching anything
    #[arg(long, action)]
    pub check_inputs: bool,

    /// Run a single handler once and exit (status 0 = success)
    #[arg(long, value_name = "HANDLER")]
    pub run: Option<HandlerId>,

    /// Write the built-in default config.toml to the config path and exit.
    /// Use --config <PATH> to write to a custom location.
    #[arg(long, action)]
    pub write_config: bool,

    /// Print the built-in default config.toml to stdout and exit
    #[arg(long, action)]
    pub print_config: bool,
}

// ── Enums shared across TOML + backends ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pull { Up, Down, None }

/// BCM pin numbers of the five buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    pub thumb:   u8,
    pub pinky:   u8,
    pub index:   u8,
    pub middle:  u8,
    pub pointer: u8,
}

impl PinMap {
    pub fn finger(&self, f: Finger) -> u8 {
        match f {
            Finger::Pinky   => self.pinky,
            Finger::Index   => self.index,
            Finger::Middle  => self.middle,
            Finger::Pointer => self.pointer,
        }
    }

    pub fn channel(&self, ch: Channel) -> u8 {
        match ch {
            Channel::Thumb     => self.thumb,
            Channel::Finger(f) => self.finger(f),
        }
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self { thumb: 5, pinky: 26, index: 19, middle: 13, pointer: 6 }
    }
}

// ── TOML file structure ───────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub general:  Option<GeneralCfg>,
    pub timing:   Option<TimingCfg>,
    pub pins:     Option<PinsCfg>,
    pub handlers: Option<HandlersCfg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralCfg {
    pub dry_run: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingCfg {
    pub poll_ms:          Option<u64>,
    pub debounce_ms:      Option<u64>,
    /// Pause after a failed poll before trying again
    pub error_backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinsCfg {
    pub thumb:       Option<u8>,
    pub pinky:       Option<u8>,
    pub index:       Option<u8>,
    pub middle:      Option<u8>,
    pub pointer:     Option<u8>,
    /// true: a HIGH level means pressed
    pub active_high: Option<bool>,
    pub pull:        Option<Pull>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlersCfg {
    pub dir:          Option<PathBuf>,
    pub interpreter:  Option<String>,
    pub timeout_secs: Option<u64>,
    pub files:        Option<HandlerFilesCfg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerFilesCfg {
    pub temperature:    Option<String>,
    pub camera_query:   Option<String>,
    pub time:           Option<String>,
    pub front_distance: Option<String>,
    pub volume_up:      Option<String>,
    pub back_distance:  Option<String>,
    pub volume_down:    Option<String>,
    pub motion:         Option<String>,
    pub weather:        Option<String>,
}

impl HandlerFilesCfg {
    fn get(&self, id: HandlerId) -> Option<&String> {
        match id {
            HandlerId::Temperature   => self.temperature.as_ref(),
            HandlerId::CameraQuery   => self.camera_query.as_ref(),
            HandlerId::Time          => self.time.as_ref(),
            HandlerId::FrontDistance => self.front_distance.as_ref(),
            HandlerId::VolumeUp      => self.volume_up.as_ref(),
            HandlerId::BackDistance  => self.back_distance.as_ref(),
            HandlerId::VolumeDown    => self.volume_down.as_ref(),
            HandlerId::Motion        => self.motion.as_ref(),
            HandlerId::Weather       => self.weather.as_ref(),
        }
    }
}

// ── Resolved / merged config ──────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dry_run:          bool,
    pub poll:             Duration,
    /// Global cooldown between two dispatches
    pub debounce:         Duration,
    pub error_backoff:    Duration,
    pub pins:             PinMap,
    pub active_high:      bool,
    pub pull:             Pull,
    pub handler_dir:      PathBuf,
    /// Empty → run handler files directly
    pub interpreter:      String,
    pub handler_timeout:  Duration,
    pub handler_files:    HandlerFiles,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dry_run:         false,
            poll:            Duration::from_millis(10),
            debounce:        Duration::from_millis(300),
            error_backoff:   Duration::from_millis(100),
            pins:            PinMap::default(),
            active_high:     true,
            pull:            Pull::Up,
            handler_dir:     default_handler_dir(),
            interpreter:     "python3".into(),
            handler_timeout: Duration::from_secs(30),
            handler_files:   HandlerFiles::default(),
        }
    }
}

// ── Config loader ─────────────────────────────────────────────────────────────
impl AppConfig {
    /// Config file location: `--config`, else `$XDG_CONFIG_HOME/chordglove/config.toml`.
    fn path_for(cli: &Cli) -> PathBuf {
        cli.config.clone().unwrap_or_else(default_config_path)
    }

    /// Save the embedded example as the user's config file.
    pub fn write_default_config(cli: &Cli) -> Result<PathBuf> {
        let path = Self::path_for(cli);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
        std::fs::write(&path, DEFAULT_CONFIG_TOML)
            .with_context(|| format!("cannot save config as {}", path.display()))?;
        Ok(path)
    }

    /// Parse the file at `path`.  `Ok(None)` when there is no such file.
    fn read_file(path: &Path) -> Result<Option<FileConfig>> {
        if !path.is_file() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let fc = toml::from_str(&raw)
            .with_context(|| format!("{} is not a valid chordglove config", path.display()))?;
        Ok(Some(fc))
    }

    /// Built-in defaults, then the config file, then command-line flags.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut cfg = Self::default();

        let path = Self::path_for(cli);
        match Self::read_file(&path)? {
            Some(fc) => {
                log::info!("[config] loaded {}", path.display());
                cfg.apply_file(&fc);
            }
            None if cli.config.is_some() => bail!("--config {}: no such file", path.display()),
            None => log::info!(
                "[config] {} not found, running on defaults; `chordglove --write-config` saves an editable copy",
                path.display()
            ),
        }

        cfg.apply_cli(cli);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_file(&mut self, fc: &FileConfig) {
        if let Some(g) = &fc.general {
            if let Some(v) = g.dry_run { self.dry_run = v; }
        }
        if let Some(t) = &fc.timing {
            if let Some(v) = t.poll_ms          { self.poll          = Duration::from_millis(v); }
            if let Some(v) = t.debounce_ms      { self.debounce      = Duration::from_millis(v); }
            if let Some(v) = t.error_backoff_ms { self.error_backoff = Duration::from_millis(v); }
        }
        if let Some(p) = &fc.pins {
            if let Some(v) = p.thumb       { self.pins.thumb   = v; }
            if let Some(v) = p.pinky       { self.pins.pinky   = v; }
            if let Some(v) = p.index       { self.pins.index   = v; }
            if let Some(v) = p.middle      { self.pins.middle  = v; }
            if let Some(v) = p.pointer     { self.pins.pointer = v; }
            if let Some(v) = p.active_high { self.active_high  = v; }
            if let Some(v) = p.pull        { self.pull         = v; }
        }
        if let Some(h) = &fc.handlers {
            if let Some(v) = &h.dir          { self.handler_dir     = v.clone(); }
            if let Some(v) = &h.interpreter  { self.interpreter     = v.clone(); }
            if let Some(v) = h.timeout_secs  { self.handler_timeout = Duration::from_secs(v); }
            if let Some(files) = &h.files {
                for id in HandlerId::ALL {
                    if let Some(v) = files.get(id) { self.handler_files.set(id, v.clone()); }
                }
            }
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(v) = &cli.handler_dir { self.handler_dir     = v.clone(); }
        if let Some(v) = &cli.interpreter { self.interpreter     = v.clone(); }
        if let Some(v) = cli.debounce_ms  { self.debounce        = Duration::from_millis(v); }
        if let Some(v) = cli.poll_ms      { self.poll            = Duration::from_millis(v); }
        if let Some(v) = cli.timeout_secs { self.handler_timeout = Duration::from_secs(v); }
        if cli.dry_run                    { self.dry_run         = true; }
    }

    fn validate(&self) -> Result<()> {
        if self.poll.is_zero() {
            bail!("poll_ms must be greater than zero");
        }
        if self.handler_timeout.is_zero() {
            bail!("handler timeout_secs must be greater than zero");
        }
        for (i, a) in Channel::ALL.iter().enumerate() {
            for b in &Channel::ALL[i + 1..] {
                let (pa, pb) = (self.pins.channel(*a), self.pins.channel(*b));
                if pa == pb {
                    bail!("{a} and {b} are both wired to BCM {pa} — every button needs its own pin");
                }
            }
        }
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    config_home().join("chordglove").join("config.toml")
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
fn config_home() -> PathBuf {
    if let Ok(v) = std::env::var("XDG_CONFIG_HOME") { return PathBuf::from(v); }
    let home = std::env::var("HOME").unwrap_or_default();
    PathBuf::from(home).join(".config")
}

/// Handlers ship next to the binary unless configured otherwise.
fn default_handler_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}
