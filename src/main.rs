// src/main.rs  —  chordglove  entry point
mod action;
mod chord;
mod config;
mod controller;
mod input;
mod lifecycle;

use action::{Dispatcher, Invoker};
use anyhow::Result;
use chord::{ChordEngine, SystemClock};
use clap::Parser;
use config::{AppConfig, Cli};
use lifecycle::{InputSession, Shutdown};
use std::time::Duration;

/// How long `--check-inputs` watches the buttons.
const CHECK_INPUTS_FOR: Duration = Duration::from_secs(10);

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // ── --print-config  ───────────────────────────────────────────────────────
    if cli.print_config {
        print!("{}", config::DEFAULT_CONFIG_TOML);
        return Ok(());
    }

    // ── --write-config  ───────────────────────────────────────────────────────
    if cli.write_config {
        let path = AppConfig::write_default_config(&cli)?;
        println!("Config written to: {}", path.display());
        println!("Edit it to set pins, handler directory, interpreter, etc.");
        return Ok(());
    }

    // ── Load config ───────────────────────────────────────────────────────────
    let cfg = AppConfig::load(&cli)?;

    let invoker = Invoker::new(
        cfg.handler_dir.clone(),
        cfg.interpreter.clone(),
        cfg.handler_timeout,
        cfg.handler_files.clone(),
    );

    // ── --list-actions  ───────────────────────────────────────────────────────
    if cli.list_actions {
        println!("Handler directory: {}", invoker.dir().display());
        for intent in action::all_intents() {
            let handler = action::handler_for(intent);
            let path = invoker.path_for(handler);
            let mark = if path.is_file() { "" } else { "   (missing)" };
            println!("  {:<16} → {:<15} {}{mark}", intent.to_string(), handler.key(), path.display());
        }
        return Ok(());
    }

    // ── --run <HANDLER>  ──────────────────────────────────────────────────────
    if let Some(handler) = cli.run {
        let ok = Dispatcher::new(invoker, false).run(handler);
        std::process::exit(if ok { 0 } else { 1 });
    }

    // ── Interrupt → stop flag ─────────────────────────────────────────────────
    let shutdown = Shutdown::new();
    shutdown.install()?;

    // ── Acquire inputs (released when `session` drops) ────────────────────────
    let mut session = match InputSession::acquire(&cfg) {
        Ok(s) => s,
        Err(e) => {
            log::error!("[lifecycle] cannot acquire inputs: {e:#}");
            return Err(e);
        }
    };

    // ── --check-inputs  ───────────────────────────────────────────────────────
    if cli.check_inputs {
        controller::check_inputs(&mut session, &cfg.pins, &shutdown, CHECK_INPUTS_FOR, cfg.poll);
        return Ok(());
    }

    // ── Main loop ─────────────────────────────────────────────────────────────
    log::info!(
        "chordglove running — handlers in {}  debounce={}ms  poll={}ms  timeout={}s{}",
        invoker.dir().display(),
        cfg.debounce.as_millis(),
        cfg.poll.as_millis(),
        cfg.handler_timeout.as_secs(),
        if cfg.dry_run { "  (dry run)" } else { "" },
    );
    println!("Button controller running. Press Ctrl+C to exit.");

    let mut engine = ChordEngine::new(cfg.debounce);
    let mut dispatcher = Dispatcher::new(invoker, cfg.dry_run);

    controller::run(
        &mut session,
        &mut engine,
        &mut dispatcher,
        &SystemClock,
        &shutdown,
        cfg.poll,
        cfg.error_backoff,
    );

    // ── Cleanup ───────────────────────────────────────────────────────────────
    drop(session);
    println!("\nInputs released. Bye.");
    Ok(())
}
