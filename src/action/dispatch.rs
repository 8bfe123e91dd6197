// src/action/dispatch.rs  —  IntentSink that looks up and runs the handler
use super::{handler_for, HandlerId, HandlerOutput, InvokeError, Invoker};
use crate::chord::{Intent, IntentSink};

pub struct Dispatcher {
    invoker: Invoker,
    dry_run: bool,
}

impl Dispatcher {
    pub fn new(invoker: Invoker, dry_run: bool) -> Self {
        Self { invoker, dry_run }
    }

    /// Run one handler and log the outcome.  Returns true on success.
    pub fn run(&self, handler: HandlerId) -> bool {
        match self.invoker.invoke(handler) {
            Ok(out) => {
                log::info!("[invoke] {handler} done in {}ms", out.elapsed.as_millis());
                log_output(handler, &out);
                true
            }
            Err(e) => {
                log::warn!("[invoke] {e}");
                if let Some(out) = e.output() {
                    log_output(handler, out);
                }
                if let InvokeError::NotFound { .. } = e {
                    log::debug!("[invoke] handler directory: {}", self.invoker.dir().display());
                }
                false
            }
        }
    }
}

impl IntentSink for Dispatcher {
    fn dispatch(&mut self, intent: Intent) {
        let handler = handler_for(intent);
        if self.dry_run {
            log::info!("[dispatch] {intent} → {handler}  (dry run)");
            return;
        }
        log::info!("[dispatch] {intent} → {handler}");
        self.run(handler);
    }
}

fn log_output(handler: HandlerId, out: &HandlerOutput) {
    let stdout = out.stdout.trim();
    if !stdout.is_empty() {
        log::info!("[invoke] {handler} stdout:\n{stdout}");
    }
    let stderr = out.stderr.trim();
    if !stderr.is_empty() {
        log::warn!("[invoke] {handler} stderr:\n{stderr}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::HandlerFiles;
    use crate::input::Finger;
    use std::path::PathBuf;
    use std::time::Duration;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("chordglove-dispatch-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn dispatch_runs_mapped_handler() {
        let dir = scratch("run");
        let mut files = HandlerFiles::default();
        files.set(HandlerId::Motion, "motion.sh");
        std::fs::write(dir.join("motion.sh"), "touch ran-motion\n").unwrap();
        let invoker = Invoker::new(dir.clone(), "sh".into(), Duration::from_secs(5), files);
        let mut d = Dispatcher::new(invoker, false);
        d.dispatch(Intent::ThumbChord(Finger::Pinky));
        assert!(dir.join("ran-motion").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn dry_run_spawns_nothing() {
        let dir = scratch("dry");
        let mut files = HandlerFiles::default();
        files.set(HandlerId::Weather, "weather.sh");
        std::fs::write(dir.join("weather.sh"), "touch ran-weather\n").unwrap();
        let invoker = Invoker::new(dir.clone(), "sh".into(), Duration::from_secs(5), files);
        let mut d = Dispatcher::new(invoker, true);
        d.dispatch(Intent::ThumbAlone);
        assert!(!dir.join("ran-weather").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failures_are_swallowed() {
        let dir = scratch("fail");
        let invoker = Invoker::new(dir.clone(), "sh".into(), Duration::from_secs(5), HandlerFiles::default());
        let mut d = Dispatcher::new(invoker, false);
        // nothing exists in the directory: logs and returns
        d.dispatch(Intent::SingleButton(Finger::Index));
        assert!(!d.run(HandlerId::VolumeUp));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
