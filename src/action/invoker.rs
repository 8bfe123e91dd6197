// src/action/invoker.rs  —  Run one handler program with a hard timeout
//
// Handlers are ordinary programs in the handler directory.  Each invocation:
//
//   1. resolves <dir>/<file>; a missing file is reported without spawning
//   2. starts `<interpreter> <path>` (or `<path>` if no interpreter) with the
//      handler directory as working directory and stdin closed
//   3. drains stdout / stderr on two reader threads so a chatty handler can
//      never block on a full pipe
//   4. polls for exit; past the timeout the child is killed and reaped
//   5. gives the readers at most DRAIN_GRACE after that.  A background
//      process the handler left behind can hold the pipes open forever;
//      whatever it writes later is dropped
//
// Nothing here panics or propagates into the polling loop.  Every failure
// comes back as an `InvokeError` for the caller to log.

use super::{HandlerFiles, HandlerId};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is checked for exit.
const WAIT_POLL: Duration = Duration::from_millis(20);

/// How long the output readers may run on once the child is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Captured output of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerOutput {
    pub stdout:  String,
    pub stderr:  String,
    pub elapsed: Duration,
}

/// Why a handler did not run to a successful exit.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("handler {handler}: file not found: {}", path.display())]
    NotFound { handler: HandlerId, path: PathBuf },

    #[error("handler {handler} timed out after {}s", after.as_secs())]
    Timeout { handler: HandlerId, after: Duration, output: HandlerOutput },

    #[error("handler {handler} failed: {fault}")]
    Execution { handler: HandlerId, fault: ExecutionFault, output: HandlerOutput },
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionFault {
    #[error("exited with {0}")]
    Exit(ExitStatus),
    #[error("could not start: {0}")]
    Spawn(#[source] io::Error),
    #[error("lost track of process: {0}")]
    Wait(#[source] io::Error),
}

impl InvokeError {
    /// Whatever the handler printed before it failed, if it got that far.
    pub fn output(&self) -> Option<&HandlerOutput> {
        match self {
            InvokeError::NotFound { .. }           => None,
            InvokeError::Timeout { output, .. }    => Some(output),
            InvokeError::Execution { output, .. }  => Some(output),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Invoker {
    dir:         PathBuf,
    interpreter: String,
    timeout:     Duration,
    files:       HandlerFiles,
}

impl Invoker {
    pub fn new(dir: PathBuf, interpreter: String, timeout: Duration, files: HandlerFiles) -> Self {
        Self { dir, interpreter, timeout, files }
    }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn path_for(&self, handler: HandlerId) -> PathBuf {
        self.dir.join(self.files.get(handler))
    }

    /// Run `handler` to completion or until the timeout.  Blocks the caller.
    pub fn invoke(&self, handler: HandlerId) -> Result<HandlerOutput, InvokeError> {
        let path = self.path_for(handler);
        if !path.is_file() {
            return Err(InvokeError::NotFound { handler, path });
        }
        log::info!("[invoke] {handler}: running {}", path.display());

        let started = Instant::now();
        let mut child = self.command(&path)
            .spawn()
            .map_err(|e| InvokeError::Execution {
                handler,
                fault:  ExecutionFault::Spawn(e),
                output: HandlerOutput::default(),
            })?;

        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = wait_with_deadline(&mut child, self.timeout);
        let drain_until = Instant::now() + DRAIN_GRACE;
        let output = HandlerOutput {
            stdout:  collect(stdout, drain_until),
            stderr:  collect(stderr, drain_until),
            elapsed: started.elapsed(),
        };
        match status {
            Ok(Some(status)) if status.success() => Ok(output),
            Ok(Some(status)) => {
                Err(InvokeError::Execution { handler, fault: ExecutionFault::Exit(status), output })
            }
            Ok(None) => Err(InvokeError::Timeout { handler, after: self.timeout, output }),
            Err(e) => {
                Err(InvokeError::Execution { handler, fault: ExecutionFault::Wait(e), output })
            }
        }
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = if self.interpreter.trim().is_empty() {
            Command::new(path)
        } else {
            let mut c = Command::new(self.interpreter.trim());
            c.arg(path);
            c
        };
        cmd.current_dir(&self.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// Wait for `child` up to `timeout`.  `Ok(None)` means it was killed.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) if Instant::now() >= deadline => {
                if let Err(e) = child.kill() {
                    log::warn!("[invoke] kill after timeout failed: {e}");
                }
                let _ = child.wait();
                return Ok(None);
            }
            Ok(None) => thread::sleep(WAIT_POLL),
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        }
    }
}

/// Forward everything read from `pipe` in chunks.  The channel disconnects
/// at end of stream.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    let mut pipe = pipe?;
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    Some(rx)
}

/// Gather a reader's chunks until end of stream or `until`, whichever comes
/// first.  A reader still running at `until` is left detached.
fn collect(reader: Option<Receiver<Vec<u8>>>, until: Instant) -> String {
    let Some(rx) = reader else { return String::new() };
    let mut bytes = Vec::new();
    loop {
        match rx.recv_timeout(until.saturating_duration_since(Instant::now())) {
            Ok(chunk) => bytes.extend_from_slice(&chunk),
            Err(RecvTimeoutError::Timeout) => {
                bytes.extend(rx.try_iter().flatten());
                break;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Fresh scratch directory under the system temp dir.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("chordglove-invoker-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sh_invoker(dir: &Path, timeout: Duration) -> Invoker {
        let mut files = HandlerFiles::default();
        for h in HandlerId::ALL {
            files.set(h, format!("{}.sh", h.key()));
        }
        Invoker::new(dir.to_path_buf(), "sh".into(), timeout, files)
    }

    #[test]
    fn captures_stdout_and_stderr() {
        let dir = scratch("ok");
        fs::write(dir.join("time.sh"), "echo it is noon\necho hoarse >&2\n").unwrap();
        let inv = sh_invoker(&dir, Duration::from_secs(5));
        let out = inv.invoke(HandlerId::Time).unwrap();
        assert_eq!(out.stdout.trim(), "it is noon");
        assert_eq!(out.stderr.trim(), "hoarse");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn runs_in_handler_directory() {
        let dir = scratch("cwd");
        fs::write(dir.join("weather.sh"), "ls\n").unwrap();
        fs::write(dir.join("marker.txt"), "").unwrap();
        let inv = sh_invoker(&dir, Duration::from_secs(5));
        let out = inv.invoke(HandlerId::Weather).unwrap();
        assert!(out.stdout.contains("marker.txt"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = scratch("missing");
        let inv = sh_invoker(&dir, Duration::from_secs(5));
        let err = inv.invoke(HandlerId::Motion).unwrap_err();
        assert!(matches!(err, InvokeError::NotFound { handler: HandlerId::Motion, .. }));
        assert!(err.output().is_none());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn nonzero_exit_is_execution_error_with_output() {
        let dir = scratch("exit");
        fs::write(dir.join("volume_up.sh"), "echo no mixer >&2\nexit 3\n").unwrap();
        let inv = sh_invoker(&dir, Duration::from_secs(5));
        let err = inv.invoke(HandlerId::VolumeUp).unwrap_err();
        match &err {
            InvokeError::Execution { fault: ExecutionFault::Exit(status), output, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(output.stderr.trim(), "no mixer");
            }
            other => panic!("unexpected: {other:?}"),
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn slow_handler_is_killed_at_timeout() {
        let dir = scratch("slow");
        fs::write(dir.join("camera_query.sh"), "exec sleep 10\n").unwrap();
        let inv = sh_invoker(&dir, Duration::from_millis(200));
        let started = Instant::now();
        let err = inv.invoke(HandlerId::CameraQuery).unwrap_err();
        assert!(matches!(err, InvokeError::Timeout { handler: HandlerId::CameraQuery, .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn background_child_does_not_hold_up_return() {
        let dir = scratch("bg");
        fs::write(dir.join("front_distance.sh"), "sleep 5 &\necho hi\n").unwrap();
        let inv = sh_invoker(&dir, Duration::from_millis(500));
        let started = Instant::now();
        let out = inv.invoke(HandlerId::FrontDistance).unwrap();
        assert!(started.elapsed() < Duration::from_secs(1), "took {:?}", started.elapsed());
        assert_eq!(out.stdout.trim(), "hi");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_interpreter_is_spawn_fault() {
        let dir = scratch("spawn");
        fs::write(dir.join("temperature.sh"), "echo 21C\n").unwrap();
        let mut inv = sh_invoker(&dir, Duration::from_secs(5));
        inv.interpreter = "chordglove-no-such-interpreter".into();
        let err = inv.invoke(HandlerId::Temperature).unwrap_err();
        assert!(matches!(
            err,
            InvokeError::Execution { fault: ExecutionFault::Spawn(_), .. }
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
