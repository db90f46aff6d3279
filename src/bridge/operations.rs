//! Bridge operations - spawning and supervising adb processes

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::BridgeRunner;
use super::types::BridgeOutput;
use crate::cancel::CancelToken;
use crate::error::{SaveError, SaveResult};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs `adb` (or a compatible program) with a hard timeout
pub struct AdbBridge {
    program: PathBuf,
    serial: Option<String>,
    timeout: Duration,
}

impl AdbBridge {
    pub fn new(program: impl Into<PathBuf>, serial: Option<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            serial,
            timeout,
        }
    }

    fn full_args<'a>(&'a self, args: &[&'a str]) -> Vec<&'a str> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(serial) = &self.serial {
            full.push("-s");
            full.push(serial.as_str());
        }
        full.extend_from_slice(args);
        full
    }

    fn command_line(&self, args: &[&str]) -> String {
        let mut line = self.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Drain a pipe on its own thread; the text arrives once the pipe closes
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Wait for a reader under the same deadline as the process.
///
/// A pipe inherited by a grandchild stays open after the child exits, so the
/// reader may never finish on its own.
fn collect_pipe(
    rx: &Receiver<String>,
    command: &str,
    start: Instant,
    timeout: Duration,
    cancel: &CancelToken,
) -> SaveResult<String> {
    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(text) => return Ok(text),
            Err(RecvTimeoutError::Disconnected) => return Ok(String::new()),
            Err(RecvTimeoutError::Timeout) => {}
        }

        cancel.check()?;
        if start.elapsed() > timeout {
            warn!(
                "bridge - Output still open after {:.1}s: {}",
                start.elapsed().as_secs_f32(),
                command
            );
            return Err(SaveError::TimedOut {
                command: command.to_string(),
                after: timeout,
            });
        }
    }
}

fn stop_child(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl BridgeRunner for AdbBridge {
    fn run(&self, args: &[&str], cancel: &CancelToken) -> SaveResult<BridgeOutput> {
        cancel.check()?;

        let args = self.full_args(args);
        let command = self.command_line(&args);
        debug!("bridge - {}", command);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SaveError::Bridge {
                command: command.clone(),
                status: "not started".to_string(),
                stderr: e.to_string(),
            })?;

        // Drain both pipes so a chatty child never blocks on a full buffer
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    stop_child(&mut child);
                    return Err(SaveError::Bridge {
                        command,
                        status: "wait failed".to_string(),
                        stderr: e.to_string(),
                    });
                }
            }

            if cancel.is_cancelled() {
                warn!("bridge - Cancelling: {}", command);
                stop_child(&mut child);
                return Err(SaveError::Cancelled);
            }

            if start.elapsed() > self.timeout {
                warn!(
                    "bridge - Timeout after {:.1}s: {}",
                    start.elapsed().as_secs_f32(),
                    command
                );
                stop_child(&mut child);
                return Err(SaveError::TimedOut {
                    command,
                    after: self.timeout,
                });
            }

            std::thread::sleep(POLL_INTERVAL);
        };

        let output = BridgeOutput {
            status: status.code(),
            stdout: collect_pipe(&stdout, &command, start, self.timeout, cancel)?,
            stderr: collect_pipe(&stderr, &command, start, self.timeout, cancel)?,
        };

        debug!(
            "bridge - {} finished ({}) in {:.2}s",
            command,
            output.status_label(),
            start.elapsed().as_secs_f32()
        );

        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_and_status() {
        let bridge = AdbBridge::new("sh", None, Duration::from_secs(10));
        let out = bridge
            .run(&["-c", "echo hello; echo oops >&2; exit 3"], &CancelToken::new())
            .unwrap();

        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.status, Some(3));
        assert!(!out.success());
    }

    #[test]
    fn serial_is_prepended() {
        let bridge = AdbBridge::new("adb", Some("R58M".to_string()), Duration::from_secs(1));
        assert_eq!(bridge.full_args(&["devices"]), vec!["-s", "R58M", "devices"]);
    }

    #[test]
    fn missing_program_is_bridge_error() {
        let bridge = AdbBridge::new("/nonexistent/adb", None, Duration::from_secs(1));
        let err = bridge.run(&["devices"], &CancelToken::new()).err().unwrap();
        assert!(matches!(err, SaveError::Bridge { .. }));
    }

    #[test]
    fn slow_command_times_out() {
        let bridge = AdbBridge::new("sleep", None, Duration::from_millis(200));
        let start = Instant::now();
        let err = bridge.run(&["5"], &CancelToken::new()).err().unwrap();

        assert!(matches!(err, SaveError::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn cancellation_kills_running_command() {
        let bridge = AdbBridge::new("sleep", None, Duration::from_secs(30));
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(150));
            trigger.cancel();
        });

        let start = Instant::now();
        let err = bridge.run(&["5"], &cancel).err().unwrap();

        assert!(matches!(err, SaveError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn inherited_pipe_is_bounded_by_timeout() {
        // The backgrounded sleep keeps stdout open after sh exits
        let bridge = AdbBridge::new("sh", None, Duration::from_millis(300));
        let start = Instant::now();
        let err = bridge
            .run(&["-c", "sleep 5 & echo started"], &CancelToken::new())
            .err()
            .unwrap();

        assert!(matches!(err, SaveError::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
