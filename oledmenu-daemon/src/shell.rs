//! Bounded subprocess calls
//!
//! Every external program the menu runs goes through [`Runner`]. Programs
//! are started with an explicit argument vector (never through a shell),
//! polled until they exit or a deadline passes, and killed at the deadline.
//! Output is collected by reader threads under the same deadline; readers
//! still held open by a leftover descendant are abandoned.
//! The caller always gets a [`CommandStatus`] back, never an error.

use std::io::Read;
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Stdio};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// Exit code reported when the deadline passed
pub const TIMEOUT_CODE: i32 = 124;

/// Exit code reported when the program could not be started
pub const SPAWN_FAILURE_CODE: i32 = 127;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Outcome of a command: exit code and a one-line message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStatus {
    pub code: i32,
    /// Trimmed stdout on success, stderr (or stdout) otherwise
    pub message: String,
}

impl CommandStatus {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn timed_out(&self) -> bool {
        self.code == TIMEOUT_CODE
    }
}

/// Something that can run a program with a deadline
pub trait Runner {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> CommandStatus;
}

impl<R: Runner + ?Sized> Runner for &R {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> CommandStatus {
        (**self).run(program, args, timeout)
    }
}

impl<R: Runner + ?Sized> Runner for Rc<R> {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> CommandStatus {
        (**self).run(program, args, timeout)
    }
}

/// Runs real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> CommandStatus {
        run_with_timeout(program, args, timeout)
    }
}

/// Run `program` with `args`, killing it after `timeout`
///
/// Arguments are not logged; some carry secrets.
pub fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> CommandStatus {
    log::debug!("running {} ({} args, timeout {:?})", program, args.len(), timeout);

    let spawned = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            log::warn!("cannot start {}: {}", program, e);
            return CommandStatus {
                code: SPAWN_FAILURE_CODE,
                message: format!("cannot run {}: {}", program, e),
            };
        }
    };

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);
    let deadline = Instant::now() + timeout;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                let now = Instant::now();
                if now >= deadline {
                    if let Err(e) = child.kill() {
                        log::warn!("cannot kill {}: {}", program, e);
                    }
                    // Reap; the readers are dropped with their channels
                    let _ = child.wait();
                    log::warn!("{} timed out after {:?}", program, timeout);
                    return CommandStatus {
                        code: TIMEOUT_CODE,
                        message: format!("{} timed out", program),
                    };
                }
                thread::sleep(POLL_INTERVAL.min(deadline - now));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return CommandStatus {
                    code: 1,
                    message: format!("cannot wait for {}: {}", program, e),
                };
            }
        }
    };

    let stdout = collect(program, stdout, deadline);
    let stderr = collect(program, stderr, deadline);
    let code = exit_code(status);
    let message = if code == 0 || stderr.is_empty() {
        stdout
    } else {
        stderr
    };
    log::debug!("{} exited with {}", program, code);
    CommandStatus { code, message }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        let _ = tx.send(String::from_utf8_lossy(&bytes).trim().to_string());
    });
    rx
}

/// Wait for a reader until `deadline`; a pipe still open then yields nothing
fn collect(program: &str, reader: Option<Receiver<String>>, deadline: Instant) -> String {
    let Some(reader) = reader else {
        return String::new();
    };
    let remaining = deadline.saturating_duration_since(Instant::now());
    match reader.recv_timeout(remaining) {
        Ok(output) => output,
        Err(_) => {
            log::warn!("{} left its output open past the deadline", program);
            String::new()
        }
    }
}

/// Shell convention: the exit code, or 128 + signal number
fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

/// Canned runner for tests: answers by the joined command line
#[cfg(test)]
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    replies: std::cell::RefCell<Vec<(String, CommandStatus)>>,
    pub calls: std::cell::RefCell<Vec<(String, Duration)>>,
}

#[cfg(test)]
impl ScriptedRunner {
    pub fn reply(&self, command_line: &str, code: i32, message: &str) {
        self.replies.borrow_mut().push((
            command_line.to_string(),
            CommandStatus {
                code,
                message: message.to_string(),
            },
        ));
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(line, _)| line.clone()).collect()
    }
}

#[cfg(test)]
impl Runner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> CommandStatus {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.borrow_mut().push((line.clone(), timeout));
        self.replies
            .borrow()
            .iter()
            .find(|(expected, _)| *expected == line)
            .map(|(_, status)| status.clone())
            .unwrap_or(CommandStatus {
                code: SPAWN_FAILURE_CODE,
                message: format!("no reply scripted for {}", line),
            })
    }
}
