//! Process runner adapters.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use graft_core::application::ApplicationError;
use graft_core::application::ports::{CommandOutput, CommandRequest, ProcessRunner};
use graft_core::error::{GraftError, GraftResult};
use tracing::{debug, info, warn};

/// How often the wait loop checks whether the child has exited.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Production process runner that spawns commands through `sh -c`.
///
/// Commands run with the project root (or the request's `cwd`, joined onto
/// it) as working directory, stdin closed, and stdout/stderr captured. A
/// child that outlives its timeout is killed.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    root: PathBuf,
}

impl ShellRunner {
    /// Create a new shell runner rooted at the project directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ProcessRunner for ShellRunner {
    fn run(&self, request: &CommandRequest) -> GraftResult<CommandOutput> {
        let cwd = match &request.cwd {
            Some(dir) => self.root.join(dir.as_path()),
            None => self.root.clone(),
        };
        info!(command = %request.command, cwd = %cwd.display(), "spawning command");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&request.command)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_failed(&request.command, &e))?;

        // Drain both pipes on their own threads; a chatty child would
        // otherwise fill the pipe buffer and never exit.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + request.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!(command = %request.command, "command timed out, killing");
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = stdout.join();
                        let _ = stderr.join();
                        return Err(ApplicationError::ProcessTimeout {
                            command: request.command.clone(),
                            timeout_secs: request.timeout.as_secs(),
                        }
                        .into());
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(spawn_failed(&request.command, &e)),
            }
        };

        let output = CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        };
        debug!(exit_code = output.exit_code, "command finished");
        Ok(output)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

fn spawn_failed(command: &str, e: &std::io::Error) -> GraftError {
    ApplicationError::ProcessSpawnFailed {
        command: command.to_string(),
        reason: e.to_string(),
    }
    .into()
}

/// Process runner for testing: records every request and reports success
/// without spawning anything.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    requests: Arc<Mutex<Vec<CommandRequest>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// The commands received so far, in order.
    pub fn commands(&self) -> Vec<String> {
        let requests = self.requests.lock().unwrap();
        requests.iter().map(|r| r.command.clone()).collect()
    }

    /// The full requests received so far, in order.
    pub fn requests(&self) -> Vec<CommandRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, request: &CommandRequest) -> GraftResult<CommandOutput> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════
