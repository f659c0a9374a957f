//! Running the encoder binary.
//!
//! [`ProcessDriver`] is the seam between the encode pipeline and the
//! operating system. The pipeline hands it a finished token sequence and only
//! cares whether it succeeded; [`FfmpegDriver`] is the real implementation.

use std::collections::VecDeque;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::progress::ProgressListener;
use crate::Result;

/// Number of stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// How often a process that closed stderr is polled for exit.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The encoder process did not complete successfully.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{program} {status}: {detail}")]
pub struct ExecutionError {
    program: String,
    code: Option<i32>,
    status: String,
    detail: String,
}

impl ExecutionError {
    /// The process exited with `code` (`None` when killed by a signal).
    pub fn new(program: impl Into<String>, code: Option<i32>, detail: impl Into<String>) -> Self {
        let status = match code {
            Some(c) => format!("exited with status {c}"),
            None => "was terminated".to_string(),
        };
        Self {
            program: program.into(),
            code,
            status,
            detail: detail.into(),
        }
    }

    /// The process could not be started.
    pub fn spawn(program: impl Into<String>, err: &std::io::Error) -> Self {
        Self {
            program: program.into(),
            code: None,
            status: "failed to spawn".to_string(),
            detail: err.to_string(),
        }
    }

    /// The process ran past its deadline and was killed.
    pub fn timed_out(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            code: None,
            status: "timed out".to_string(),
            detail: format!("killed after {:?}", timeout),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Exit code, if the process exited normally.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Tail of the process's stderr, or the reason it never ran.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Executes token sequences as encoder invocations.
pub trait ProcessDriver: Send + Sync {
    /// Run the encoder with `args`, blocking until it exits.
    ///
    /// Every output line is handed to `listener` while the process runs. With
    /// `bypass_errors` a non-zero exit is not reported as a failure.
    fn execute(
        &self,
        args: &[String],
        bypass_errors: bool,
        listener: Option<&mut dyn ProgressListener>,
    ) -> std::result::Result<(), ExecutionError>;

    /// Thread count to request from the encoder, if configured.
    fn threads(&self) -> Option<u32> {
        None
    }
}

/// Settings for [`FfmpegDriver`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Passed as `-threads` on every encode.
    #[serde(default)]
    pub threads: Option<u32>,
    /// Kill the encoder if a single invocation runs longer than this.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

/// [`ProcessDriver`] spawning an ffmpeg executable.
#[derive(Debug, Clone)]
pub struct FfmpegDriver {
    binary: PathBuf,
    config: DriverConfig,
}

impl FfmpegDriver {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            config: DriverConfig::default(),
        }
    }

    /// Locate ffmpeg via a configured path or `PATH`.
    pub fn discover(config_path: Option<&Path>) -> Result<Self> {
        crate::tools::get_tool_path("ffmpeg", config_path).map(Self::new)
    }

    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.config.threads = Some(threads);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn program_name(&self) -> String {
        self.binary
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.binary.to_string_lossy().to_string())
    }
}

impl Default for FfmpegDriver {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl ProcessDriver for FfmpegDriver {
    fn execute(
        &self,
        args: &[String],
        bypass_errors: bool,
        mut listener: Option<&mut dyn ProgressListener>,
    ) -> std::result::Result<(), ExecutionError> {
        let program = self.program_name();
        tracing::debug!("exec: {} {}", self.binary.display(), args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutionError::spawn(&program, &e))?;

        let (tx, rx) = mpsc::channel::<String>();
        let reader = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                split_lines(BufReader::new(stderr), |line| {
                    // Receiver gone means the process was abandoned.
                    let _ = tx.send(line);
                })
            })
        });

        let deadline = self.config.timeout.map(|t| Instant::now() + t);
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

        loop {
            let received = match deadline {
                Some(d) => rx.recv_timeout(d.saturating_duration_since(Instant::now())),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(line) => {
                    if let Some(l) = listener.as_mut() {
                        l.on_line(&line);
                    }
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);

                    // A child flooding stderr keeps the channel non-empty past the deadline.
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        return Err(kill_timed_out(&mut child, &program, self.config.timeout));
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(kill_timed_out(&mut child, &program, self.config.timeout));
                }
            }
        }

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        return Err(kill_timed_out(&mut child, &program, self.config.timeout));
                    }
                    thread::sleep(EXIT_POLL_INTERVAL);
                }
                Err(e) => return Err(ExecutionError::new(&program, None, e.to_string())),
            }
        };

        if let Some(handle) = reader {
            join_reader(handle, &program);
        }

        if !status.success() && !bypass_errors {
            let detail = tail.into_iter().collect::<Vec<_>>().join("\n");
            return Err(ExecutionError::new(program, status.code(), detail));
        }

        Ok(())
    }

    fn threads(&self) -> Option<u32> {
        self.config.threads
    }
}

/// Wait for the stderr reader; `false` if it panicked.
fn join_reader(handle: thread::JoinHandle<()>, program: &str) -> bool {
    if handle.join().is_err() {
        tracing::warn!("{program} stderr reader panicked, error detail may be incomplete");
        return false;
    }
    true
}

fn kill_timed_out(child: &mut Child, program: &str, timeout: Option<Duration>) -> ExecutionError {
    tracing::warn!("{program} exceeded its timeout, killing pid {}", child.id());
    let _ = child.kill();
    let _ = child.wait();
    ExecutionError::timed_out(program, timeout.unwrap_or_default())
}

/// Split a byte stream on `\n` and `\r`; ffmpeg rewrites its status line with
/// carriage returns.
fn split_lines(reader: impl Read, mut emit: impl FnMut(String)) {
    let mut current = Vec::new();
    for byte in reader.bytes() {
        let Ok(byte) = byte else { break };
        if byte == b'\n' || byte == b'\r' {
            if !current.is_empty() {
                emit(String::from_utf8_lossy(&current).trim_end().to_string());
                current.clear();
            }
        } else {
            current.push(byte);
        }
    }
    if !current.is_empty() {
        emit(String::from_utf8_lossy(&current).trim_end().to_string());
    }
}
