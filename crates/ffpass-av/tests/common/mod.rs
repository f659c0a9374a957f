//! Shared fakes for integration tests.
//!
//! [`ScriptedDriver`] records every encoder invocation and can fail a chosen
//! call; [`StubProber`] answers every probe with one video and one audio stream.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ffpass_av::probe::{AudioStream, VideoStream};
use ffpass_av::{Error, ExecutionError, ProcessDriver, Prober, ProgressListener, StreamInfo};

#[derive(Default)]
pub struct StubProber {
    unprobeable: HashSet<PathBuf>,
}

impl StubProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unprobeable(mut self, path: &str) -> Self {
        self.unprobeable.insert(PathBuf::from(path));
        self
    }
}

impl Prober for StubProber {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn streams(&self, path: &Path) -> ffpass_av::Result<StreamInfo> {
        if self.unprobeable.contains(path) {
            return Err(Error::probe(path, "invalid data found when processing input"));
        }
        Ok(StreamInfo {
            file_path: path.to_path_buf(),
            container: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
            duration: Some(Duration::from_secs(100)),
            videos: vec![VideoStream {
                index: 0,
                codec: "h264".to_string(),
                width: 1280,
                height: 720,
                frame_rate: Some(25.0),
            }],
            audios: vec![AudioStream {
                index: 1,
                codec: "aac".to_string(),
                channels: 2,
                sample_rate: Some(44100),
                language: Some("eng".to_string()),
            }],
        })
    }
}

/// A snapshot of one `execute` call.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: Vec<String>,
    /// Whether the `-passlogfile` directory existed, when present.
    pub log_dir_existed: Option<bool>,
}

#[derive(Clone, Default)]
pub struct ScriptedDriver {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    fail_on: Option<usize>,
    stderr: Vec<String>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th call (1-based).
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    /// Lines fed to the listener on every call.
    pub fn with_stderr<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stderr = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn log_prefixes(&self) -> Vec<PathBuf> {
        self.invocations()
            .iter()
            .filter_map(|inv| flag_value(&inv.args, "-passlogfile").map(PathBuf::from))
            .collect()
    }
}

impl ProcessDriver for ScriptedDriver {
    fn execute(
        &self,
        args: &[String],
        _bypass_errors: bool,
        listener: Option<&mut dyn ProgressListener>,
    ) -> Result<(), ExecutionError> {
        let log_dir_existed = flag_value(args, "-passlogfile")
            .map(|prefix| Path::new(prefix).parent().is_some_and(|p| p.is_dir()));
        let n = {
            let mut invocations = self.invocations.lock().unwrap();
            invocations.push(Invocation {
                args: args.to_vec(),
                log_dir_existed,
            });
            invocations.len()
        };

        if let Some(listener) = listener {
            for line in &self.stderr {
                listener.on_line(line);
            }
        }

        if self.fail_on == Some(n) {
            return Err(ExecutionError::new(
                "ffmpeg",
                Some(1),
                format!("Conversion failed on call {n}"),
            ));
        }
        Ok(())
    }
}

pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

pub fn strings(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|s| s.to_string()).collect()
}
