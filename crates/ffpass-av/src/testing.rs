//! In-crate fakes for the prober and driver seams.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use crate::driver::{ExecutionError, ProcessDriver};
use crate::media::{Media, MediaKind};
use crate::probe::{AudioStream, Prober, StreamInfo, VideoStream};
use crate::progress::ProgressListener;
use crate::{Error, Result};

#[derive(Default)]
pub struct FakeProber {
    missing: HashSet<PathBuf>,
    audio_only: HashSet<PathBuf>,
    empty: HashSet<PathBuf>,
}

impl FakeProber {
    pub fn missing(mut self, path: &str) -> Self {
        self.missing.insert(PathBuf::from(path));
        self
    }

    pub fn audio_only(mut self, path: &str) -> Self {
        self.audio_only.insert(PathBuf::from(path));
        self
    }

    pub fn no_streams(mut self, path: &str) -> Self {
        self.empty.insert(PathBuf::from(path));
        self
    }
}

impl Prober for FakeProber {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn streams(&self, path: &Path) -> Result<StreamInfo> {
        if self.missing.contains(path) {
            return Err(Error::probe(path, "no such file"));
        }
        let mut info = StreamInfo {
            file_path: path.to_path_buf(),
            container: "fake".to_string(),
            duration: Some(Duration::from_secs(60)),
            ..Default::default()
        };
        if self.empty.contains(path) {
            return Ok(info);
        }
        if !self.audio_only.contains(path) {
            info.videos.push(VideoStream {
                index: 0,
                codec: "h264".to_string(),
                width: 1920,
                height: 1080,
                frame_rate: Some(25.0),
            });
        }
        info.audios.push(AudioStream {
            index: 1,
            codec: "aac".to_string(),
            channels: 2,
            sample_rate: Some(48000),
            language: None,
        });
        Ok(info)
    }
}

/// Records every command; optionally fails one call (1-based).
#[derive(Default)]
pub struct RecordingDriver {
    calls: Mutex<Vec<Vec<String>>>,
    log_dirs: Mutex<Vec<bool>>,
    fail_on: Option<usize>,
    threads: Option<u32>,
}

impl RecordingDriver {
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// For each call carrying `-passlogfile`, whether its directory existed.
    pub fn log_dirs_existed(&self) -> Vec<bool> {
        self.log_dirs.lock().unwrap().clone()
    }
}

impl ProcessDriver for RecordingDriver {
    fn execute(
        &self,
        args: &[String],
        _bypass_errors: bool,
        listener: Option<&mut dyn ProgressListener>,
    ) -> std::result::Result<(), ExecutionError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(args.to_vec());
            calls.len()
        };
        if let Some(i) = args.iter().position(|a| a == "-passlogfile") {
            let dir_exists = Path::new(&args[i + 1])
                .parent()
                .is_some_and(|p| p.is_dir());
            self.log_dirs.lock().unwrap().push(dir_exists);
        }
        if let Some(listener) = listener {
            listener.on_line("frame=  10 fps=0.0 q=0.0 size=0kB time=00:00:30.00 bitrate=0.0kbits/s speed=1.0x");
        }
        if self.fail_on == Some(n) {
            return Err(ExecutionError::new("ffmpeg", Some(1), format!("call {n} failed")));
        }
        Ok(())
    }

    fn threads(&self) -> Option<u32> {
        self.threads
    }
}

pub fn video_media<'a>(
    path: &str,
    prober: &'a FakeProber,
    driver: &'a RecordingDriver,
) -> Media<'a> {
    Media::new(path, MediaKind::Video, prober, driver)
}

pub fn audio_media<'a>(
    path: &str,
    prober: &'a FakeProber,
    driver: &'a RecordingDriver,
) -> Media<'a> {
    Media::new(path, MediaKind::Audio, prober, driver)
}
